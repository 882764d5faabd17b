// ==========================================
// 学生数据处理管道 - PDF 导出
// ==========================================
// 版式（US Letter 612 x 792）:
// - 标题 y=750（Helvetica-Bold 16），表头 y=720（Helvetica-Bold 10），仅首页
// - 数据行 Helvetica 8，首页从 y=700 开始，续页从 y=750 开始，行距 15
// 分页策略（单次渲染只用一种）:
// - VerticalCursor: 游标低于 min_y 时换页（默认，min_y=50）
// - RecordCount: 每 per_page 条记录换页
// score 缺失时输出 0（CSV / XLSX 为空）
// ==========================================

use crate::domain::StudentRecord;
use crate::exporter::error::ExportResult;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const PAGE_WIDTH: i64 = 612;
pub const PAGE_HEIGHT: i64 = 792;
pub const LEFT_MARGIN: i64 = 50;
pub const TITLE_Y: i64 = 750;
pub const HEADER_Y: i64 = 720;
pub const FIRST_ROW_Y: i64 = 700;
pub const CONTINUATION_ROW_Y: i64 = 750;
pub const ROW_STEP: i64 = 15;

pub const PDF_TITLE: &str = "Student Data Export";
pub const PDF_HEADER: &str = "Student ID | First Name | Last Name | Date of Birth | Class | Score";

/// 默认游标下限
pub const DEFAULT_MIN_Y: i64 = 50;

/// 首页在 RecordCount 策略下最多容纳的记录数（y 不低于 0）
pub const MAX_RECORDS_PER_PAGE: usize = (FIRST_ROW_Y / ROW_STEP) as usize + 1;

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";

// ==========================================
// PageBreakPolicy - 分页策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageBreakPolicy {
    /// 游标低于 min_y 时换页
    VerticalCursor { min_y: i64 },
    /// 每 per_page 条记录换页
    RecordCount { per_page: usize },
}

impl Default for PageBreakPolicy {
    fn default() -> Self {
        PageBreakPolicy::VerticalCursor {
            min_y: DEFAULT_MIN_Y,
        }
    }
}

impl PageBreakPolicy {
    /// 策略参数是否能保证所有行落在页面内
    pub fn is_valid(&self) -> bool {
        match *self {
            PageBreakPolicy::VerticalCursor { min_y } => (0..=FIRST_ROW_Y).contains(&min_y),
            PageBreakPolicy::RecordCount { per_page } => (1..=MAX_RECORDS_PER_PAGE).contains(&per_page),
        }
    }

    /// 计算每页数据行的 y 坐标
    ///
    /// # 返回
    /// - 至少一页（零记录时为一个空页）
    pub fn plan_pages(&self, record_count: usize) -> Vec<Vec<i64>> {
        let mut pages: Vec<Vec<i64>> = vec![Vec::new()];
        let mut y = FIRST_ROW_Y;

        for idx in 0..record_count {
            let break_now = match *self {
                PageBreakPolicy::VerticalCursor { min_y } => y < min_y,
                PageBreakPolicy::RecordCount { per_page } => idx > 0 && idx % per_page.max(1) == 0,
            };
            if break_now {
                pages.push(Vec::new());
                y = CONTINUATION_ROW_Y;
            }
            if let Some(page) = pages.last_mut() {
                page.push(y);
            }
            y -= ROW_STEP;
        }
        pages
    }
}

/// PDF 版式配置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfLayout {
    pub page_break: PageBreakPolicy,
}

impl PdfLayout {
    pub fn new(page_break: PageBreakPolicy) -> Self {
        Self { page_break }
    }
}

/// 单条记录的 PDF 行文本
pub fn pdf_row_text(record: &StudentRecord) -> String {
    format!(
        "{} | {} | {} | {} | {} | {}",
        record.id,
        record.first_name,
        record.last_name,
        record.dob_text(),
        record.class_text(),
        record.score.unwrap_or(0)
    )
}

fn text_line(font: &str, size: i64, y: i64, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), size.into()]),
        Operation::new("Td", vec![LEFT_MARGIN.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
    ]
}

/// 生成 PDF 字节
pub fn render_pdf(records: &[StudentRecord], layout: &PdfLayout) -> ExportResult<Vec<u8>> {
    let plan = layout.page_break.plan_pages(records.len());
    debug!(records = records.len(), pages = plan.len(), "PDF 分页完成");

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_REGULAR => regular_id,
            FONT_BOLD => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(plan.len());
    let mut rows = records.iter();
    for (page_idx, positions) in plan.iter().enumerate() {
        let mut operations = Vec::new();
        if page_idx == 0 {
            operations.extend(text_line(FONT_BOLD, 16, TITLE_Y, PDF_TITLE));
            operations.extend(text_line(FONT_BOLD, 10, HEADER_Y, PDF_HEADER));
        }
        for (&y, record) in positions.iter().zip(rows.by_ref()) {
            operations.extend(text_line(FONT_REGULAR, 8, y, &pdf_row_text(record)));
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = add_page(&mut doc, pages_id, content_id);
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

fn add_page(doc: &mut Document, pages_id: ObjectId, content_id: ObjectId) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    })
}
