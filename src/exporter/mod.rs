// ==========================================
// 学生数据处理管道 - 导出层
// ==========================================
// 职责: 记录集 → CSV / XLSX / PDF
// 输出: <output_dir>/students_export_<token>.<ext>
// ==========================================

pub mod csv_export;
pub mod error;
pub mod format;
pub mod pdf_export;
pub mod xlsx_export;

pub use error::{ExportError, ExportResult};
pub use format::ExportFormat;
pub use pdf_export::{PageBreakPolicy, PdfLayout};

use crate::domain::StudentRecord;
use crate::importer::StagedOutput;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, instrument};

/// CSV / XLSX 导出表头
pub const EXPORT_HEADER: [&str; 6] = [
    "Student ID",
    "First Name",
    "Last Name",
    "Date of Birth",
    "Class",
    "Score",
];

/// 导出文件名前缀
pub const EXPORT_FILE_KIND: &str = "students_export";

// ==========================================
// StudentExporter
// ==========================================
pub struct StudentExporter {
    output_dir: PathBuf,
    pdf_layout: PdfLayout,
}

impl StudentExporter {
    pub fn new(output_dir: impl Into<PathBuf>, pdf_layout: PdfLayout) -> Self {
        Self {
            output_dir: output_dir.into(),
            pdf_layout,
        }
    }

    /// 渲染为字节
    pub fn render(&self, records: &[StudentRecord], format: ExportFormat) -> ExportResult<Vec<u8>> {
        match format {
            ExportFormat::Csv => {
                let mut buffer = Vec::new();
                csv_export::write_csv(records, &mut buffer)?;
                Ok(buffer)
            }
            ExportFormat::Xlsx => xlsx_export::render_xlsx(records),
            ExportFormat::Pdf => pdf_export::render_pdf(records, &self.pdf_layout),
        }
    }

    /// 渲染并发布到输出目录，返回文件路径
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub fn export(&self, records: &[StudentRecord], format: ExportFormat) -> ExportResult<PathBuf> {
        let bytes = self.render(records, format)?;

        let mut output = StagedOutput::create(&self.output_dir, EXPORT_FILE_KIND, format.extension())?;
        output.file_mut().write_all(&bytes)?;
        let path = output.publish()?;

        info!(path = %path.display(), bytes = bytes.len(), "导出完成");
        Ok(path)
    }
}
