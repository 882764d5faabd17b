// ==========================================
// 学生数据处理管道 - Excel 流式行读取
// ==========================================
// 职责: 单向流式读取第一个工作表，按行回调
// 约束: 不把整张表读入内存
// 实现: 同一文件打开两个只读句柄，一个读值、一个读公式，按单元格位置归并
// ==========================================

use crate::importer::cell_value::CellValue;
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Reader, Xlsx};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

// ==========================================
// SheetRow - 一行单元格
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    /// 行号（从 0 开始）
    pub index: u32,
    /// 按列号存放，缺失的单元格为 Empty
    pub cells: Vec<CellValue>,
}

impl SheetRow {
    fn new(index: u32) -> Self {
        Self {
            index,
            cells: Vec::new(),
        }
    }

    fn set(&mut self, col: u32, value: CellValue) {
        let col = col as usize;
        if self.cells.len() <= col {
            self.cells.resize(col + 1, CellValue::Empty);
        }
        self.cells[col] = value;
    }

    /// 已填充列宽：最后一个有值单元格的列号 + 1
    pub fn populated_width(&self) -> usize {
        self.cells
            .iter()
            .rposition(CellValue::is_populated)
            .map_or(0, |idx| idx + 1)
    }

    pub fn cell(&self, col: usize) -> Option<&CellValue> {
        self.cells.get(col)
    }
}

/// 流式遍历第一个工作表的所有行
///
/// # 参数
/// - path: xlsx 文件路径
/// - on_row: 每行回调（按行号递增顺序，没有单元格的行不会出现）
///
/// # 返回
/// - Ok(行数)
/// - Err(ExcelParseError): 非法 xlsx 容器 / 无工作表
pub fn for_each_row<F>(path: &Path, mut on_row: F) -> ImportResult<usize>
where
    F: FnMut(SheetRow) -> ImportResult<()>,
{
    let mut value_book: Xlsx<BufReader<File>> = open_workbook(path)?;
    let mut formula_book: Xlsx<BufReader<File>> = open_workbook(path)?;

    let sheet_name = value_book
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
    debug!(sheet = %sheet_name, "开始流式读取工作表");

    let mut values = value_book.worksheet_cells_reader(&sheet_name)?;
    let mut formulas = formula_book.worksheet_cells_reader(&sheet_name)?;
    let mut pending_formula = formulas.next_formula()?;

    let mut current: Option<SheetRow> = None;
    let mut emitted = 0usize;

    while let Some(cell) = values.next_cell()? {
        let pos = cell.get_position();

        // 公式读取器追上当前位置
        while pending_formula
            .as_ref()
            .is_some_and(|f| f.get_position() < pos)
        {
            pending_formula = formulas.next_formula()?;
        }

        let value = match pending_formula.as_ref() {
            Some(f) if f.get_position() == pos && !f.get_value().is_empty() => {
                CellValue::Formula(f.get_value().clone())
            }
            _ => CellValue::from(cell.get_value()),
        };

        let (row, col) = pos;
        if current.as_ref().is_some_and(|r| r.index != row) {
            if let Some(done) = current.take() {
                on_row(done)?;
                emitted += 1;
            }
        }
        current.get_or_insert_with(|| SheetRow::new(row)).set(col, value);
    }

    if let Some(done) = current.take() {
        on_row(done)?;
        emitted += 1;
    }

    Ok(emitted)
}
