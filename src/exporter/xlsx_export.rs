// ==========================================
// 学生数据处理管道 - Excel 导出
// ==========================================
// 单工作表；表头加粗；列宽自适应
// id / score 写为数值，score 缺失时单元格留空
// ==========================================

use crate::domain::StudentRecord;
use crate::exporter::error::ExportResult;
use crate::exporter::EXPORT_HEADER;
use rust_xlsxwriter::{Format, Workbook};

pub const EXPORT_SHEET_NAME: &str = "Students";

/// 生成 xlsx 字节
pub fn render_xlsx(records: &[StudentRecord]) -> ExportResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(EXPORT_SHEET_NAME)?;

    let header_format = Format::new().set_bold();
    for (col, title) in EXPORT_HEADER.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &header_format)?;
    }

    for (idx, record) in records.iter().enumerate() {
        let row = u32::try_from(idx + 1).unwrap_or(u32::MAX);
        worksheet.write_number(row, 0, record.id as f64)?;
        worksheet.write_string(row, 1, &record.first_name)?;
        worksheet.write_string(row, 2, &record.last_name)?;
        worksheet.write_string(row, 3, record.dob_text())?;
        worksheet.write_string(row, 4, record.class_text())?;
        if let Some(score) = record.score {
            worksheet.write_number(row, 5, score as f64)?;
        }
    }

    worksheet.autofit();
    Ok(workbook.save_to_buffer()?)
}
