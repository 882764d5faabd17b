// ==========================================
// 学生数据处理管道 - Excel → CSV 转换器
// ==========================================
// 流程: 上传流 → 临时 xlsx → 流式读取首个工作表 → 逐行转换 → 发布 CSV
// 规则:
// - 首行视为表头丢弃（不校验）
// - 已填充列宽不足 6 的行跳过（记日志）
// - DOB 规范为 YYYY-MM-DD，无法解析时原样保留
// - score = 源成绩 + 10，无法解析时为 10
// ==========================================

use crate::importer::cell_value::{cell_to_string, format_date_to_iso};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::output_file::StagedOutput;
use crate::importer::score::to_transfer_score;
use crate::importer::sheet_stream::{for_each_row, SheetRow};
use serde::Serialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// 转换后 CSV 的表头
pub const CONVERTED_CSV_HEADER: [&str; 6] = ["studentId", "firstName", "lastName", "DOB", "class", "score"];

/// 数据行最少列数
pub const REQUIRED_COLUMNS: usize = 6;

/// 转换结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    /// 发布的 CSV 路径
    pub csv_path: PathBuf,
    /// 写出的数据行数
    pub rows_written: usize,
    /// 跳过的数据行数
    pub rows_skipped: usize,
}

// ==========================================
// ExcelToCsvConverter
// ==========================================
pub struct ExcelToCsvConverter {
    data_dir: PathBuf,
    temp_dir: PathBuf,
}

impl ExcelToCsvConverter {
    /// # 参数
    /// - data_dir: CSV 发布目录
    /// - temp_dir: 上传中转目录
    pub fn new(data_dir: impl Into<PathBuf>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            temp_dir: temp_dir.into(),
        }
    }

    /// 转换上传的 Excel 流（源数据不会被修改）
    #[instrument(skip(self, input))]
    pub fn convert<R: Read>(&self, mut input: R) -> ImportResult<ConversionSummary> {
        info!("开始转换 Excel → CSV");

        // 上传流落地为临时文件，drop 时删除
        let mut upload = tempfile::Builder::new()
            .prefix("uploaded_excel_")
            .suffix(".xlsx")
            .tempfile_in(&self.temp_dir)
            .map_err(|e| ImportError::FileWriteError(e.to_string()))?;
        let bytes = io::copy(&mut input, upload.as_file_mut())
            .map_err(|e| ImportError::FileWriteError(e.to_string()))?;
        debug!(bytes, path = %upload.path().display(), "上传文件已落地");

        let summary = self.convert_file(upload.path());

        if let Err(e) = upload.close() {
            warn!(error = %e, "删除上传临时文件失败");
        }
        summary
    }

    /// 转换本地 Excel 文件
    pub fn convert_file(&self, xlsx_path: &Path) -> ImportResult<ConversionSummary> {
        let mut output = StagedOutput::create(&self.data_dir, "converted", "csv")
            .map_err(|e| ImportError::FileWriteError(e.to_string()))?;

        let mut rows_written = 0usize;
        let mut rows_skipped = 0usize;
        {
            let mut writer = csv::Writer::from_writer(output.file_mut());
            writer.write_record(CONVERTED_CSV_HEADER)?;

            let mut header_seen = false;
            for_each_row(xlsx_path, |row| {
                if !header_seen {
                    header_seen = true;
                    return Ok(());
                }
                match extract_row(&row) {
                    Some(record) => {
                        writer.write_record(&record)?;
                        rows_written += 1;
                    }
                    None => rows_skipped += 1,
                }
                Ok(())
            })?;

            writer
                .flush()
                .map_err(|e| ImportError::FileWriteError(e.to_string()))?;
        }

        let csv_path = output
            .publish()
            .map_err(|e| ImportError::FileWriteError(e.to_string()))?;

        info!(
            path = %csv_path.display(),
            rows_written,
            rows_skipped,
            "Excel → CSV 转换完成"
        );
        Ok(ConversionSummary {
            csv_path,
            rows_written,
            rows_skipped,
        })
    }
}

/// 单行转换，列不足时返回 None
fn extract_row(row: &SheetRow) -> Option<[String; 6]> {
    let width = row.populated_width();
    if width < REQUIRED_COLUMNS {
        warn!(row = row.index + 1, columns = width, "列数不足，跳过该行");
        return None;
    }

    Some([
        cell_to_string(row.cell(0)),
        cell_to_string(row.cell(1)),
        cell_to_string(row.cell(2)),
        format_date_to_iso(&cell_to_string(row.cell(3))),
        cell_to_string(row.cell(4)),
        to_transfer_score(&cell_to_string(row.cell(5))).to_string(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::cell_value::CellValue;
    use chrono::NaiveDate;

    fn row(cells: Vec<CellValue>) -> SheetRow {
        SheetRow { index: 1, cells }
    }

    #[test]
    fn test_extract_row_recodes_score_and_dob() {
        let extracted = extract_row(&row(vec![
            CellValue::Number(1.0),
            CellValue::Text("ANN".to_string()),
            CellValue::Text("LEE".to_string()),
            CellValue::Date(NaiveDate::from_ymd_opt(2004, 2, 9).unwrap()),
            CellValue::Text("Class1".to_string()),
            CellValue::Number(60.0),
        ]))
        .unwrap();

        assert_eq!(extracted, ["1", "ANN", "LEE", "2004-02-09", "Class1", "70"]);
    }

    #[test]
    fn test_extract_row_fallbacks() {
        let extracted = extract_row(&row(vec![
            CellValue::Number(2.0),
            CellValue::Text("BOB".to_string()),
            CellValue::Text("KIM".to_string()),
            CellValue::Text("someday".to_string()),
            CellValue::Empty,
            CellValue::Text("excellent".to_string()),
        ]))
        .unwrap();

        assert_eq!(extracted, ["2", "BOB", "KIM", "someday", "", "10"]);
    }

    #[test]
    fn test_extract_row_skips_short_rows() {
        let short = row(vec![
            CellValue::Number(3.0),
            CellValue::Text("CY".to_string()),
            CellValue::Text("LI".to_string()),
            CellValue::Text("2004-01-01".to_string()),
            CellValue::Text("Class1".to_string()),
            CellValue::Empty,
        ]);
        assert!(extract_row(&short).is_none());
    }
}
