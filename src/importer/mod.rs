// ==========================================
// 学生数据处理管道 - 导入层
// ==========================================
// 职责: 模拟数据生成、Excel → CSV 转换、CSV → 数据库导入
// 支持: xlsx（流式读取）、CSV
// ==========================================

// 模块声明
pub mod cell_value;
pub mod csv_to_store;
pub mod dataset_generator;
pub mod error;
pub mod excel_to_csv;
pub mod output_file;
pub mod score;
pub mod sheet_stream;

// 重导出核心类型
pub use cell_value::{cell_to_string, format_date_to_iso, text_to_date, CellValue, DateCoercion};
pub use csv_to_store::{CsvToStoreImporter, ImportSummary};
pub use dataset_generator::{DatasetGenerator, MAX_GENERATED_ROWS};
pub use error::{ImportError, ImportResult};
pub use excel_to_csv::{ConversionSummary, ExcelToCsvConverter, CONVERTED_CSV_HEADER};
pub use output_file::{file_token, output_file_name, StagedOutput};
pub use score::{to_store_score, to_transfer_score};
pub use sheet_stream::{for_each_row, SheetRow};
