// ==========================================
// 学生数据处理管道 - 导出模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导出模块错误类型
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("不支持的导出格式: {0}（可选 csv / xlsx / pdf）")]
    UnsupportedFormat(String),

    #[error("导出文件写入失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV 写出失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel 写出失败: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("PDF 生成失败: {0}")]
    Pdf(String),
}

// lopdf::Error 不实现 Clone / PartialEq，统一转为文本
impl From<lopdf::Error> for ExportError {
    fn from(err: lopdf::Error) -> Self {
        ExportError::Pdf(err.to_string())
    }
}

/// Result 类型别名
pub type ExportResult<T> = Result<T, ExportError>;
