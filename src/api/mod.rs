// ==========================================
// 学生数据处理管道 - API 层
// ==========================================
// 职责: 调用方入口（查询 / 导出 / 生成 / 转换 / 上传 / 下载解析）
// ==========================================

pub mod data_api;
pub mod download;
pub mod error;
pub mod student_api;
pub mod validator;

// 重导出核心类型
pub use data_api::{ConvertResponse, DataApi, FileResponse, UploadResponse};
pub use download::{download_link, resolve_download, DownloadTarget};
pub use error::{ApiError, ApiResult};
pub use student_api::{ExportRequest, ExportResponse, StudentApi};
