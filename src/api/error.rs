// ==========================================
// 学生数据处理管道 - API 层错误类型
// ==========================================
// 职责: 统一各层错误，转换为调用方可理解的错误消息
// ==========================================

use crate::exporter::ExportError;
use crate::importer::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 参数错误（任何 I/O 之前拒绝）
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 管道错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("文件导出失败: {0}")]
    ExportError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg)
            | RepositoryError::UniqueConstraintViolation(msg)
            | RepositoryError::ConstraintViolation(msg) => ApiError::DatabaseError(msg),
            err @ RepositoryError::BulkLoadFailed { .. } => ApiError::ImportError(err.to_string()),
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::InvalidCount(..) => ApiError::InvalidInput(err.to_string()),
            ImportError::Other(err) => ApiError::Other(err),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

// ==========================================
// 从 ExportError 转换
// ==========================================
impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::UnsupportedFormat(_) => ApiError::InvalidInput(err.to_string()),
            other => ApiError::ExportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_conversions() {
        let api: ApiError = ImportError::InvalidCount(-1, 10).into();
        assert!(matches!(api, ApiError::InvalidInput(_)));

        let api: ApiError = ImportError::EmptyFile.into();
        assert!(matches!(api, ApiError::ImportError(_)));

        let api: ApiError = ExportError::UnsupportedFormat("json".to_string()).into();
        assert!(matches!(api, ApiError::InvalidInput(msg) if msg.contains("json")));

        let api: ApiError = RepositoryError::BulkLoadFailed {
            row: 3,
            message: "CHECK constraint failed".to_string(),
        }
        .into();
        assert!(matches!(api, ApiError::ImportError(msg) if msg.contains("CHECK")));

        let api: ApiError = RepositoryError::DatabaseConnectionError("unable to open".to_string()).into();
        assert!(matches!(api, ApiError::DatabaseConnectionError(_)));
    }
}
