// ==========================================
// 学生数据处理管道 - 核心库
// ==========================================
// 流程: 生成 Excel → 转换 CSV → 批量入库 → 过滤查询 → 导出 CSV / XLSX / PDF
// 技术栈: Rust + SQLite + calamine / rust_xlsxwriter / lopdf
// 并发模型: 每次调用同步执行，无跨调用可变状态
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 学生记录、过滤条件、分页
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 生成 / 转换 / 入库
pub mod importer;

// 导出层 - CSV / XLSX / PDF
pub mod exporter;

// 配置层
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 调用方入口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{NewStudent, Page, PageRequest, StudentFilter, StudentPredicate, StudentRecord};

// API
pub use api::{ApiError, ApiResult, DataApi, ExportRequest, ExportResponse, StudentApi};

// 配置
pub use config::AppConfig;

// 仓储
pub use repository::{SqliteStudentRepository, StudentRepository};

// 导出
pub use exporter::{ExportFormat, PageBreakPolicy, PdfLayout, StudentExporter};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "学生数据处理管道";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(!APP_NAME.is_empty());
    }
}
