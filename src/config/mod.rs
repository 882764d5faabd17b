// ==========================================
// 学生数据处理管道 - 配置层
// ==========================================
// 职责: 目录、数据库路径、PDF 分页策略
// ==========================================

pub mod app_config;

pub use app_config::{AppConfig, ConfigError, ConfigResult};
