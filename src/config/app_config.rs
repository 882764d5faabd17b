// ==========================================
// 学生数据处理管道 - 应用配置
// ==========================================
// 来源（优先级从高到低）:
// - 环境变量 STUDENT_PIPELINE_*
// - JSON 配置文件
// - 默认值: 用户数据目录/student-pipeline
// ==========================================

use crate::exporter::PageBreakPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const ENV_DATA_DIR: &str = "STUDENT_PIPELINE_DATA_DIR";
pub const ENV_DB_PATH: &str = "STUDENT_PIPELINE_DB_PATH";
pub const ENV_TEMP_DIR: &str = "STUDENT_PIPELINE_TEMP_DIR";
pub const ENV_PDF_ROWS_PER_PAGE: &str = "STUDENT_PIPELINE_PDF_ROWS_PER_PAGE";

pub const APP_DIR_NAME: &str = "student-pipeline";
pub const DB_FILE_NAME: &str = "student_pipeline.db";

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置文件解析失败: {0}")]
    Json(#[from] serde_json::Error),

    #[error("配置项 {key} 非法: {value}")]
    InvalidValue { key: String, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// AppConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 生成 / 转换 / 导出文件的目录（平铺，无子目录）
    pub data_dir: PathBuf,
    /// SQLite 数据库文件
    pub db_path: PathBuf,
    /// 上传中转目录
    pub temp_dir: PathBuf,
    /// PDF 分页策略
    pub pdf_page_break: PageBreakPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        let base = dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR_NAME));
        Self::with_base_dir(&base)
    }
}

impl AppConfig {
    /// 所有路径放在 base 下
    pub fn with_base_dir(base: &Path) -> Self {
        Self {
            data_dir: base.join("data"),
            db_path: base.join(DB_FILE_NAME),
            temp_dir: std::env::temp_dir(),
            pdf_page_break: PageBreakPolicy::default(),
        }
    }

    /// 默认值 + 环境变量覆写
    pub fn from_env() -> ConfigResult<Self> {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// JSON 文件（缺省字段取默认值）+ 环境变量覆写
    pub fn from_json_file(path: &Path) -> ConfigResult<Self> {
        let text = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&text)?;
        debug!(path = %path.display(), "已加载配置文件");
        config.overlay(|key| std::env::var(key).ok())
    }

    /// 按 lookup 覆写（空白值视为未设置）
    pub fn overlay<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(dir) = get(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(path) = get(ENV_DB_PATH) {
            self.db_path = PathBuf::from(path);
        }
        if let Some(dir) = get(ENV_TEMP_DIR) {
            self.temp_dir = PathBuf::from(dir);
        }
        if let Some(rows) = get(ENV_PDF_ROWS_PER_PAGE) {
            let policy = rows
                .parse::<usize>()
                .ok()
                .map(|per_page| PageBreakPolicy::RecordCount { per_page })
                .filter(PageBreakPolicy::is_valid)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: ENV_PDF_ROWS_PER_PAGE.to_string(),
                    value: rows.clone(),
                })?;
            self.pdf_page_break = policy;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.pdf_page_break.is_valid() {
            return Err(ConfigError::InvalidValue {
                key: "pdf_page_break".to_string(),
                value: format!("{:?}", self.pdf_page_break),
            });
        }
        Ok(())
    }

    /// 确保数据目录与中转目录存在
    pub fn ensure_dirs(&self) -> ConfigResult<()> {
        fs::create_dir_all(&self.data_dir)?;
        fs::create_dir_all(&self.temp_dir)?;
        if let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// 数据库路径文本（仓储以 &str 打开连接）
    pub fn db_path_str(&self) -> String {
        self.db_path.to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_overlay_paths_and_policy() {
        let base = AppConfig::with_base_dir(Path::new("/srv/app"));
        let config = base
            .overlay(lookup(&[
                (ENV_DATA_DIR, "/srv/files"),
                (ENV_DB_PATH, " "),
                (ENV_PDF_ROWS_PER_PAGE, "30"),
            ]))
            .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/files"));
        assert_eq!(config.db_path, PathBuf::from("/srv/app").join(DB_FILE_NAME));
        assert_eq!(config.pdf_page_break, PageBreakPolicy::RecordCount { per_page: 30 });
    }

    #[test]
    fn test_overlay_rejects_bad_rows_per_page() {
        let base = AppConfig::with_base_dir(Path::new("/srv/app"));
        for bad in ["0", "abc", "500"] {
            let result = base.clone().overlay(lookup(&[(ENV_PDF_ROWS_PER_PAGE, bad)]));
            assert!(matches!(result, Err(ConfigError::InvalidValue { .. })), "{}", bad);
        }
    }

    #[test]
    fn test_json_file_defaults_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"data_dir": "/tmp/exports", "pdf_page_break": {"kind": "record_count", "per_page": 30}}"#,
        )
        .unwrap();

        let config = AppConfig::from_json_file(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/exports"));
        assert_eq!(config.pdf_page_break, PageBreakPolicy::RecordCount { per_page: 30 });
        assert_eq!(config.temp_dir, AppConfig::default().temp_dir);
    }
}
