// ==========================================
// 学生数据处理管道 - 下载引用
// ==========================================
// 公开引用只由文件名生成，不暴露完整路径
// ==========================================

use crate::exporter::ExportFormat;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const DOWNLOAD_PREFIX: &str = "/api/download/";

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// 文件名 → 下载链接
pub fn download_link(file_name: &str) -> String {
    format!("{}{}", DOWNLOAD_PREFIX, file_name)
}

/// 可下载文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadTarget {
    pub path: PathBuf,
    pub content_type: &'static str,
}

/// 在 base_dir 下解析下载文件
///
/// # 返回
/// - None: 文件名非法（含路径分隔符或 ".."）或文件不存在
pub fn resolve_download(base_dir: &Path, file_name: &str) -> Option<DownloadTarget> {
    let illegal = file_name.is_empty()
        || file_name.contains('/')
        || file_name.contains('\\')
        || file_name.contains("..");
    if illegal {
        return None;
    }

    let path = base_dir.join(file_name);
    if !path.is_file() {
        return None;
    }

    let content_type = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ExportFormat::from_extension)
        .map_or(FALLBACK_CONTENT_TYPE, |format| format.content_type());

    Some(DownloadTarget { path, content_type })
}
