// ==========================================
// 学生数据处理管道 - 请求参数校验
// ==========================================
// 职责: 在任何存储访问 / 文件 I/O 之前拒绝非法参数
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::page::MAX_PAGE_SIZE;
use crate::domain::PageRequest;
use crate::exporter::ExportFormat;
use crate::importer::MAX_GENERATED_ROWS;

/// 校验导出格式（大小写不敏感）
pub fn validate_format(format: &str) -> ApiResult<ExportFormat> {
    Ok(format.parse::<ExportFormat>()?)
}

/// 校验生成数量
pub fn validate_count(count: i64) -> ApiResult<u32> {
    u32::try_from(count)
        .ok()
        .filter(|n| *n <= MAX_GENERATED_ROWS)
        .ok_or_else(|| {
            ApiError::InvalidInput(format!(
                "count={} 超出范围（允许 0..={}）",
                count, MAX_GENERATED_ROWS
            ))
        })
}

/// 校验分页参数
pub fn validate_page(page: u32, size: u32) -> ApiResult<PageRequest> {
    PageRequest::new(page, size).ok_or_else(|| {
        ApiError::InvalidInput(format!("size={} 超出范围（允许 1..={}）", size, MAX_PAGE_SIZE))
    })
}
