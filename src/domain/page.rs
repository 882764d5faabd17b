// ==========================================
// 学生数据处理管道 - 分页类型
// ==========================================
// PageRequest: 页码从 0 开始，页大小为正
// Page<T>:     携带总记录数的分页结果
// ==========================================

use serde::{Deserialize, Serialize};

/// 默认页大小（列表查询）
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// 默认页大小（分页导出）
pub const DEFAULT_EXPORT_PAGE_SIZE: u32 = 100;

/// 页大小上限
pub const MAX_PAGE_SIZE: u32 = 10_000;

/// 分页请求
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 页码（从 0 开始）
    pub page: u32,
    /// 页大小
    pub size: u32,
}

impl PageRequest {
    /// 创建分页请求，页大小为 0 或超过上限时返回 None
    pub fn new(page: u32, size: u32) -> Option<Self> {
        if size == 0 || size > MAX_PAGE_SIZE {
            return None;
        }
        Some(Self { page, size })
    }

    /// SQL OFFSET
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// 分页结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// 当前页内容
    pub content: Vec<T>,
    /// 页码
    pub page: u32,
    /// 页大小
    pub size: u32,
    /// 总记录数
    pub total_elements: u64,
    /// 总页数
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size);
        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages: total_elements.div_ceil(size),
        }
    }

    /// 是否存在下一页
    pub fn has_next(&self) -> bool {
        u64::from(self.page) + 1 < self.total_pages
    }
}
