// ==========================================
// 学生数据处理管道 - 学生查询 / 导出 API
// ==========================================
// 职责: 分页过滤查询、导出用全量查询、导出文件生成
// 约束: 分页查询与导出使用同一谓词构造（StudentPredicate::build）
// ==========================================

use crate::api::download::download_link;
use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::validate_format;
use crate::config::AppConfig;
use crate::domain::{Page, PageRequest, StudentFilter, StudentPredicate, StudentRecord};
use crate::exporter::{ExportFormat, PdfLayout, StudentExporter};
use crate::repository::StudentRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// 导出请求
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    /// csv / xlsx / pdf（大小写不敏感）
    pub format: String,
    #[serde(default)]
    pub criteria: StudentFilter,
    /// None 时导出全部满足条件的记录
    #[serde(default)]
    pub page: Option<PageRequest>,
}

/// 导出响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResponse {
    pub file_path: String,
    pub file_name: String,
    pub download_link: String,
    pub format: ExportFormat,
    pub record_count: usize,
}

/// 学生 API
pub struct StudentApi<R: StudentRepository> {
    repo: Arc<R>,
    exporter: StudentExporter,
}

impl<R: StudentRepository> StudentApi<R> {
    pub fn new(repo: Arc<R>, exporter: StudentExporter) -> Self {
        Self { repo, exporter }
    }

    /// 按配置创建（导出目录 = data_dir）
    pub fn from_config(repo: Arc<R>, config: &AppConfig) -> Self {
        let exporter = StudentExporter::new(&config.data_dir, PdfLayout::new(config.pdf_page_break));
        Self::new(repo, exporter)
    }

    /// 分页过滤查询
    ///
    /// # 参数
    /// - criteria: 过滤条件（全部缺失时匹配所有记录）
    /// - page: 分页请求
    #[instrument(skip(self))]
    pub fn list_students(&self, criteria: &StudentFilter, page: PageRequest) -> ApiResult<Page<StudentRecord>> {
        let predicate = StudentPredicate::build(criteria);
        let (content, total) = self.repo.find_filtered(&predicate, Some(page))?;
        debug!(returned = content.len(), total, "分页查询完成");
        Ok(Page::new(content, page, total))
    }

    /// 导出用查询（不分页）
    #[instrument(skip(self))]
    pub fn list_students_for_export(&self, criteria: &StudentFilter) -> ApiResult<Vec<StudentRecord>> {
        let predicate = StudentPredicate::build(criteria);
        let (records, _) = self.repo.find_filtered(&predicate, None)?;
        Ok(records)
    }

    /// 导出学生数据
    ///
    /// # 返回
    /// - Err(InvalidInput): 格式非法（在查询存储之前拒绝）
    #[instrument(skip(self, request), fields(format = %request.format))]
    pub fn export_students(&self, request: &ExportRequest) -> ApiResult<ExportResponse> {
        let format = validate_format(&request.format)?;

        let records = match request.page {
            Some(page) => self.list_students(&request.criteria, page)?.content,
            None => self.list_students_for_export(&request.criteria)?,
        };

        let path = self.exporter.export(&records, format)?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| ApiError::InternalError(format!("导出文件名非法: {}", path.display())))?;

        info!(file = %file_name, records = records.len(), "学生数据导出完成");
        Ok(ExportResponse {
            file_path: path.to_string_lossy().to_string(),
            download_link: download_link(&file_name),
            file_name,
            format,
            record_count: records.len(),
        })
    }
}
