// ==========================================
// 学生数据处理管道 - 数据管道 API
// ==========================================
// 职责: 生成模拟数据、Excel → CSV 转换、CSV 上传入库
// ==========================================

use crate::api::download::download_link;
use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::validate_count;
use crate::config::AppConfig;
use crate::importer::{CsvToStoreImporter, DatasetGenerator, ExcelToCsvConverter};
use crate::repository::StudentRepository;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

/// 文件类响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResponse {
    pub file_path: String,
    pub file_name: String,
    pub download_link: String,
}

impl FileResponse {
    fn from_path(path: &Path) -> ApiResult<Self> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| ApiError::InternalError(format!("输出文件名非法: {}", path.display())))?;
        Ok(Self {
            file_path: path.to_string_lossy().to_string(),
            download_link: download_link(&file_name),
            file_name,
        })
    }
}

/// 转换响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertResponse {
    #[serde(flatten)]
    pub file: FileResponse,
    pub rows_written: usize,
    pub rows_skipped: usize,
}

/// 上传入库响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub rows_imported: u64,
}

/// 数据管道 API
pub struct DataApi<R: StudentRepository> {
    repo: Arc<R>,
    generator: DatasetGenerator,
    converter: ExcelToCsvConverter,
    importer: CsvToStoreImporter,
}

impl<R: StudentRepository> DataApi<R> {
    pub fn new(repo: Arc<R>, config: &AppConfig) -> Self {
        Self {
            repo,
            generator: DatasetGenerator::new(&config.data_dir),
            converter: ExcelToCsvConverter::new(&config.data_dir, &config.temp_dir),
            importer: CsvToStoreImporter::new(&config.temp_dir),
        }
    }

    /// 生成模拟数据 Excel
    ///
    /// # 参数
    /// - count: 数据行数（0..=1,048,575）
    #[instrument(skip(self))]
    pub fn generate(&self, count: i64) -> ApiResult<FileResponse> {
        validate_count(count)?;
        let path = self.generator.generate(count)?;
        FileResponse::from_path(&path)
    }

    /// 上传的 Excel 转为 CSV
    #[instrument(skip(self, input))]
    pub fn convert_excel_to_csv<I: Read>(&self, input: I) -> ApiResult<ConvertResponse> {
        let summary = self.converter.convert(input)?;
        Ok(ConvertResponse {
            file: FileResponse::from_path(&summary.csv_path)?,
            rows_written: summary.rows_written,
            rows_skipped: summary.rows_skipped,
        })
    }

    /// 上传 CSV 并导入数据库
    #[instrument(skip(self, input))]
    pub fn upload_csv<I: Read>(&self, input: I) -> ApiResult<UploadResponse> {
        let summary = self.importer.import_csv(self.repo.as_ref(), input)?;
        info!(rows_imported = summary.rows_imported, "CSV 上传入库完成");
        Ok(UploadResponse {
            message: "CSV file uploaded and imported successfully".to_string(),
            rows_read: summary.rows_read,
            rows_skipped: summary.rows_skipped,
            rows_imported: summary.rows_imported,
        })
    }
}
