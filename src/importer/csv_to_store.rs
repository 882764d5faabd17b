// ==========================================
// 学生数据处理管道 - CSV → 数据库导入器
// ==========================================
// 流程: 上传流 → 临时 CSV → 逐行重编码成绩 → 第二个临时 CSV → 批量导入
// 规则:
// - 表头原样保留（缺失 / 为空时报 EmptyFile，不触碰数据库）
// - 字段不足 6 的记录跳过（记日志）
// - score = CSV 值 - 5，无法解析时为 -5
// - 两个临时文件在所有退出路径上都会删除
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::score::to_store_score;
use crate::repository::{BulkLoadSpec, StudentRepository};
use csv::StringRecord;
use serde::Serialize;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

/// 数据行最少字段数
pub const REQUIRED_FIELDS: usize = 6;

/// 成绩所在字段
const SCORE_FIELD: usize = 5;

/// 导入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// 读取的数据行数（不含表头）
    pub rows_read: usize,
    /// 跳过的数据行数
    pub rows_skipped: usize,
    /// 写入数据库的行数
    pub rows_imported: u64,
}

// ==========================================
// CsvToStoreImporter
// ==========================================
pub struct CsvToStoreImporter {
    temp_dir: PathBuf,
}

impl CsvToStoreImporter {
    /// # 参数
    /// - temp_dir: 上传与重编码中转目录
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
        }
    }

    /// 导入上传的 CSV 流
    ///
    /// # 返回
    /// - Ok(ImportSummary)
    /// - Err(EmptyFile): 无表头
    /// - Err(BulkLoadError): 批量导入失败（整体回滚）
    #[instrument(skip(self, repo, input))]
    pub fn import_csv<R, I>(&self, repo: &R, mut input: I) -> ImportResult<ImportSummary>
    where
        R: StudentRepository + ?Sized,
        I: Read,
    {
        info!("开始导入 CSV");

        let mut upload = self.temp_file("uploaded_csv_")?;
        let bytes = match io::copy(&mut input, upload.as_file_mut()) {
            Ok(bytes) => bytes,
            Err(e) => {
                cleanup(upload);
                return Err(ImportError::FileWriteError(e.to_string()));
            }
        };
        debug!(bytes, path = %upload.path().display(), "上传文件已落地");

        let mut recoded = match self.temp_file("import_csv_") {
            Ok(file) => file,
            Err(e) => {
                cleanup(upload);
                return Err(e);
            }
        };

        let result = recode(&mut upload, &mut recoded).and_then(|(rows_read, rows_skipped)| {
            recoded.as_file_mut().seek(SeekFrom::Start(0))?;
            let rows_imported = repo
                .bulk_load(&BulkLoadSpec::students(), recoded.as_file_mut())
                .map_err(|e| ImportError::BulkLoadError(e.to_string()))?;
            Ok(ImportSummary {
                rows_read,
                rows_skipped,
                rows_imported,
            })
        });

        cleanup(upload);
        cleanup(recoded);

        match &result {
            Ok(summary) => info!(
                rows_read = summary.rows_read,
                rows_skipped = summary.rows_skipped,
                rows_imported = summary.rows_imported,
                "CSV 导入完成"
            ),
            Err(e) => warn!(error = %e, "CSV 导入失败"),
        }
        result
    }

    fn temp_file(&self, prefix: &str) -> ImportResult<NamedTempFile> {
        let file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(".csv")
            .tempfile_in(&self.temp_dir)
            .map_err(|e| ImportError::FileWriteError(e.to_string()))?;
        Ok(file)
    }
}

/// 重编码：保留表头，跳过短行，改写成绩字段
///
/// # 返回
/// - (读取行数, 跳过行数)
fn recode(upload: &mut NamedTempFile, recoded: &mut NamedTempFile) -> ImportResult<(usize, usize)> {
    upload.as_file_mut().seek(SeekFrom::Start(0))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(upload.as_file_mut());

    let header = reader.headers()?.clone();
    if header.iter().all(|field| field.trim().is_empty()) {
        return Err(ImportError::EmptyFile);
    }

    // 表头原样保留，列数可与数据行不同
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(recoded.as_file_mut());
    writer.write_record(&header)?;

    let mut rows_read = 0usize;
    let mut rows_skipped = 0usize;
    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        rows_read += 1;
        match recode_record(&record) {
            Some(out) => writer.write_record(&out)?,
            None => {
                warn!(
                    line = record.position().map_or(0, |p| p.line()),
                    fields = record.len(),
                    "字段不足，跳过该行"
                );
                rows_skipped += 1;
            }
        }
    }

    writer
        .flush()
        .map_err(|e| ImportError::FileWriteError(e.to_string()))?;
    Ok((rows_read, rows_skipped))
}

/// 单条记录重编码，字段不足时返回 None
fn recode_record(record: &StringRecord) -> Option<StringRecord> {
    if record.len() < REQUIRED_FIELDS {
        return None;
    }

    let score = to_store_score(&record[SCORE_FIELD]).to_string();
    Some(
        record
            .iter()
            .enumerate()
            .map(|(idx, field)| if idx == SCORE_FIELD { score.as_str() } else { field })
            .collect(),
    )
}

/// 删除临时文件，失败只记日志
fn cleanup(file: NamedTempFile) {
    let path = file.path().to_path_buf();
    if let Err(e) = file.close() {
        warn!(path = %path.display(), error = %e, "删除临时文件失败");
    }
}
