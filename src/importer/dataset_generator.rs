// ==========================================
// 学生数据处理管道 - 模拟数据集生成器
// ==========================================
// 输出: <data_dir>/students_<count>_<token>.xlsx
// 字段:
// - studentId: 1..=count
// - firstName / lastName: 大写字母，长度 [3, 8]
// - DOB: [2000-01-01, 2010-12-31]，YYYY-MM-DD
// - class: Class1..Class5
// - score: [55, 75]
// ==========================================

use crate::domain::DATE_FORMAT;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::output_file::StagedOutput;
use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_xlsxwriter::Workbook;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

/// 生成文件的表头
pub const GENERATED_HEADER: [&str; 6] = ["studentId", "firstName", "lastName", "DOB", "class", "score"];

/// 班级候选
pub const CLASS_LABELS: [&str; 5] = ["Class1", "Class2", "Class3", "Class4", "Class5"];

/// 单 sheet 最大数据行数（1,048,576 行减去表头）
pub const MAX_GENERATED_ROWS: u32 = 1_048_575;

pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 8;
pub const SCORE_MIN: i64 = 55;
pub const SCORE_MAX: i64 = 75;

/// 出生日期范围（闭区间）
pub fn dob_range() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
        NaiveDate::from_ymd_opt(2010, 12, 31).unwrap_or_default(),
    )
}

// ==========================================
// DatasetGenerator
// ==========================================
pub struct DatasetGenerator {
    data_dir: PathBuf,
}

impl DatasetGenerator {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// 生成 count 行模拟数据，返回文件路径
    #[instrument(skip(self))]
    pub fn generate(&self, count: i64) -> ImportResult<PathBuf> {
        self.generate_with_rng(count, &mut rand::thread_rng())
    }

    /// 使用指定随机源生成（随机源不做播种要求）
    pub fn generate_with_rng<R: Rng + ?Sized>(&self, count: i64, rng: &mut R) -> ImportResult<PathBuf> {
        let rows = u32::try_from(count)
            .ok()
            .filter(|n| *n <= MAX_GENERATED_ROWS)
            .ok_or(ImportError::InvalidCount(count, MAX_GENERATED_ROWS))?;

        info!(count = rows, "开始生成 Excel 模拟数据");

        // 常量内存模式：行写完即刷到临时文件，必须按行序写入
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet_with_constant_memory();
        worksheet.set_name("Students")?;

        for (col, title) in GENERATED_HEADER.iter().enumerate() {
            worksheet.write_string(0, col as u16, *title)?;
        }

        for row in 1..=rows {
            worksheet.write_number(row, 0, f64::from(row))?;
            worksheet.write_string(row, 1, random_alpha(rng))?;
            worksheet.write_string(row, 2, random_alpha(rng))?;
            worksheet.write_string(row, 3, random_dob(rng).format(DATE_FORMAT).to_string())?;
            worksheet.write_string(row, 4, random_class(rng))?;
            worksheet.write_number(row, 5, rng.gen_range(SCORE_MIN..=SCORE_MAX) as f64)?;
        }

        let kind = format!("students_{}", rows);
        let mut output = StagedOutput::create(&self.data_dir, &kind, "xlsx")
            .map_err(|e| ImportError::FileWriteError(e.to_string()))?;
        workbook.save_to_writer(output.file_mut())?;
        debug!(path = %output.final_path().display(), "工作簿已写入暂存文件");
        let path = output
            .publish()
            .map_err(|e| ImportError::FileWriteError(e.to_string()))?;

        info!(path = %path.display(), "Excel 模拟数据生成完成");
        Ok(path)
    }
}

/// 随机大写字母串，长度 [3, 8]
fn random_alpha<R: Rng + ?Sized>(rng: &mut R) -> String {
    let len = rng.gen_range(NAME_MIN_LEN..=NAME_MAX_LEN);
    (0..len).map(|_| rng.gen_range(b'A'..=b'Z') as char).collect()
}

/// 随机出生日期（闭区间均匀分布）
fn random_dob<R: Rng + ?Sized>(rng: &mut R) -> NaiveDate {
    let (start, end) = dob_range();
    let days = (end - start).num_days();
    start + Duration::days(rng.gen_range(0..=days))
}

fn random_class<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    CLASS_LABELS.choose(rng).copied().unwrap_or(CLASS_LABELS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_fields_in_bounds() {
        let mut rng = rand::thread_rng();
        let (start, end) = dob_range();
        for _ in 0..500 {
            let name = random_alpha(&mut rng);
            assert!((NAME_MIN_LEN..=NAME_MAX_LEN).contains(&name.len()));
            assert!(name.chars().all(|c| c.is_ascii_uppercase()));

            let dob = random_dob(&mut rng);
            assert!(dob >= start && dob <= end);

            assert!(CLASS_LABELS.contains(&random_class(&mut rng)));
        }
    }

    #[test]
    fn test_invalid_count_rejected_before_io() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");
        let generator = DatasetGenerator::new(&target);

        assert!(matches!(generator.generate(-1), Err(ImportError::InvalidCount(-1, _))));
        assert!(matches!(
            generator.generate(i64::from(MAX_GENERATED_ROWS) + 1),
            Err(ImportError::InvalidCount(_, _))
        ));
        assert!(!target.exists());
    }

    #[test]
    fn test_generated_workbook_rows_in_order() {
        use calamine::{open_workbook, Data, Reader, Xlsx};

        let dir = tempfile::tempdir().unwrap();
        let generator = DatasetGenerator::new(dir.path());
        let path = generator.generate(3).unwrap();

        // 只有发布后的文件，没有暂存残留
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range("Students").unwrap();
        let rows: Vec<_> = range.rows().collect();
        assert_eq!(rows.len(), 4);

        let header: Vec<String> = rows[0].iter().map(|c| c.to_string()).collect();
        assert_eq!(header, GENERATED_HEADER);
        for (idx, row) in rows[1..].iter().enumerate() {
            assert_eq!(row[0], Data::Float((idx + 1) as f64));
            assert!(matches!(&row[1], Data::String(name) if name.len() >= NAME_MIN_LEN));
            assert!(CLASS_LABELS.contains(&row[4].to_string().as_str()));
        }
    }
}
