// ==========================================
// 学生数据处理管道 - CSV 导出
// ==========================================
// 表头固定；可选字段缺失时输出空串（score 也为空）
// ==========================================

use crate::domain::StudentRecord;
use crate::exporter::error::ExportResult;
use crate::exporter::EXPORT_HEADER;
use std::io::Write;

/// 单条记录的文本字段（CSV / XLSX 共用）
pub(crate) fn record_fields(record: &StudentRecord) -> [String; 6] {
    [
        record.id.to_string(),
        record.first_name.clone(),
        record.last_name.clone(),
        record.dob_text(),
        record.class_text().to_string(),
        record.score.map(|s| s.to_string()).unwrap_or_default(),
    ]
}

/// 写出 CSV
pub fn write_csv<W: Write>(records: &[StudentRecord], target: W) -> ExportResult<()> {
    let mut writer = csv::Writer::from_writer(target);
    writer.write_record(EXPORT_HEADER)?;
    for record in records {
        writer.write_record(record_fields(record))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_empty_export_has_header_only() {
        let mut buf = Vec::new();
        write_csv(&[], &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Student ID,First Name,Last Name,Date of Birth,Class,Score\n"
        );
    }

    #[test]
    fn test_absent_fields_are_empty() {
        let records = vec![
            StudentRecord {
                id: 1,
                first_name: "ANN".to_string(),
                last_name: "LEE".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(2004, 2, 9),
                class_label: Some("Class1".to_string()),
                score: Some(65),
            },
            StudentRecord {
                id: 2,
                first_name: "BOB".to_string(),
                last_name: "KIM".to_string(),
                date_of_birth: None,
                class_label: None,
                score: None,
            },
        ];

        let mut buf = Vec::new();
        write_csv(&records, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "1,ANN,LEE,2004-02-09,Class1,65");
        assert_eq!(lines[2], "2,BOB,KIM,,,");
    }
}
