// ==========================================
// 学生数据处理管道 - 单元格值转换
// ==========================================
// 职责: 表格单元格 → 规范文本；文本 → 日期（尽力而为）
// 规则:
// - 空单元格 → 空串
// - 日期 → YYYY-MM-DD
// - 数值 → 整数不带小数点，非整数保留自然小数表示
// - 布尔 → true / false
// - 公式 → 公式源文本（不求值）
// ==========================================

use crate::domain::DATE_FORMAT;
use calamine::DataRef;
use chrono::NaiveDate;
use tracing::warn;

/// 严格格式失败后依次尝试的宽松格式
const LENIENT_DATE_FORMATS: [&str; 4] = ["%Y/%m/%d", "%Y%m%d", "%d.%m.%Y", "%m/%d/%Y"];

// ==========================================
// CellValue - 拥有所有权的单元格值
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
    /// 公式源文本（不含前导 '='）
    Formula(String),
}

impl CellValue {
    /// 是否有值（用于统计行内已填充的列）
    pub fn is_populated(&self) -> bool {
        match self {
            CellValue::Empty => false,
            CellValue::Text(s) | CellValue::Formula(s) => !s.is_empty(),
            _ => true,
        }
    }
}

impl From<&DataRef<'_>> for CellValue {
    fn from(value: &DataRef<'_>) -> Self {
        match value {
            DataRef::String(s) => CellValue::Text(s.clone()),
            DataRef::SharedString(s) => CellValue::Text((*s).to_string()),
            DataRef::Float(f) => CellValue::Number(*f),
            DataRef::Int(i) => CellValue::Number(*i as f64),
            DataRef::Bool(b) => CellValue::Bool(*b),
            DataRef::DateTime(dt) => match dt.as_datetime() {
                Some(datetime) => CellValue::Date(datetime.date()),
                None => CellValue::Number(dt.as_f64()),
            },
            DataRef::DateTimeIso(s) => match text_to_date(s) {
                DateCoercion::Date(date) => CellValue::Date(date),
                DateCoercion::Text(text) => CellValue::Text(text),
            },
            DataRef::DurationIso(s) => CellValue::Text(s.clone()),
            // 错误值 / 空值
            _ => CellValue::Empty,
        }
    }
}

/// 单元格 → 规范文本
pub fn cell_to_string(cell: Option<&CellValue>) -> String {
    match cell {
        None | Some(CellValue::Empty) => String::new(),
        Some(CellValue::Text(s)) => s.clone(),
        Some(CellValue::Number(n)) => format_number(*n),
        Some(CellValue::Date(d)) => d.format(DATE_FORMAT).to_string(),
        Some(CellValue::Bool(b)) => b.to_string(),
        // 保留公式源文本，不返回计算结果
        Some(CellValue::Formula(src)) => src.clone(),
    }
}

/// 数值格式化：整数不带小数点
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

// ==========================================
// 文本 → 日期
// ==========================================
/// 日期转换结果：成功为日期，失败保留原文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateCoercion {
    Date(NaiveDate),
    Text(String),
}

/// 先严格 YYYY-MM-DD，再宽松格式；全部失败返回原文本（不报错）
pub fn text_to_date(text: &str) -> DateCoercion {
    let trimmed = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return DateCoercion::Date(date);
    }

    LENIENT_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .map(DateCoercion::Date)
        .unwrap_or_else(|| DateCoercion::Text(text.to_string()))
}

/// 规范化为 ISO 日期文本，无法解析时原样返回
pub fn format_date_to_iso(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    match text_to_date(text) {
        DateCoercion::Date(date) => date.format(DATE_FORMAT).to_string(),
        DateCoercion::Text(original) => {
            warn!(value = %original, "无法解析日期，原样保留");
            original
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_cell_is_empty() {
        assert_eq!(cell_to_string(None), "");
        assert_eq!(cell_to_string(Some(&CellValue::Empty)), "");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(cell_to_string(Some(&CellValue::Number(65.0))), "65");
        assert_eq!(cell_to_string(Some(&CellValue::Number(-3.0))), "-3");
        assert_eq!(cell_to_string(Some(&CellValue::Number(65.5))), "65.5");
    }

    #[test]
    fn test_date_bool_formula() {
        let date = NaiveDate::from_ymd_opt(2003, 7, 1).unwrap();
        assert_eq!(cell_to_string(Some(&CellValue::Date(date))), "2003-07-01");
        assert_eq!(cell_to_string(Some(&CellValue::Bool(true))), "true");
        assert_eq!(cell_to_string(Some(&CellValue::Bool(false))), "false");
        assert_eq!(
            cell_to_string(Some(&CellValue::Formula("SUM(A1:A3)".to_string()))),
            "SUM(A1:A3)"
        );
    }

    #[test]
    fn test_text_to_date_strict_then_lenient() {
        let expected = NaiveDate::from_ymd_opt(2005, 3, 2).unwrap();
        assert_eq!(text_to_date("2005-03-02"), DateCoercion::Date(expected));
        assert_eq!(text_to_date("2005/03/02"), DateCoercion::Date(expected));
        assert_eq!(text_to_date("20050302"), DateCoercion::Date(expected));
    }

    #[test]
    fn test_text_to_date_failure_returns_original() {
        assert_eq!(
            text_to_date("not a date"),
            DateCoercion::Text("not a date".to_string())
        );
        assert_eq!(format_date_to_iso(" soon "), " soon ");
        assert_eq!(format_date_to_iso("   "), "");
        assert_eq!(format_date_to_iso("2005/03/02"), "2005-03-02");
    }

    #[test]
    fn test_is_populated() {
        assert!(!CellValue::Empty.is_populated());
        assert!(!CellValue::Text(String::new()).is_populated());
        assert!(CellValue::Number(0.0).is_populated());
    }
}
