// ==========================================
// 学生数据处理管道 - 谓词 → SQL 翻译
// ==========================================
// 职责: 把 StudentPredicate 解释为参数化 WHERE 子句
// 约束: 所有值以参数绑定，不拼接进 SQL
// ==========================================

use crate::domain::StudentPredicate;
use rusqlite::types::Value;

/// 参数化 WHERE 子句（不含 WHERE 关键字）
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFilter {
    pub clause: String,
    pub params: Vec<Value>,
}

/// 翻译谓词
pub fn to_sql_filter(predicate: &StudentPredicate) -> SqlFilter {
    let mut params = Vec::new();
    let clause = render(predicate, &mut params);
    SqlFilter { clause, params }
}

fn render(predicate: &StudentPredicate, params: &mut Vec<Value>) -> String {
    match predicate {
        StudentPredicate::MatchAll => "1 = 1".to_string(),
        StudentPredicate::IdEquals(id) => {
            params.push(Value::Integer(*id));
            "studentid = ?".to_string()
        }
        StudentPredicate::ClassEquals(class_label) => {
            params.push(Value::Text(class_label.clone()));
            "clazz = ?".to_string()
        }
        StudentPredicate::FirstNameContains(term) => {
            params.push(Value::Text(like_pattern(term)));
            r"LOWER(firstname) LIKE ? ESCAPE '\'".to_string()
        }
        StudentPredicate::LastNameContains(term) => {
            params.push(Value::Text(like_pattern(term)));
            r"LOWER(lastname) LIKE ? ESCAPE '\'".to_string()
        }
        StudentPredicate::And(items) => join(items, " AND ", "1 = 1", params),
        StudentPredicate::Or(items) => join(items, " OR ", "1 = 0", params),
    }
}

fn join(items: &[StudentPredicate], sep: &str, empty: &str, params: &mut Vec<Value>) -> String {
    if items.is_empty() {
        return empty.to_string();
    }
    let parts: Vec<String> = items.iter().map(|p| render(p, params)).collect();
    format!("({})", parts.join(sep))
}

/// `%term%`，转义 LIKE 通配符
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StudentFilter;

    #[test]
    fn test_match_all() {
        let filter = to_sql_filter(&StudentPredicate::MatchAll);
        assert_eq!(filter.clause, "1 = 1");
        assert!(filter.params.is_empty());
    }

    #[test]
    fn test_full_filter_clause_and_params() {
        let predicate = StudentPredicate::build(
            &StudentFilter::new().with_id(3).with_class("Class1").with_search("Ab"),
        );
        let filter = to_sql_filter(&predicate);

        assert_eq!(
            filter.clause,
            r"(studentid = ? AND clazz = ? AND (LOWER(firstname) LIKE ? ESCAPE '\' OR LOWER(lastname) LIKE ? ESCAPE '\'))"
        );
        assert_eq!(
            filter.params,
            vec![
                Value::Integer(3),
                Value::Text("Class1".to_string()),
                Value::Text("%ab%".to_string()),
                Value::Text("%ab%".to_string()),
            ]
        );
    }

    #[test]
    fn test_wildcards_escaped() {
        assert_eq!(like_pattern("a%b_c"), r"%a\%b\_c%");
    }
}
