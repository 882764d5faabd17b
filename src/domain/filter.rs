// ==========================================
// 学生数据处理管道 - 动态过滤条件
// ==========================================
// 职责: StudentFilter（查询条件） → StudentPredicate（可组合谓词）
// 规则: 已提供的条件之间 AND；姓名搜索在名/姓之间 OR
// 约束: 分页查询与导出使用同一个谓词构造，不做任何修改
// ==========================================

use crate::domain::student::StudentRecord;
use serde::{Deserialize, Serialize};

// ==========================================
// StudentFilter - 查询条件
// ==========================================
/// 查询条件，缺失的条件不参与过滤（而不是匹配失败）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentFilter {
    /// 学号精确匹配
    pub student_id: Option<i64>,
    /// 班级精确匹配（不做大小写归一化）
    pub class_label: Option<String>,
    /// 名或姓的子串匹配（忽略大小写）
    pub search: Option<String>,
}

impl StudentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, student_id: i64) -> Self {
        self.student_id = Some(student_id);
        self
    }

    pub fn with_class(mut self, class_label: impl Into<String>) -> Self {
        self.class_label = Some(class_label.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
}

// ==========================================
// StudentPredicate - 可组合谓词
// ==========================================
/// 数据化描述的过滤谓词，由仓储适配器解释为 SQL，也可在内存中求值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StudentPredicate {
    /// 匹配所有记录
    MatchAll,
    IdEquals(i64),
    ClassEquals(String),
    /// 名包含（词已小写）
    FirstNameContains(String),
    /// 姓包含（词已小写）
    LastNameContains(String),
    And(Vec<StudentPredicate>),
    Or(Vec<StudentPredicate>),
}

impl StudentPredicate {
    /// 由查询条件构造谓词（纯函数）
    ///
    /// # 说明
    /// - 全部条件缺失时返回 MatchAll
    /// - 班级 / 搜索词去除空白后为空视为缺失
    pub fn build(filter: &StudentFilter) -> Self {
        let mut predicates = Vec::new();

        if let Some(id) = filter.student_id {
            predicates.push(StudentPredicate::IdEquals(id));
        }

        if let Some(class_label) = filter.class_label.as_deref() {
            if !class_label.trim().is_empty() {
                predicates.push(StudentPredicate::ClassEquals(class_label.to_string()));
            }
        }

        if let Some(search) = filter.search.as_deref() {
            let term = search.trim().to_ascii_lowercase();
            if !term.is_empty() {
                predicates.push(StudentPredicate::Or(vec![
                    StudentPredicate::FirstNameContains(term.clone()),
                    StudentPredicate::LastNameContains(term),
                ]));
            }
        }

        match predicates.len() {
            0 => StudentPredicate::MatchAll,
            1 => predicates.remove(0),
            _ => StudentPredicate::And(predicates),
        }
    }

    /// 是否为全匹配谓词
    pub fn is_match_all(&self) -> bool {
        matches!(self, StudentPredicate::MatchAll)
    }

    /// 在内存中对记录求值（与 SQL 解释语义一致，ASCII 大小写折叠）
    pub fn matches(&self, record: &StudentRecord) -> bool {
        match self {
            StudentPredicate::MatchAll => true,
            StudentPredicate::IdEquals(id) => record.id == *id,
            StudentPredicate::ClassEquals(class_label) => {
                record.class_label.as_deref() == Some(class_label.as_str())
            }
            StudentPredicate::FirstNameContains(term) => {
                record.first_name.to_ascii_lowercase().contains(term.as_str())
            }
            StudentPredicate::LastNameContains(term) => {
                record.last_name.to_ascii_lowercase().contains(term.as_str())
            }
            StudentPredicate::And(items) => items.iter().all(|p| p.matches(record)),
            StudentPredicate::Or(items) => items.iter().any(|p| p.matches(record)),
        }
    }
}

impl From<&StudentFilter> for StudentPredicate {
    fn from(filter: &StudentFilter) -> Self {
        StudentPredicate::build(filter)
    }
}
