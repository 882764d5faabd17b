// ==========================================
// 学生数据处理管道 - 学生领域模型
// ==========================================
// 职责: 定义 StudentRecord（落库后的学生记录）与 NewStudent（待保存）
// 红线: 管道只通过仓储读写记录，不跨调用缓存
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 日期统一格式 (YYYY-MM-DD)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ==========================================
// StudentRecord - 学生记录
// ==========================================
/// 学生记录（由仓储持有，id 由仓储在创建时分配）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// 学号（正整数，创建后稳定）
    pub id: i64,
    /// 名
    pub first_name: String,
    /// 姓
    pub last_name: String,
    /// 出生日期（可选）
    pub date_of_birth: Option<NaiveDate>,
    /// 班级标签（可选）
    pub class_label: Option<String>,
    /// 成绩（仓储编码，可选）
    pub score: Option<i64>,
}

impl StudentRecord {
    /// 出生日期文本（缺失时为空串）
    pub fn dob_text(&self) -> String {
        self.date_of_birth
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default()
    }

    /// 班级文本（缺失时为空串）
    pub fn class_text(&self) -> &str {
        self.class_label.as_deref().unwrap_or("")
    }
}

// ==========================================
// NewStudent - 待保存的学生
// ==========================================
/// 直接保存（非批量导入）时使用，id 由仓储分配
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub class_label: Option<String>,
    pub score: Option<i64>,
}

impl NewStudent {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth: None,
            class_label: None,
            score: None,
        }
    }

    pub fn with_dob(mut self, dob: NaiveDate) -> Self {
        self.date_of_birth = Some(dob);
        self
    }

    pub fn with_class(mut self, class_label: impl Into<String>) -> Self {
        self.class_label = Some(class_label.into());
        self
    }

    pub fn with_score(mut self, score: i64) -> Self {
        self.score = Some(score);
        self
    }
}
