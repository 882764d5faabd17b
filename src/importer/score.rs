// ==========================================
// 学生数据处理管道 - 成绩两段式编码
// ==========================================
// 源成绩 S
// CSV 传输值 = S + 10   (Excel → CSV)
// 入库值     = CSV - 5  (CSV → 数据库) = S + 5
// 无法解析时取哨兵值: CSV 阶段 10，入库阶段 -5（按 0 处理）
// ==========================================

use tracing::warn;

/// Excel → CSV 的成绩增量
pub const TRANSFER_SCORE_OFFSET: i64 = 10;

/// CSV → 数据库的成绩减量
pub const STORE_SCORE_OFFSET: i64 = 5;

/// CSV 阶段哨兵值（0 + 10）
pub const TRANSFER_SCORE_FALLBACK: i64 = TRANSFER_SCORE_OFFSET;

/// 入库阶段哨兵值（0 - 5）
pub const STORE_SCORE_FALLBACK: i64 = -STORE_SCORE_OFFSET;

/// 源成绩 → CSV 传输值
pub fn to_transfer_score(raw: &str) -> i64 {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|score| score.checked_add(TRANSFER_SCORE_OFFSET))
        .unwrap_or_else(|| {
            warn!(value = %raw, "无法解析成绩，按 0 处理");
            TRANSFER_SCORE_FALLBACK
        })
}

/// CSV 传输值 → 入库值
pub fn to_store_score(raw: &str) -> i64 {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|score| score.checked_sub(STORE_SCORE_OFFSET))
        .unwrap_or_else(|| {
            warn!(value = %raw, "CSV 成绩格式错误，按 0 处理");
            STORE_SCORE_FALLBACK
        })
}
