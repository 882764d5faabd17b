// ==========================================
// 学生数据处理管道 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供 students 表的建表语句（无自动迁移）
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// students 表结构
///
/// 说明：
/// - STRICT 表：批量导入时类型不符的值直接报错，而不是静默以 TEXT 存储
/// - dob 必须为 NULL 或合法的 YYYY-MM-DD
pub const STUDENTS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS students (
    studentid INTEGER PRIMARY KEY,
    firstname TEXT NOT NULL,
    lastname  TEXT NOT NULL,
    dob       TEXT CHECK (dob IS NULL OR date(dob) IS dob),
    clazz     TEXT,
    score     INTEGER
) STRICT;
"#;

/// 配置 SQLite 连接的统一 PRAGMA
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 确保 students 表存在（幂等）
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(STUDENTS_SCHEMA)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_rejects_invalid_dob() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO students (firstname, lastname, dob) VALUES ('A', 'B', '2004-02-09')",
            [],
        )
        .unwrap();

        let bad = conn.execute(
            "INSERT INTO students (firstname, lastname, dob) VALUES ('A', 'B', '09/02/2004')",
            [],
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_schema_rejects_text_score() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();

        let ok = conn.execute(
            "INSERT INTO students (firstname, lastname, score) VALUES ('A', 'B', '65')",
            [],
        );
        assert!(ok.is_ok());

        let bad = conn.execute(
            "INSERT INTO students (firstname, lastname, score) VALUES ('A', 'B', 'abc')",
            [],
        );
        assert!(bad.is_err());
    }
}
