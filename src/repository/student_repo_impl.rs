// ==========================================
// 学生数据处理管道 - 学生仓储 SQLite 实现
// ==========================================
// 职责: 实现 StudentRepository（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::{NewStudent, PageRequest, StudentPredicate, StudentRecord, DATE_FORMAT};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::predicate_sql::to_sql_filter;
use crate::repository::student_repo::{BulkLoadSpec, StudentRepository};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Result as SqliteResult};
use std::io::Read;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument};

const SELECT_COLUMNS: &str = "studentid, firstname, lastname, dob, clazz, score";

// ==========================================
// SqliteStudentRepository
// ==========================================
pub struct SqliteStudentRepository {
    db_path: String,
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStudentRepository {
    /// 创建新的仓储实例并确保表结构存在
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（批量导入会单独打开连接，需为文件库）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = Self::connect(db_path)?;
        ensure_schema(&conn)?;
        Ok(Self {
            db_path: db_path.to_string(),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 打开连接，失败归为连接错误
    fn connect(db_path: &str) -> RepositoryResult<Connection> {
        open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(format!("{}: {}", db_path, e)))
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &rusqlite::Row<'_>) -> SqliteResult<StudentRecord> {
        Ok(StudentRecord {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            date_of_birth: row
                .get::<_, Option<String>>(3)?
                .and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok()),
            class_label: row.get(4)?,
            score: row.get(5)?,
        })
    }
}

/// 表名 / 列名只允许字母、数字、下划线
fn validate_identifier(name: &str) -> RepositoryResult<()> {
    let valid = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(RepositoryError::ValidationError(format!("非法标识符: {:?}", name)))
    }
}

impl StudentRepository for SqliteStudentRepository {
    fn save(&self, student: &NewStudent) -> RepositoryResult<StudentRecord> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO students (firstname, lastname, dob, clazz, score) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                student.first_name,
                student.last_name,
                student.date_of_birth.map(|d| d.format(DATE_FORMAT).to_string()),
                student.class_label,
                student.score,
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!(student_id = id, "学生记录已保存");

        Ok(StudentRecord {
            id,
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            date_of_birth: student.date_of_birth,
            class_label: student.class_label.clone(),
            score: student.score,
        })
    }

    fn find_all(&self) -> RepositoryResult<Vec<StudentRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM students ORDER BY studentid",
            SELECT_COLUMNS
        ))?;
        let records = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<StudentRecord>>>()?;
        Ok(records)
    }

    fn find_filtered(
        &self,
        predicate: &StudentPredicate,
        page: Option<PageRequest>,
    ) -> RepositoryResult<(Vec<StudentRecord>, u64)> {
        let conn = self.get_conn()?;
        let filter = to_sql_filter(predicate);

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM students WHERE {}", filter.clause),
            params_from_iter(filter.params.iter()),
            |row| row.get(0),
        )?;

        let mut sql = format!(
            "SELECT {} FROM students WHERE {} ORDER BY studentid",
            SELECT_COLUMNS, filter.clause
        );
        let mut params = filter.params;
        if let Some(page) = page {
            sql.push_str(" LIMIT ? OFFSET ?");
            params.push(Value::Integer(i64::from(page.size)));
            params.push(Value::Integer(i64::try_from(page.offset()).unwrap_or(i64::MAX)));
        }

        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(params.iter()), Self::map_row)?
            .collect::<SqliteResult<Vec<StudentRecord>>>()?;

        Ok((records, u64::try_from(total).unwrap_or(0)))
    }

    fn count(&self) -> RepositoryResult<u64> {
        let conn = self.get_conn()?;
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    #[instrument(skip(self, spec, source), fields(table = %spec.table))]
    fn bulk_load(&self, spec: &BulkLoadSpec, source: &mut dyn Read) -> RepositoryResult<u64> {
        validate_identifier(&spec.table)?;
        if spec.columns.is_empty() {
            return Err(RepositoryError::ValidationError("批量导入列清单为空".to_string()));
        }
        for column in &spec.columns {
            validate_identifier(column)?;
        }

        // 独立连接：函数返回（含出错）即释放
        let mut conn = Self::connect(&self.db_path)?;
        let tx = conn.transaction()?;

        let column_count = spec.columns.len();
        let placeholders: Vec<String> = (1..=column_count).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            spec.table,
            spec.columns.join(", "),
            placeholders.join(", ")
        );

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(spec.delimiter)
            .has_headers(spec.has_header)
            .flexible(true)
            .from_reader(source);

        let mut loaded = 0u64;
        {
            let mut stmt = tx.prepare(&sql)?;
            for (idx, result) in reader.records().enumerate() {
                let row = idx as u64 + 1;
                let record = result.map_err(|e| RepositoryError::BulkLoadFailed {
                    row,
                    message: e.to_string(),
                })?;

                if record.len() != column_count {
                    return Err(RepositoryError::BulkLoadFailed {
                        row,
                        message: format!("字段数 {} 与列数 {} 不一致", record.len(), column_count),
                    });
                }

                // 空字段按 NULL 处理
                let values = record.iter().map(|v| if v.is_empty() { None } else { Some(v) });
                stmt.execute(params_from_iter(values))
                    .map_err(|e| RepositoryError::BulkLoadFailed {
                        row,
                        message: e.to_string(),
                    })?;
                loaded += 1;
            }
        }

        tx.commit()?;
        info!(rows = loaded, "批量导入完成");
        Ok(loaded)
    }
}
