// ==========================================
// 学生数据处理管道 - 学生仓储 Trait
// ==========================================
// 职责: 定义存储边界（保存 / 查询 / 过滤分页 / 批量导入）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::{NewStudent, PageRequest, StudentPredicate, StudentRecord};
use crate::repository::error::RepositoryResult;
use std::io::Read;
use std::sync::Arc;

/// students 表的规范列（批量导入顺序）
pub const STUDENT_COLUMNS: [&str; 6] = ["studentid", "firstname", "lastname", "dob", "clazz", "score"];

// ==========================================
// BulkLoadSpec - 批量导入描述
// ==========================================
/// 服务端批量导入的目标描述（表、列、分隔符、是否带表头）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkLoadSpec {
    pub table: String,
    pub columns: Vec<String>,
    pub delimiter: u8,
    pub has_header: bool,
}

impl BulkLoadSpec {
    /// students 表的标准批量导入描述（CSV，带表头）
    pub fn students() -> Self {
        Self {
            table: "students".to_string(),
            columns: STUDENT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            delimiter: b',',
            has_header: true,
        }
    }
}

// ==========================================
// StudentRepository Trait
// ==========================================
// 实现者: SqliteStudentRepository
pub trait StudentRepository {
    /// 保存一条学生记录，返回带 id 的记录
    fn save(&self, student: &NewStudent) -> RepositoryResult<StudentRecord>;

    /// 查询全部记录（按学号升序）
    fn find_all(&self) -> RepositoryResult<Vec<StudentRecord>>;

    /// 按谓词查询
    ///
    /// # 返回
    /// - (当前窗口内的记录, 满足谓词的总记录数)
    /// - page 为 None 时返回全部满足谓词的记录
    fn find_filtered(
        &self,
        predicate: &StudentPredicate,
        page: Option<PageRequest>,
    ) -> RepositoryResult<(Vec<StudentRecord>, u64)>;

    /// 记录总数
    fn count(&self) -> RepositoryResult<u64>;

    /// 批量导入分隔文本流，返回导入行数
    ///
    /// # 说明
    /// - 单独连接 + 单事务，任何一行失败整体回滚
    fn bulk_load(&self, spec: &BulkLoadSpec, source: &mut dyn Read) -> RepositoryResult<u64>;
}

impl<T: StudentRepository + ?Sized> StudentRepository for &T {
    fn save(&self, student: &NewStudent) -> RepositoryResult<StudentRecord> {
        (**self).save(student)
    }

    fn find_all(&self) -> RepositoryResult<Vec<StudentRecord>> {
        (**self).find_all()
    }

    fn find_filtered(
        &self,
        predicate: &StudentPredicate,
        page: Option<PageRequest>,
    ) -> RepositoryResult<(Vec<StudentRecord>, u64)> {
        (**self).find_filtered(predicate, page)
    }

    fn count(&self) -> RepositoryResult<u64> {
        (**self).count()
    }

    fn bulk_load(&self, spec: &BulkLoadSpec, source: &mut dyn Read) -> RepositoryResult<u64> {
        (**self).bulk_load(spec, source)
    }
}

impl<T: StudentRepository + ?Sized> StudentRepository for Arc<T> {
    fn save(&self, student: &NewStudent) -> RepositoryResult<StudentRecord> {
        (**self).save(student)
    }

    fn find_all(&self) -> RepositoryResult<Vec<StudentRecord>> {
        (**self).find_all()
    }

    fn find_filtered(
        &self,
        predicate: &StudentPredicate,
        page: Option<PageRequest>,
    ) -> RepositoryResult<(Vec<StudentRecord>, u64)> {
        (**self).find_filtered(predicate, page)
    }

    fn count(&self) -> RepositoryResult<u64> {
        (**self).count()
    }

    fn bulk_load(&self, spec: &BulkLoadSpec, source: &mut dyn Read) -> RepositoryResult<u64> {
        (**self).bulk_load(spec, source)
    }
}
