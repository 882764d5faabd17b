// ==========================================
// 学生数据处理管道 - 领域层
// ==========================================
// 职责: 学生记录、过滤条件、分页类型
// 红线: 领域层不依赖数据库与文件格式
// ==========================================

pub mod filter;
pub mod page;
pub mod student;

// 重导出核心类型
pub use filter::{StudentFilter, StudentPredicate};
pub use page::{Page, PageRequest};
pub use student::{NewStudent, StudentRecord, DATE_FORMAT};
