// ==========================================
// 学生数据处理管道 - 输出文件命名与发布
// ==========================================
// 命名: <kind>_<token>.<ext>，token = 毫秒时间戳 + 8 位随机十六进制
// 发布: 先写入同目录隐藏临时文件，成功后原子改名；失败不留下已发布文件
// ==========================================

use chrono::Utc;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// 生成防冲突的文件名 token
pub fn file_token() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().timestamp_millis(), &uuid[..8])
}

/// 生成输出文件名
pub fn output_file_name(kind: &str, ext: &str) -> String {
    format!("{}_{}.{}", kind, file_token(), ext)
}

// ==========================================
// StagedOutput - 待发布的输出文件
// ==========================================
pub struct StagedOutput {
    staged: NamedTempFile,
    final_path: PathBuf,
}

impl StagedOutput {
    /// 在 dir 下创建待发布文件（目录不存在时自动创建）
    pub fn create(dir: &Path, kind: &str, ext: &str) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let final_path = dir.join(output_file_name(kind, ext));
        let staged = tempfile::Builder::new()
            .prefix(&format!(".{}_", kind))
            .suffix(".part")
            .tempfile_in(dir)?;
        Ok(Self { staged, final_path })
    }

    /// 写入句柄
    pub fn file_mut(&mut self) -> &mut File {
        self.staged.as_file_mut()
    }

    /// 发布后的路径
    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    /// 发布：改名为最终文件名
    pub fn publish(self) -> io::Result<PathBuf> {
        let Self { staged, final_path } = self;
        staged.persist(&final_path).map_err(|e| e.error)?;
        Ok(final_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_output_file_name_shape() {
        let name = output_file_name("converted", "csv");
        assert!(name.starts_with("converted_"));
        assert!(name.ends_with(".csv"));
        assert_ne!(name, output_file_name("converted", "csv"));
    }

    #[test]
    fn test_publish_and_drop() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested");

        let mut staged = StagedOutput::create(&target, "students_export", "csv").unwrap();
        writeln!(staged.file_mut(), "a,b").unwrap();
        let path = staged.publish().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\n");

        // 未发布的文件在 drop 时删除
        let abandoned = StagedOutput::create(&target, "students_export", "csv").unwrap();
        let abandoned_path = abandoned.final_path().to_path_buf();
        drop(abandoned);
        assert!(!abandoned_path.exists());
        assert_eq!(fs::read_dir(&target).unwrap().count(), 1);
    }
}
