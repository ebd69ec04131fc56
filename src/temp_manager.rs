//! 临时文件管理模块
//!
//! 此模块负责：
//! - 为目标文件创建同目录下的临时文件（`<目标>_fixed`）
//! - 内容写完后通过一次rename覆盖目标文件
//! - 未提交时在Drop中自动清理临时文件

use std::ffi::OsString;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::dict_error;
use crate::error::Result;
use crate::site_constants::layout_config::TEMP_SUFFIX;

/// 目标文件的同目录临时文件
///
/// rename只在同一文件系统内是原子的，因此临时文件总是与目标放在同一目录。
pub struct TempSibling {
    target: PathBuf,
    temp_path: PathBuf,
    writer: Option<BufWriter<fs::File>>,
    committed: bool,
}

/// 计算目标文件对应的临时文件路径
pub fn sibling_temp_path<P: AsRef<Path>>(target: P) -> PathBuf {
    let target = target.as_ref();
    let mut name: OsString = target.as_os_str().to_owned();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

impl TempSibling {
    /// 为目标文件创建临时文件（覆盖同名的残留临时文件）
    pub fn create<P: AsRef<Path>>(target: P) -> Result<Self> {
        let target = target.as_ref().to_path_buf();
        let temp_path = sibling_temp_path(&target);

        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| dict_error!(file_op, parent.display(), "创建目录", e))?;
            }
        }

        let file = fs::File::create(&temp_path)
            .map_err(|e| dict_error!(file_op, temp_path.display(), "创建临时文件", e))?;
        debug!("创建临时文件: {}", temp_path.display());

        Ok(Self {
            target,
            temp_path,
            writer: Some(BufWriter::new(file)),
            committed: false,
        })
    }

    /// 临时文件路径
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// 写入文本
    pub fn write_str(&mut self, text: &str) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| dict_error!(file_op, self.temp_path.display(), "写入", "临时文件已关闭"))?;
        writer
            .write_all(text.as_bytes())
            .map_err(|e| dict_error!(file_op, self.temp_path.display(), "写入", e))
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer
                .flush()
                .map_err(|e| dict_error!(file_op, self.temp_path.display(), "写入", e))?;
            writer
                .get_ref()
                .sync_all()
                .map_err(|e| dict_error!(file_op, self.temp_path.display(), "同步", e))?;
        }
        Ok(())
    }

    /// 用临时文件一次性替换目标文件
    ///
    /// rename会直接覆盖已存在的目标，不存在先删除后改名的窗口期
    pub fn commit(mut self) -> Result<PathBuf> {
        self.close()?;
        fs::rename(&self.temp_path, &self.target).map_err(|e| {
            dict_error!(
                file_op,
                format!("{} -> {}", self.temp_path.display(), self.target.display()),
                "重命名",
                e
            )
        })?;
        self.committed = true;
        debug!("已替换: {}", self.target.display());
        Ok(self.target.clone())
    }

    /// 放弃临时文件，目标文件保持不变
    pub fn discard(mut self) -> Result<()> {
        self.close()?;
        self.remove_temp()
    }

    fn remove_temp(&mut self) -> Result<()> {
        if self.temp_path.exists() {
            fs::remove_file(&self.temp_path)
                .map_err(|e| dict_error!(file_op, self.temp_path.display(), "清理临时文件", e))?;
            debug!("清理临时文件: {}", self.temp_path.display());
        }
        self.committed = true;
        Ok(())
    }
}

impl Drop for TempSibling {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        self.writer.take();
        if let Err(e) = self.remove_temp() {
            warn!("自动清理临时文件失败: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::babylon::tests::unique_test_dir;

    #[test]
    fn test_sibling_temp_path() {
        let path = sibling_temp_path("/data/dict/ક.babylon");
        assert_eq!(path, PathBuf::from("/data/dict/ક.babylon_fixed"));
    }

    #[test]
    fn test_commit_replaces_target() {
        let dir = unique_test_dir("temp-commit");
        let target = dir.join("a.babylon");
        fs::write(&target, "old").unwrap();

        let mut temp = TempSibling::create(&target).unwrap();
        assert!(temp.path().exists());
        temp.write_str("new").unwrap();
        let committed = temp.commit().unwrap();

        assert_eq!(committed, target);
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        assert!(!sibling_temp_path(&target).exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_discard_keeps_target() {
        let dir = unique_test_dir("temp-discard");
        let target = dir.join("a.babylon");
        fs::write(&target, "old").unwrap();

        let mut temp = TempSibling::create(&target).unwrap();
        temp.write_str("new").unwrap();
        temp.discard().unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "old");
        assert!(!sibling_temp_path(&target).exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_auto_cleanup_on_drop() {
        let dir = unique_test_dir("temp-drop");
        let target = dir.join("sub").join("a.babylon");

        {
            let mut temp = TempSibling::create(&target).unwrap();
            temp.write_str("partial").unwrap();
            assert!(temp.path().exists());
        }

        assert!(!sibling_temp_path(&target).exists());
        assert!(!target.exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
