use std::path::Path;

use tracing::warn;

use crate::dict_error;
use crate::error::Result;
use crate::site_constants::layout_config::BABYLON_EXTENSION;

/// 初始化日志系统
pub fn init_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// 验证输入的babylon文件
pub fn validate_input_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(dict_error!(input_validation, path.display(), "输入文件不存在"));
    }

    if !path.is_file() {
        return Err(dict_error!(input_validation, path.display(), "输入路径不是文件"));
    }

    match path.extension() {
        Some(ext) if ext == BABYLON_EXTENSION => {}
        Some(ext) => warn!("⚠️  文件扩展名不是babylon: {}", ext.to_string_lossy()),
        None => warn!("⚠️  文件没有扩展名: {}", path.display()),
    }

    Ok(())
}

/// 验证输入目录
pub fn validate_input_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Err(dict_error!(input_validation, path.display(), "输入路径不是目录"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::babylon::tests::unique_test_dir;

    #[test]
    fn test_validate_input_file() {
        let dir = unique_test_dir("validate");
        let file = dir.join("a.babylon");
        std::fs::write(&file, "").unwrap();

        assert!(validate_input_file(&file).is_ok());
        assert!(validate_input_file(&dir).is_err());
        assert!(validate_input_file(&dir.join("missing.babylon")).is_err());
        assert!(validate_input_dir(&dir).is_ok());
        assert!(validate_input_dir(&file).is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
