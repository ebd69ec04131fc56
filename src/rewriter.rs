//! babylon文件原地改写模块
//!
//! 对词条行（行号%3==0）或释义行（行号%3==1）逐行套用转换函数，
//! 结果写入同目录临时文件，成功后一次rename覆盖原文件。

// 标准库导入
use std::fs;
use std::path::Path;

// 第三方crate导入
use tracing::{debug, info};

// 本地模块导入
use crate::babylon::LineRole;
use crate::dict_error;
use crate::error::Result;
use crate::temp_manager::TempSibling;

/// 改写结果统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteSummary {
    /// 文件总行数
    pub lines: usize,
    /// 经过转换的行数
    pub converted: usize,
    /// 内容实际发生变化的行数
    pub changed: usize,
}

/// 拆出行尾换行符，返回（正文, 行尾）
fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// 对指定角色的行套用转换函数
///
/// 非dry run时用临时文件替换原文件；dry run时逐行打印结果，原文件不变。
/// 读取或转换失败都会在替换之前中止，原文件保持完整。
pub fn rewrite_lines<P, F>(
    path: P,
    role: LineRole,
    mut convert: F,
    dry_run: bool,
) -> Result<RewriteSummary>
where
    P: AsRef<Path>,
    F: FnMut(&str) -> Result<String>,
{
    let path = path.as_ref();
    let content =
        fs::read_to_string(path).map_err(|e| dict_error!(file_op, path.display(), "读取", e))?;

    let mut temp = TempSibling::create(path)?;
    let mut summary = RewriteSummary::default();

    for (index, raw_line) in content.split_inclusive('\n').enumerate() {
        summary.lines += 1;
        let (body, terminator) = split_terminator(raw_line);

        let body = if LineRole::of(index) == role {
            summary.converted += 1;
            let converted = convert(body)?;
            if converted != body {
                summary.changed += 1;
            }
            converted
        } else {
            body.to_string()
        };

        if dry_run {
            println!("{}", body);
        }
        temp.write_str(&body)?;
        temp.write_str(terminator)?;
    }

    if dry_run {
        debug!("dry run, 保留原文件: {}", path.display());
        temp.discard()?;
    } else {
        temp.commit()?;
        info!(
            "✏️  改写 {}: {} 行中转换 {} 行, 变化 {} 行",
            path.display(),
            summary.lines,
            summary.converted,
            summary.changed
        );
    }

    Ok(summary)
}

/// 改写所有词条行
pub fn rewrite_headwords<P, F>(path: P, convert: F, dry_run: bool) -> Result<RewriteSummary>
where
    P: AsRef<Path>,
    F: FnMut(&str) -> Result<String>,
{
    rewrite_lines(path, LineRole::Headwords, convert, dry_run)
}

/// 改写所有释义行
pub fn rewrite_definitions<P, F>(path: P, convert: F, dry_run: bool) -> Result<RewriteSummary>
where
    P: AsRef<Path>,
    F: FnMut(&str) -> Result<String>,
{
    rewrite_lines(path, LineRole::Definition, convert, dry_run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::babylon::tests::unique_test_dir;
    use crate::temp_manager::sibling_temp_path;
    use crate::transliteration::{line_converter, Script};

    const SAMPLE: &str = "આપોશાન\nતર્પણ વગેરે\n\nકર\nહાથ\n\n";

    #[test]
    fn test_rewrite_headwords() {
        let dir = unique_test_dir("rewrite-hw");
        let path = dir.join("a.babylon");
        fs::write(&path, SAMPLE).unwrap();

        let summary = rewrite_headwords(
            &path,
            line_converter(Script::Gujarati, Script::Devanagari, false).unwrap(),
            false,
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "आपोशान\nતર્પણ વગેરે\n\nकर\nહાથ\n\n"
        );
        assert_eq!(summary.lines, 6);
        assert_eq!(summary.converted, 2);
        assert_eq!(summary.changed, 2);
        assert!(!sibling_temp_path(&path).exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_rewrite_definitions() {
        let dir = unique_test_dir("rewrite-def");
        let path = dir.join("a.babylon");
        fs::write(&path, SAMPLE).unwrap();

        rewrite_definitions(&path, |line| Ok(line.to_uppercase() + "!"), false).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "આપોશાન\nતર્પણ વગેરે!\n\nકર\nહાથ!\n\n"
        );

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let dir = unique_test_dir("rewrite-idem");
        let path = dir.join("a.babylon");
        fs::write(&path, SAMPLE).unwrap();

        let convert = || line_converter(Script::Gujarati, Script::Devanagari, false).unwrap();
        rewrite_headwords(&path, convert(), false).unwrap();
        let first = fs::read_to_string(&path).unwrap();
        let summary = rewrite_headwords(&path, convert(), false).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), first);
        assert_eq!(summary.changed, 0);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_dry_run_leaves_original() {
        let dir = unique_test_dir("rewrite-dry");
        let path = dir.join("a.babylon");
        fs::write(&path, SAMPLE).unwrap();

        let summary = rewrite_headwords(
            &path,
            line_converter(Script::Gujarati, Script::Devanagari, false).unwrap(),
            true,
        )
        .unwrap();

        assert_eq!(summary.changed, 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE);
        assert!(!sibling_temp_path(&path).exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_conversion_error_keeps_original() {
        let dir = unique_test_dir("rewrite-err");
        let path = dir.join("a.babylon");
        fs::write(&path, SAMPLE).unwrap();

        let result = rewrite_headwords(
            &path,
            |line| {
                if line == "કર" {
                    Err(dict_error!(transliteration, line, "test failure"))
                } else {
                    Ok(line.to_string())
                }
            },
            false,
        );

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE);
        assert!(!sibling_temp_path(&path).exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_crlf_terminators_preserved() {
        let dir = unique_test_dir("rewrite-crlf");
        let path = dir.join("a.babylon");
        fs::write(&path, "a\r\nb\r\n\r\n").unwrap();

        rewrite_headwords(&path, |line| Ok(format!("{}{}", line, line)), false).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "aa\r\nb\r\n\r\n");

        fs::remove_dir_all(&dir).unwrap();
    }
}
