//! babylon词典文件读写模块
//!
//! babylon格式为固定的三行一条记录：
//! - 第1行：词条（多个同义词条用`|`分隔）
//! - 第2行：释义
//! - 第3行：空行（记录结束）
//!
//! 行号对3取余决定该行的角色，任何其他排列都视为格式错误。

// 标准库导入
use std::collections::{BTreeSet, HashMap};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

// 第三方crate导入
use tracing::{debug, info, warn};

// 本地模块导入
use crate::dict_error;
use crate::error::Result;

/// 词条分隔符
pub const HEADWORD_SEPARATOR: char = '|';

/// 一条babylon记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// 词条列表（顺序即写出顺序）
    pub headwords: Vec<String>,
    /// 释义
    pub definition: String,
}

impl Entry {
    /// 创建新记录
    pub fn new<I, S>(headwords: I, definition: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headwords: headwords.into_iter().map(Into::into).collect(),
            definition: definition.into(),
        }
    }

    /// 渲染为三行记录文本
    pub fn to_record(&self) -> String {
        format!(
            "{}\n{}\n\n",
            self.headwords.join(&HEADWORD_SEPARATOR.to_string()),
            self.definition
        )
    }
}

/// 行在记录中的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    Headwords,
    Definition,
    Terminator,
}

impl LineRole {
    /// 根据行号（从0开始）判断角色
    pub fn of(index: usize) -> Self {
        match index % 3 {
            0 => LineRole::Headwords,
            1 => LineRole::Definition,
            _ => LineRole::Terminator,
        }
    }
}

/// 读取整个文件（UTF-8）
fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| dict_error!(file_op, path.display(), "读取", e))
}

/// 拆分词条行，忽略空词条
fn split_headwords(line: &str) -> impl Iterator<Item = &str> {
    line.trim()
        .split(HEADWORD_SEPARATOR)
        .filter(|hw| !hw.is_empty())
}

/// 读取babylon文件中的全部释义
///
/// 每个非空词条映射到其最近一次出现的非空释义（后出现的覆盖先出现的）。
/// 空词条与空释义只计数并告警，不会导致失败；记录分隔行非空则返回格式错误。
pub fn parse_definitions<P: AsRef<Path>>(path: P) -> Result<HashMap<String, String>> {
    let path = path.as_ref();
    info!("📖 读取释义: {}", path.display());

    let content = read_text(path)?;
    let mut definitions = HashMap::new();
    let mut empty_headwords = 0usize;
    let mut empty_definitions = 0usize;
    let mut definition_lines = 0usize;
    let mut current_headwords: Vec<&str> = Vec::new();

    for (index, line) in content.lines().enumerate() {
        match LineRole::of(index) {
            LineRole::Headwords => {
                current_headwords = line.trim().split(HEADWORD_SEPARATOR).collect();
            }
            LineRole::Definition => {
                let definition = line.trim();
                if definition.is_empty() {
                    empty_definitions += 1;
                    continue;
                }
                for headword in &current_headwords {
                    if headword.is_empty() {
                        empty_headwords += 1;
                    } else {
                        definitions.insert(headword.to_string(), definition.to_string());
                    }
                }
                definition_lines += 1;
            }
            LineRole::Terminator => {
                if !line.trim().is_empty() {
                    tracing::error!("❌ 第{}行应为空行: {}", index + 1, line);
                    return Err(dict_error!(format, path.display(), index + 1, line));
                }
            }
        }
    }

    if empty_headwords != 0 || empty_definitions != 0 {
        warn!(
            "⚠️  空词条: {}, 空释义: {} ({})",
            empty_headwords,
            empty_definitions,
            path.display()
        );
    }
    info!(
        "✅ 读取到 {} 条释义, 对应 {} 个词条 ({})",
        definition_lines,
        definitions.len(),
        path.display()
    );

    Ok(definitions)
}

/// 读取babylon文件中的全部词条
///
/// 返回去重并按码点升序排列的非空词条
pub fn parse_headwords<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = read_text(path)?;

    let headwords: BTreeSet<String> = content
        .lines()
        .enumerate()
        .filter(|(index, _)| LineRole::of(*index) == LineRole::Headwords)
        .flat_map(|(_, line)| split_headwords(line))
        .map(str::to_string)
        .collect();

    debug!("{} 中共有 {} 个不同词条", path.display(), headwords.len());
    Ok(headwords.into_iter().collect())
}

/// 确保父目录存在
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| dict_error!(file_op, parent.display(), "创建目录", e))?;
        }
    }
    Ok(())
}

fn write_records(entries: &[Entry], path: &Path, append: bool) -> Result<()> {
    ensure_parent_dir(path)?;

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)
        .map_err(|e| dict_error!(file_op, path.display(), "打开", e))?;
    let mut writer = BufWriter::new(file);

    for entry in entries {
        writer
            .write_all(entry.to_record().as_bytes())
            .map_err(|e| dict_error!(file_op, path.display(), "写入", e))?;
    }
    writer
        .flush()
        .map_err(|e| dict_error!(file_op, path.display(), "写入", e))?;

    debug!("写入 {} 条记录到 {}", entries.len(), path.display());
    Ok(())
}

/// 按给定顺序写出记录（覆盖已有文件）
///
/// 不校验词条是否为空，由调用方负责
pub fn write_entries<P: AsRef<Path>>(entries: &[Entry], path: P) -> Result<()> {
    write_records(entries, path.as_ref(), false)
}

/// 追加记录到已有文件末尾
pub fn append_entries<P: AsRef<Path>>(entries: &[Entry], path: P) -> Result<()> {
    write_records(entries, path.as_ref(), true)
}

fn write_lines<'a, I>(lines: I, out_path: &Path) -> Result<usize>
where
    I: IntoIterator<Item = &'a String>,
{
    ensure_parent_dir(out_path)?;
    let file = fs::File::create(out_path)
        .map_err(|e| dict_error!(file_op, out_path.display(), "创建", e))?;
    let mut writer = BufWriter::new(file);
    let mut count = 0;
    for line in lines {
        writeln!(writer, "{}", line)
            .map_err(|e| dict_error!(file_op, out_path.display(), "写入", e))?;
        count += 1;
    }
    writer
        .flush()
        .map_err(|e| dict_error!(file_op, out_path.display(), "写入", e))?;
    Ok(count)
}

/// 导出词条列表文件，每行一个词条
pub fn dump_headwords_file<P, Q>(in_path: P, out_path: Q) -> Result<usize>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let headwords = parse_headwords(in_path)?;
    let count = write_lines(&headwords, out_path.as_ref())?;
    info!("📝 导出 {} 个词条到 {}", count, out_path.as_ref().display());
    Ok(count)
}

/// 导出释义列表文件，每行一条释义（顺序不固定）
pub fn dump_definitions_file<P, Q>(in_path: P, out_path: Q) -> Result<usize>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let definitions = parse_definitions(in_path)?;
    let count = write_lines(definitions.values(), out_path.as_ref())?;
    info!("📝 导出 {} 条释义到 {}", count, out_path.as_ref().display());
    Ok(count)
}
