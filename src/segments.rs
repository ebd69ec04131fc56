//! 分段文件拼接模块
//!
//! 每个字母一个`<字母>.babylon`分段文件，全部完成后按文件名顺序拼接为
//! 上一级目录下的`<上级目录名>.babylon`。

// 标准库导入
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

// 第三方crate导入
use tracing::{debug, info};
use walkdir::WalkDir;

// 本地模块导入
use crate::babylon::ensure_parent_dir;
use crate::dict_error;
use crate::error::Result;
use crate::site_constants::layout_config::BABYLON_EXTENSION;

/// 列出目录下（不递归）指定扩展名的文件，按文件名码点顺序排列
pub fn list_segments<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut segments = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| dict_error!(file_op, dir.display(), "遍历目录", e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        if path.extension().map_or(false, |ext| ext == extension) {
            segments.push(path);
        }
    }

    segments.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(segments)
}

/// 计算分段目录对应的最终输出路径
///
/// `<词典目录>/<分段目录>` → `<词典目录>/<词典目录名>.babylon`
pub fn joined_output_path<P: AsRef<Path>>(segment_dir: P) -> Result<PathBuf> {
    let segment_dir = segment_dir.as_ref();
    let dictionary_dir = segment_dir
        .parent()
        .filter(|p| p.file_name().is_some())
        .ok_or_else(|| dict_error!(input_validation, segment_dir.display(), "分段目录缺少上级词典目录"))?;
    let name = dictionary_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(dictionary_dir.join(format!("{}.{}", name, BABYLON_EXTENSION)))
}

/// 按文件名顺序拼接目录下的全部babylon分段
///
/// 纯字节拼接，不做去重或校验；每个分段应自带结尾空行。
pub fn join_segments<P: AsRef<Path>>(segment_dir: P) -> Result<PathBuf> {
    let segment_dir = segment_dir.as_ref();
    let output_path = joined_output_path(segment_dir)?;
    let segments = list_segments(segment_dir, BABYLON_EXTENSION)?;

    ensure_parent_dir(&output_path)?;
    let output = fs::File::create(&output_path)
        .map_err(|e| dict_error!(file_op, output_path.display(), "创建", e))?;
    let mut writer = BufWriter::new(output);

    for segment in &segments {
        debug!("拼接分段: {}", segment.display());
        let mut input = fs::File::open(segment)
            .map_err(|e| dict_error!(file_op, segment.display(), "读取", e))?;
        io::copy(&mut input, &mut writer)
            .map_err(|e| dict_error!(file_op, output_path.display(), "写入", e))?;
    }
    writer
        .flush()
        .map_err(|e| dict_error!(file_op, output_path.display(), "写入", e))?;

    info!(
        "🔗 拼接 {} 个分段到 {}",
        segments.len(),
        output_path.display()
    );
    Ok(output_path)
}
