//! 按字母分区的抓取流程
//!
//! 每个字母是一个独立分区：独占自己的输出文件，失败只影响自身。
//! 输出先写入同目录临时文件，整个字母完成后才替换为正式文件。

// 标准库导入
use std::collections::HashMap;
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};

// 第三方crate导入
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

// 本地模块导入
use crate::babylon::{parse_definitions, Entry};
use crate::dict_error;
use crate::error::Result;
use crate::scraper::{known_definition, DictionarySite};
use crate::site_constants::{glyphs, layout_config};
use crate::stats::LetterStatus;
use crate::temp_manager::TempSibling;
use crate::transliteration::{gujarati_headword_to_devanagari, transliterate, Script};

/// 释义抓取所涉及的目录
#[derive(Debug, Clone)]
pub struct DefinitionDirs {
    /// 词条列表目录（`<字母>.csv`）
    pub headword_dir: PathBuf,
    /// 古吉拉特语babylon分段目录
    pub out_dir: PathBuf,
    /// 天城体babylon分段目录
    pub out_dir_devanagari: PathBuf,
}

/// `<目录>/<字母>.csv`
pub fn headword_list_path<P: AsRef<Path>>(dir: P, letter: &str) -> PathBuf {
    dir.as_ref()
        .join(format!("{}.{}", letter, layout_config::HEADWORD_LIST_EXTENSION))
}

/// `<目录>/<字母>.babylon`
pub fn segment_path<P: AsRef<Path>>(dir: P, letter: &str) -> PathBuf {
    dir.as_ref()
        .join(format!("{}.{}", letter, layout_config::BABYLON_EXTENSION))
}

/// 统一双danda的写法，再按古吉拉特语文件的习惯加宽
///
/// 先还原再加宽，已加宽的释义再处理一次结果不变
fn pad_dandas(definition: &str) -> String {
    unpad_dandas(definition).replace(glyphs::SENTENCE_SUBSTITUTE, glyphs::PADDED_DOUBLE_DANDA)
}

fn unpad_dandas(definition: &str) -> String {
    definition.replace(glyphs::PADDED_DOUBLE_DANDA, glyphs::SENTENCE_SUBSTITUTE)
}

/// 抓取一个字母的全部词条，写入`<out_dir>/<字母>.csv`
///
/// 输出已存在时跳过
pub async fn harvest_letter_headwords<S, P>(
    site: &S,
    letter: &str,
    out_dir: P,
) -> Result<LetterStatus>
where
    S: DictionarySite,
    P: AsRef<Path>,
{
    let out_path = headword_list_path(out_dir, letter);
    if out_path.exists() {
        warn!("⚠️  跳过字母 {}，{} 已存在", letter, out_path.display());
        return Ok(LetterStatus::Skipped);
    }

    let headwords = site.enumerate_headwords(letter).await?;

    let mut temp = TempSibling::create(&out_path)?;
    for headword in &headwords {
        temp.write_str(headword)?;
        temp.write_str("\n")?;
    }
    temp.commit()?;

    info!("✅ 字母 {}: {} 个词条", letter, headwords.len());
    Ok(LetterStatus::Written {
        entries: headwords.len(),
        reused: 0,
    })
}

/// 抓取一个字母下全部词条的释义
///
/// 同时写出古吉拉特语分段和天城体分段；两者都已存在时跳过。
/// 已有的古吉拉特语分段中的非空释义会被复用，不再请求站点。
pub async fn dump_letter_definitions<S>(
    site: &S,
    letter: &str,
    dirs: &DefinitionDirs,
) -> Result<LetterStatus>
where
    S: DictionarySite,
{
    let in_path = headword_list_path(&dirs.headword_dir, letter);
    let out_path = segment_path(&dirs.out_dir, letter);
    let out_path_devanagari = segment_path(&dirs.out_dir_devanagari, letter);

    if out_path.exists() && out_path_devanagari.exists() {
        warn!("⚠️  跳过字母 {}，{} 已存在", letter, out_path.display());
        return Ok(LetterStatus::Skipped);
    }

    let existing: HashMap<String, String> = if out_path.exists() {
        parse_definitions(&out_path)?
    } else {
        HashMap::new()
    };

    let headword_list = fs::read_to_string(&in_path)
        .map_err(|e| dict_error!(file_op, in_path.display(), "读取", e))?;

    let mut file_out = TempSibling::create(&out_path)?;
    let mut file_out_devanagari = TempSibling::create(&out_path_devanagari)?;
    let mut entries = 0usize;
    let mut reused = 0usize;

    for line in headword_list.lines() {
        let headword = line
            .trim()
            .replace(glyphs::ASCII_COLON, glyphs::GUJARATI_VISARGA);
        if headword.is_empty() {
            debug!("字母 {} 中有空行，跳过", letter);
            continue;
        }

        if known_definition(&headword, &existing).is_some() {
            reused += 1;
        }
        let definition = unpad_dandas(&site.fetch_definition(&headword, &existing).await?);

        let devanagari_headword = gujarati_headword_to_devanagari(&headword);
        let devanagari_definition =
            transliterate(&definition, Script::Gujarati, Script::Devanagari);

        let headwords = [headword.clone(), devanagari_headword];
        file_out.write_str(&Entry::new(headwords.clone(), pad_dandas(&definition)).to_record())?;
        file_out_devanagari.write_str(&Entry::new(headwords, devanagari_definition).to_record())?;

        entries += 1;
        if entries % 100 == 0 {
            info!("字母 {}: 已处理 {} 个词条", letter, entries);
        }
    }

    file_out.commit()?;
    file_out_devanagari.commit()?;

    info!("✅ 字母 {}: {} 条释义 (复用 {} 条)", letter, entries, reused);
    Ok(LetterStatus::Written { entries, reused })
}

/// 按分区键并发执行任务，同时最多`workers`个
///
/// 结果按键的原始顺序返回；单个分区失败只记录日志，不影响其他分区
pub async fn run_partitions<F, Fut>(
    keys: &[String],
    workers: usize,
    job: F,
) -> Vec<(String, Result<LetterStatus>)>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<LetterStatus>>,
{
    let tasks = keys.iter().cloned().map(|key| {
        let task = job(key.clone());
        async move {
            let outcome = task.await;
            if let Err(e) = &outcome {
                error!("❌ 分区 {} 失败: {}", key, e);
            }
            (key, outcome)
        }
    });

    stream::iter(tasks)
        .buffered(workers.max(1))
        .collect()
        .await
}
