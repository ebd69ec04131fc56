//! 婆罗米系文字转写模块
//!
//! 古吉拉特语与天城体在Unicode中按ISCII对齐排布（各占0x80个码位），
//! 因此两者之间的转写可以通过码位偏移完成。块外字符（ASCII、标点、
//! 共用的danda等）原样保留。

// 标准库导入
use std::fmt;
use std::str::FromStr;

// 本地模块导入
use crate::dict_error;
use crate::error::{DictError, Result};

const DEVANAGARI_BLOCK: u32 = 0x0900;
const GUJARATI_BLOCK: u32 = 0x0A80;
const BLOCK_SIZE: u32 = 0x80;

const DEVANAGARI_ANUSVARA: char = '\u{0902}';
const DEVANAGARI_VIRAMA: char = '\u{094D}';

/// 支持的文字
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    Devanagari,
    Gujarati,
}

impl Script {
    fn block_start(self) -> u32 {
        match self {
            Script::Devanagari => DEVANAGARI_BLOCK,
            Script::Gujarati => GUJARATI_BLOCK,
        }
    }

    /// 字符是否属于该文字的Unicode块
    pub fn contains(self, c: char) -> bool {
        let start = self.block_start();
        (start..start + BLOCK_SIZE).contains(&(c as u32))
    }

    /// 块内偏移是否在该文字中有对应字符
    fn is_assigned(self, offset: u32) -> bool {
        match self {
            // 天城体块全部已分配
            Script::Devanagari => offset < BLOCK_SIZE,
            Script::Gujarati => matches!(
                offset,
                0x01..=0x03
                    | 0x05..=0x0D
                    | 0x0F..=0x11
                    | 0x13..=0x28
                    | 0x2A..=0x30
                    | 0x32..=0x33
                    | 0x35..=0x39
                    | 0x3C..=0x45
                    | 0x47..=0x49
                    | 0x4B..=0x4D
                    | 0x50
                    | 0x60..=0x63
                    | 0x66..=0x71
                    | 0x79..=0x7F
            ),
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Script::Devanagari => write!(f, "devanagari"),
            Script::Gujarati => write!(f, "gujarati"),
        }
    }
}

impl FromStr for Script {
    type Err = DictError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "devanagari" | "deva" => Ok(Script::Devanagari),
            "gujarati" | "gujr" => Ok(Script::Gujarati),
            other => Err(dict_error!(input_validation, other, "不支持的文字")),
        }
    }
}

/// 两块同一偏移处字符含义不同的位置
///
/// 0x71：天城体高位点 ॱ 对应古吉拉特语卢比符号 ૱；
/// 0x7A..=0x7F：天城体字母 ॺ–ॿ 对应古吉拉特语附加符号。
fn is_divergent(offset: u32) -> bool {
    matches!(offset, 0x71 | 0x7A..=0x7F)
}

/// 单字符转写，无对应字符时原样返回
fn map_char(c: char, from: Script, to: Script) -> char {
    if !from.contains(c) {
        return c;
    }
    let offset = c as u32 - from.block_start();
    // danda与双danda两种文字共用天城体码位
    if from == Script::Devanagari && (offset == 0x64 || offset == 0x65) {
        return c;
    }
    if is_divergent(offset) || !to.is_assigned(offset) {
        return c;
    }
    char::from_u32(to.block_start() + offset).unwrap_or(c)
}

/// 将文本从一种文字转写为另一种
pub fn transliterate(text: &str, from: Script, to: Script) -> String {
    if from == to {
        return text.to_string();
    }
    text.chars().map(|c| map_char(c, from, to)).collect()
}

/// 天城体辅音所属的五组（varga）及其鼻音
fn varga_nasal(c: char) -> Option<char> {
    match c {
        '\u{0915}'..='\u{0919}' => Some('\u{0919}'), // क-ङ
        '\u{091A}'..='\u{091E}' => Some('\u{091E}'), // च-ञ
        '\u{091F}'..='\u{0923}' => Some('\u{0923}'), // ट-ण
        '\u{0924}'..='\u{0928}' => Some('\u{0928}'), // त-न
        '\u{092A}'..='\u{092E}' => Some('\u{092E}'), // प-म
        _ => None,
    }
}

/// 将分组辅音前的anusvara改写为同组鼻音加virama
///
/// 例如 `संत` → `सन्त`，`अंक` → `अङ्क`。
pub fn fix_lazy_anusvara(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == DEVANAGARI_ANUSVARA {
            if let Some(nasal) = chars.peek().copied().and_then(varga_nasal) {
                output.push(nasal);
                output.push(DEVANAGARI_VIRAMA);
                continue;
            }
        }
        output.push(c);
    }
    output
}

/// 古吉拉特语词条转为天城体并修正anusvara
pub fn gujarati_headword_to_devanagari(headword: &str) -> String {
    fix_lazy_anusvara(&transliterate(headword, Script::Gujarati, Script::Devanagari))
}

/// 构造按行转写的转换函数，可直接交给改写器使用
///
/// 源文字与目标文字相同，或对非天城体目标要求修正anusvara时返回错误
pub fn line_converter(
    from: Script,
    to: Script,
    fix_anusvara: bool,
) -> Result<impl FnMut(&str) -> Result<String>> {
    if from == to {
        return Err(dict_error!(transliteration, from, "源文字与目标文字相同"));
    }
    if fix_anusvara && to != Script::Devanagari {
        return Err(dict_error!(transliteration, to, "anusvara修正仅适用于天城体"));
    }

    Ok(move |line: &str| {
        let converted = transliterate(line, from, to);
        Ok(if fix_anusvara {
            fix_lazy_anusvara(&converted)
        } else {
            converted
        })
    })
}
