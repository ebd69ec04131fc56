/// 词典站点配置常量
///
/// 该文件定义了抓取站点、文件布局、字符替换相关的常量配置，方便统一管理和维护

/// 默认词典站点配置
pub mod site_config {
    /// 默认词典站点入口地址
    pub const DEFAULT_BASE_URL: &str = "http://www.bhagavadgomandal.com/index.php";

    /// 词条列表页的type参数
    pub const HEADWORD_LIST_TYPE: &str = "1";

    /// 释义页的type参数
    pub const DEFINITION_TYPE: &str = "3";

    /// 分页下拉框的name属性
    pub const PAGE_SELECT_NAME: &str = "pgInd";

    /// 词条链接的class
    pub const WORD_LINK_CLASS: &str = "word";

    /// 释义区域容器的class
    pub const DEFINITION_CONTAINER_CLASS: &str = "right_middle";

    /// 古吉拉特语字母表（分区键）
    pub const GUJARATI_LETTERS: &[&str] = &[
        "અ", "આ", "ઇ", "ઈ", "ઉ", "ઊ", "ઋ", "ઌ", "ઍ", "એ", "ઐ", "ઑ", "ઓ", "ઔ",
        "ક", "ખ", "ગ", "ઘ", "ઙ", "ચ", "છ", "જ", "ઝ", "ઞ", "ટ", "ઠ", "ડ", "ઢ",
        "ણ", "ત", "થ", "દ", "ધ", "ન", "પ", "ફ", "બ", "ભ", "મ", "ય", "ર", "લ",
        "ળ", "વ", "શ", "ષ", "સ", "હ", "ૐ", "ૠ", "ૡ",
    ];
}

/// 文件布局配置
pub mod layout_config {
    /// babylon分段文件扩展名
    pub const BABYLON_EXTENSION: &str = "babylon";

    /// 词条列表文件扩展名
    pub const HEADWORD_LIST_EXTENSION: &str = "csv";

    /// 原地改写时使用的临时文件后缀
    pub const TEMP_SUFFIX: &str = "_fixed";
}

/// 抓取配置
pub mod crawler_config {
    /// 默认请求超时时间（秒）
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 250;

    /// 默认User-Agent
    pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; dict-scraper/0.1.0)";

    /// 最大重试次数
    pub const DEFAULT_MAX_RETRIES: usize = 3;

    /// 重试延迟基数（毫秒）
    pub const RETRY_DELAY_BASE_MS: u64 = 1000;

    /// 默认并发分区数量
    pub const DEFAULT_WORKERS: usize = 8;
}

/// 释义文本中的字符替换
pub mod glyphs {
    /// 句点的替代字符（避免与babylon工具的句子切分冲突）
    pub const SENTENCE_TERMINATOR: char = '.';
    pub const SENTENCE_SUBSTITUTE: &str = "॥";

    /// ASCII冒号替换为古吉拉特语visarga
    pub const ASCII_COLON: char = ':';
    pub const GUJARATI_VISARGA: &str = "ઃ";

    /// 行内换行标记
    pub const LINE_BREAK: &str = "<br>";

    /// 写入古吉拉特语文件时对双danda的加宽形式
    pub const PADDED_DOUBLE_DANDA: &str = "  ॥ ";
}

/// 实用工具函数
/// 校验站点地址是否有效
pub fn is_valid_base_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// 判断是否为已知的分区键
pub fn is_known_letter(letter: &str) -> bool {
    site_config::GUJARATI_LETTERS.contains(&letter)
}
