//! 词典站点抓取模块
//!
//! 此模块负责：
//! - 按字母枚举站点上的全部词条（分页列表）
//! - 按词条抓取释义表格并拼装为babylon释义行
//! - 网络请求的有限次指数退避重试

// 标准库导入
use std::collections::HashMap;
use std::future::Future;
use std::sync::OnceLock;

// 第三方crate导入
use regex::Regex;
use reqwest::Client;
use tracing::{debug, error, info, warn};
use url::Url;

// 本地模块导入
use crate::config::ScraperConfig;
use crate::dict_error;
use crate::error::Result;
use crate::html_processor::{find_by_name, nested_table_rows, parse_html, select, text_content};
use crate::site_constants::{glyphs, site_config};

/// 词典站点抽象
///
/// 管道只依赖这两个操作，便于用离线实现替换真实站点
#[allow(async_fn_in_trait)]
pub trait DictionarySite {
    /// 枚举某个字母下的全部词条（按站点顺序）
    async fn enumerate_headwords(&self, letter: &str) -> Result<Vec<String>>;

    /// 抓取单个词条的释义
    ///
    /// 已有非空释义时直接返回，不发起网络请求
    async fn fetch_definition(
        &self,
        headword: &str,
        existing: &HashMap<String, String>,
    ) -> Result<String>;
}

/// 已有释义中查找非空项
pub fn known_definition<'a>(
    headword: &str,
    existing: &'a HashMap<String, String>,
) -> Option<&'a str> {
    existing
        .get(headword)
        .map(String::as_str)
        .filter(|definition| !definition.is_empty())
}

/// 将释义表格拼装为一行babylon释义
///
/// 以`<词条><br>`开头；每行取前两列作为标题、第4列作为正文，
/// 正文中的句点替换为`॥`，连续换行折叠为`<br>`；最后将ASCII冒号替换为visarga。
/// 第一行为表头，跳过。
pub fn format_definition(headword: &str, rows: &[Vec<String>]) -> String {
    static NEWLINES: OnceLock<Regex> = OnceLock::new();
    let newlines = NEWLINES.get_or_init(|| Regex::new(r"\n+").expect("静态正则表达式"));
    let mut definition = format!("{}{}", headword, glyphs::LINE_BREAK);

    for row in rows.iter().skip(1) {
        if row.len() < 4 {
            warn!("⚠️  {} 的释义表格中有列数不足的行，已丢弃: {:?}", headword, row);
            continue;
        }
        let detail = row[3].replace(glyphs::SENTENCE_TERMINATOR, glyphs::SENTENCE_SUBSTITUTE);
        let detail = newlines.replace_all(&detail, glyphs::LINE_BREAK);
        definition.push_str(&format!(
            "{}{br}{}{br}{br}",
            row[0..2].join(" "),
            detail,
            br = glyphs::LINE_BREAK
        ));
    }

    definition.replace(glyphs::ASCII_COLON, glyphs::GUJARATI_VISARGA)
}

/// 带指数退避的重试
///
/// 首次失败后最多再尝试`max_retries`次，全部失败时返回最后一次的错误
pub async fn with_retry<T, F, Fut>(
    config: &ScraperConfig,
    what: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let total_attempts = config.max_retries() + 1;
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!("✅ 重试成功: {}", what);
                }
                return Ok(value);
            }
            Err(e) if attempt < total_attempts => {
                warn!("❌ 请求失败 (尝试 {}/{}) {}: {}", attempt, total_attempts, what, e);
                let delay = config.retry_delay(attempt);
                debug!("⏳ 等待 {:?} 后重试...", delay);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                error!("❌ 所有重试均失败 {}: {}", what, e);
                return Err(e);
            }
        }
    }
}

/// Bhagavad Go Mandal 在线词典
pub struct GomandalSite {
    config: ScraperConfig,
    client: Client,
}

impl GomandalSite {
    /// 创建站点客户端
    pub fn new(config: ScraperConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .build()?;
        Ok(Self { config, client })
    }

    /// 当前配置
    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// 构造查询地址
    pub fn page_url(&self, item: &str, item_type: &str, page: usize) -> Result<Url> {
        let page = page.to_string();
        Url::parse_with_params(
            self.config.base_url(),
            &[
                ("action", "dictionary"),
                ("sitem", item),
                ("type", item_type),
                ("page", page.as_str()),
            ],
        )
        .map_err(|e| dict_error!(config, "base_url", e))
    }

    async fn get_once(&self, url: &Url) -> Result<String> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(dict_error!(
                network,
                format!("{} 返回错误状态", url),
                status.as_u16()
            ));
        }
        Ok(response.text().await?)
    }

    /// 获取页面内容（带重试）
    async fn get_page(&self, url: &Url) -> Result<String> {
        let result = with_retry(&self.config, url.as_str(), || self.get_once(url)).await;
        if let Err(e) = &result {
            if e.is_timeout() {
                error!("⏰ 请求超时: {}", url);
            }
        }
        result
    }
}

/// 列表页的分页数量，没有分页下拉框时返回None
pub fn page_count(html: &str) -> Result<Option<usize>> {
    let dom = parse_html(html)?;
    Ok(find_by_name(&dom.document, "select", site_config::PAGE_SELECT_NAME)
        .map(|dropdown| select(&dropdown, "option", None).len()))
}

/// 列表页上的词条
pub fn page_headwords(html: &str) -> Result<Vec<String>> {
    let dom = parse_html(html)?;
    Ok(select(&dom.document, "a", Some(site_config::WORD_LINK_CLASS))
        .iter()
        .map(text_content)
        .collect())
}

/// 释义页上的表格行
pub fn definition_rows(html: &str) -> Result<Vec<Vec<String>>> {
    let dom = parse_html(html)?;
    Ok(nested_table_rows(
        &dom.document,
        "div",
        site_config::DEFINITION_CONTAINER_CLASS,
        2,
    ))
}

impl DictionarySite for GomandalSite {
    async fn enumerate_headwords(&self, letter: &str) -> Result<Vec<String>> {
        info!("🔤 处理字母 {}", letter);
        let first_url = self.page_url(letter, site_config::HEADWORD_LIST_TYPE, 0)?;
        let first_page = self.get_page(&first_url).await?;

        let num_pages = match page_count(&first_page)? {
            Some(count) => count.max(1),
            None => {
                warn!("⚠️  字母 {} 没有分页", letter);
                1
            }
        };
        info!("📄 字母 {} 共 {} 页", letter, num_pages);

        let mut headwords = page_headwords(&first_page)?;
        for page in 1..num_pages {
            if page % 10 == 0 {
                info!("字母 {}, 第 {} 页", letter, page);
            }
            let url = self.page_url(letter, site_config::HEADWORD_LIST_TYPE, page)?;
            let html = self.get_page(&url).await?;
            headwords.extend(page_headwords(&html)?);
        }

        Ok(headwords)
    }

    async fn fetch_definition(
        &self,
        headword: &str,
        existing: &HashMap<String, String>,
    ) -> Result<String> {
        if let Some(definition) = known_definition(headword, existing) {
            return Ok(definition.to_string());
        }

        let url = self.page_url(headword, site_config::DEFINITION_TYPE, 0)?;
        let html = self.get_page(&url).await?;
        let rows = definition_rows(&html)?;
        debug!("{}: {} 行释义", headword, rows.len().saturating_sub(1));

        Ok(format_definition(headword, &rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DictError;
    use std::cell::Cell;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_format_definition() {
        let rows = vec![
            row(&["શબ્દ", "જાતિ", "x", "અર્થ"]),
            row(&["અંક", "પું.", "x", "સંખ્યા. આંકડો\n\nનિશાની"]),
            row(&["અંક", "પું.", "x", "ખોળો"]),
        ];

        assert_eq!(
            format_definition("અંક", &rows),
            "અંક<br>અંક પું.<br>સંખ્યા॥ આંકડો<br>નિશાની<br><br>અંક પું.<br>ખોળો<br><br>"
        );
    }

    #[test]
    fn test_format_definition_colon_and_short_rows() {
        let rows = vec![
            row(&["header"]),
            row(&["a", "b"]),
            row(&["દુઃખ", "ન.", "x", "1: પીડા"]),
        ];

        assert_eq!(
            format_definition("દુ:ખ", &rows),
            "દુઃખ<br>દુઃખ ન.<br>1ઃ પીડા<br><br>"
        );
    }

    #[test]
    fn test_known_definition() {
        let mut existing = HashMap::new();
        existing.insert("a".to_string(), "def".to_string());
        existing.insert("b".to_string(), String::new());

        assert_eq!(known_definition("a", &existing), Some("def"));
        assert_eq!(known_definition("b", &existing), None);
        assert_eq!(known_definition("c", &existing), None);
    }

    #[test]
    fn test_page_url_encodes_headword() {
        let site = GomandalSite::new(ScraperConfig::new()).unwrap();
        let url = site.page_url("અ", site_config::HEADWORD_LIST_TYPE, 2).unwrap();

        assert!(url.as_str().starts_with(site_config::DEFAULT_BASE_URL));
        let pairs: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["action"], "dictionary");
        assert_eq!(pairs["sitem"], "અ");
        assert_eq!(pairs["type"], "1");
        assert_eq!(pairs["page"], "2");
    }

    #[test]
    fn test_page_parsing() {
        let html = r#"<select name="pgInd"><option>1</option><option>2</option></select>
            <a class="word">અ</a><a class="word">અંક</a>"#;
        assert_eq!(page_count(html).unwrap(), Some(2));
        assert_eq!(page_headwords(html).unwrap(), vec!["અ", "અંક"]);
        assert_eq!(page_count("<p>none</p>").unwrap(), None);
    }

    #[test]
    fn test_definition_rows_to_definition() {
        let html = r#"<div class="right_middle"><table><tr><td><table>
            <tr><td>h1</td><td>h2</td><td>h3</td><td>h4</td></tr>
            <tr><td>કર</td><td>પું.</td><td>x</td><td>હાથ.<br>હસ્ત</td></tr>
            </table></td></tr></table></div>"#;
        let rows = definition_rows(html).unwrap();
        assert_eq!(
            format_definition("કર", &rows),
            "કર<br>કર પું.<br>હાથ॥<br>હસ્ત<br><br>"
        );
    }

    #[test]
    fn test_collapsed_detail_text_is_included() {
        // 折叠的详情块已在页面中，只是默认隐藏
        let html = r#"<div class="right_middle"><table><tr><td><table>
            <tr><td>h1</td><td>h2</td><td>h3</td><td>h4</td></tr>
            <tr><td>કર</td><td>પું.</td><td>x</td><td>હાથ<a class="detaillink">+</a><br>
            <span class="detail" style="display:none">હસ્ત</span></td></tr>
            </table></td></tr></table></div>"#;
        let rows = definition_rows(html).unwrap();
        assert_eq!(
            format_definition("કર", &rows),
            "કર<br>કર પું.<br>હાથ+<br>હસ્ત<br><br>"
        );
    }

    #[tokio::test]
    async fn test_fetch_definition_uses_existing() {
        // 站点不可达，命中已有释义时不会发起请求
        let config = ScraperConfig::new().with_base_url("http://127.0.0.1:9/index.php");
        let site = GomandalSite::new(config).unwrap();
        let mut existing = HashMap::new();
        existing.insert("કર".to_string(), "હાથ".to_string());

        assert_eq!(site.fetch_definition("કર", &existing).await.unwrap(), "હાથ");
    }

    #[tokio::test]
    async fn test_with_retry_recovers() {
        let config = ScraperConfig::new()
            .with_max_retries(2)
            .with_retry_base_delay_ms(1);
        let calls = Cell::new(0);

        let result = with_retry(&config, "test", || {
            calls.set(calls.get() + 1);
            let attempt = calls.get();
            async move {
                if attempt < 3 {
                    Err(dict_error!(timeout, "http://example.com"))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_with_retry_gives_up() {
        let config = ScraperConfig::new()
            .with_max_retries(1)
            .with_retry_base_delay_ms(1);
        let calls = Cell::new(0);

        let result: Result<()> = with_retry(&config, "test", || {
            calls.set(calls.get() + 1);
            async { Err(dict_error!(timeout, "http://example.com")) }
        })
        .await;

        assert!(matches!(result, Err(DictError::NetworkTimeout { .. })));
        assert_eq!(calls.get(), 2);
    }
}
