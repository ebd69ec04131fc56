//! 配置管理模块
//!
//! 提供CLI参数解析和抓取配置管理功能

// 标准库导入
use std::path::PathBuf;
use std::time::Duration;

// 第三方crate导入
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::warn;

// 本地模块导入
use crate::dict_error;
use crate::error::Result;
use crate::site_constants::{crawler_config, is_known_letter, is_valid_base_url, site_config};

/// 抓取配置结构体
///
/// 支持Builder模式进行链式配置。
///
/// # Examples
///
/// ```rust
/// use dict_scraper::config::ScraperConfig;
///
/// let config = ScraperConfig::new()
///     .with_base_url("http://localhost:8080/index.php")
///     .with_timeout_secs(30)
///     .with_max_retries(5);
/// assert_eq!(config.max_retries(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// 词典站点入口地址
    base_url: String,
    /// 请求超时时间（秒）
    timeout_secs: u64,
    /// User-Agent
    user_agent: String,
    /// 最大重试次数（不含首次请求）
    max_retries: usize,
    /// 重试延迟基数（毫秒），按2的幂递增
    retry_base_delay_ms: u64,
    /// 并发分区数量
    workers: usize,
}

impl ScraperConfig {
    /// 创建新的配置实例
    ///
    /// 默认值取自`site_constants`
    pub fn new() -> Self {
        Self {
            base_url: site_config::DEFAULT_BASE_URL.to_string(),
            timeout_secs: crawler_config::DEFAULT_TIMEOUT_SECONDS,
            user_agent: crawler_config::DEFAULT_USER_AGENT.to_string(),
            max_retries: crawler_config::DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: crawler_config::RETRY_DELAY_BASE_MS,
            workers: crawler_config::DEFAULT_WORKERS,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// 第`attempt`次失败后的等待时间（attempt从1开始）
    pub fn retry_delay(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16) as u32;
        Duration::from_millis(self.retry_base_delay_ms.saturating_mul(1u64 << exponent))
    }

    /// 设置站点地址
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// 设置超时时间
    pub fn with_timeout_secs(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }

    /// 设置User-Agent
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// 设置最大重试次数
    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries;
        self
    }

    /// 设置重试延迟基数
    pub fn with_retry_base_delay_ms(mut self, millis: u64) -> Self {
        self.retry_base_delay_ms = millis;
        self
    }

    /// 设置并发分区数量（至少为1）
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        if !is_valid_base_url(&self.base_url) {
            return Err(dict_error!(config, "base_url", "必须以http://或https://开头"));
        }
        if self.timeout_secs == 0 {
            return Err(dict_error!(config, "timeout", "超时时间必须大于0"));
        }
        Ok(())
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// CLI参数结构
#[derive(Parser)]
#[command(author, version, about = "网页词典抓取与babylon词典文件处理工具", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// 详细输出模式
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 静默模式 (仅输出错误)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// 显示批处理统计
    #[arg(long, global = true)]
    pub stats: bool,

    /// 将批处理结果写入JSON报告
    #[arg(long, global = true, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

/// 子命令
#[derive(Subcommand)]
pub enum Command {
    /// 按字母抓取词条列表，每个字母写一个`<字母>.csv`
    Headwords {
        /// 输出目录
        #[arg(short, long, value_name = "DIR")]
        out_dir: PathBuf,

        #[command(flatten)]
        scrape: ScrapeArgs,
    },

    /// 按字母抓取释义，写出古吉拉特语与天城体两份babylon分段
    Definitions {
        /// 词条列表目录（`<字母>.csv`）
        #[arg(short, long, value_name = "DIR")]
        in_dir: PathBuf,

        /// 古吉拉特语babylon输出目录
        #[arg(short, long, value_name = "DIR")]
        out_dir: PathBuf,

        /// 天城体babylon输出目录
        #[arg(long, value_name = "DIR")]
        out_dir_devanagari: PathBuf,

        #[command(flatten)]
        scrape: ScrapeArgs,
    },

    /// 拼接目录下的babylon分段文件
    Join {
        /// 分段目录
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// 对babylon文件的词条行或释义行做文字转写
    Transliterate {
        /// babylon文件
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// 改写对象
        #[arg(long, value_enum, default_value = "headwords")]
        target: RewriteTarget,

        /// 源文字
        #[arg(long, default_value = "gujarati")]
        from: String,

        /// 目标文字
        #[arg(long, default_value = "devanagari")]
        to: String,

        /// 修正天城体的anusvara
        #[arg(long)]
        fix_anusvara: bool,

        /// 仅打印结果，不修改文件
        #[arg(long)]
        dry_run: bool,
    },

    /// 导出去重排序后的词条列表
    DumpHeadwords {
        #[arg(value_name = "FILE")]
        input: PathBuf,
        #[arg(value_name = "OUT")]
        output: PathBuf,
    },

    /// 导出全部释义
    DumpDefinitions {
        #[arg(value_name = "FILE")]
        input: PathBuf,
        #[arg(value_name = "OUT")]
        output: PathBuf,
    },
}

/// 改写对象
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RewriteTarget {
    Headwords,
    Definitions,
}

/// 抓取相关参数
#[derive(Args, Debug, Clone)]
pub struct ScrapeArgs {
    /// 词典站点入口地址
    #[arg(long, default_value = site_config::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// 只处理指定字母（可重复），默认处理全部字母
    #[arg(long = "letter", value_name = "LETTER")]
    pub letters: Vec<String>,

    /// 并发分区数量
    #[arg(long, default_value_t = crawler_config::DEFAULT_WORKERS)]
    pub workers: usize,

    /// 请求超时时间（秒）
    #[arg(long, default_value_t = crawler_config::DEFAULT_TIMEOUT_SECONDS)]
    pub timeout: u64,

    /// 最大重试次数
    #[arg(long, default_value_t = crawler_config::DEFAULT_MAX_RETRIES)]
    pub max_retries: usize,

    /// 自定义User-Agent
    #[arg(long)]
    pub user_agent: Option<String>,
}

impl ScrapeArgs {
    /// 转换为抓取配置
    pub fn to_config(&self) -> Result<ScraperConfig> {
        let mut config = ScraperConfig::new()
            .with_base_url(&self.base_url)
            .with_workers(self.workers)
            .with_timeout_secs(self.timeout)
            .with_max_retries(self.max_retries);
        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent);
        }
        config.validate()?;
        Ok(config)
    }

    /// 需要处理的字母列表
    pub fn letters(&self) -> Vec<String> {
        if self.letters.is_empty() {
            site_config::GUJARATI_LETTERS
                .iter()
                .map(|l| l.to_string())
                .collect()
        } else {
            for letter in self.letters.iter().filter(|l| !is_known_letter(l)) {
                warn!("⚠️  {} 不在古吉拉特语字母表中", letter);
            }
            self.letters.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ScraperConfig::default();
        assert_eq!(config.base_url(), site_config::DEFAULT_BASE_URL);
        assert_eq!(config.max_retries(), crawler_config::DEFAULT_MAX_RETRIES);
        assert_eq!(config.workers(), crawler_config::DEFAULT_WORKERS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retry_delay_is_exponential() {
        let config = ScraperConfig::new().with_retry_base_delay_ms(100);
        assert_eq!(config.retry_delay(1), Duration::from_millis(100));
        assert_eq!(config.retry_delay(2), Duration::from_millis(200));
        assert_eq!(config.retry_delay(3), Duration::from_millis(400));
    }

    #[test]
    fn test_validation() {
        assert!(ScraperConfig::new().with_base_url("ftp://x").validate().is_err());
        assert!(ScraperConfig::new().with_timeout_secs(0).validate().is_err());
        assert_eq!(ScraperConfig::new().with_workers(0).workers(), 1);
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "dict-scraper",
            "definitions",
            "--in-dir",
            "h",
            "--out-dir",
            "o",
            "--out-dir-devanagari",
            "d",
            "--letter",
            "ક",
            "--workers",
            "2",
            "--verbose",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Command::Definitions { scrape, .. } => {
                assert_eq!(scrape.letters(), vec!["ક"]);
                assert_eq!(scrape.to_config().unwrap().workers(), 2);
            }
            _ => panic!("Wrong command"),
        }
    }

    #[test]
    fn test_cli_transliterate() {
        let cli = Cli::parse_from([
            "dict-scraper",
            "transliterate",
            "a.babylon",
            "--target",
            "definitions",
            "--dry-run",
        ]);
        match cli.command {
            Command::Transliterate { target, dry_run, from, .. } => {
                assert_eq!(target, RewriteTarget::Definitions);
                assert!(dry_run);
                assert_eq!(from, "gujarati");
            }
            _ => panic!("Wrong command"),
        }
    }
}
