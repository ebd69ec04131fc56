//! dict-scraper - 网页词典抓取与babylon词典工具库
//!
//! 这个库提供了babylon文件读写、分段拼接、原地转写改写、网页词典抓取等核心功能。

pub mod error;
pub mod site_constants;
pub mod config;
pub mod babylon;
pub mod segments;
pub mod temp_manager;
pub mod rewriter;
pub mod transliteration;
pub mod html_processor;
pub mod scraper;
pub mod pipeline;
pub mod stats;
pub mod utils;
