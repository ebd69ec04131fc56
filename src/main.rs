use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use dict_scraper::babylon::{dump_definitions_file, dump_headwords_file};
use dict_scraper::config::{Cli, Command, RewriteTarget, ScrapeArgs};
use dict_scraper::pipeline::{
    dump_letter_definitions, harvest_letter_headwords, run_partitions, DefinitionDirs,
};
use dict_scraper::rewriter::{rewrite_definitions, rewrite_headwords};
use dict_scraper::scraper::GomandalSite;
use dict_scraper::segments::join_segments;
use dict_scraper::stats::{build_report, print_batch_stats, write_report, BatchStats, LetterStatus};
use dict_scraper::transliteration::{line_converter, Script};
use dict_scraper::utils::{init_logging, validate_input_dir, validate_input_file};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志系统
    init_logging(cli.verbose, cli.quiet);

    let total_start = Instant::now();

    if let Err(e) = run(&cli).await {
        error!("❌ 执行失败: {:#}", e);
        std::process::exit(1);
    }

    if !cli.quiet {
        info!("✅ 完成！总耗时: {:.3}秒", total_start.elapsed().as_secs_f64());
    }

    Ok(())
}

async fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Headwords { out_dir, scrape } => {
            let site = build_site(scrape)?;
            let letters = scrape.letters();
            info!("🚀 抓取词条: {} 个字母 -> {}", letters.len(), out_dir.display());

            let start = Instant::now();
            let outcomes = run_partitions(&letters, site.config().workers(), |letter| {
                let site = &site;
                async move { harvest_letter_headwords(site, &letter, out_dir).await }
            })
            .await;

            finish_batch(cli, "headwords", &outcomes, start)
        }

        Command::Definitions {
            in_dir,
            out_dir,
            out_dir_devanagari,
            scrape,
        } => {
            validate_input_dir(in_dir)?;
            let site = build_site(scrape)?;
            let letters = scrape.letters();
            let dirs = DefinitionDirs {
                headword_dir: in_dir.clone(),
                out_dir: out_dir.clone(),
                out_dir_devanagari: out_dir_devanagari.clone(),
            };
            info!("🚀 抓取释义: {} 个字母", letters.len());
            info!("📂 古吉拉特语输出: {}", out_dir.display());
            info!("📂 天城体输出: {}", out_dir_devanagari.display());

            let start = Instant::now();
            let outcomes = run_partitions(&letters, site.config().workers(), |letter| {
                let site = &site;
                let dirs = &dirs;
                async move { dump_letter_definitions(site, &letter, dirs).await }
            })
            .await;

            finish_batch(cli, "definitions", &outcomes, start)
        }

        Command::Join { dir } => {
            validate_input_dir(dir)?;
            let output = join_segments(dir)
                .with_context(|| format!("拼接分段失败: {}", dir.display()))?;
            info!("📄 输出文件: {}", output.display());
            Ok(())
        }

        Command::Transliterate {
            file,
            target,
            from,
            to,
            fix_anusvara,
            dry_run,
        } => transliterate_file(file, *target, from, to, *fix_anusvara, *dry_run),

        Command::DumpHeadwords { input, output } => {
            validate_input_file(input)?;
            dump_headwords_file(input, output)
                .with_context(|| format!("导出词条失败: {}", input.display()))?;
            Ok(())
        }

        Command::DumpDefinitions { input, output } => {
            validate_input_file(input)?;
            dump_definitions_file(input, output)
                .with_context(|| format!("导出释义失败: {}", input.display()))?;
            Ok(())
        }
    }
}

fn build_site(scrape: &ScrapeArgs) -> Result<GomandalSite> {
    let config = scrape.to_config().context("抓取配置无效")?;
    GomandalSite::new(config).context("创建站点客户端失败")
}

/// 对文件做文字转写
fn transliterate_file(
    file: &Path,
    target: RewriteTarget,
    from: &str,
    to: &str,
    fix_anusvara: bool,
    dry_run: bool,
) -> Result<()> {
    validate_input_file(file)?;
    let from: Script = from.parse()?;
    let to: Script = to.parse()?;
    info!("🔁 转写 {} ({} -> {}, {:?})", file.display(), from, to, target);

    let convert = line_converter(from, to, fix_anusvara)?;

    let summary = match target {
        RewriteTarget::Headwords => rewrite_headwords(file, convert, dry_run)?,
        RewriteTarget::Definitions => rewrite_definitions(file, convert, dry_run)?,
    };
    info!(
        "📊 共 {} 行, 转换 {} 行, 变化 {} 行{}",
        summary.lines,
        summary.converted,
        summary.changed,
        if dry_run { " (dry run)" } else { "" }
    );
    Ok(())
}

/// 汇总批处理结果，按需打印统计和写出报告
fn finish_batch(
    cli: &Cli,
    command: &str,
    outcomes: &[(String, dict_scraper::error::Result<LetterStatus>)],
    start: Instant,
) -> Result<()> {
    let stats = BatchStats::from_outcomes(outcomes, start.elapsed());

    let counts: Vec<String> = outcomes
        .iter()
        .map(|(letter, outcome)| match outcome {
            Ok(status) => format!("{}:{}", letter, status.count()),
            Err(_) => format!("{}:失败", letter),
        })
        .collect();
    info!("{}", counts.join(" "));

    if cli.stats || cli.verbose {
        print_batch_stats(&stats);
    }

    if let Some(report_path) = &cli.report {
        let report = build_report(command, outcomes, &stats);
        write_report(report_path, &report)
            .with_context(|| format!("写入报告失败: {}", report_path.display()))?;
        info!("📝 报告已写入: {}", report_path.display());
    }

    if !stats.all_succeeded() {
        anyhow::bail!("{} 个分区失败", stats.failed);
    }
    Ok(())
}
