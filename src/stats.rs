use std::path::Path;
use std::time::Duration;

use serde_json::{json, Value};

use crate::dict_error;
use crate::error::{DictError, Result};

/// 单个分区（字母）的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterStatus {
    /// 已写出
    Written {
        /// 写出的记录数
        entries: usize,
        /// 复用已有释义的记录数
        reused: usize,
    },
    /// 输出已存在，跳过
    Skipped,
}

impl LetterStatus {
    /// 写出的记录数，跳过时为0
    pub fn count(&self) -> usize {
        match self {
            LetterStatus::Written { entries, .. } => *entries,
            LetterStatus::Skipped => 0,
        }
    }
}

/// 批处理统计
#[derive(Debug, Default)]
pub struct BatchStats {
    pub letters: usize,
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
    pub entries: usize,
    pub reused: usize,
    pub duration: Duration,
}

impl BatchStats {
    /// 汇总各分区结果
    pub fn from_outcomes(outcomes: &[(String, Result<LetterStatus>)], duration: Duration) -> Self {
        let mut stats = BatchStats {
            letters: outcomes.len(),
            duration,
            ..Default::default()
        };
        for (_, outcome) in outcomes {
            match outcome {
                Ok(LetterStatus::Written { entries, reused }) => {
                    stats.written += 1;
                    stats.entries += entries;
                    stats.reused += reused;
                }
                Ok(LetterStatus::Skipped) => stats.skipped += 1,
                Err(_) => stats.failed += 1,
            }
        }
        stats
    }

    /// 是否全部分区成功（含跳过）
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// 打印批处理统计
pub fn print_batch_stats(stats: &BatchStats) {
    println!("\n📊 批处理统计报告:");
    println!("═══════════════════════════════════════");

    println!("🔤 分区统计:");
    println!("   分区总数: {}", stats.letters);
    println!("   已写出: {}", stats.written);
    println!("   已跳过: {}", stats.skipped);
    println!("   失败: {}", stats.failed);

    println!("\n📝 记录统计:");
    println!("   写出记录: {} 条", stats.entries);
    println!("   复用释义: {} 条", stats.reused);
    if stats.entries > 0 {
        println!(
            "   复用率: {:.1}%",
            stats.reused as f64 / stats.entries as f64 * 100.0
        );
    }

    println!("\n⏱️  总耗时: {}", format_duration(stats.duration));
}

/// 生成JSON报告
pub fn build_report(
    command: &str,
    outcomes: &[(String, Result<LetterStatus>)],
    stats: &BatchStats,
) -> Value {
    let letters: Vec<Value> = outcomes
        .iter()
        .map(|(letter, outcome)| match outcome {
            Ok(LetterStatus::Written { entries, reused }) => json!({
                "letter": letter,
                "status": "written",
                "entries": entries,
                "reused": reused,
            }),
            Ok(LetterStatus::Skipped) => json!({
                "letter": letter,
                "status": "skipped",
                "entries": 0,
            }),
            Err(e) => json!({
                "letter": letter,
                "status": "failed",
                "error": e.to_string(),
            }),
        })
        .collect();

    json!({
        "command": command,
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "duration_ms": stats.duration.as_millis() as u64,
        "summary": {
            "letters": stats.letters,
            "written": stats.written,
            "skipped": stats.skipped,
            "failed": stats.failed,
            "entries": stats.entries,
            "reused": stats.reused,
        },
        "letters": letters,
    })
}

/// 写出JSON报告
pub fn write_report<P: AsRef<Path>>(path: P, report: &Value) -> Result<()> {
    let path = path.as_ref();
    let text = serde_json::to_string_pretty(report)
        .map_err(|e| DictError::from(anyhow::Error::new(e)))?;
    std::fs::write(path, text).map_err(|e| dict_error!(file_op, path.display(), "写入", e))
}

/// 格式化持续时间
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.3}s", duration.as_secs_f64())
    }
}
