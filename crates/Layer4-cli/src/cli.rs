//! Command runners and output formatting

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tokenmeter_foundation::{
    BenchmarkReport, JsonStore, StoreScope, TokenCountResult, TokenCounter, TokenFamily,
    TokenizerConfig, WarmUpReport, WarmUpStatus, TOKENIZER_CONFIG_FILE,
};

// ============================================================================
// Commands
// ============================================================================

/// Count tokens for a single text
pub async fn run_count(
    counter: &TokenCounter,
    text: &str,
    family: TokenFamily,
    model: Option<&str>,
    json: bool,
) -> Result<()> {
    let result = match model {
        Some(model) => counter.count_tokens_with_model(text, model).await,
        None => counter.count_tokens(text, family).await,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    if !result.success {
        anyhow::bail!(result.error.unwrap_or_default());
    }

    if !json {
        println!("{}", format_result(&result));
    }

    Ok(())
}

/// Count tokens for a JSON array of strings
pub async fn run_batch(
    counter: &TokenCounter,
    input: &Value,
    family: TokenFamily,
    json: bool,
) -> Result<()> {
    let results = counter.count_tokens_batch_value(input, family).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    for (index, result) in results.iter().enumerate() {
        println!("[{}] {}", index, format_result(result));
    }

    let total: usize = results.iter().map(|r| r.count).sum();
    let failed = results.iter().filter(|r| !r.success).count();
    println!("\nTotal: {} tokens in {} texts ({} failed)", total, results.len(), failed);

    Ok(())
}

/// Time every tokenizer family on the same text
pub async fn run_bench(
    counter: &TokenCounter,
    text: &str,
    iterations: usize,
    json: bool,
) -> Result<()> {
    let report = counter.benchmark_tokenizers(text, iterations).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_benchmark(&report));
    }

    Ok(())
}

/// Build the engine cache ahead of time
pub async fn run_warm_up(counter: &TokenCounter, json: bool) -> Result<()> {
    let report = counter.warm_up().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_warm_up(&report));
    }

    Ok(())
}

/// Write a config file with every default spelled out
pub fn run_init(scope: StoreScope, force: bool) -> Result<()> {
    let store = JsonStore::for_scope(scope)?;
    let path = store.file_path(TOKENIZER_CONFIG_FILE);

    if TokenizerConfig::init_store(&store, force)? {
        println!("✓ Wrote {}", path.display());
    } else {
        println!("{} already exists (use --force to overwrite)", path.display());
    }

    Ok(())
}

// ============================================================================
// Input
// ============================================================================

/// Text argument, or all of stdin when omitted
pub fn read_text(text: Option<String>) -> Result<String> {
    match text {
        Some(text) => Ok(text),
        None => {
            let input =
                std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?;
            Ok(input.trim_end_matches(['\n', '\r']).to_string())
        }
    }
}

/// Batch input from a file, or stdin when no path is given
pub fn read_batch(path: Option<&Path>) -> Result<Value> {
    let content = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?,
    };

    parse_batch(&content)
}

pub fn parse_batch(content: &str) -> Result<Value> {
    serde_json::from_str(content).context("Batch input is not valid JSON")
}

// ============================================================================
// Output
// ============================================================================

pub fn format_result(result: &TokenCountResult) -> String {
    let family = result
        .family
        .map(|f| f.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if result.success {
        let kind = if result.exact { "" } else { ", estimate" };
        format!(
            "{} tokens ({}{}, {:.2}ms)",
            result.count, family, kind, result.timing_ms
        )
    } else {
        format!(
            "error: {} ({})",
            result.error.as_deref().unwrap_or("unknown error"),
            family
        )
    }
}

pub fn format_benchmark(report: &BenchmarkReport) -> String {
    let mut out = format!(
        "Benchmark ({} iterations, timings in ms)\n\n{:<10} {:>10} {:>10} {:>10}\n{}\n",
        report.iterations,
        "Tokenizer",
        "avg",
        "min",
        "max",
        "-".repeat(43)
    );

    for family in TokenFamily::BENCHMARK_ORDER {
        if let Some(stats) = report.get(family) {
            out.push_str(&format!(
                "{:<10} {:>10.3} {:>10.3} {:>10.3}\n",
                family, stats.avg_ms, stats.min_ms, stats.max_ms
            ));
        }
    }

    out
}

pub fn format_warm_up(report: &WarmUpReport) -> String {
    let mut out = match report.status {
        WarmUpStatus::AlreadyWarm => return "Cache already warm\n".to_string(),
        WarmUpStatus::Complete => "✓ Cache warmed\n".to_string(),
        WarmUpStatus::Partial => "⚠ Cache partially warmed\n".to_string(),
    };

    for key in &report.warmed {
        if report.estimated.contains(key) {
            out.push_str(&format!("  ✓ {} (estimate)\n", key));
        } else {
            out.push_str(&format!("  ✓ {}\n", key));
        }
    }
    for (key, error) in &report.failures {
        out.push_str(&format!("  ✗ {}: {}\n", key, error));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::io::Write;
    use tokenmeter_foundation::TimingStats;

    #[test]
    fn test_parse_batch() {
        let value = parse_batch(r#"["one", "two"]"#).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));

        // 배열 여부는 라이브러리가 판단
        assert!(parse_batch(r#""just a string""#).unwrap().is_string());
        assert!(parse_batch("not json").is_err());
    }

    #[test]
    fn test_read_batch_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["hello", "world"]"#).unwrap();

        let value = read_batch(Some(file.path())).unwrap();
        assert_eq!(value[1], "world");

        assert!(read_batch(Some(Path::new("/nonexistent/batch.json"))).is_err());
    }

    #[test]
    fn test_read_text_argument() {
        assert_eq!(read_text(Some("hi".to_string())).unwrap(), "hi");
    }

    #[test]
    fn test_format_result() {
        let ok = TokenCountResult::succeeded(4, 1.234, TokenFamily::OpenAi, "Hello, world!");
        assert_eq!(format_result(&ok), "4 tokens (openai, 1.23ms)");

        let guessed =
            TokenCountResult::succeeded(3, 0.5, TokenFamily::Gemini, "hi").with_exact(false);
        assert_eq!(format_result(&guessed), "3 tokens (gemini, estimate, 0.50ms)");

        let failed = TokenCountResult::failed(0.0, None, "x", "Token counting failed: boom");
        assert_eq!(format_result(&failed), "error: Token counting failed: boom (unknown)");
    }

    #[test]
    fn test_format_benchmark_order() {
        let stats: BTreeMap<_, _> = [TokenFamily::OpenAi, TokenFamily::Claude, TokenFamily::Gemini]
            .into_iter()
            .map(|f| (f, TimingStats::from_samples(&[1.0, 2.0])))
            .collect();
        let report = BenchmarkReport {
            iterations: 2,
            stats,
        };

        let out = format_benchmark(&report);
        let claude = out.find("claude").unwrap();
        let openai = out.find("openai").unwrap();
        let gemini = out.find("gemini").unwrap();
        assert!(claude < openai && openai < gemini);
        assert!(out.contains("1.500"));
    }

    #[test]
    fn test_format_warm_up() {
        let report = WarmUpReport {
            status: WarmUpStatus::Partial,
            warmed: vec!["openai:gpt-4o".to_string(), "gemini-local".to_string()],
            estimated: vec!["gemini-local".to_string()],
            failures: vec![("gemini".to_string(), "missing".to_string())],
        };

        let out = format_warm_up(&report);
        assert!(out.contains("partially"));
        assert!(out.contains("✓ openai:gpt-4o\n"));
        assert!(out.contains("✓ gemini-local (estimate)"));
        assert!(out.contains("✗ gemini: missing"));

        assert_eq!(format_warm_up(&WarmUpReport::already_warm()), "Cache already warm\n");
    }
}
