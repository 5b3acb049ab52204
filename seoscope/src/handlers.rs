use anyhow::Context;
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use seoscope_core::{
    AuditConfig, AuditReport, CrawlEvent, CrawlEventCallback, ReportFormat, audit_with_progress,
    render_report, save_report,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use url::Url;

pub fn print_banner() {
    println!(
        "{} {}",
        "seoscope".bright_cyan().bold(),
        env!("CARGO_PKG_VERSION").bright_black()
    );
    println!("{}", "site-wide SEO audits from the command line".bright_black());
    println!();
}

/// Log filter for the `-v` count: warn, info, then debug.
pub fn verbosity_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over `-v` when set.
pub fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity_filter(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Prepend `https://` to a bare host such as `example.com`.
///
/// Anything that still does not parse is returned untouched so the audit
/// reports the validation failure itself.
pub fn normalize_target_url(input: &str) -> String {
    let trimmed = input.trim();
    if Url::parse(trimmed).is_ok() {
        return trimmed.to_string();
    }

    if !trimmed.contains("://") && !trimmed.contains(char::is_whitespace) {
        let with_scheme = format!("https://{}", trimmed);
        if let Ok(parsed) = Url::parse(&with_scheme)
            && parsed.host_str().is_some_and(|h| h.contains('.') || h == "localhost")
        {
            return with_scheme;
        }
    }

    trimmed.to_string()
}

/// Path portion of a URL for compact progress messages.
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path();
            if path.is_empty() {
                "/".to_string()
            } else {
                path.to_string()
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Expand a leading `~` in an output path.
pub fn resolve_output_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Write a rendered report, creating missing parent directories.
pub fn write_report(content: &str, path: &str) -> anyhow::Result<PathBuf> {
    let path = resolve_output_path(path);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    save_report(content, &path)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    Ok(path)
}

fn config_from_args(args: &ArgMatches) -> AuditConfig {
    let mut config = AuditConfig::default();
    if let Some(max_pages) = args.get_one::<usize>("max-pages") {
        config = config.with_max_pages(*max_pages);
    }
    if let Some(max_depth) = args.get_one::<usize>("max-depth") {
        config = config.with_max_depth(*max_depth);
    }
    if let Some(delay) = args.get_one::<u64>("delay-ms") {
        config = config.with_delay(Duration::from_millis(*delay));
    }
    if let Some(timeout) = args.get_one::<u64>("timeout") {
        config = config.with_timeout(Duration::from_secs(*timeout));
    }
    config
}

fn progress_spinner(quiet: bool) -> anyhow::Result<Option<ProgressBar>> {
    if quiet {
        return Ok(None);
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {prefix:.bold} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Starting audit...");
    Ok(Some(spinner))
}

fn spinner_callback(spinner: ProgressBar) -> CrawlEventCallback {
    Arc::new(move |event: &CrawlEvent| match event {
        CrawlEvent::Fetching { url, depth } => {
            spinner.set_message(format!("depth {} {}", depth, extract_url_path(url)));
        }
        CrawlEvent::Crawled { crawled, .. } => spinner.set_prefix(format!("{} crawled", crawled)),
        CrawlEvent::Failed { url, reason } => {
            spinner.println(format!("  {} {} ({})", "✗".red(), extract_url_path(url), reason));
        }
        CrawlEvent::Done { crawled, failed } => {
            spinner.set_message(format!(
                "Crawl finished: {} crawled, {} failed. Analyzing...",
                crawled, failed
            ));
        }
    })
}

fn print_outcome(report: &AuditReport) {
    match (&report.details, &report.error) {
        (Some(details), _) => println!(
            "{} Audit complete: score {}/100 across {} pages",
            "✓".green().bold(),
            details.overall_score,
            details.pages_analysis.total_pages
        ),
        (None, error) => eprintln!(
            "{} Audit failed: {}",
            "✗".red().bold(),
            error.as_deref().unwrap_or("unknown error")
        ),
    }
}

/// Run the `audit` subcommand. Returns the report's success flag.
pub async fn handle_audit(args: &ArgMatches) -> anyhow::Result<bool> {
    let quiet = args.get_flag("quiet");
    let raw_url = args
        .get_one::<String>("url")
        .context("--url is required")?;
    let url = normalize_target_url(raw_url);
    debug!("Audit target {} (from '{}')", url, raw_url);
    let format: ReportFormat = args
        .get_one::<String>("format")
        .map(|f| f.parse())
        .transpose()?
        .unwrap_or_default();
    let config = config_from_args(args);

    let spinner = progress_spinner(quiet)?;
    let callback = spinner.clone().map(spinner_callback);

    let report = audit_with_progress(&url, &config, callback).await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let rendered = render_report(&report, format)?;
    match args.get_one::<String>("output") {
        Some(path) => {
            let written = write_report(&rendered, path)?;
            if !quiet {
                print_outcome(&report);
                println!("{} Report saved to {}", "✓".green().bold(), written.display());
            }
        }
        None => {
            print!("{}", rendered);
            if !quiet {
                print_outcome(&report);
            }
        }
    }

    Ok(report.success)
}
