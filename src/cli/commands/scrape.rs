//! Scrape command.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::icons::{dim_arrow, error, success, warn};
use crate::config::{Config, Settings};
use crate::models::CrawlSummary;
use crate::output::{drain, JsonLinesSink};
use crate::scrapers::{HttpClient, ScrapeOptions, WodwellScraper};
use crate::utils::format_duration;

/// Records buffered between the crawler and the file writer.
const RECORD_BUFFER: usize = 256;

#[derive(Args, Debug, Default)]
pub struct ScrapeArgs {
    /// Comma-separated feed tags
    #[arg(long, env = "WOD_FEEDS")]
    pub feeds: Option<String>,

    /// Safety cap on page requests in this run
    #[arg(long, env = "WOD_MAX_PAGES")]
    pub max_pages: Option<u32>,

    /// Minimum delay between requests in milliseconds
    #[arg(long, env = "WOD_DELAY_MS")]
    pub delay_ms: Option<u64>,

    /// First page index to request (resume after a failure)
    #[arg(long)]
    pub start_page: Option<u32>,

    /// Directory for the output file
    #[arg(short, long, env = "WOD_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Skip the landing page visit and paginate directly
    #[arg(long)]
    pub no_bootstrap: bool,
}

impl ScrapeArgs {
    /// Overlay command-line values onto settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref feeds) = self.feeds {
            settings.feeds = feeds.clone();
        }
        if let Some(max_pages) = self.max_pages {
            settings.max_pages = max_pages;
        }
        if let Some(delay) = self.delay_ms {
            settings.request_delay_ms = delay;
        }
        if let Some(start_page) = self.start_page {
            settings.start_page = start_page;
        }
        if let Some(ref dir) = self.output_dir {
            settings.output_dir = PathBuf::from(shellexpand::tilde(&dir.to_string_lossy()).as_ref());
        }
        if self.no_bootstrap {
            settings.bootstrap = false;
        }
    }
}

pub async fn cmd_scrape(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    let config_hash = config.hash();
    info!(
        config_hash = &config_hash[..16],
        feeds = %settings.feeds,
        start_page = settings.start_page,
        max_pages = settings.max_pages,
        "Starting scrape"
    );

    let client = HttpClient::new(
        Some(&settings.user_agent),
        Duration::from_secs(settings.request_timeout),
        Duration::from_millis(settings.request_delay_ms),
        settings.max_retries,
    )?;
    let scraper = WodwellScraper::new(client, ScrapeOptions::from_settings(settings));
    let mut sink = JsonLinesSink::create(&settings.output_dir).await?;
    let output_path = sink.path().to_path_buf();

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Scraping from page {}...", settings.start_page));

    let started = Instant::now();
    let (tx, rx) = mpsc::channel(RECORD_BUFFER);

    let writer = async {
        // Owning the receiver here means a write failure closes the channel
        // and the crawler stops at its next send.
        let mut rx = rx;
        drain(&mut rx, &mut sink, |n| {
            pb.set_message(format!("{} records written", n))
        })
        .await
    };
    let (crawl, written) = tokio::join!(scraper.run(tx), writer);
    pb.finish_and_clear();

    let elapsed = format_duration(started.elapsed());
    let written = written?;

    match crawl {
        Ok(summary) => {
            println!("{} Scrape finished in {}", success(), elapsed);
            print_summary(&summary, written, &output_path);
            Ok(())
        }
        Err(failure) => {
            eprintln!(
                "{} Scrape aborted after {}: {}",
                error(),
                elapsed,
                failure.error
            );
            print_summary(&failure.summary, written, &output_path);
            Err(failure.error.into())
        }
    }
}

fn print_summary(summary: &CrawlSummary, written: u64, output: &std::path::Path) {
    println!(
        "  {} Pages fetched: {} (pages {}..{})",
        dim_arrow(),
        summary.pages_fetched,
        summary.start_page,
        summary.last_page
    );
    println!("  {} Records emitted: {}", dim_arrow(), summary.records_emitted);
    println!("  {} Ads filtered: {}", dim_arrow(), summary.ads_filtered);
    if summary.warnings > 0 {
        println!(
            "  {} Warnings: {} (see log for details)",
            warn(),
            style(summary.warnings).yellow()
        );
    } else {
        println!("  {} Warnings: 0", dim_arrow());
    }
    println!(
        "  {} Output: {} ({} records)",
        dim_arrow(),
        output.display(),
        written
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_override_settings() {
        let args = ScrapeArgs {
            feeds: Some("1407".to_string()),
            delay_ms: Some(0),
            start_page: Some(7),
            output_dir: Some(PathBuf::from("/tmp/wods")),
            no_bootstrap: true,
            ..Default::default()
        };
        let mut settings = Settings::default();
        args.apply_to_settings(&mut settings);

        assert_eq!(settings.feeds, "1407");
        assert_eq!(settings.request_delay_ms, 0);
        assert_eq!(settings.start_page, 7);
        assert_eq!(settings.output_dir, PathBuf::from("/tmp/wods"));
        assert!(!settings.bootstrap);
        assert_eq!(settings.max_pages, 500);
    }

    #[test]
    fn test_empty_args_keep_settings() {
        let mut settings = Settings::default();
        ScrapeArgs::default().apply_to_settings(&mut settings);
        assert_eq!(settings, Settings::default());
    }
}
