//! Wodwell listing scraper.
//!
//! A run optionally bootstraps from the landing page (to pick up the listing
//! URL used as Referer and the advertised total), then pages through the
//! AJAX endpoint until it answers `success: false`.

pub mod bootstrap;
pub mod extract;
pub mod filter;
pub mod paginate;
pub mod score_types;

pub use bootstrap::BootstrapInfo;
pub use extract::{extract_entry, extract_page, ExtractionWarning, PageExtraction};
pub use filter::{ad_kind, AdFilter, AdKind};
pub use score_types::{classify, Classification};

use std::time::Duration;

use tokio::sync::mpsc;

use super::{RateLimiter, ScrapeFailure, Transport};
use crate::config::Settings;
use crate::models::{CrawlState, CrawlSummary, Record};

/// Parameters of one scrape run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeOptions {
    pub start_url: String,
    pub endpoint: String,
    /// Comma-separated feed tag filter.
    pub feeds: String,
    /// Fixed form constants, sent in this order before `paged` and `feeds`.
    pub form_fields: Vec<(String, String)>,
    /// Minimum interval between dispatched requests.
    pub request_delay: Duration,
    /// Maximum page requests in one run.
    pub max_pages: u32,
    pub start_page: u32,
    /// Whether to visit the landing page before paginating.
    pub bootstrap: bool,
}

impl ScrapeOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            start_url: settings.start_url.clone(),
            endpoint: settings.endpoint.clone(),
            feeds: settings.feeds.clone(),
            form_fields: settings.form_fields.clone(),
            request_delay: Duration::from_millis(settings.request_delay_ms),
            max_pages: settings.max_pages,
            start_page: settings.start_page,
            bootstrap: settings.bootstrap,
        }
    }
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Scraper over any [`Transport`].
pub struct WodwellScraper<T> {
    transport: T,
    options: ScrapeOptions,
    limiter: RateLimiter,
}

impl<T: Transport> WodwellScraper<T> {
    pub fn new(transport: T, options: ScrapeOptions) -> Self {
        let limiter = RateLimiter::new(options.request_delay);
        Self {
            transport,
            options,
            limiter,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Requests dispatched so far, bootstrap included.
    pub async fn total_requests(&self) -> u64 {
        self.limiter.total_requests().await
    }

    /// Run bootstrap (when enabled) and pagination, sending records to `records`.
    ///
    /// The sender is dropped when this returns, which closes the channel.
    pub async fn run(&self, records: mpsc::Sender<Record>) -> Result<CrawlSummary, ScrapeFailure> {
        let info = if self.options.bootstrap {
            bootstrap::bootstrap(&self.transport, &self.limiter, &self.options)
                .await
                .map_err(|error| ScrapeFailure {
                    error,
                    summary: CrawlState::new(self.options.start_page).summary(),
                })?
        } else {
            BootstrapInfo::default()
        };

        paginate::run(
            &self.transport,
            &self.limiter,
            &self.options,
            info.listing_url.as_deref(),
            records,
        )
        .await
    }
}
