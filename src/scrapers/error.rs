//! Scraper error types.

use thiserror::Error;

use crate::models::{CrawlSummary, PageDecodeError};

/// Failure inside the transport collaborator.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Whether a retry might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::Other(_) => false,
        }
    }
}

/// Errors that abort a run.
///
/// Everything else (unknown labels, odd entry shapes, ads) is recovered
/// locally and only counted.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Transport failure on page {page} ({endpoint}): {source}; resume with --start-page {page}")]
    Transport {
        page: u32,
        endpoint: String,
        #[source]
        source: TransportError,
    },

    #[error("Undecodable response for page {page} ({endpoint}): {source}; resume with --start-page {page}")]
    Decode {
        page: u32,
        endpoint: String,
        #[source]
        source: PageDecodeError,
    },

    #[error("Safety cap of {max_pages} pages reached without an end-of-data signal ({records} records emitted)")]
    SafetyCapExhausted { max_pages: u32, records: u64 },

    #[error("Page index overflow after page {page}")]
    PageIndexExhausted { page: u32 },

    #[error("Bootstrap failed: {0}")]
    Bootstrap(String),

    #[error("Record receiver closed before the run finished")]
    SinkClosed,
}

/// An aborted run: the error plus what the run achieved before it.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ScrapeFailure {
    pub error: ScrapeError,
    pub summary: CrawlSummary,
}
