//! Scraper for the wodwell workout listing.

mod error;
mod http_client;
mod rate_limiter;
pub mod wodwell;

pub use error::{ScrapeError, ScrapeFailure, TransportError};
pub use http_client::{resolve_user_agent, HttpClient, USER_AGENT};
pub use rate_limiter::RateLimiter;
pub use wodwell::{ScrapeOptions, WodwellScraper};

use async_trait::async_trait;

/// Network collaborator used by the scraper.
///
/// Implemented by [`HttpClient`] for real runs and by scripted fakes in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch a page as text.
    async fn get_text(&self, url: &str) -> Result<String, TransportError>;

    /// POST a url-encoded form, sending fields in the given order.
    async fn post_form(
        &self,
        url: &str,
        fields: &[(String, String)],
        referer: Option<&str>,
    ) -> Result<String, TransportError>;
}
