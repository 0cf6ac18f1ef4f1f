//! Landing-page discovery of the listing URL and advertised total.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{info, warn};
use url::Url;

use super::ScrapeOptions;
use crate::scrapers::{RateLimiter, ScrapeError, Transport};

/// First navigation link on the landing page ("All WODs, by newest").
pub const LISTING_LINK_SELECTOR: &str = "li > div > a";

/// Headline span holding the advertised workout count.
pub const ADVERTISED_COUNT_SELECTOR: &str =
    "#content > div:nth-of-type(1) > div:nth-of-type(1) > h1 > span:nth-of-type(1)";

/// Feed filter placeholder in the landing-page link.
const ALL_FEEDS: &str = "feeds=all";

fn selector(cell: &'static OnceLock<Selector>, css: &str) -> &'static Selector {
    cell.get_or_init(|| Selector::parse(css).unwrap())
}

fn link_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    selector(&SELECTOR, LISTING_LINK_SELECTOR)
}

fn count_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    selector(&SELECTOR, ADVERTISED_COUNT_SELECTOR)
}

fn digits_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d[\d,.]*").unwrap())
}

/// What the bootstrap step learned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapInfo {
    /// Listing URL with the feed filter applied. Sent as Referer.
    pub listing_url: Option<String>,
    /// Total advertised by the listing headline. Informational only.
    pub advertised_total: Option<u64>,
}

/// Resolve the listing link on the landing page and apply the feed filter.
pub fn find_listing_url(landing_html: &str, base_url: &str, feeds: &str) -> Option<String> {
    let document = Html::parse_document(landing_html);
    let href = document
        .select(link_selector())
        .find_map(|a| a.value().attr("href"))?;

    let resolved = Url::parse(base_url)
        .and_then(|base| base.join(href))
        .map(String::from)
        .ok()?;

    Some(resolved.replace(ALL_FEEDS, &format!("feeds={}", feeds)))
}

/// Read the advertised total from the listing headline.
pub fn parse_advertised_total(listing_html: &str) -> Option<u64> {
    let document = Html::parse_document(listing_html);
    let text: String = document.select(count_selector()).next()?.text().collect();
    let digits: String = digits_regex()
        .find(text.trim())?
        .as_str()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Fetch the landing page and the filtered listing page.
///
/// Fetch failures abort the run. A missing link or count only warns.
pub async fn bootstrap<T>(
    transport: &T,
    limiter: &RateLimiter,
    options: &ScrapeOptions,
) -> Result<BootstrapInfo, ScrapeError>
where
    T: Transport + ?Sized,
{
    info!("Entering landing page at {}", options.start_url);
    limiter.acquire().await;
    let landing = transport
        .get_text(&options.start_url)
        .await
        .map_err(|e| ScrapeError::Bootstrap(format!("{}: {}", options.start_url, e)))?;

    let listing_url = match find_listing_url(&landing, &options.start_url, &options.feeds) {
        Some(url) => url,
        None => {
            warn!(
                selector = LISTING_LINK_SELECTOR,
                "No listing link on landing page; continuing without Referer"
            );
            return Ok(BootstrapInfo::default());
        }
    };
    info!("Listing URL composed at {}", listing_url);

    limiter.acquire().await;
    let listing = transport
        .get_text(&listing_url)
        .await
        .map_err(|e| ScrapeError::Bootstrap(format!("{}: {}", listing_url, e)))?;

    let advertised_total = parse_advertised_total(&listing);
    match advertised_total {
        Some(total) => info!("Upstream advertises {} workouts", total),
        None => warn!(
            selector = ADVERTISED_COUNT_SELECTOR,
            "Advertised total not found on listing page"
        ),
    }

    Ok(BootstrapInfo {
        listing_url: Some(listing_url),
        advertised_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LANDING: &str = r#"<html><body><nav><ul>
        <li><div><a href="/wods/?sort=newest&feeds=all">All WODs</a></div></li>
        <li><div><a href="/other">Other</a></div></li>
    </ul></nav></body></html>"#;

    const LISTING: &str = r#"<html><body><div id="content">
        <div><div><h1><span> 4,213 </span> <span>WODs</span></h1></div></div>
    </div></body></html>"#;

    #[test]
    fn test_listing_url_resolved_and_filtered() {
        let url = find_listing_url(LANDING, "https://wodwell.com", "1407,736,1611").unwrap();
        assert_eq!(url, "https://wodwell.com/wods/?sort=newest&feeds=1407,736,1611");
    }

    #[test]
    fn test_listing_url_absolute_href() {
        let html = r#"<li><div><a href="https://cdn.example.com/x?feeds=all">x</a></div></li>"#;
        let url = find_listing_url(html, "https://wodwell.com", "1").unwrap();
        assert_eq!(url, "https://cdn.example.com/x?feeds=1");
    }

    #[test]
    fn test_listing_url_missing() {
        assert!(find_listing_url("<p>nothing</p>", "https://wodwell.com", "1").is_none());
    }

    #[test]
    fn test_advertised_total() {
        assert_eq!(parse_advertised_total(LISTING), Some(4213));
        assert_eq!(parse_advertised_total("<div id=\"content\"></div>"), None);
    }
}
