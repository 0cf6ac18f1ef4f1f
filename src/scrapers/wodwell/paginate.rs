//! Pagination controller: fetch, extract, continue or stop.

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::extract::extract_page;
use super::ScrapeOptions;
use crate::models::{CrawlState, CrawlSummary, PageResult, Record};
use crate::scrapers::{RateLimiter, ScrapeError, ScrapeFailure, Transport};

/// Form fields for one page request: the fixed constants in configured
/// order, then the page index and feed filter.
pub fn page_form(options: &ScrapeOptions, page: u32) -> Vec<(String, String)> {
    let mut fields = options.form_fields.clone();
    fields.push(("paged".to_string(), page.to_string()));
    fields.push(("feeds".to_string(), options.feeds.clone()));
    fields
}

/// Drive pages from `options.start_page` until upstream reports the end of
/// data.
///
/// One request is in flight at a time and every dispatch goes through the
/// pacer. Records are sent in arrival order. Transport and decode failures
/// abort with the failing page index; running into the safety cap is also an
/// error. An aborted run still reports what it did before the failure.
pub async fn run<T>(
    transport: &T,
    limiter: &RateLimiter,
    options: &ScrapeOptions,
    referer: Option<&str>,
    records: mpsc::Sender<Record>,
) -> Result<CrawlSummary, ScrapeFailure>
where
    T: Transport + ?Sized,
{
    let mut state = CrawlState::new(options.start_page);

    match crawl(&mut state, transport, limiter, options, referer, &records).await {
        Ok(()) => {
            let summary = state.summary();
            info!(
                "Crawl finished: {} pages, {} records, {} ads filtered",
                summary.pages_fetched, summary.records_emitted, summary.ads_filtered
            );
            Ok(summary)
        }
        Err(error) => Err(ScrapeFailure {
            error,
            summary: state.summary(),
        }),
    }
}

async fn crawl<T>(
    state: &mut CrawlState,
    transport: &T,
    limiter: &RateLimiter,
    options: &ScrapeOptions,
    referer: Option<&str>,
    records: &mpsc::Sender<Record>,
) -> Result<(), ScrapeError>
where
    T: Transport + ?Sized,
{
    while !state.is_terminated() {
        if state.pages_fetched() >= options.max_pages {
            return Err(ScrapeError::SafetyCapExhausted {
                max_pages: options.max_pages,
                records: state.records(),
            });
        }

        let page = state.page();
        let result = fetch_page(transport, limiter, options, referer, page).await?;
        state.mark_fetched();

        if !result.success {
            info!("Page {}: end of data", page);
            state.terminate();
            break;
        }

        let extraction = extract_page(&result);
        info!(
            "Page {}: {} entries, {} records, {} ads",
            page,
            result.entries.len(),
            extraction.records.len(),
            extraction.ads
        );

        state.add_ads(extraction.ads);
        state.add_warnings(extraction.warnings.len() as u64);
        for record in extraction.records {
            records
                .send(record)
                .await
                .map_err(|_| ScrapeError::SinkClosed)?;
            state.add_records(1);
        }

        if state.advance().is_none() {
            return Err(ScrapeError::PageIndexExhausted { page });
        }
    }

    Ok(())
}

async fn fetch_page<T>(
    transport: &T,
    limiter: &RateLimiter,
    options: &ScrapeOptions,
    referer: Option<&str>,
    page: u32,
) -> Result<PageResult, ScrapeError>
where
    T: Transport + ?Sized,
{
    limiter.acquire().await;
    debug!("Sending request for page {}", page);

    let body = transport
        .post_form(&options.endpoint, &page_form(options, page), referer)
        .await
        .map_err(|source| ScrapeError::Transport {
            page,
            endpoint: options.endpoint.clone(),
            source,
        })?;

    PageResult::parse(page, &body).map_err(|source| ScrapeError::Decode {
        page,
        endpoint: options.endpoint.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_form_order() {
        let options = ScrapeOptions {
            form_fields: vec![
                ("nf_ajax_query".to_string(), "True".to_string()),
                ("sort".to_string(), "newest".to_string()),
            ],
            feeds: "1,2".to_string(),
            ..ScrapeOptions::default()
        };
        let form = page_form(&options, 3);
        let names: Vec<&str> = form.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["nf_ajax_query", "sort", "paged", "feeds"]);
        assert_eq!(form[2].1, "3");
        assert_eq!(form[3].1, "1,2");
    }
}
