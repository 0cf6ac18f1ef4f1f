//! Mutable crawl state owned by the pagination controller.

use serde::Serialize;

/// Single-writer state for one run.
///
/// Only the pagination controller mutates this. The page index only grows,
/// the termination flag only goes from false to true, and the counters only
/// increase.
#[derive(Debug, Clone, Default)]
pub struct CrawlState {
    page: u32,
    start_page: u32,
    terminated: bool,
    ads: u64,
    pages_fetched: u32,
    records: u64,
    warnings: u64,
}

impl CrawlState {
    pub fn new(start_page: u32) -> Self {
        Self {
            page: start_page,
            start_page,
            ..Default::default()
        }
    }

    /// Page index of the next request.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Requests issued in this run.
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    pub fn records(&self) -> u64 {
        self.records
    }

    /// Count a dispatched page request.
    pub fn mark_fetched(&mut self) {
        self.pages_fetched += 1;
    }

    /// Move on to the next page. Returns `None`, leaving the index as is,
    /// when the page index cannot grow any further.
    pub fn advance(&mut self) -> Option<u32> {
        self.page = self.page.checked_add(1)?;
        Some(self.page)
    }

    /// Latch the end-of-data signal.
    pub fn terminate(&mut self) {
        self.terminated = true;
    }

    pub fn add_ads(&mut self, n: u64) {
        self.ads += n;
    }

    pub fn add_records(&mut self, n: u64) {
        self.records += n;
    }

    pub fn add_warnings(&mut self, n: u64) {
        self.warnings += n;
    }

    /// Snapshot for the post-run report.
    pub fn summary(&self) -> CrawlSummary {
        CrawlSummary {
            start_page: self.start_page,
            last_page: self.page,
            pages_fetched: self.pages_fetched,
            records_emitted: self.records,
            ads_filtered: self.ads,
            warnings: self.warnings,
            terminated: self.terminated,
        }
    }
}

/// Post-run report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlSummary {
    pub start_page: u32,
    /// Page index reached when the run stopped.
    pub last_page: u32,
    pub pages_fetched: u32,
    pub records_emitted: u64,
    pub ads_filtered: u64,
    pub warnings: u64,
    /// True when upstream reported the end of data.
    pub terminated: bool,
}
