//! Data models for wodharvest.

mod crawl_state;
pub(crate) mod entry;
mod record;

pub use crawl_state::{CrawlState, CrawlSummary};
pub use entry::{PageDecodeError, PageResult, RawEntry, ScoreTypesField};
pub use record::{Record, ScoreFacets, DATA_SOURCE};
