//! Cleaning of raw exports produced by an external generic crawler.
//!
//! Exports come with whatever columns the crawler was configured with. The
//! cleaner maps them onto the canonical schema by header keywords and runs
//! the same normalizers the live scraper uses. `summary` reduces a cleaned
//! table to the headline figures of a category.

pub mod cleaner;
pub mod errors;
pub mod raw;
pub mod summary;

pub use cleaner::{TECHNICAL_COLUMNS, clean_raw, match_column};
pub use errors::SchemaError;
pub use raw::RawTable;
pub use summary::{PRICE_BANDS, PriceBand, Summary, summarize};

use tracing::instrument;

use crate::config::{Category, Config};
use crate::extractor::ListingTable;

/// Load the raw export configured for a category.
#[instrument(skip(config))]
pub fn load_category(config: &Config, category: Category) -> Result<RawTable, SchemaError> {
    RawTable::from_path(config.raw_file(category))
}

/// Load and clean the raw export configured for a category.
pub fn clean_category(config: &Config, category: Category) -> Result<ListingTable, SchemaError> {
    clean_raw(&load_category(config, category)?)
}

/// Load, clean and summarize the raw export configured for a category.
pub fn summarize_category(config: &Config, category: Category) -> Result<Summary, SchemaError> {
    Ok(summarize(&clean_category(config, category)?))
}
