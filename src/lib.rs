//! CoinAfrique listings scraper.
//!
//! Pipeline, one direction only:
//!   fetcher -> parser -> runner (raw table) -> cleaning -> stats

pub mod catalog;
pub mod cleaning;
pub mod error;
pub mod fetcher;
pub mod parser;
pub mod price;
pub mod runner;
pub mod settings;
pub mod stats;
pub mod table;

pub use catalog::Category;
pub use cleaning::{
    normalize, normalize_with_report, normalize_with_settings, CleaningReport, NormalizedListing,
};
pub use error::{FetchError, ScrapeError};
pub use fetcher::{HttpFetcher, PageSource};
pub use parser::Extractor;
pub use runner::{run, Progress, RunReport};
pub use settings::Settings;
pub use stats::{summarize, AggregateView};
pub use table::{ListingTable, RawListing};
