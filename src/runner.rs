use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::{page_url, Category};
use crate::error::ScrapeError;
use crate::fetcher::PageSource;
use crate::parser::Extractor;
use crate::settings::Settings;
use crate::table::ListingTable;

/// Emitted after each page, fetched or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub page: u32,
    pub page_count: u32,
}

impl Progress {
    pub fn fraction(&self) -> f64 {
        self.page as f64 / self.page_count as f64
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageFailure {
    pub page: u32,
    pub url: String,
    pub error: String,
}

/// Counters describing how a scrape went.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub category: Category,
    pub page_count: u32,
    pub pages_attempted: u32,
    pub pages_failed: u32,
    pub pages_empty: u32,
    pub listings_extracted: usize,
    pub blocks_skipped: usize,
    pub failures: Vec<PageFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    fn start(category: Category, page_count: u32) -> Self {
        let now = Utc::now();
        RunReport {
            category,
            page_count,
            pages_attempted: 0,
            pages_failed: 0,
            pages_empty: 0,
            listings_extracted: 0,
            blocks_skipped: 0,
            failures: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }
}

pub fn validate_page_count(page_count: u32, limit: u32) -> Result<(), ScrapeError> {
    if page_count == 0 || page_count > limit {
        return Err(ScrapeError::InvalidPageCount {
            got: page_count,
            max: limit,
        });
    }
    Ok(())
}

/// Scrape pages `1..=page_count` of `category`, one after the other.
///
/// Only invalid input fails the call, and it does so before any request is
/// sent. A page that cannot be fetched, or yields no listings, is counted in
/// the report and the run moves on.
pub fn run<S, F>(
    source: &S,
    extractor: &Extractor,
    category: Category,
    page_count: u32,
    settings: &Settings,
    mut on_progress: F,
) -> Result<(ListingTable, RunReport), ScrapeError>
where
    S: PageSource + ?Sized,
    F: FnMut(Progress),
{
    validate_page_count(page_count, settings.page_limit())?;

    let base_url = category.base_url(&settings.site_url);
    let mut table = ListingTable::new();
    let mut report = RunReport::start(category, page_count);
    info!(%category, page_count, %base_url, "starting scrape");

    for page in 1..=page_count {
        report.pages_attempted += 1;

        match source.fetch(&base_url, page) {
            Ok(html) => {
                let extracted = extractor.extract_page(&html);
                report.blocks_skipped += extracted.skipped.len();
                if extracted.listings.is_empty() {
                    report.pages_empty += 1;
                    warn!(page, blocks = extracted.blocks_found, "page yielded no listings");
                } else {
                    info!(page, listings = extracted.listings.len(), "page scraped");
                }
                report.listings_extracted += extracted.listings.len();
                table.extend(extracted.listings);
            }
            Err(e) => {
                warn!(page, error = %e, "page fetch failed");
                report.pages_failed += 1;
                report.failures.push(PageFailure {
                    page,
                    url: page_url(&base_url, page),
                    error: e.to_string(),
                });
            }
        }

        on_progress(Progress { page, page_count });
    }

    report.finished_at = Utc::now();
    info!(
        pages = report.pages_attempted,
        failed = report.pages_failed,
        listings = report.listings_extracted,
        "scrape finished"
    );
    Ok((table, report))
}
