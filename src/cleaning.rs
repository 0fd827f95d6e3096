use serde::{Deserialize, Serialize};
use tracing::info;

use crate::price::parse_price;
use crate::settings::{Settings, DEFAULT_CURRENCY_TOKEN, DEFAULT_PRICE_CEILING};
use crate::table::{ListingTable, RawListing};

/// A listing that survived cleaning: numeric price below the ceiling and
/// every field non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedListing {
    #[serde(rename = "titre")]
    pub title: String,
    #[serde(rename = "prix")]
    pub price: f64,
    #[serde(rename = "adresse")]
    pub location: String,
    #[serde(rename = "image")]
    pub image_url: String,
}

impl NormalizedListing {
    /// Raw row that normalizes back to `self`.
    pub fn to_raw(&self) -> RawListing {
        RawListing {
            title: self.title.clone(),
            price_text: self.price.to_string(),
            location: self.location.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    UnparsablePrice,
    OverCeiling,
    MissingField,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub input_rows: usize,
    pub kept: usize,
    pub dropped_unparsable_price: usize,
    pub dropped_over_ceiling: usize,
    pub dropped_missing_field: usize,
}

impl CleaningReport {
    pub fn dropped(&self) -> usize {
        self.dropped_unparsable_price + self.dropped_over_ceiling + self.dropped_missing_field
    }

    fn record(&mut self, reason: DropReason) {
        match reason {
            DropReason::UnparsablePrice => self.dropped_unparsable_price += 1,
            DropReason::OverCeiling => self.dropped_over_ceiling += 1,
            DropReason::MissingField => self.dropped_missing_field += 1,
        }
    }
}

/// Clean one row. Price problems are checked before empty fields, so a row
/// with both is reported as a price drop.
pub fn normalize_row(
    row: &RawListing,
    price_ceiling: f64,
    currency_token: &str,
) -> Result<NormalizedListing, DropReason> {
    let price = parse_price(&row.price_text, currency_token).ok_or(DropReason::UnparsablePrice)?;
    if price >= price_ceiling {
        return Err(DropReason::OverCeiling);
    }

    let title = row.title.trim();
    let location = row.location.trim();
    let image_url = row.image_url.trim();
    if title.is_empty() || location.is_empty() || image_url.is_empty() {
        return Err(DropReason::MissingField);
    }

    Ok(NormalizedListing {
        title: title.to_string(),
        price,
        location: location.to_string(),
        image_url: image_url.to_string(),
    })
}

/// Normalized view of `table`. Surviving rows keep their relative order;
/// `table` is left untouched.
///
/// Prices are read with `DEFAULT_CURRENCY_TOKEN`; use
/// [`normalize_with_settings`] when the token is configured.
pub fn normalize(table: &ListingTable, price_ceiling: f64) -> Vec<NormalizedListing> {
    normalize_with_report(table, price_ceiling, DEFAULT_CURRENCY_TOKEN).0
}

pub fn normalize_default(table: &ListingTable) -> Vec<NormalizedListing> {
    normalize(table, DEFAULT_PRICE_CEILING)
}

/// Ceiling and currency token both taken from `settings`.
pub fn normalize_with_settings(
    table: &ListingTable,
    settings: &Settings,
) -> (Vec<NormalizedListing>, CleaningReport) {
    normalize_with_report(table, settings.price_ceiling, &settings.currency_token)
}

pub fn normalize_with_report(
    table: &ListingTable,
    price_ceiling: f64,
    currency_token: &str,
) -> (Vec<NormalizedListing>, CleaningReport) {
    let mut report = CleaningReport {
        input_rows: table.len(),
        ..CleaningReport::default()
    };
    let rows: Vec<NormalizedListing> = table
        .iter()
        .filter_map(|row| match normalize_row(row, price_ceiling, currency_token) {
            Ok(clean) => Some(clean),
            Err(reason) => {
                report.record(reason);
                None
            }
        })
        .collect();
    report.kept = rows.len();

    info!(
        input = report.input_rows,
        kept = report.kept,
        dropped = report.dropped(),
        "normalized table"
    );
    (rows, report)
}
