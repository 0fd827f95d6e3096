use std::collections::HashMap;

use itertools::Itertools;
use serde::Serialize;

use crate::cleaning::NormalizedListing;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationStats {
    pub location: String,
    pub count: usize,
    pub mean_price: f64,
}

/// Snapshot summary of a normalized table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateView {
    pub count: usize,
    /// `None` for an empty table.
    pub mean_price: Option<f64>,
    pub distinct_locations: usize,
    /// Most listed locations first; ties broken by name.
    pub by_location: Vec<LocationStats>,
}

/// Upper bound on histogram bins; larger requests are clamped.
pub const MAX_HISTOGRAM_BINS: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Locations are grouped by exact string match: "Dakar" and "dakar " are
/// two different groups.
pub fn summarize(rows: &[NormalizedListing]) -> AggregateView {
    let count = rows.len();
    let mean_price = mean(rows.iter().map(|r| r.price));

    let mut groups: HashMap<&str, (usize, f64)> = HashMap::new();
    for row in rows {
        let entry = groups.entry(row.location.as_str()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += row.price;
    }

    let by_location: Vec<LocationStats> = groups
        .into_iter()
        .map(|(location, (n, total))| LocationStats {
            location: location.to_string(),
            count: n,
            mean_price: total / n as f64,
        })
        .sorted_by(|a, b| b.count.cmp(&a.count).then_with(|| a.location.cmp(&b.location)))
        .collect();

    AggregateView {
        count,
        mean_price,
        distinct_locations: by_location.len(),
        by_location,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (n, total) = values.fold((0usize, 0.0), |(n, total), v| (n + 1, total + v));
    (n > 0).then(|| total / n as f64)
}

/// Equal-width price distribution over `[min, max]`. The top edge is
/// inclusive so the most expensive listing lands in the last bin.
pub fn price_histogram(rows: &[NormalizedListing], bins: usize) -> Vec<HistogramBin> {
    let bins = bins.min(MAX_HISTOGRAM_BINS);
    if rows.is_empty() || bins == 0 {
        return Vec::new();
    }
    let (min, max) = match rows.iter().map(|r| r.price).minmax_by(f64::total_cmp) {
        itertools::MinMaxResult::OneElement(p) => (p, p),
        itertools::MinMaxResult::MinMax(lo, hi) => (lo, hi),
        itertools::MinMaxResult::NoElements => return Vec::new(),
    };
    if min == max {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: rows.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for row in rows {
        let idx = (((row.price - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count,
        })
        .collect()
}

/// `12345.6` -> `"12,346 FCFA"`.
pub fn format_fcfa(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let grouped = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .join(",");
    let sign = if rounded < 0 { "-" } else { "" };
    format!("{}{} FCFA", sign, grouped)
}

pub fn render_markdown(view: &AggregateView, histogram: &[HistogramBin], top: usize) -> String {
    let mut out = String::new();
    out.push_str("## Analyse des prix\n");
    let mean = view
        .mean_price
        .map(format_fcfa)
        .unwrap_or_else(|| "n/a".to_string());
    out.push_str(&format!(
        "- Prix moyen: {}\n- Nombre d'annonces: {}\n- Localisations distinctes: {}\n",
        mean, view.count, view.distinct_locations
    ));

    if !view.by_location.is_empty() {
        out.push_str(&format!("\n### Top {} localisations\n", top.min(view.by_location.len())));
        for loc in view.by_location.iter().take(top) {
            out.push_str(&format!(
                "- {}: {} annonces, prix moyen {}\n",
                loc.location,
                loc.count,
                format_fcfa(loc.mean_price)
            ));
        }
    }

    if !histogram.is_empty() {
        out.push_str("\n### Distribution des prix\n");
        for bin in histogram {
            out.push_str(&format!(
                "- {} - {}: {}\n",
                format_fcfa(bin.lower),
                format_fcfa(bin.upper),
                bin.count
            ));
        }
    }

    out
}
