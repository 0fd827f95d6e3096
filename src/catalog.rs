use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScrapeError;

/// Site categories the scraper knows how to walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    VetementsHomme,
    ChaussuresHomme,
    VetementsEnfants,
    ChaussuresEnfants,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::VetementsHomme,
        Category::ChaussuresHomme,
        Category::VetementsEnfants,
        Category::ChaussuresEnfants,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Category::VetementsHomme => "vetements-homme",
            Category::ChaussuresHomme => "chaussures-homme",
            Category::VetementsEnfants => "vetements-enfants",
            Category::ChaussuresEnfants => "chaussures-enfants",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::VetementsHomme => "Vêtements homme",
            Category::ChaussuresHomme => "Chaussures homme",
            Category::VetementsEnfants => "Vêtements enfants",
            Category::ChaussuresEnfants => "Chaussures enfants",
        }
    }

    /// Listing URL for this category, e.g. `https://sn.coinafrique.com/categorie/vetements-homme`.
    pub fn base_url(self, site_url: &str) -> String {
        format!("{}/categorie/{}", site_url.trim_end_matches('/'), self.slug())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.slug() == key || c.label().to_lowercase() == key)
            .ok_or_else(|| ScrapeError::UnknownCategory {
                name: s.to_string(),
                expected: Category::ALL.map(Category::slug).join(", "),
            })
    }
}

/// 1-indexed page URL: `{base}?page={n}`.
pub fn page_url(base_url: &str, page: u32) -> String {
    let sep = if base_url.contains('?') { '&' } else { '?' };
    format!("{}{}page={}", base_url, sep, page)
}
