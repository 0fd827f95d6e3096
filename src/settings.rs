use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::ScrapeError;

pub const DEFAULT_PRICE_CEILING: f64 = 1_000_000.0;
pub const MAX_PAGE_COUNT: u32 = 10;
pub const DEFAULT_SITE_URL: &str = "https://sn.coinafrique.com";
pub const DEFAULT_CURRENCY_TOKEN: &str = "CFA";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

const CONFIG_FILE: &str = "coinafrique";
const ENV_PREFIX: &str = "COINAFRIQUE";

/// Constants consumed by the pipeline. Layered as: built-in defaults,
/// then an optional `coinafrique.{toml,json,yaml}` file, then `COINAFRIQUE_*`
/// environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub site_url: String,
    pub user_agent: String,
    pub currency_token: String,
    pub price_ceiling: f64,
    pub max_pages: u32,
    pub card_selector: String,
    pub title_selector: String,
    pub price_selector: String,
    pub location_selector: String,
    pub image_selector: String,
    pub image_attr: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            site_url: DEFAULT_SITE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            currency_token: DEFAULT_CURRENCY_TOKEN.to_string(),
            price_ceiling: DEFAULT_PRICE_CEILING,
            max_pages: MAX_PAGE_COUNT,
            card_selector: "div.col.s6.m4.l3".to_string(),
            title_selector: "p.ad__card-description".to_string(),
            price_selector: "p.ad__card-price".to_string(),
            location_selector: "p.ad__card-location span".to_string(),
            image_selector: "img.ad__card-img".to_string(),
            image_attr: "src".to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ScrapeError> {
        Self::load_from(CONFIG_FILE)
    }

    /// `file` is a path with or without extension; a missing file is not an error.
    pub fn load_from(file: &str) -> Result<Self, ScrapeError> {
        let settings = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name(file).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Upper bound for a run's page count. Configuration may lower it, never
    /// raise it past `MAX_PAGE_COUNT`.
    pub fn page_limit(&self) -> u32 {
        self.max_pages.clamp(1, MAX_PAGE_COUNT)
    }
}
