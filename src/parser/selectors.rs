use scraper::Selector;

use crate::error::ScrapeError;
use crate::settings::Settings;

/// Compiled CSS selectors for one listing card and its four fields.
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    pub card: Selector,
    pub title: Selector,
    pub price: Selector,
    pub location: Selector,
    pub image: Selector,
    pub image_attr: String,
}

impl ListingSelectors {
    pub fn from_settings(settings: &Settings) -> Result<Self, ScrapeError> {
        Ok(ListingSelectors {
            card: compile(&settings.card_selector)?,
            title: compile(&settings.title_selector)?,
            price: compile(&settings.price_selector)?,
            location: compile(&settings.location_selector)?,
            image: compile(&settings.image_selector)?,
            image_attr: settings.image_attr.clone(),
        })
    }
}

fn compile(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selectors_compile() {
        assert!(ListingSelectors::from_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn bad_selector_is_reported() {
        let settings = Settings {
            price_selector: "p..[".to_string(),
            ..Settings::default()
        };
        let err = ListingSelectors::from_settings(&settings).unwrap_err();
        assert!(matches!(err, ScrapeError::Selector { ref selector, .. } if selector == "p..["));
    }
}
