pub mod fields;
pub mod selectors;

use scraper::{ElementRef, Html};
use tracing::debug;

use crate::error::ScrapeError;
use crate::price::parse_price;
use crate::settings::Settings;
use crate::table::RawListing;
use fields::{attr_of, text_of, Field, SkipReason};
use selectors::ListingSelectors;

/// Result for one listing card: a record, or the reason it was skipped.
pub type BlockOutcome = Result<RawListing, SkipReason>;

/// What one page yielded.
#[derive(Debug, Default)]
pub struct PageExtraction {
    pub blocks_found: usize,
    pub listings: Vec<RawListing>,
    pub skipped: Vec<SkipReason>,
}

/// Turns a category page into listings. Cards are handled independently:
/// a malformed card is skipped, the rest of the page is kept.
#[derive(Debug, Clone)]
pub struct Extractor {
    selectors: ListingSelectors,
    currency_token: String,
}

impl Extractor {
    pub fn new(selectors: ListingSelectors, currency_token: impl Into<String>) -> Self {
        Extractor {
            selectors,
            currency_token: currency_token.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ScrapeError> {
        Ok(Self::new(
            ListingSelectors::from_settings(settings)?,
            settings.currency_token.clone(),
        ))
    }

    /// One outcome per card, in document order.
    pub fn extract_blocks(&self, html: &str) -> Vec<BlockOutcome> {
        let document = Html::parse_document(html);
        document
            .select(&self.selectors.card)
            .map(|card| self.extract_card(card))
            .collect()
    }

    pub fn extract(&self, html: &str) -> Vec<RawListing> {
        self.extract_blocks(html)
            .into_iter()
            .filter_map(Result::ok)
            .collect()
    }

    pub fn extract_page(&self, html: &str) -> PageExtraction {
        let mut page = PageExtraction::default();
        for outcome in self.extract_blocks(html) {
            page.blocks_found += 1;
            match outcome {
                Ok(listing) => page.listings.push(listing),
                Err(reason) => {
                    debug!(block = page.blocks_found, %reason, "skipping listing block");
                    page.skipped.push(reason);
                }
            }
        }
        page
    }

    fn extract_card(&self, card: ElementRef<'_>) -> BlockOutcome {
        let s = &self.selectors;
        let title = text_of(card, &s.title);
        let price_text = text_of(card, &s.price);
        let location = text_of(card, &s.location);
        let image_url = attr_of(card, &s.image, &s.image_attr);

        let title = title.ok_or(SkipReason::Missing(Field::Title))?;
        let price_text = price_text.ok_or(SkipReason::Missing(Field::Price))?;
        let location = location.ok_or(SkipReason::Missing(Field::Location))?;
        let image_url = image_url.ok_or(SkipReason::Missing(Field::Image))?;

        if parse_price(&price_text, &self.currency_token).is_none() {
            return Err(SkipReason::UnparsablePrice(price_text));
        }

        Ok(RawListing {
            title,
            price_text,
            location,
            image_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> Extractor {
        Extractor::from_settings(&Settings::default()).unwrap()
    }

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    fn card(inner: &str) -> String {
        format!(r#"<div class="col s6 m4 l3"><div class="card ad__card">{}</div></div>"#, inner)
    }

    #[test]
    fn malformed_blocks_are_isolated() {
        let html = fixture("vetements_homme_page");
        let outcomes = extractor().extract_blocks(&html);
        assert_eq!(outcomes.len(), 10);

        let listings = extractor().extract(&html);
        assert_eq!(listings.len(), 7);
        let missing_price = outcomes
            .iter()
            .filter(|o| matches!(o, Err(SkipReason::Missing(Field::Price))))
            .count();
        assert_eq!(missing_price, 3);
    }

    #[test]
    fn fields_are_read_from_card() {
        let listings = extractor().extract(&fixture("vetements_homme_page"));
        let first = &listings[0];
        assert_eq!(first.title, "Chemise en lin blanche");
        assert_eq!(first.price_text, "15 000 CFA");
        assert_eq!(first.location, "Dakar, Sénégal");
        assert_eq!(
            first.image_url,
            "https://images.coinafrique.com/4210551_uploaded_image1_1698412345.jpg"
        );
    }

    #[test]
    fn document_order_is_kept() {
        let listings = extractor().extract(&fixture("vetements_homme_page"));
        let titles: Vec<&str> = listings.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Chemise en lin blanche",
                "Costume 3 pièces bleu nuit",
                "Jean slim noir",
                "Boubou brodé bazin",
                "Polo Lacoste original",
                "Veste en cuir",
                "Lot de 5 t-shirts",
            ]
        );
    }

    #[test]
    fn each_skip_reason_is_inspectable() {
        let html = [
            card(r#"<p class="ad__card-price">1 000 CFA</p><p class="ad__card-location"><span>Thiès</span></p><img class="ad__card-img" src="a.jpg">"#),
            card(r#"<p class="ad__card-description">Sac</p><p class="ad__card-price">1 000 CFA</p><img class="ad__card-img" src="b.jpg">"#),
            card(r#"<p class="ad__card-description">Sac</p><p class="ad__card-price">1 000 CFA</p><p class="ad__card-location"><span>Thiès</span></p>"#),
            card(r#"<p class="ad__card-description">Sac</p><p class="ad__card-price">Prix sur demande</p><p class="ad__card-location"><span>Thiès</span></p><img class="ad__card-img" src="d.jpg">"#),
        ]
        .concat();

        let outcomes = extractor().extract_blocks(&html);
        assert_eq!(
            outcomes,
            vec![
                Err(SkipReason::Missing(Field::Title)),
                Err(SkipReason::Missing(Field::Location)),
                Err(SkipReason::Missing(Field::Image)),
                Err(SkipReason::UnparsablePrice("Prix sur demande".into())),
            ]
        );
    }

    #[test]
    fn dot_grouped_price_is_skipped() {
        let html = card(r#"<p class="ad__card-description">Sac</p><p class="ad__card-price">15.000 CFA</p><p class="ad__card-location"><span>Thiès</span></p><img class="ad__card-img" src="a.jpg">"#);
        assert_eq!(
            extractor().extract_blocks(&html),
            vec![Err(SkipReason::UnparsablePrice("15.000 CFA".into()))]
        );
    }

    #[test]
    fn page_without_cards_yields_nothing() {
        let page = extractor().extract_page("<html><body><p>Aucune annonce</p></body></html>");
        assert_eq!(page.blocks_found, 0);
        assert!(page.listings.is_empty());
    }

    #[test]
    fn page_summary_counts_skips() {
        let page = extractor().extract_page(&fixture("vetements_homme_page"));
        assert_eq!(page.blocks_found, 10);
        assert_eq!(page.listings.len(), 7);
        assert_eq!(page.skipped.len(), 3);
    }
}
