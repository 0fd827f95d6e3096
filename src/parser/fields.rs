use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// The four sub-elements every listing card must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Price,
    Location,
    Image,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Title => "title",
            Field::Price => "price",
            Field::Location => "location",
            Field::Image => "image",
        };
        f.write_str(name)
    }
}

/// Why a card was left out of the page's listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Missing(Field),
    UnparsablePrice(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Missing(field) => write!(f, "missing {}", field),
            SkipReason::UnparsablePrice(text) => write!(f, "unparsable price {:?}", text),
        }
    }
}

/// Whitespace-collapsed text of the first match under `card`, or `None`
/// when there is no match or the text is blank.
pub fn text_of(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let node = card.select(selector).next()?;
    let text = collapse_ws(&node.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

/// Trimmed attribute value of the first match under `card`.
pub fn attr_of(card: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    let value = card.select(selector).next()?.value().attr(attr)?.trim();
    (!value.is_empty()).then(|| value.to_string())
}

pub fn collapse_ws(s: &str) -> String {
    WS_RE.replace_all(s.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn collapses_inner_whitespace() {
        assert_eq!(collapse_ws("  Chemise \n\t  lin  "), "Chemise lin");
    }

    #[test]
    fn blank_text_counts_as_missing() {
        let doc = Html::parse_fragment(r#"<div><p class="t">   </p><img class="i" src=" "></div>"#);
        let card = doc.root_element();
        let t = Selector::parse("p.t").unwrap();
        let i = Selector::parse("img.i").unwrap();
        assert_eq!(text_of(card, &t), None);
        assert_eq!(attr_of(card, &i, "src"), None);
    }

    #[test]
    fn skip_reason_messages() {
        assert_eq!(SkipReason::Missing(Field::Location).to_string(), "missing location");
        assert_eq!(
            SkipReason::UnparsablePrice("abc".into()).to_string(),
            "unparsable price \"abc\""
        );
    }
}
