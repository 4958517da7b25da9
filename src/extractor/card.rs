//! Field lookup for a single listing card.
//!
//! Each field has its own ordered table of CSS selectors; the first one that
//! yields visible text wins. Site layout changes should only ever touch these
//! tables.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::extractor::errors::ExtractionError;
use crate::extractor::model::ListingRecord;
use crate::extractor::normalize::{
    LOCATION_ICON_TOKEN, normalize_address, normalize_price, normalize_text,
};

const PRICE_STRATEGIES: &[&str] = &["h3", ".price", "[class*=price]"];

const ADDRESS_STRATEGIES: &[&str] = &[
    ".location",
    ".address",
    "[class*=location]",
    "[class*=address]",
];

const IMAGE_SELECTOR: &str = "img";

/// Lazy-load attribute first, the plain source second.
const IMAGE_SOURCE_ATTRS: &[&str] = &["data-src", "src"];

pub(crate) fn compile_selector(selector: &'static str) -> Result<Selector, ExtractionError> {
    Selector::parse(selector).map_err(|e| ExtractionError::Selector {
        selector,
        reason: e.to_string(),
    })
}

fn compile_all(selectors: &[&'static str]) -> Result<Vec<Selector>, ExtractionError> {
    selectors.iter().copied().map(compile_selector).collect()
}

/// Text nodes of an element, trimmed and joined by single spaces.
pub(crate) fn visible_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Turns one card into a [`ListingRecord`]. Each field is looked up on its
/// own, so a card missing its price still yields its address and image.
#[derive(Debug, Clone)]
pub struct CardExtractor {
    base_url: Url,
    price: Vec<Selector>,
    address: Vec<Selector>,
    image: Selector,
}

impl CardExtractor {
    pub fn new(base_url: Url) -> Result<Self, ExtractionError> {
        Ok(Self {
            base_url,
            price: compile_all(PRICE_STRATEGIES)?,
            address: compile_all(ADDRESS_STRATEGIES)?,
            image: compile_selector(IMAGE_SELECTOR)?,
        })
    }

    pub fn extract(&self, card: ElementRef<'_>, ad_url: &Url) -> ListingRecord {
        ListingRecord {
            price: normalize_price(self.raw_price(card).as_deref()),
            address: normalize_address(self.raw_address(card).as_deref()),
            image_link: normalize_text(self.raw_image(card).as_deref()),
            ad_url: normalize_text(Some(ad_url.as_str())),
            title: None,
        }
    }

    /// Same as [`extract`](Self::extract) for a card held as markup text.
    pub fn extract_fragment(&self, fragment: &str, ad_url: &Url) -> ListingRecord {
        let html = Html::parse_fragment(fragment);
        self.extract(html.root_element(), ad_url)
    }

    fn raw_price(&self, card: ElementRef<'_>) -> Option<String> {
        first_text(card, &self.price)
    }

    fn raw_address(&self, card: ElementRef<'_>) -> Option<String> {
        first_text(card, &self.address).or_else(|| {
            let text = visible_text(card);
            text.contains(LOCATION_ICON_TOKEN).then_some(text)
        })
    }

    fn raw_image(&self, card: ElementRef<'_>) -> Option<String> {
        let img = card.select(&self.image).next()?;
        let source = IMAGE_SOURCE_ATTRS
            .iter()
            .filter_map(|attr| img.value().attr(attr))
            .map(str::trim)
            .find(|value| !value.is_empty())?;
        self.base_url.join(source).ok().map(String::from)
    }
}

fn first_text(card: ElementRef<'_>, strategies: &[Selector]) -> Option<String> {
    strategies.iter().find_map(|selector| {
        card.select(selector)
            .map(visible_text)
            .find(|text| !text.is_empty())
    })
}
