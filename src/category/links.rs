use scraper::ElementRef;
use url::Url;

use crate::config::AD_PATH_PREFIX;
use crate::extractor::ExtractionError;

/// Tag of the element that wraps one ad card on category pages.
const CARD_CONTAINER_TAG: &str = "div";

/// Recognizes links to ad detail pages of the target site.
#[derive(Debug, Clone)]
pub struct AdLinkMatcher {
    base_url: Url,
}

impl AdLinkMatcher {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    /// Absolute ad URL for `href`, or `None` when the link points anywhere
    /// other than an ad detail page on the site. Fragments are dropped so the
    /// same ad always resolves to the same URL.
    pub fn resolve(&self, href: &str) -> Result<Option<Url>, ExtractionError> {
        let href = href.trim();
        let mut url = match self.base_url.join(href) {
            Ok(url) => url,
            Err(source) if href.starts_with(AD_PATH_PREFIX) => {
                return Err(ExtractionError::InvalidLink {
                    href: href.to_string(),
                    source,
                });
            }
            Err(_) => return Ok(None),
        };

        let same_site = url.host_str() == self.base_url.host_str()
            && url.port_or_known_default() == self.base_url.port_or_known_default();
        if !same_site || !url.path().starts_with(AD_PATH_PREFIX) {
            return Ok(None);
        }

        url.set_fragment(None);
        Ok(Some(url))
    }
}

/// The nearest ancestor `div` of an ad link, which holds the whole card.
pub fn enclosing_card(anchor: ElementRef<'_>) -> Option<ElementRef<'_>> {
    anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == CARD_CONTAINER_TAG)
}

/// Category URL for a 1-based page index. An existing `page` parameter is
/// replaced; other query parameters are kept.
pub fn page_url(category_url: &Url, page: u32) -> Url {
    let kept: Vec<(String, String)> = category_url
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = category_url.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("page", &page.to_string());
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn matcher() -> AdLinkMatcher {
        AdLinkMatcher::new(Url::parse("https://sn.coinafrique.com").unwrap())
    }

    #[test]
    fn resolves_relative_ad_links() {
        let url = matcher()
            .resolve("/annonce/chaussures-homme/basket-42#photos")
            .unwrap()
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://sn.coinafrique.com/annonce/chaussures-homme/basket-42"
        );
    }

    #[test]
    fn accepts_absolute_links_on_site() {
        let url = matcher()
            .resolve("https://sn.coinafrique.com/annonce/vetements-homme/chemise-7")
            .unwrap();
        assert!(url.is_some());
    }

    #[test]
    fn ignores_other_links() {
        let m = matcher();
        assert!(m.resolve("/categorie/vetements-homme?page=2").unwrap().is_none());
        assert!(m.resolve("https://ci.coinafrique.com/annonce/x-1").unwrap().is_none());
        assert!(m.resolve("mailto:contact@coinafrique.com").unwrap().is_none());
        assert!(m.resolve("#").unwrap().is_none());
    }

    #[test]
    fn finds_nearest_div() {
        let html = Html::parse_fragment(
            r#"<div id="outer"><div id="card"><p><a href="/annonce/a-1">ad</a></p></div></div>"#,
        );
        let anchor = html
            .select(&Selector::parse("a").unwrap())
            .next()
            .unwrap();
        let card = enclosing_card(anchor).unwrap();
        assert_eq!(card.value().id(), Some("card"));
    }

    #[test]
    fn anchor_without_div_has_no_card() {
        let html = Html::parse_document(r#"<body><a href="/annonce/a-1">ad</a></body>"#);
        let anchor = html
            .select(&Selector::parse("a").unwrap())
            .next()
            .unwrap();
        assert!(enclosing_card(anchor).is_none());
    }

    #[test]
    fn page_url_appends_or_replaces_page() {
        let base = Url::parse("https://sn.coinafrique.com/categorie/vetements-homme").unwrap();
        assert_eq!(
            page_url(&base, 1).as_str(),
            "https://sn.coinafrique.com/categorie/vetements-homme?page=1"
        );

        let filtered =
            Url::parse("https://sn.coinafrique.com/categorie/vetements-homme?sort=recent&page=9")
                .unwrap();
        assert_eq!(
            page_url(&filtered, 3).as_str(),
            "https://sn.coinafrique.com/categorie/vetements-homme?sort=recent&page=3"
        );
    }
}
