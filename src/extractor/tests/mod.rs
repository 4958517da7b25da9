use std::fs;

use url::Url;

use crate::extractor::{CardExtractor, ListingRecord};

fn extractor() -> CardExtractor {
    CardExtractor::new(Url::parse("https://sn.coinafrique.com").unwrap()).unwrap()
}

fn extract_fixture(name: &str, ad_url: &str) -> ListingRecord {
    let html = fs::read_to_string(format!("src/extractor/tests/fixtures/{name}"))
        .expect("Failed to read test fixture");
    extractor().extract_fragment(&html, &Url::parse(ad_url).unwrap())
}

#[test]
fn test_extract_full_card() {
    let record = extract_fixture(
        "card.html",
        "https://sn.coinafrique.com/annonce/chaussures-homme/basket-nike-air-max-4512345",
    );

    assert_eq!(record.price, Some(25000));
    assert_eq!(record.address.as_deref(), Some("Sicap Liberté, Dakar"));
    assert_eq!(
        record.image_link.as_deref(),
        Some("https://sn.coinafrique.com/uploads/ads/4512345_1.jpg")
    );
    assert_eq!(
        record.ad_url.as_deref(),
        Some("https://sn.coinafrique.com/annonce/chaussures-homme/basket-nike-air-max-4512345")
    );
    assert_eq!(record.title, None);
}

#[test]
fn test_extract_price_on_request_card() {
    let record = extract_fixture(
        "card_on_request.html",
        "https://sn.coinafrique.com/annonce/vetements-homme/costume-3-pieces-4400001",
    );

    assert_eq!(record.price, None);
    // No location element: the whole card text is the address candidate.
    assert_eq!(
        record.address.as_deref(),
        Some("Prix sur demande Thiès, Sénégal")
    );
    assert_eq!(
        record.image_link.as_deref(),
        Some("https://images.coinafrique.com/4400001_1.jpg")
    );
}

#[test]
fn test_extract_bare_card() {
    let record = extract_fixture(
        "card_bare.html",
        "https://sn.coinafrique.com/annonce/vetements-enfants/ensemble-4400002",
    );

    assert_eq!(record.price, None);
    assert_eq!(record.address, None);
    assert_eq!(record.image_link, None);
    assert!(record.ad_url.is_some());
}

#[test]
fn test_malformed_markup() {
    let record = extractor().extract_fragment(
        r#"<div class="card"><h3>3 000 CFA<p class="location">Pikine<img data-src="/x.jpg""#,
        &Url::parse("https://sn.coinafrique.com/annonce/a-1").unwrap(),
    );

    assert_eq!(record.price, Some(3000));
    assert!(record.ad_url.is_some());
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use crate::extractor::{normalize_address, normalize_price, normalize_text};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extract_never_panics(html in ".*") {
            let ad_url = Url::parse("https://sn.coinafrique.com/annonce/a-1").unwrap();
            let record = extractor().extract_fragment(&html, &ad_url);
            prop_assert_eq!(record.ad_url.as_deref(), Some(ad_url.as_str()));
        }

        #[test]
        fn test_text_idempotent(raw in ".*") {
            let once = normalize_text(Some(&raw));
            prop_assert_eq!(normalize_text(once.as_deref()), once);
        }

        #[test]
        fn test_address_idempotent(raw in "[a-zA-Zé_ ,\t\n]*(location_on)?[a-z ,]*") {
            let once = normalize_address(Some(&raw));
            prop_assert_eq!(normalize_address(once.as_deref()), once);
        }

        #[test]
        fn test_price_idempotent(raw in ".*") {
            let once = normalize_price(Some(&raw));
            let again = once.and_then(|p| normalize_price(Some(&p.to_string())));
            prop_assert_eq!(again, once);
        }
    }
}
