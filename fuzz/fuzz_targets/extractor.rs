#![no_main]

use std::sync::LazyLock;

use libfuzzer_sys::fuzz_target;
use url::Url;

use vitrine::extractor::{CardExtractor, normalize_address, normalize_price, normalize_text};

static BASE: LazyLock<Url> = LazyLock::new(|| Url::parse("https://sn.coinafrique.com").unwrap());

static EXTRACTOR: LazyLock<CardExtractor> =
    LazyLock::new(|| CardExtractor::new(BASE.clone()).unwrap());

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    // Normalizers must be total and idempotent on arbitrary text
    let address = normalize_address(Some(&text));
    assert_eq!(normalize_address(address.as_deref()), address);
    let cleaned = normalize_text(Some(&text));
    assert_eq!(normalize_text(cleaned.as_deref()), cleaned);
    let _ = normalize_price(Some(&text));

    // The card extractor should never panic regardless of markup
    let ad_url = BASE.join("/annonce/fuzz-1").unwrap();
    let _ = EXTRACTOR.extract_fragment(&text, &ad_url);
});
