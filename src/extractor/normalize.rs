//! Field normalizers shared by the live scraper and the raw export cleaner.
//!
//! Each one maps raw text to either a clean value or `None`. Feeding a
//! normalizer its own output gives back the same output.

use std::sync::LazyLock;

use regex::Regex;

/// Lowercased fragment of "Prix sur demande".
pub const PRICE_ON_REQUEST_MARKER: &str = "demande";

/// Material icon name that leaks into the text of location elements.
pub const LOCATION_ICON_TOKEN: &str = "location_on";

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static COMMA_SPACING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*,\s*").unwrap());

/// Collapse whitespace runs to one space and trim. Blank input is `None`,
/// never an empty string.
pub fn normalize_text(raw: Option<&str>) -> Option<String> {
    let collapsed = WHITESPACE_RUN.replace_all(raw?, " ");
    let trimmed = collapsed.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Whole currency units from localized price text: `"10 000 CFA"` is `10000`.
///
/// Every non-digit is dropped, so decimal marks and currency labels never end
/// up in the number. Prices on request, text without digits and digit runs
/// too long for `u64` are all `None`.
pub fn normalize_price(raw: Option<&str>) -> Option<u64> {
    let text = raw?.trim();
    if text.is_empty() || text.to_lowercase().contains(PRICE_ON_REQUEST_MARKER) {
        return None;
    }
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Strip the location icon token and canonicalize separators to `", "`.
pub fn normalize_address(raw: Option<&str>) -> Option<String> {
    let mut text = normalize_text(raw)?;
    // Removing one token can splice a new one together.
    while text.contains(LOCATION_ICON_TOKEN) {
        text = text.replace(LOCATION_ICON_TOKEN, "");
    }
    let text = normalize_text(Some(&text))?;
    let text = COMMA_SPACING.replace_all(&text, ", ");
    normalize_text(Some(&text))
}
