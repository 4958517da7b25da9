use tracing::{debug, info, warn};

use crate::dataset::errors::SchemaError;
use crate::dataset::raw::RawTable;
use crate::extractor::{
    Column, ListingRecord, ListingTable, normalize_address, normalize_price, normalize_text,
};

/// Bookkeeping columns the generic crawler adds to every export.
pub const TECHNICAL_COLUMNS: &[&str] = &[
    "pagination",
    "_follow",
    "_followSelectorId",
    "web_scraper_order",
    "web_scraper_start_url",
];

/// Header keywords per canonical field, matched as lowercase substrings.
const SYNONYMS: &[(Column, &[&str])] = &[
    (Column::Price, &["price", "prix"]),
    (Column::Address, &["address", "adresse", "location"]),
    (Column::Title, &["title", "titre"]),
    (Column::ImageLink, &["image"]),
];

/// Canonical field for a raw header, if any. A header that hits keywords of
/// more than one field is rejected rather than guessed.
pub fn match_column(header: &str) -> Result<Option<Column>, SchemaError> {
    let lowered = header.to_lowercase();
    let candidates: Vec<Column> = SYNONYMS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(column, _)| *column)
        .collect();

    match candidates.as_slice() {
        [] => Ok(None),
        [column] => Ok(Some(*column)),
        _ => Err(SchemaError::AmbiguousColumn {
            column: header.to_string(),
            candidates,
        }),
    }
}

/// Source column index for each canonical field found in the headers.
fn plan_columns(headers: &[String]) -> Result<Vec<(Column, usize)>, SchemaError> {
    let mut plan: Vec<(Column, usize)> = Vec::new();

    for (index, header) in headers.iter().enumerate() {
        if TECHNICAL_COLUMNS.contains(&header.as_str()) {
            continue;
        }
        let Some(column) = match_column(header)? else {
            debug!(header = %header, "ignoring unrecognized column");
            continue;
        };
        // First header for a field wins; link selectors export `title` next to `title-href`.
        if let Some(&(_, first)) = plan.iter().find(|(c, _)| *c == column) {
            warn!(
                header = %header,
                kept = %headers[first],
                column = %column,
                "ignoring second column for field"
            );
            continue;
        }
        plan.push((column, index));
    }

    plan.sort();
    Ok(plan)
}

fn apply(record: &mut ListingRecord, column: Column, raw: Option<&str>) {
    match column {
        Column::Price => record.price = normalize_price(raw),
        Column::Address => record.address = normalize_address(raw),
        Column::Title => record.title = normalize_text(raw),
        Column::ImageLink => record.image_link = normalize_text(raw),
        Column::AdUrl => record.ad_url = normalize_text(raw),
    }
}

/// Turn a raw export with an arbitrary header set into a listing table.
///
/// Only canonical columns that can be derived from the headers appear in the
/// result. Rows with nothing left after normalization and exact duplicates
/// are dropped; the first copy of a duplicate is kept.
pub fn clean_raw(raw: &RawTable) -> Result<ListingTable, SchemaError> {
    let plan = plan_columns(raw.headers())?;

    let records = raw
        .rows()
        .iter()
        .map(|row| {
            let mut record = ListingRecord::default();
            for &(column, index) in &plan {
                apply(&mut record, column, row.get(index).and_then(Option::as_deref));
            }
            record
        })
        .collect();

    let mut table = ListingTable::with_records(plan.iter().map(|&(c, _)| c), records);
    let blank = table.retain_non_blank();
    let duplicates = table.dedup_exact();

    info!(
        rows_in = raw.len(),
        rows_out = table.len(),
        blank,
        duplicates,
        columns = ?table.columns(),
        "raw export cleaned"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| {
                    row.iter()
                        .map(|c| (!c.is_empty()).then(|| c.to_string()))
                        .collect()
                })
                .collect(),
        )
    }

    #[test]
    fn headers_map_by_keyword() {
        assert_eq!(match_column("Price").unwrap(), Some(Column::Price));
        assert_eq!(match_column("prix_annonce").unwrap(), Some(Column::Price));
        assert_eq!(match_column("Location").unwrap(), Some(Column::Address));
        assert_eq!(match_column("TITRE").unwrap(), Some(Column::Title));
        assert_eq!(match_column("image-src").unwrap(), Some(Column::ImageLink));
        assert_eq!(match_column("vendeur").unwrap(), None);
    }

    #[test]
    fn canonical_headers_map_to_themselves() {
        for column in [Column::Price, Column::Address, Column::Title, Column::ImageLink] {
            assert_eq!(match_column(column.name()).unwrap(), Some(column));
        }
    }

    #[test]
    fn header_matching_two_fields_is_rejected() {
        assert!(matches!(
            match_column("price_location"),
            Err(SchemaError::AmbiguousColumn { ref candidates, .. })
                if candidates == &[Column::Price, Column::Address]
        ));
    }

    #[test]
    fn first_header_for_a_field_wins() {
        let table = raw(
            &["web_scraper_order", "title", "title-href", "price"],
            &[
                &["1-1", "Chemise en lin", "https://sn.coinafrique.com/annonce/x/1", "5 000 CFA"],
                &["1-2", "Jean slim", "https://sn.coinafrique.com/annonce/x/2", ""],
            ],
        );
        let cleaned = clean_raw(&table).unwrap();

        assert_eq!(cleaned.columns(), &[Column::Price, Column::Title]);
        let titles: Vec<_> = cleaned.records().iter().map(|r| r.title.as_deref()).collect();
        assert_eq!(titles, vec![Some("Chemise en lin"), Some("Jean slim")]);
        assert_eq!(cleaned.records()[0].price, Some(5000));
    }

    #[test]
    fn price_only_export_keeps_only_price() {
        let table = raw(&["Price", "vendeur"], &[&["10 000 CFA", "Awa"], &["2 500 CFA", "Moussa"]]);
        let cleaned = clean_raw(&table).unwrap();
        assert_eq!(cleaned.columns(), &[Column::Price]);
        let prices: Vec<_> = cleaned.records().iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![Some(10000), Some(2500)]);
    }

    #[test]
    fn no_recognizable_columns_is_empty_not_error() {
        let table = raw(&["vendeur", "telephone"], &[&["Awa", "77 000 00 00"]]);
        let cleaned = clean_raw(&table).unwrap();
        assert!(cleaned.columns().is_empty());
        assert!(cleaned.is_empty());
    }

    #[test]
    fn technical_columns_are_ignored() {
        let table = raw(
            &["web_scraper_order", "web_scraper_start_url", "pagination", "title"],
            &[&["1-1", "https://sn.coinafrique.com/categorie/x", "2", "Chemise"]],
        );
        let cleaned = clean_raw(&table).unwrap();
        assert_eq!(cleaned.columns(), &[Column::Title]);
        assert_eq!(cleaned.records()[0].title.as_deref(), Some("Chemise"));
    }

    #[test]
    fn normalizes_drops_blank_and_duplicate_rows() {
        let table = raw(
            &["Title", "Price", "Location", "image-src"],
            &[
                &["Basket  Nike", "25 000 CFA", "location_on Dakar ,Sénégal", "https://img/1.jpg"],
                &["", "Prix sur demande", "  ", ""],
                &["Basket Nike", "25000 CFA", "Dakar, Sénégal", " https://img/1.jpg "],
                &["Sandales", "", "Thiès", ""],
            ],
        );
        let cleaned = clean_raw(&table).unwrap();

        assert_eq!(
            cleaned.columns(),
            &[Column::Price, Column::Address, Column::ImageLink, Column::Title]
        );
        assert_eq!(
            cleaned.records(),
            &[
                ListingRecord {
                    price: Some(25000),
                    address: Some("Dakar, Sénégal".into()),
                    image_link: Some("https://img/1.jpg".into()),
                    ad_url: None,
                    title: Some("Basket Nike".into()),
                },
                ListingRecord {
                    price: None,
                    address: Some("Thiès".into()),
                    image_link: None,
                    ad_url: None,
                    title: Some("Sandales".into()),
                },
            ]
        );
    }
}
