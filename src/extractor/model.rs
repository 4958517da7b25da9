use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::io;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One listing in the canonical schema. Every field is either a normalized
/// value or cleanly absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingRecord {
    #[serde(rename = "prix")]
    pub price: Option<u64>,
    #[serde(rename = "adresse")]
    pub address: Option<String>,
    #[serde(rename = "image_lien")]
    pub image_link: Option<String>,
    /// Always set by the live scraper, where it identifies the ad.
    pub ad_url: Option<String>,
    /// Only raw exports carry a title.
    #[serde(rename = "titre")]
    pub title: Option<String>,
}

impl ListingRecord {
    pub fn is_blank(&self) -> bool {
        self.price.is_none()
            && self.address.is_none()
            && self.image_link.is_none()
            && self.ad_url.is_none()
            && self.title.is_none()
    }

    /// Cell text for one column, `None` when absent.
    pub fn cell(&self, column: Column) -> Option<String> {
        match column {
            Column::Price => self.price.map(|p| p.to_string()),
            Column::Address => self.address.clone(),
            Column::ImageLink => self.image_link.clone(),
            Column::AdUrl => self.ad_url.clone(),
            Column::Title => self.title.clone(),
        }
    }

    fn json_cell(&self, column: Column) -> Value {
        match column {
            Column::Price => self.price.map_or(Value::Null, Value::from),
            other => self.cell(other).map_or(Value::Null, Value::String),
        }
    }
}

/// Canonical output columns. Declaration order is the output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    #[serde(rename = "prix")]
    Price,
    #[serde(rename = "adresse")]
    Address,
    #[serde(rename = "image_lien")]
    ImageLink,
    #[serde(rename = "ad_url")]
    AdUrl,
    #[serde(rename = "titre")]
    Title,
}

impl Column {
    /// Columns produced by the live category scraper.
    pub const SCRAPED: [Column; 4] = [
        Column::Price,
        Column::Address,
        Column::ImageLink,
        Column::AdUrl,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Price => "prix",
            Column::Address => "adresse",
            Column::ImageLink => "image_lien",
            Column::AdUrl => "ad_url",
            Column::Title => "titre",
        }
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Records plus the columns that are meaningful for them, in canonical order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingTable {
    columns: Vec<Column>,
    records: Vec<ListingRecord>,
}

impl ListingTable {
    pub fn new(columns: impl IntoIterator<Item = Column>) -> Self {
        Self::with_records(columns, Vec::new())
    }

    pub fn with_records(
        columns: impl IntoIterator<Item = Column>,
        records: Vec<ListingRecord>,
    ) -> Self {
        let mut columns: Vec<Column> = columns.into_iter().collect();
        columns.sort();
        columns.dedup();
        Self { columns, records }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn records(&self) -> &[ListingRecord] {
        &self.records
    }

    pub fn push(&mut self, record: ListingRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop exact duplicate rows, keeping the first. Returns how many went.
    pub fn dedup_exact(&mut self) -> usize {
        let before = self.records.len();
        let mut seen = HashSet::with_capacity(before);
        self.records.retain(|record| seen.insert(record.clone()));
        before - self.records.len()
    }

    /// Drop rows with every field absent. Returns how many went.
    pub fn retain_non_blank(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|record| !record.is_blank());
        before - self.records.len()
    }

    /// CSV with a header row of canonical column names; absent cells are empty.
    /// A table without columns writes nothing.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        if self.columns.is_empty() {
            return Ok(());
        }
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(self.columns.iter().map(|c| c.name()))?;
        for record in &self.records {
            wtr.write_record(
                self.columns
                    .iter()
                    .map(|&c| record.cell(c).unwrap_or_default()),
            )?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// One JSON object per record holding only this table's columns.
    pub fn to_json_rows(&self) -> Vec<Map<String, Value>> {
        self.records
            .iter()
            .map(|record| {
                self.columns
                    .iter()
                    .map(|&c| (c.name().to_string(), record.json_cell(c)))
                    .collect()
            })
            .collect()
    }
}
