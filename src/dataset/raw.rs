use std::fs::File;
use std::io;
use std::path::Path;

use serde_json::{Map, Value};

use crate::dataset::errors::SchemaError;

/// Cell values the crawler and spreadsheet tooling write for "no value".
const NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn cell(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!NULL_MARKERS.contains(&trimmed)).then(|| value.to_string())
}

/// A raw export as loaded: header names plus rows of optional cells, every
/// row exactly as wide as the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Rows shorter than the header are padded with absent cells and longer
    /// ones are cut.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(io::BufReader::new(file))
    }

    /// Reads UTF-8 CSV with a header row.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, SchemaError> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
                h.trim().to_string()
            })
            .collect();
        if headers.iter().all(String::is_empty) {
            return Err(SchemaError::MissingHeader);
        }

        let mut rows = Vec::new();
        for record in rdr.records() {
            rows.push(record?.iter().map(cell).collect());
        }

        Ok(Self::new(headers, rows))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the table back out as loaded, absent cells empty.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(|c| c.as_deref().unwrap_or_default()))?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// One JSON object per row keyed by header; absent cells are `null`.
    pub fn to_json_rows(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .zip(row)
                    .map(|(h, c)| (h.clone(), c.clone().map_or(Value::Null, Value::String)))
                    .collect()
            })
            .collect()
    }
}
