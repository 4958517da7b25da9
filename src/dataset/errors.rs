use std::path::PathBuf;

use thiserror::Error;

use crate::extractor::Column;

/// A raw export that cannot be turned into a listing table. Unlike page and
/// card failures these are reported to the operator.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("cannot read raw export {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed raw export: {0}")]
    Csv(#[from] csv::Error),

    #[error("raw export has no header row")]
    MissingHeader,

    #[error("column `{column}` matches several canonical fields ({})", join_columns(.candidates))]
    AmbiguousColumn {
        column: String,
        candidates: Vec<Column>,
    },
}

fn join_columns(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguity_message_names_the_fields() {
        let err = SchemaError::AmbiguousColumn {
            column: "price_location".into(),
            candidates: vec![Column::Price, Column::Address],
        };
        assert_eq!(
            err.to_string(),
            "column `price_location` matches several canonical fields (prix, adresse)"
        );
    }
}
