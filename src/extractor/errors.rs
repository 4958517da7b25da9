use thiserror::Error;

/// Failure to turn one anchor into a card. Callers skip the card and carry on
/// with the page.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("invalid selector `{selector}`: {reason}")]
    Selector {
        selector: &'static str,
        reason: String,
    },

    #[error("cannot resolve ad link `{href}`: {source}")]
    InvalidLink {
        href: String,
        #[source]
        source: url::ParseError,
    },

    #[error("no enclosing card container for {ad_url}")]
    MissingContainer { ad_url: String },
}
