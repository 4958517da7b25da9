pub mod card;
pub mod errors;
pub mod model;
pub mod normalize;

#[cfg(test)]
mod tests;

pub use card::CardExtractor;
pub use errors::ExtractionError;
pub use model::{Column, ListingRecord, ListingTable};
pub use normalize::{normalize_address, normalize_price, normalize_text};
