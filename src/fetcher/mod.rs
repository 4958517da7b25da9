pub mod client;
pub mod errors;
pub mod pipeline;
pub mod types;

pub use client::{HttpFetcher, PageSource};
pub use errors::FetchError;
pub use types::PageResponse;

#[cfg(test)]
pub use client::MockPageSource;
