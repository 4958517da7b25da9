pub mod category;
pub mod config;
pub mod dataset;
pub mod extractor;
pub mod fetcher;
