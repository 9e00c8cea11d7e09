pub mod aggregator;
pub mod api;
pub mod config;
pub mod data_models;
pub mod dedup;
pub mod diagnostics;
pub mod document;
pub mod errors;
pub mod extractor;
pub mod fetcher;
pub mod filter;
pub mod query;
pub mod retry;
pub mod shutdown;
pub mod sites;
pub mod urls;
