// pricefeed-core/src/lib.rs

#![allow(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports: Connector, RateProvider, ProductSource
pub mod ports;

// 2. Domain: records, transform rules, snapshot manifest. Depends on nothing else.
pub mod domain;

// 3. Infrastructure: DuckDB, HTTP clients, snapshot stores, config files
pub mod infrastructure;

// 4. Application: Fetcher, Transformer, Loader, queries
pub mod application;

pub mod error;

pub use error::PricefeedError;
