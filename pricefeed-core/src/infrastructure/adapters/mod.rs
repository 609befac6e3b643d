pub mod duckdb;
pub mod exchange_rate;
pub mod source_feed;

pub use self::duckdb::DuckDBConnector;
pub use exchange_rate::HttpRateProvider;
pub use source_feed::HttpProductSource;
