// pricefeed-core/src/ports/mod.rs

pub mod connector;
pub mod rates;
pub mod source;

pub use connector::Connector;
pub use rates::RateProvider;
pub use source::ProductSource;
