// pricefeed-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Invalid record at position {position}: {reason}")]
    #[diagnostic(
        code(pricefeed::domain::invalid_record),
        help("The source feed returned a record the transform cannot derive from.")
    )]
    InvalidRecord { position: usize, reason: String },

    #[error("Product {product_id} has an invalid price: {price}")]
    #[diagnostic(
        code(pricefeed::domain::invalid_price),
        help("Prices must be finite and non-negative.")
    )]
    InvalidPrice { product_id: i64, price: f64 },

    #[error("Duplicate product_id {0} in snapshot")]
    #[diagnostic(code(pricefeed::domain::duplicate_id))]
    DuplicateProductId(i64),

    #[error("Invalid exchange rate: {0}")]
    #[diagnostic(code(pricefeed::domain::rate), help("Rates must be finite and > 0."))]
    InvalidRate(f64),

    #[error("Invalid price range: min={min}, max={max}")]
    #[diagnostic(
        code(pricefeed::domain::price_range),
        help("Bounds must be non-negative and min must not exceed max.")
    )]
    InvalidPriceRange { min: f64, max: f64 },
}
