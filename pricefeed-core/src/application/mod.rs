// pricefeed-core/src/application/mod.rs

pub mod fetch;
pub mod load;
pub mod pipeline;
pub mod query;
pub mod transform;

pub use fetch::Fetcher;
pub use load::Loader;
pub use pipeline::{PipelineReport, run_pipeline};
pub use query::{search_products, top_products, validate_price_range};
pub use transform::{TransformReport, Transformer, resolve_rate};
