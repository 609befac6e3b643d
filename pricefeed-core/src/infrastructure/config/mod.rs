pub mod pipeline;

pub use crate::domain::config::PipelineConfig;
pub use pipeline::load_pipeline_config;
