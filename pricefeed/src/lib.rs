// pricefeed/src/lib.rs

pub mod api;
pub mod cli;
pub mod commands;
mod output;

pub use api::{AppState, build_router};
