pub mod cli;
pub mod dataset;
pub mod error;
pub mod inference;
pub mod models;
pub mod processors;
pub mod query;
pub mod readers;
pub mod settings;
pub mod utils;
pub mod writers;

pub use error::{ForecastError, Result};
