//! HTTP service that classifies potato leaf images with a pre-trained model.

pub mod classifier;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod preprocess;
pub mod service;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{Error, Result};
pub use service::AppState;
