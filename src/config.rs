//! Service configuration: command-line flags with environment fallbacks.

use std::path::PathBuf;

use actix_web::http::Uri;
use clap::Parser;

use crate::error::{Error, Result};
use crate::models::{ClassLabels, InputShape};

pub const DEFAULT_LOG_FILTER: &str = "info,tract=warn,tract_core=warn,tract_onnx=warn";

#[derive(Debug, Clone, Parser)]
#[command(name = "potato-classifier", version, about = "Potato leaf disease classifier over HTTP")]
pub struct Config {
    #[arg(long, env = "CLASSIFIER_HOST", default_value = "localhost")]
    pub host: String,

    #[arg(long, env = "CLASSIFIER_PORT", default_value_t = 8001)]
    pub port: u16,

    /// ONNX model loaded once at startup
    #[arg(long = "model", env = "CLASSIFIER_MODEL", default_value = "./models/1.onnx")]
    pub model_path: PathBuf,

    /// Class names in model output order
    #[arg(
        long,
        env = "CLASSIFIER_LABELS",
        value_delimiter = ',',
        default_values = ["Early Blight", "Late Blight", "Healthy"]
    )]
    pub labels: Vec<String>,

    #[arg(long, env = "CLASSIFIER_HEIGHT", default_value_t = 256)]
    pub height: usize,

    #[arg(long, env = "CLASSIFIER_WIDTH", default_value_t = 256)]
    pub width: usize,

    #[arg(long, env = "CLASSIFIER_CHANNELS", default_value_t = 3)]
    pub channels: usize,

    #[arg(
        long = "allowed-origin",
        env = "CLASSIFIER_ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_values = ["http://localhost", "http://localhost:3000"]
    )]
    pub allowed_origins: Vec<String>,

    #[arg(long, env = "CLASSIFIER_MAX_UPLOAD_BYTES", default_value_t = 10 * 1024 * 1024)]
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.height == 0 || self.width == 0 || self.channels == 0 {
            return Err(Error::Config(format!(
                "input shape {} has a zero dimension",
                self.input_shape()
            )));
        }
        if self.max_upload_bytes == 0 {
            return Err(Error::Config("max upload size must be positive".into()));
        }
        self.class_labels()?;
        for origin in &self.allowed_origins {
            validate_origin(origin)?;
        }
        Ok(())
    }

    pub fn input_shape(&self) -> InputShape {
        InputShape::new(self.height, self.width, self.channels)
    }

    pub fn class_labels(&self) -> Result<ClassLabels> {
        ClassLabels::new(self.labels.iter().cloned())
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

/// CORS origins must be concrete `scheme://host[:port]` values; the
/// middleware refuses wildcards once credentials are allowed.
fn validate_origin(origin: &str) -> Result<()> {
    let invalid = |reason: &str| Error::Config(format!("allowed origin `{}` {}", origin, reason));

    if origin.trim().is_empty() {
        return Err(invalid("is empty"));
    }
    if origin.trim() == "*" {
        return Err(invalid("is a wildcard"));
    }
    let uri: Uri = origin.parse().map_err(|_| invalid("is not a valid URI"))?;
    match (uri.scheme_str(), uri.host()) {
        (Some("http" | "https"), Some(host)) if !host.is_empty() => Ok(()),
        _ => Err(invalid("needs an http(s) scheme and a host")),
    }
}
