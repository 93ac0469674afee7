use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

pub const PING_MESSAGE: &str = "Hello, I am alive!";

pub const DEFAULT_CLASS_LABELS: [&str; 3] = ["Early Blight", "Late Blight", "Healthy"];

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub class: String,
    pub confidence: f32,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// Height, width and channel count of a single image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputShape {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl InputShape {
    pub fn new(height: usize, width: usize, channels: usize) -> Self {
        Self {
            height,
            width,
            channels,
        }
    }

    /// The model input shape with a leading batch axis of one.
    pub fn batched(&self) -> [usize; 4] {
        [1, self.height, self.width, self.channels]
    }
}

impl fmt::Display for InputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.height, self.width, self.channels)
    }
}

/// Ordered class names; position `i` names model output `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLabels(Vec<String>);

impl ClassLabels {
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels
            .into_iter()
            .map(|label| label.into().trim().to_string())
            .collect();

        if labels.is_empty() {
            return Err(Error::Config("at least one class label is required".into()));
        }
        if labels.iter().any(|label| label.is_empty()) {
            return Err(Error::Config("class labels must not be blank".into()));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = labels.iter().find(|label| !seen.insert(label.as_str())) {
            return Err(Error::Config(format!("duplicate class label `{}`", dup)));
        }

        Ok(Self(labels))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Fails when the model's output cardinality disagrees with the label count.
    pub fn ensure_matches(&self, outputs: usize) -> Result<()> {
        if self.len() != outputs {
            return Err(Error::LabelMismatch {
                labels: self.len(),
                outputs,
            });
        }
        Ok(())
    }
}

impl Default for ClassLabels {
    fn default() -> Self {
        Self(DEFAULT_CLASS_LABELS.iter().map(|s| s.to_string()).collect())
    }
}
