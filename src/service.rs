use std::sync::Arc;

use crate::classifier::{top_class, Classifier, TractClassifier};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{ClassLabels, InputShape, Prediction};
use crate::preprocess::{decode_image, ensure_shape, into_batch};

/// Immutable context shared by every worker for the life of the process.
pub struct AppState {
    classifier: Arc<dyn Classifier>,
    labels: ClassLabels,
    input_shape: InputShape,
    max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        labels: ClassLabels,
        input_shape: InputShape,
        max_upload_bytes: usize,
    ) -> Result<Self> {
        labels.ensure_matches(classifier.output_classes())?;
        Ok(Self {
            classifier,
            labels,
            input_shape,
            max_upload_bytes,
        })
    }

    /// Loads the configured model and checks it against the label set.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let input_shape = config.input_shape();
        let classifier = TractClassifier::load(&config.model_path, input_shape)?;
        Self::new(
            Arc::new(classifier),
            config.class_labels()?,
            input_shape,
            config.max_upload_bytes,
        )
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// decode -> validate shape -> batch -> infer -> pick the top class
    pub fn classify(&self, bytes: &[u8]) -> Result<Prediction> {
        let image = decode_image(bytes)?;
        ensure_shape(&image, self.input_shape)?;

        let scores = self.classifier.scores(&into_batch(image))?;
        if scores.len() != self.labels.len() {
            return Err(Error::Inference(format!(
                "model produced {} scores for {} labels",
                scores.len(),
                self.labels.len()
            )));
        }

        let (index, confidence) = top_class(&scores)
            .ok_or_else(|| Error::Inference("model produced no comparable scores".into()))?;
        let class = self
            .labels
            .get(index)
            .ok_or_else(|| Error::Inference(format!("no label for class index {}", index)))?;

        Ok(Prediction {
            class: class.to_string(),
            confidence,
        })
    }
}
