use std::path::Path;

use ndarray::Array4;
use tract_onnx::prelude::*;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::InputShape;

/// A loaded model: a batch tensor in, one score per class out.
pub trait Classifier: Send + Sync {
    /// Number of scores the model produces for one image.
    fn output_classes(&self) -> usize;

    /// Runs the forward pass and returns the scores of the first batch entry.
    fn scores(&self, batch: &Array4<f32>) -> Result<Vec<f32>>;
}

/// ONNX model executed by tract, optimized once for a fixed input shape.
pub struct TractClassifier {
    plan: TypedRunnableModel<TypedModel>,
    input_shape: InputShape,
    output_classes: usize,
}

impl TractClassifier {
    pub fn load(path: impl AsRef<Path>, input_shape: InputShape) -> Result<Self> {
        let path = path.as_ref();
        let load_err = |e: TractError| Error::ModelLoad(format!("{}: {:#}", path.display(), e));

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(load_err)?
            .with_input_fact(0, f32::fact(input_shape.batched()).into())
            .map_err(load_err)?
            .into_optimized()
            .map_err(load_err)?
            .into_runnable()
            .map_err(load_err)?;

        let output_fact = plan.model().output_fact(0).map_err(load_err)?;
        let output_classes = output_fact
            .shape
            .as_concrete()
            .and_then(|dims| dims.last().copied())
            .ok_or_else(|| {
                Error::ModelLoad(format!(
                    "{}: output shape {:?} has no concrete class dimension",
                    path.display(),
                    output_fact.shape
                ))
            })?;

        info!(
            model = %path.display(),
            input = %input_shape,
            output_classes,
            "model loaded"
        );

        Ok(Self {
            plan,
            input_shape,
            output_classes,
        })
    }
}

impl Classifier for TractClassifier {
    fn output_classes(&self) -> usize {
        self.output_classes
    }

    fn scores(&self, batch: &Array4<f32>) -> Result<Vec<f32>> {
        let infer_err = |e: TractError| Error::Inference(format!("{:#}", e));

        let batch = batch.as_standard_layout();
        let data = batch
            .as_slice()
            .ok_or_else(|| Error::Inference("batch tensor is not contiguous".into()))?;
        let tensor = Tensor::from_shape(&self.input_shape.batched(), data).map_err(infer_err)?;

        let outputs = self.plan.run(tvec!(tensor.into())).map_err(infer_err)?;
        let output = outputs
            .first()
            .ok_or_else(|| Error::Inference("model produced no outputs".into()))?;
        let view = output.to_array_view::<f32>().map_err(infer_err)?;

        let scores = if view.ndim() > 1 {
            view.index_axis(tract_ndarray::Axis(0), 0).iter().copied().collect()
        } else {
            view.iter().copied().collect()
        };
        Ok(scores)
    }
}

/// Index and value of the highest score. The first maximum wins ties and
/// NaN scores are never selected.
pub fn top_class(scores: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((index, score)),
        }
    }
    best
}
