//! Fixtures shared by the unit tests.

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use ndarray::Array4;

use crate::classifier::Classifier;
use crate::error::{Error, Result};

pub fn solid_rgb(width: u32, height: u32, pixel: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(pixel)))
}

pub fn solid_rgba(width: u32, height: u32, pixel: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(pixel)))
}

pub fn solid_gray(width: u32, height: u32, value: u8) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([value])))
}

pub fn encode_png(image: DynamicImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .unwrap();
    bytes
}

/// A 2x2x3 ONNX model: flatten, a matmul that sums each channel scaled by
/// 0.01, then softmax over three classes. The brightest channel wins.
pub fn leaf_2x2_model() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/leaf_2x2.onnx")
}

/// Returns the same scores for every input and counts how often it ran.
pub struct FixedScores {
    scores: Vec<f32>,
    calls: AtomicUsize,
}

impl FixedScores {
    pub fn new(scores: Vec<f32>) -> Self {
        Self {
            scores,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for FixedScores {
    fn output_classes(&self) -> usize {
        self.scores.len()
    }

    fn scores(&self, _batch: &Array4<f32>) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.scores.clone())
    }
}

/// Scores three classes from the first pixel's red channel, so distinct
/// uploads produce distinct predictions.
pub struct RedChannel;

impl Classifier for RedChannel {
    fn output_classes(&self) -> usize {
        3
    }

    fn scores(&self, batch: &Array4<f32>) -> Result<Vec<f32>> {
        let red = batch[[0, 0, 0, 0]] / 255.0;
        Ok(vec![red, 1.0 - red, 0.0])
    }
}

/// Always fails the forward pass.
pub struct Broken;

impl Classifier for Broken {
    fn output_classes(&self) -> usize {
        3
    }

    fn scores(&self, _batch: &Array4<f32>) -> Result<Vec<f32>> {
        Err(Error::Inference("kernel exploded".into()))
    }
}
