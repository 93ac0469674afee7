//! Turns uploaded bytes into the batch tensor the model consumes.
//!
//! Pixels are passed through as raw `0..=255` values in the image's own
//! channel layout. Nothing is resized or normalized, so uploads must already
//! have the dimensions the model was trained on.

use image::GenericImageView;
use ndarray::{Array3, Array4, Axis};

use crate::error::{Error, Result};
use crate::models::InputShape;

/// Decodes an uploaded image into a `height x width x channels` array.
pub fn decode_image(bytes: &[u8]) -> Result<Array3<f32>> {
    let img = image::load_from_memory(bytes).map_err(|e| Error::Decode(e.to_string()))?;
    let (width, height) = img.dimensions();

    let (channels, raw) = match img.color().channel_count() {
        1 => (1, img.into_luma8().into_raw()),
        2 => (2, img.into_luma_alpha8().into_raw()),
        4 => (4, img.into_rgba8().into_raw()),
        _ => (3, img.into_rgb8().into_raw()),
    };

    let pixels = raw.into_iter().map(f32::from).collect();
    Array3::from_shape_vec((height as usize, width as usize, channels), pixels)
        .map_err(|e| Error::Decode(e.to_string()))
}

/// Rejects images whose shape differs from what the model was built for.
pub fn ensure_shape(image: &Array3<f32>, expected: InputShape) -> Result<()> {
    let (height, width, channels) = image.dim();
    let actual = InputShape::new(height, width, channels);
    if actual != expected {
        return Err(Error::ShapeMismatch { expected, actual });
    }
    Ok(())
}

/// Adds the leading batch axis: `(H, W, C)` becomes `(1, H, W, C)`.
pub fn into_batch(image: Array3<f32>) -> Array4<f32> {
    image.insert_axis(Axis(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{encode_png, solid_gray, solid_rgb, solid_rgba};

    #[test]
    fn decodes_rgb_in_native_layout() {
        let bytes = encode_png(solid_rgb(4, 2, [10, 20, 30]));
        let image = decode_image(&bytes).unwrap();

        assert_eq!(image.dim(), (2, 4, 3));
        assert_eq!(image[[1, 3, 0]], 10.0);
        assert_eq!(image[[1, 3, 1]], 20.0);
        assert_eq!(image[[1, 3, 2]], 30.0);
    }

    #[test]
    fn keeps_alpha_and_grayscale_channel_counts() {
        let rgba = decode_image(&encode_png(solid_rgba(3, 3, [1, 2, 3, 4]))).unwrap();
        assert_eq!(rgba.dim(), (3, 3, 4));
        assert_eq!(rgba[[0, 0, 3]], 4.0);

        let gray = decode_image(&encode_png(solid_gray(5, 6, 200))).unwrap();
        assert_eq!(gray.dim(), (6, 5, 1));
        assert_eq!(gray[[5, 4, 0]], 200.0);
    }

    #[test]
    fn non_image_bytes_are_a_decode_error() {
        let err = decode_image(b"definitely not a png").unwrap_err();
        assert!(matches!(err, Error::Decode(_)), "got {:?}", err);
    }

    #[test]
    fn shape_check_reports_both_shapes() {
        let image = Array3::<f32>::zeros((8, 6, 4));
        assert!(ensure_shape(&image, InputShape::new(8, 6, 4)).is_ok());

        match ensure_shape(&image, InputShape::new(8, 6, 3)) {
            Err(Error::ShapeMismatch { expected, actual }) => {
                assert_eq!(expected, InputShape::new(8, 6, 3));
                assert_eq!(actual, InputShape::new(8, 6, 4));
            }
            other => panic!("expected shape mismatch, got {:?}", other),
        }
    }

    #[test]
    fn batch_has_single_leading_entry() {
        let mut image = Array3::<f32>::zeros((2, 3, 3));
        image[[1, 2, 0]] = 7.0;

        let batch = into_batch(image);
        assert_eq!(batch.shape(), &[1, 2, 3, 3]);
        assert_eq!(batch[[0, 1, 2, 0]], 7.0);
    }
}
