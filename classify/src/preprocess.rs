use anyhow::{Context, ensure};
use image::Rgb32FImage;
use image::imageops::{self, FilterType};
use tract_core::ndarray::{Array3, ArrayView3, Axis};
use tract_core::prelude::*;

/// Spatial size of the model input, in pixels.
pub const INPUT_SIZE: u32 = 224;
/// The model consumes RGB images.
pub const CHANNELS: usize = 3;

/// Resize an (height, width, 3) image to the model input size and scale it to [0, 1].
///
/// Scaling happens before the triangle (bilinear) resize, on f32 pixels, so a
/// uniform image stays exactly uniform after resizing.
pub fn process(image: ArrayView3<u8>) -> TractResult<Array3<f32>> {
    let (height, width, channels) = image.dim();
    ensure!(
        channels == CHANNELS,
        "Expected an image with {} channels, got shape {:?}",
        CHANNELS,
        image.shape()
    );
    ensure!(height > 0 && width > 0, "Can not process an empty image (shape {:?})", image.shape());

    let scaled: Vec<f32> = image.iter().map(|&v| v as f32 / 255.0).collect();
    let source = Rgb32FImage::from_raw(width as u32, height as u32, scaled)
        .context("Pixel buffer does not match image dimensions")?;
    let resized = imageops::resize(&source, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);
    trace!("Resized {}x{} to {}x{}", width, height, INPUT_SIZE, INPUT_SIZE);

    let size = INPUT_SIZE as usize;
    let mut processed = Array3::from_shape_vec((size, size, CHANNELS), resized.into_raw())?;
    processed.mapv_inplace(|v| v.clamp(0.0, 1.0));
    Ok(processed)
}

/// Add the leading batch axis: (224, 224, 3) becomes (1, 224, 224, 3).
pub fn batch(processed: Array3<f32>) -> Tensor {
    processed.insert_axis(Axis(0)).into()
}
