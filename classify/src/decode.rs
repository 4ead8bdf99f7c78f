use std::path::Path;

use anyhow::Context;
use image::RgbImage;
use image::io::Reader;
use tract_core::prelude::*;
use tract_core::ndarray::Array3;

/// Decode an image file into a (height, width, 3) RGB array.
///
/// The format is sniffed from the file contents, not its extension. Grayscale
/// images are expanded and alpha is dropped.
pub fn load_image(path: impl AsRef<Path>) -> TractResult<Array3<u8>> {
    let path = path.as_ref();
    let decoded = Reader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(image::ImageError::IoError)
        .and_then(|reader| reader.decode())
        .with_context(|| format!("Failed to decode image {path:?}"))?;
    debug!("Decoded {:?}: {}x{} {:?}", path, decoded.width(), decoded.height(), decoded.color());
    array_from_rgb8(decoded.to_rgb8())
}

pub fn array_from_rgb8(image: RgbImage) -> TractResult<Array3<u8>> {
    let (width, height) = image.dimensions();
    Ok(Array3::from_shape_vec((height as usize, width as usize, 3), image.into_raw())?)
}
