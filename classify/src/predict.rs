use std::path::Path;

use anyhow::{Context, ensure};
use tract_core::prelude::*;

use crate::decode::load_image;
use crate::model::Classifier;
use crate::preprocess::{batch, process};
use crate::topk::{self, Prediction};

pub const DEFAULT_TOP_K: usize = 5;

/// Classify the image at `image_path` and keep the `top_k` best classes.
pub fn predict<C: Classifier + ?Sized>(
    image_path: impl AsRef<Path>,
    model: &C,
    top_k: usize,
) -> TractResult<Prediction> {
    ensure!(top_k > 0, "top_k must be a positive integer");
    let image_path = image_path.as_ref();
    let image = load_image(image_path)?;
    let processed =
        process(image.view()).with_context(|| format!("Preprocessing image {image_path:?}"))?;
    let probabilities = model.classify(batch(processed))?;
    debug!("Model returned {} class probabilities", probabilities.len());
    let prediction = topk::top_k(&probabilities, top_k);
    for (rank, (class, probability)) in prediction.iter().enumerate() {
        debug!("#{} class {} p={}", rank + 1, class, probability);
    }
    if prediction.len() < top_k {
        info!("Asked for {} classes, model only knows {}", top_k, probabilities.len());
    }
    Ok(prediction)
}
