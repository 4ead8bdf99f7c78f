//! Top-K image classification on top of tract.
//!
//! The pipeline is a straight line: decode an image, [`preprocess::process`] it
//! to the fixed 224x224 RGB input, run it through a [`model::Classifier`], and
//! rank the output with [`topk::top_k`]. [`predict::predict`] ties the steps
//! together.
#[macro_use]
extern crate log;

pub mod decode;
pub mod format;
pub mod labels;
pub mod model;
pub mod predict;
pub mod preprocess;
pub mod topk;

pub use labels::LabelMap;
pub use model::{Classifier, ModelFormat, TractClassifier};
pub use predict::{DEFAULT_TOP_K, predict};
pub use topk::Prediction;
