use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, bail, ensure};
use tract_hir::prelude::*;
#[cfg(feature = "onnx")]
use tract_onnx_opl::WithOnnx;

use crate::preprocess::{CHANNELS, INPUT_SIZE};

/// Anything that maps a (1, 224, 224, 3) batch to a probability per class.
pub trait Classifier {
    fn classify(&self, batch: Tensor) -> TractResult<Vec<f32>>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelFormat {
    Onnx,
    Tensorflow,
    Nnef,
    Tflite,
}

impl ModelFormat {
    /// Guess the format from the path, the way `tract` the command line does.
    ///
    /// Returns the file to actually load: a directory holding a `model.onnx`
    /// resolves to that file.
    pub fn discover(path: &Path) -> TractResult<(PathBuf, ModelFormat)> {
        if !path.exists() {
            bail!("model not found: {:?}", path)
        }
        if path.is_dir() {
            if path.join("graph.nnef").exists() {
                return Ok((path.to_path_buf(), ModelFormat::Nnef));
            }
            if path.join("model.onnx").exists() {
                return Ok((path.join("model.onnx"), ModelFormat::Onnx));
            }
            return Ok((path.to_path_buf(), ModelFormat::Nnef));
        }
        let name = path.to_string_lossy();
        let format = match path.extension().and_then(|s| s.to_str()) {
            Some("onnx") => ModelFormat::Onnx,
            Some("tflite") => ModelFormat::Tflite,
            Some("tar") | Some("tgz") | Some("nnef") => ModelFormat::Nnef,
            _ if name.ends_with(".tar.gz") => ModelFormat::Nnef,
            _ => ModelFormat::Tensorflow,
        };
        Ok((path.to_path_buf(), format))
    }
}

impl FromStr for ModelFormat {
    type Err = TractError;
    fn from_str(s: &str) -> TractResult<ModelFormat> {
        match s {
            "onnx" => Ok(ModelFormat::Onnx),
            "tf" | "tensorflow" => Ok(ModelFormat::Tensorflow),
            "nnef" => Ok(ModelFormat::Nnef),
            "tflite" => Ok(ModelFormat::Tflite),
            _ => bail!("Unknown model format {:?} (expected onnx, tf, nnef or tflite)", s),
        }
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ModelFormat::Onnx => "onnx",
            ModelFormat::Tensorflow => "tf",
            ModelFormat::Nnef => "nnef",
            ModelFormat::Tflite => "tflite",
        };
        f.write_str(name)
    }
}

/// A classifier backed by an optimized tract plan.
pub struct TractClassifier {
    plan: TypedRunnableModel<TypedModel>,
}

impl fmt::Debug for TractClassifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let model = self.plan.model();
        write!(f, "TractClassifier({} nodes, input {:?})", model.nodes.len(), model.input_fact(0).ok())
    }
}

impl TractClassifier {
    /// Load, type, optimize and plan the model at `path`.
    ///
    /// `format` overrides the discovery done by [`ModelFormat::discover`].
    pub fn load(path: impl AsRef<Path>, format: Option<ModelFormat>) -> TractResult<Self> {
        let (filename, discovered) = ModelFormat::discover(path.as_ref())?;
        let format = format.unwrap_or(discovered);
        info!("Loading {:?} as {}", filename, format);
        let model = load_typed(&filename, format)
            .with_context(|| format!("Failed to load {format} model {filename:?}"))?;
        info!("Model loaded");
        Self::from_typed(model)
    }

    pub fn from_typed(model: TypedModel) -> TractResult<Self> {
        ensure!(model.inputs.len() == 1, "Expected a single input, model has {}", model.inputs.len());
        debug!("Input fact: {:?}", model.input_fact(0)?);
        let plan = model.into_optimized()?.into_runnable()?;
        info!("Model ready");
        Ok(TractClassifier { plan })
    }
}

impl Classifier for TractClassifier {
    fn classify(&self, batch: Tensor) -> TractResult<Vec<f32>> {
        let outputs = self.plan.run(tvec!(batch.into()))?;
        let output = outputs.first().context("Model produced no output")?;
        trace!("Raw output: {:?}", output);
        let output = output.cast_to::<f32>()?;
        let probabilities = output.as_slice::<f32>()?.to_vec();
        ensure!(!probabilities.is_empty(), "Model produced an empty output");
        Ok(probabilities)
    }
}

#[cfg(any(feature = "onnx", feature = "tf"))]
fn input_fact() -> InferenceFact {
    f32::fact([1, INPUT_SIZE as usize, INPUT_SIZE as usize, CHANNELS]).into()
}

fn nnef() -> tract_nnef::internal::Nnef {
    let nnef = tract_nnef::nnef().with_tract_core();
    #[cfg(feature = "onnx")]
    let nnef = nnef.with_onnx();
    nnef
}

fn load_typed(filename: &Path, format: ModelFormat) -> TractResult<TypedModel> {
    match format {
        #[cfg(feature = "onnx")]
        ModelFormat::Onnx => tract_onnx::onnx()
            .model_for_path(filename)?
            .with_input_fact(0, input_fact())?
            .into_typed(),
        #[cfg(feature = "tf")]
        ModelFormat::Tensorflow => tract_tensorflow::tensorflow()
            .model_for_path(filename)?
            .with_input_fact(0, input_fact())?
            .into_typed(),
        ModelFormat::Nnef => nnef().model_for_path(filename),
        #[cfg(feature = "tflite")]
        ModelFormat::Tflite => tract_tflite::tflite().model_for_path(filename),
        #[allow(unreachable_patterns)]
        other => bail!(
            "Format {} not supported. You may need to recompile with the right features.",
            other
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use tract_core::ndarray::Array4;
    use tract_core::ops::nn::{Reduce, Reducer};

    /// Per-channel maximum over the whole image: a three-class "model".
    fn channel_max() -> TractResult<TypedModel> {
        let mut model = TypedModel::default();
        let input = model.add_source("input", f32::fact([1, 224, 224, 3]))?;
        let max = model.wire_node("max", Reduce::new(tvec!(1, 2), Reducer::Max), &[input])?;
        model.set_output_outlets(&max)?;
        Ok(model)
    }

    fn uniform_batch(rgb: [f32; 3]) -> Tensor {
        Array4::from_shape_fn((1, 224, 224, 3), |(_, _, _, c)| rgb[c]).into()
    }

    #[test]
    fn format_from_str() -> TractResult<()> {
        assert_eq!("onnx".parse::<ModelFormat>()?, ModelFormat::Onnx);
        assert_eq!("tf".parse::<ModelFormat>()?, ModelFormat::Tensorflow);
        assert_eq!("nnef".parse::<ModelFormat>()?, ModelFormat::Nnef);
        assert_eq!("tflite".parse::<ModelFormat>()?, ModelFormat::Tflite);
        assert!("h5".parse::<ModelFormat>().is_err());
        for format in [ModelFormat::Onnx, ModelFormat::Tensorflow, ModelFormat::Nnef] {
            assert_eq!(format.to_string().parse::<ModelFormat>()?, format);
        }
        Ok(())
    }

    #[test]
    fn discover_by_extension() -> TractResult<()> {
        let dir = tempfile::tempdir()?;
        for (name, expected) in [
            ("flowers.onnx", ModelFormat::Onnx),
            ("flowers.tflite", ModelFormat::Tflite),
            ("flowers.pb", ModelFormat::Tensorflow),
            ("flowers.tgz", ModelFormat::Nnef),
            ("flowers.nnef.tar", ModelFormat::Nnef),
            ("flowers.nnef.tar.gz", ModelFormat::Nnef),
        ] {
            let path = dir.path().join(name);
            std::fs::write(&path, b"")?;
            assert_eq!(ModelFormat::discover(&path)?, (path.clone(), expected), "{name}");
        }
        Ok(())
    }

    #[test]
    fn discover_directories() -> TractResult<()> {
        let dir = tempfile::tempdir()?;
        let nnef = dir.path().join("nnef");
        std::fs::create_dir(&nnef)?;
        std::fs::write(nnef.join("graph.nnef"), b"")?;
        assert_eq!(ModelFormat::discover(&nnef)?, (nnef.clone(), ModelFormat::Nnef));

        let onnx = dir.path().join("onnx");
        std::fs::create_dir(&onnx)?;
        std::fs::write(onnx.join("model.onnx"), b"")?;
        assert_eq!(ModelFormat::discover(&onnx)?, (onnx.join("model.onnx"), ModelFormat::Onnx));
        Ok(())
    }

    #[test]
    fn missing_model() {
        let err = TractClassifier::load("/nonexistent/saved_model.onnx", None).unwrap_err();
        assert!(err.to_string().contains("model not found"), "{err}");
    }

    #[test]
    fn garbage_model_fails_to_load() -> TractResult<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("model.onnx");
        std::fs::write(&path, b"this is no protobuf")?;
        let err = TractClassifier::load(&path, None).unwrap_err();
        assert!(format!("{err:?}").contains("model.onnx"), "{err:?}");
        Ok(())
    }

    #[test]
    fn in_memory_model() -> TractResult<()> {
        let classifier = TractClassifier::from_typed(channel_max()?)?;
        let probabilities = classifier.classify(uniform_batch([0.25, 1.0, 0.5]))?;
        assert_eq!(probabilities.len(), 3);
        assert_abs_diff_eq!(probabilities[0], 0.25);
        assert_abs_diff_eq!(probabilities[1], 1.0);
        assert_abs_diff_eq!(probabilities[2], 0.5);
        Ok(())
    }

    #[test]
    fn nnef_round_trip_through_load() -> TractResult<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("channel_max");
        tract_nnef::nnef().with_tract_core().write_to_dir(&channel_max()?, &path)?;
        let classifier = TractClassifier::load(&path, None)?;
        let probabilities = classifier.classify(uniform_batch([0.5, 0.0, 0.75]))?;
        assert_eq!(probabilities, vec![0.5, 0.0, 0.75]);
        Ok(())
    }

    #[test]
    fn wrong_input_shape_is_an_error() -> TractResult<()> {
        let classifier = TractClassifier::from_typed(channel_max()?)?;
        let batch: Tensor = Array4::<f32>::zeros((1, 10, 10, 3)).into();
        assert!(classifier.classify(batch).is_err());
        Ok(())
    }
}
