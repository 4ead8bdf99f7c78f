use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use tract_classify::{DEFAULT_TOP_K, ModelFormat};
use tract_classify::model::TractClassifier;
use tract_classify::labels::LabelMap;

use crate::CliResult;

/// Structure holding the parsed parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameters {
    pub image_path: PathBuf,
    pub model_path: PathBuf,
    pub top_k: usize,
    pub category_names: Option<PathBuf>,
    pub format: Option<ModelFormat>,
}

impl Parameters {
    /// Parses the command-line arguments.
    pub fn from_clap(matches: &clap::ArgMatches) -> CliResult<Parameters> {
        let image_path = matches.value_of("image_path").context("image_path argument required")?;
        let model_path = matches.value_of("saved_model").context("saved_model argument required")?;
        let top_k = matches
            .value_of("top_k")
            .map(usize::from_str)
            .transpose()
            .context("--top_k expects a positive integer")?
            .unwrap_or(DEFAULT_TOP_K);
        let format = matches.value_of("format").map(ModelFormat::from_str).transpose()?;
        Ok(Parameters {
            image_path: image_path.into(),
            model_path: model_path.into(),
            top_k,
            category_names: matches.value_of("category_names").map(PathBuf::from),
            format,
        })
    }

    pub fn label_map(&self) -> CliResult<Option<LabelMap>> {
        self.category_names.as_ref().map(LabelMap::from_path).transpose()
    }

    pub fn classifier(&self) -> CliResult<TractClassifier> {
        TractClassifier::load(&self.model_path, self.format)
    }
}
