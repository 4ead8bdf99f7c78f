use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use tract_core::prelude::*;

/// Class id to human readable label, as stored in a `{"1": "pink primrose", ...}` JSON file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelMap(HashMap<String, String>);

impl LabelMap {
    pub fn from_path(path: impl AsRef<Path>) -> TractResult<LabelMap> {
        let path = path.as_ref();
        let json = fs_err::read_to_string(path)?;
        let map = Self::from_json(&json).with_context(|| format!("Parsing label map {path:?}"))?;
        info!("Loaded {} labels from {:?}", map.len(), path);
        Ok(map)
    }

    pub fn from_json(json: &str) -> TractResult<LabelMap> {
        let map: HashMap<String, String> =
            serde_json::from_str(json).context("Expected a JSON object of string labels")?;
        Ok(LabelMap(map))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn label(&self, class: usize) -> Option<&str> {
        self.0.get(&class.to_string()).map(|s| s.as_str())
    }

    /// Labels for each class, in order. Fails on the first class missing from the map.
    pub fn labels_for(&self, classes: &[usize]) -> TractResult<Vec<String>> {
        classes
            .iter()
            .map(|&class| {
                self.label(class).map(|s| s.to_string()).with_context(|| {
                    format!("Class {} has no entry in the label map ({} labels)", class, self.len())
                })
            })
            .collect()
    }
}
