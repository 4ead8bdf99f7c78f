use tract_core::prelude::*;

use crate::labels::LabelMap;

pub fn format_probabilities(probabilities: &[f32]) -> String {
    format!("probabilities: {probabilities:?}")
}

/// Render classes as labels when a non-empty label map is given, raw ids otherwise.
pub fn format_classes(classes: &[usize], labels: Option<&LabelMap>) -> TractResult<String> {
    match labels {
        Some(labels) if !labels.is_empty() => {
            Ok(format!("classes: {:?}", labels.labels_for(classes)?))
        }
        _ => Ok(format!("classes: {classes:?}")),
    }
}
