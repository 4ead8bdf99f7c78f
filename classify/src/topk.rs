/// The K best classes for one image, best first.
///
/// `classes` are 1-based: class `n` is entry `n - 1` of the model output.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Prediction {
    pub probabilities: Vec<f32>,
    pub classes: Vec<usize>,
}

impl Prediction {
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.classes.iter().copied().zip(self.probabilities.iter().copied())
    }
}

/// Rank `probabilities` in descending order and keep the first `k` entries.
///
/// The sort is stable, so equal probabilities keep ascending class order.
pub fn top_k(probabilities: &[f32], k: usize) -> Prediction {
    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    order.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]));
    order.truncate(k);
    Prediction {
        probabilities: order.iter().map(|&ix| probabilities[ix]).collect(),
        classes: order.iter().map(|&ix| ix + 1).collect(),
    }
}
