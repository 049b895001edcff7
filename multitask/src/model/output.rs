use indexmap::IndexMap;
use ndarray::{Array2, ArrayView2, Axis};

use super::ForwardStats;
use crate::Error;

/// Raw logits of every task for one batch, keyed by task name in head order.
#[derive(Debug, Clone)]
pub struct MultiTaskOutput {
    pub logits: IndexMap<String, Array2<f32>>,
    pub stats: ForwardStats,
}

impl MultiTaskOutput {
    pub fn get(
        &self,
        task: &str,
    ) -> Option<&Array2<f32>> {
        self.logits.get(task)
    }

    pub fn task(
        &self,
        task: &str,
    ) -> Result<&Array2<f32>, Error> {
        self.logits.get(task).ok_or_else(|| Error::MissingTask(task.to_string()))
    }

    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.logits.keys().map(String::as_str)
    }

    /// Logits of the first two tasks, in configuration order.
    pub fn into_pair(self) -> Result<(Array2<f32>, Array2<f32>), Error> {
        let mut logits = self.logits.into_values();
        let first = logits.next().ok_or_else(|| Error::MissingTask("#0".to_string()))?;
        let second = logits.next().ok_or_else(|| Error::MissingTask("#1".to_string()))?;
        Ok((first, second))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub class_index: usize,
    pub confidence: f32,
}

/// Row-wise softmax. Not applied by the model; callers opt in.
///
/// A row of `-inf` logits becomes uniform. Rows containing NaN, or `+inf`
/// alongside other values, come out as NaN.
pub fn softmax(logits: ArrayView2<f32>) -> Array2<f32> {
    let mut probabilities = logits.to_owned();
    for mut row in probabilities.axis_iter_mut(Axis(0)) {
        if row.iter().any(|x| x.is_nan()) {
            row.fill(f32::NAN);
            continue;
        }
        let max = row.fold(f32::NEG_INFINITY, |acc, &x| acc.max(x));
        if max == f32::NEG_INFINITY {
            let uniform = 1.0 / row.len() as f32;
            row.fill(uniform);
            continue;
        }
        row.mapv_inplace(|x| (x - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|x| x / sum);
    }
    probabilities
}

/// Most probable class per row. Unlabeled classes are named `class_{idx}`.
/// Fails on rows whose probabilities are not finite.
pub fn predictions(
    logits: ArrayView2<f32>,
    labels: Option<&[String]>,
) -> Result<Vec<Prediction>, Error> {
    softmax(logits)
        .axis_iter(Axis(0))
        .enumerate()
        .map(|(row_index, row)| {
            if row.iter().any(|p| !p.is_finite()) {
                return Err(Error::NonFiniteLogits {
                    row: row_index,
                });
            }
            let (class_index, confidence) = row
                .iter()
                .copied()
                .enumerate()
                .fold((0, f32::NEG_INFINITY), |best, (idx, p)| if p > best.1 { (idx, p) } else { best });
            let label = labels
                .and_then(|labels| labels.get(class_index).cloned())
                .unwrap_or_else(|| format!("class_{class_index}"));
            Ok(Prediction {
                label,
                class_index,
                confidence,
            })
        })
        .collect()
}
