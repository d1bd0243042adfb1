//! Classification result types

use super::BackendError;
use serde::{Deserialize, Serialize};

/// Final label and confidence for one input text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Sentiment label, e.g. `positive` or `negative`
    pub label: String,
    /// Confidence score of `label`
    pub score: f32,
}

impl Classification {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }

    /// Collapse the raw label scores produced for one text into a single
    /// classification.
    ///
    /// `pos`/`positive` and `neg`/`negative` are folded together; when both
    /// polarities are present the stronger one wins, otherwise the highest
    /// scoring label is taken.
    pub fn from_scores(scores: &[LabelScore]) -> Result<Self, BackendError> {
        let mut positive: Option<f32> = None;
        let mut negative: Option<f32> = None;

        for entry in scores {
            match entry.label.to_lowercase().as_str() {
                "positive" | "pos" => positive = Some(entry.score),
                "negative" | "neg" => negative = Some(entry.score),
                _ => {}
            }
        }

        if let (Some(pos), Some(neg)) = (positive, negative) {
            return Ok(if pos > neg {
                Self::new("positive", pos)
            } else {
                Self::new("negative", neg)
            });
        }

        let best = scores
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .ok_or_else(|| BackendError::InvalidResponse("no label scores for input".into()))?;

        Ok(Self::new(normalize_label(&best.label), best.score))
    }
}

/// One raw `{label, score}` entry returned by a model server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

fn normalize_label(label: &str) -> String {
    match label.to_lowercase().as_str() {
        "pos" | "positive" => "positive".to_string(),
        "neg" | "negative" => "negative".to_string(),
        other => other.to_string(),
    }
}
