//! Dataset cases: the rows of a manifest.

use serde::{Deserialize, Serialize};

/// Fold every training case starts in before assignment.
pub const DEFAULT_FOLD: u32 = 0;

/// A held-out test image. Carries no label and no fold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestingCase {
    pub image: String,
}

impl TestingCase {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
        }
    }
}

/// A training image paired with its label and cross-validation fold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingCase {
    pub image: String,
    pub label: String,
    pub fold: u32,
}

impl TrainingCase {
    /// New case sitting in [`DEFAULT_FOLD`].
    pub fn new(image: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            label: label.into(),
            fold: DEFAULT_FOLD,
        }
    }

    pub fn with_fold(mut self, fold: u32) -> Self {
        self.fold = fold;
        self
    }
}
