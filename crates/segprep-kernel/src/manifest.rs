//! The dataset manifest (datalist) and its per-fold view.
//!
//! ```text
//! Datalist { testing: [TestingCase], training: [TrainingCase] }
//!     │ partition(k)
//! FoldPartition { folds[i] = indices of training cases with fold == i }
//!     │ split(i)
//! FoldSplit { validation: fold i, train: every other fold }
//! ```

use crate::case::{TestingCase, TrainingCase};
use crate::error::FoldError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Every testing and training case of one dataset, in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datalist {
    #[serde(default)]
    pub testing: Vec<TestingCase>,
    #[serde(default)]
    pub training: Vec<TrainingCase>,
}

impl Datalist {
    pub fn new(testing: Vec<TestingCase>, training: Vec<TrainingCase>) -> Self {
        Self { testing, training }
    }

    /// SHA-256 over the compact JSON encoding, hex-encoded.
    ///
    /// Field order is fixed by the struct layout, so equal manifests always
    /// hash equally.
    pub fn digest(&self) -> String {
        // Only strings and integers, written into a Vec: encoding cannot fail.
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        let hash = Sha256::digest(&bytes);
        hash.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Group training cases by fold index.
    pub fn partition(&self, num_folds: u32) -> Result<FoldPartition<'_>, FoldError> {
        FoldPartition::build(&self.training, num_folds)
    }
}

/// Training cases grouped by fold. Borrows the cases it was built from, so
/// stored indices always refer into the same slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldPartition<'a> {
    training: &'a [TrainingCase],
    folds: Vec<Vec<usize>>,
    stray: Vec<usize>,
}

impl<'a> FoldPartition<'a> {
    pub fn build(training: &'a [TrainingCase], num_folds: u32) -> Result<Self, FoldError> {
        if num_folds == 0 {
            return Err(FoldError::ZeroFolds);
        }
        let mut folds = vec![Vec::new(); num_folds as usize];
        let mut stray = Vec::new();
        for (index, case) in training.iter().enumerate() {
            match folds.get_mut(case.fold as usize) {
                Some(members) => members.push(index),
                None => stray.push(index),
            }
        }
        Ok(Self {
            training,
            folds,
            stray,
        })
    }

    pub fn num_folds(&self) -> u32 {
        self.folds.len() as u32
    }

    /// Indices of the cases in `fold`.
    pub fn members(&self, fold: u32) -> Result<&[usize], FoldError> {
        self.folds
            .get(fold as usize)
            .map(Vec::as_slice)
            .ok_or(FoldError::FoldOutOfRange {
                fold,
                num_folds: self.num_folds(),
            })
    }

    /// Case count per fold, indexed by fold.
    pub fn counts(&self) -> Vec<usize> {
        self.folds.iter().map(Vec::len).collect()
    }

    /// Cases whose fold value lies outside `[0, k)`, e.g. a manifest written
    /// with a larger k and read back with a smaller one.
    pub fn stray(&self) -> &[usize] {
        &self.stray
    }

    /// Validation/training split for one cross-validation iteration: the
    /// selected fold validates, every other in-range fold trains.
    pub fn split(&self, fold: u32) -> Result<FoldSplit<'a>, FoldError> {
        let training = self.training;
        let validation = self
            .members(fold)?
            .iter()
            .map(|&i| &training[i])
            .collect();
        let train = self
            .folds
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != fold as usize)
            .flat_map(|(_, members)| members.iter().map(|&i| &training[i]))
            .collect();
        Ok(FoldSplit {
            fold,
            validation,
            train,
        })
    }
}

/// One cross-validation iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldSplit<'a> {
    pub fold: u32,
    pub validation: Vec<&'a TrainingCase>,
    pub train: Vec<&'a TrainingCase>,
}
