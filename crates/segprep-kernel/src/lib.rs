//! # segprep kernel
//!
//! Deterministic cross-validation folds for segmentation datasets.
//!
//! ```text
//! Datalist             ← testing cases + training cases (image, label, fold)
//!     │
//! ShuffleStrategy      ← seeded permutation (MT19937 / CPython, or StdRng)
//!     │
//! assign_folds         ← contiguous runs of floor(N/k) cases per fold
//!     │
//! FoldPartition        ← training cases grouped by fold, per-fold splits
//! ```
//!
//! Nothing here touches the filesystem. Discovery and serialization live in
//! `segprep-dataset`; the external trainer lives behind `segprep-nnunet`.

pub mod case;
pub mod error;
pub mod fold;
pub mod manifest;
pub mod mt19937;
pub mod shuffle;

pub use case::{DEFAULT_FOLD, TestingCase, TrainingCase};
pub use error::FoldError;
pub use fold::{FoldPlan, FoldReport, RemainderPolicy, assign_folds};
pub use manifest::{Datalist, FoldPartition, FoldSplit};
pub use mt19937::Mt19937;
pub use shuffle::{ShuffleStrategy, python_shuffle};
