//! Error types for fold assignment.

/// Errors arising from invalid fold-assignment inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FoldError {
    /// Cross-validation needs at least one fold.
    #[error("fold count must be at least 1")]
    ZeroFolds,

    /// The CPython-compatible shuffle draws 32-bit indices.
    #[error("too many cases for the python shuffle: {count}")]
    TooManyCases { count: usize },

    /// A requested fold index lies outside `[0, k)`.
    #[error("fold {fold} out of range for {num_folds} folds")]
    FoldOutOfRange { fold: u32, num_folds: u32 },
}
