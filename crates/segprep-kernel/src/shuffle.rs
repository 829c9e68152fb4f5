//! Seeded in-place permutations.

use crate::error::FoldError;
use crate::mt19937::Mt19937;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Which deterministic shuffle procedure drives fold assignment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ShuffleStrategy {
    /// MT19937 + CPython `random.shuffle`. Reproducible across languages.
    #[default]
    Python,

    /// `rand`'s `StdRng` seeded from the seed value.
    ///
    /// Deterministic for a given `rand` release only; fold files are not
    /// comparable with ones produced by other tooling.
    Std,
}

impl ShuffleStrategy {
    /// Permute `items` in place under `seed`.
    pub fn shuffle<T>(self, items: &mut [T], seed: u64) -> Result<(), FoldError> {
        match self {
            Self::Python => python_shuffle(items, &mut Mt19937::from_python_seed(seed)),
            Self::Std => {
                let mut rng = StdRng::seed_from_u64(seed);
                items.shuffle(&mut rng);
                Ok(())
            }
        }
    }
}

impl std::fmt::Display for ShuffleStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Python => write!(f, "python"),
            Self::Std => write!(f, "std"),
        }
    }
}

impl std::str::FromStr for ShuffleStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "python" | "mt19937" | "cpython" => Ok(Self::Python),
            "std" | "stdrng" => Ok(Self::Std),
            _ => Err(format!("unknown shuffle strategy: {s}")),
        }
    }
}

/// CPython's `random.shuffle`: walk from the back, swapping each slot with a
/// uniformly chosen slot at or before it.
pub fn python_shuffle<T>(items: &mut [T], rng: &mut Mt19937) -> Result<(), FoldError> {
    if u32::try_from(items.len()).is_err() {
        return Err(FoldError::TooManyCases { count: items.len() });
    }
    for i in (1..items.len()).rev() {
        // i + 1 fits: len itself fits in u32.
        let j = rng.randbelow((i + 1) as u32) as usize;
        items.swap(i, j);
    }
    Ok(())
}
