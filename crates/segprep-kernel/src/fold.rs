//! Deterministic k-fold assignment.
//!
//! Shuffle the training cases under a seed, then hand out contiguous runs of
//! `floor(N / k)` cases to folds `0..k`. The `N mod k` cases past the last
//! full run are not visited and keep whatever fold they already carried,
//! unless [`RemainderPolicy::RoundRobin`] is selected.

use crate::case::TrainingCase;
use crate::error::FoldError;
use crate::shuffle::ShuffleStrategy;
use serde::{Deserialize, Serialize};

/// What happens to the `N mod k` cases left over after the full runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// Leave them untouched; they keep their prior (default) fold.
    #[default]
    Retain,

    /// Deal them out as `offset mod k`, so every case gets a fresh fold.
    RoundRobin,
}

impl std::fmt::Display for RemainderPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Retain => write!(f, "retain"),
            Self::RoundRobin => write!(f, "round-robin"),
        }
    }
}

impl std::str::FromStr for RemainderPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "retain" | "keep" => Ok(Self::Retain),
            "round-robin" | "round_robin" | "roundrobin" => Ok(Self::RoundRobin),
            _ => Err(format!("unknown remainder policy: {s}")),
        }
    }
}

/// Inputs to one fold assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldPlan {
    pub num_folds: u32,
    pub seed: u64,
    #[serde(default)]
    pub strategy: ShuffleStrategy,
    #[serde(default)]
    pub remainder: RemainderPolicy,
}

impl FoldPlan {
    /// Five folds, seed 42, CPython shuffle, remainder retained.
    pub const DEFAULT: Self = Self {
        num_folds: 5,
        seed: 42,
        strategy: ShuffleStrategy::Python,
        remainder: RemainderPolicy::Retain,
    };

    pub fn new(num_folds: u32, seed: u64) -> Self {
        Self {
            num_folds,
            seed,
            ..Self::DEFAULT
        }
    }

    pub fn with_strategy(mut self, strategy: ShuffleStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_remainder(mut self, remainder: RemainderPolicy) -> Self {
        self.remainder = remainder;
        self
    }
}

impl Default for FoldPlan {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// What an assignment did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldReport {
    pub num_folds: u32,
    pub seed: u64,
    pub strategy: ShuffleStrategy,
    pub remainder_policy: RemainderPolicy,
    pub total: usize,
    /// `floor(N / k)`.
    pub fold_size: usize,
    /// Cases that received a freshly computed fold from the full runs.
    pub assigned: usize,
    /// `N mod k` trailing cases.
    pub remainder: usize,
}

/// Shuffle `cases` in place, then write fold numbers into them.
pub fn assign_folds(cases: &mut [TrainingCase], plan: FoldPlan) -> Result<FoldReport, FoldError> {
    if plan.num_folds == 0 {
        return Err(FoldError::ZeroFolds);
    }
    plan.strategy.shuffle(cases, plan.seed)?;

    let k = plan.num_folds as usize;
    let fold_size = cases.len() / k;
    for (position, case) in cases.iter_mut().take(k * fold_size).enumerate() {
        case.fold = (position / fold_size) as u32;
    }

    let assigned = k * fold_size;
    let remainder = cases.len() - assigned;
    if plan.remainder == RemainderPolicy::RoundRobin {
        for (offset, case) in cases[assigned..].iter_mut().enumerate() {
            case.fold = (offset % k) as u32;
        }
    }

    tracing::debug!(
        total = cases.len(),
        num_folds = plan.num_folds,
        fold_size,
        remainder,
        strategy = %plan.strategy,
        remainder_policy = %plan.remainder,
        "assigned folds"
    );

    Ok(FoldReport {
        num_folds: plan.num_folds,
        seed: plan.seed,
        strategy: plan.strategy,
        remainder_policy: plan.remainder,
        total: cases.len(),
        fold_size,
        assigned,
        remainder,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::DEFAULT_FOLD;

    fn cases(n: usize) -> Vec<TrainingCase> {
        (0..n)
            .map(|i| TrainingCase::new(format!("case{i}"), format!("label{i}")))
            .collect()
    }

    #[test]
    fn zero_folds_is_rejected() {
        let mut items = cases(3);
        assert_eq!(
            assign_folds(&mut items, FoldPlan::new(0, 42)),
            Err(FoldError::ZeroFolds)
        );
    }

    #[test]
    fn fewer_cases_than_folds_assigns_nothing() {
        let mut items = cases(3);
        let report = assign_folds(&mut items, FoldPlan::new(5, 42)).expect("assign");
        assert_eq!(report.fold_size, 0);
        assert_eq!(report.assigned, 0);
        assert_eq!(report.remainder, 3);
        assert!(items.iter().all(|c| c.fold == DEFAULT_FOLD));
    }

    #[test]
    fn remainder_keeps_prior_fold_value() {
        let mut items: Vec<TrainingCase> = cases(7).into_iter().map(|c| c.with_fold(9)).collect();
        let report = assign_folds(&mut items, FoldPlan::new(3, 1)).expect("assign");
        assert_eq!(report.fold_size, 2);
        assert_eq!(items[6].fold, 9);
        let heads: Vec<u32> = items[..6].iter().map(|c| c.fold).collect();
        assert_eq!(heads, vec![0, 0, 1, 1, 2, 2]);
    }

    #[test]
    fn round_robin_assigns_every_case() {
        let mut items = cases(13);
        let plan = FoldPlan::new(5, 42).with_remainder(RemainderPolicy::RoundRobin);
        let report = assign_folds(&mut items, plan).expect("assign");
        assert_eq!(report.remainder, 3);

        let tail: Vec<u32> = items[10..].iter().map(|c| c.fold).collect();
        assert_eq!(tail, vec![0, 1, 2]);

        let mut counts = [0usize; 5];
        for case in &items {
            counts[case.fold as usize] += 1;
        }
        let max = counts.iter().max().copied().unwrap_or_default();
        let min = counts.iter().min().copied().unwrap_or_default();
        assert!(max - min <= 1, "unbalanced folds: {counts:?}");
    }

    #[test]
    fn round_robin_with_fewer_cases_than_folds() {
        let mut items = cases(2);
        let plan = FoldPlan::new(4, 42).with_remainder(RemainderPolicy::RoundRobin);
        assign_folds(&mut items, plan).expect("assign");
        let folds: Vec<u32> = items.iter().map(|c| c.fold).collect();
        assert_eq!(folds, vec![0, 1]);
    }

    #[test]
    fn policy_round_trips_through_text() {
        for policy in [RemainderPolicy::Retain, RemainderPolicy::RoundRobin] {
            assert_eq!(policy.to_string().parse::<RemainderPolicy>(), Ok(policy));
        }
    }
}
