use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::config::SplitFractions;
use crate::data::LabeledPair;
use crate::errors::PipelineError;
use crate::metrics::{SplitSummary, summarize};
use crate::rng::seeded_permutation;

/// Final dataset partitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitLabel {
    /// Training split.
    Train,
    /// Dev (validation) split.
    Dev,
    /// Test split.
    Test,
}

impl SplitLabel {
    /// Canonical iteration order.
    pub const ALL: [SplitLabel; 3] = [SplitLabel::Train, SplitLabel::Dev, SplitLabel::Test];

    /// Lowercase name, also used in file names and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            SplitLabel::Train => "train",
            SplitLabel::Dev => "dev",
            SplitLabel::Test => "test",
        }
    }
}

impl fmt::Display for SplitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Train/dev/test membership produced by [`split`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DatasetSplits {
    /// Training pairs.
    pub train: Vec<LabeledPair>,
    /// Dev pairs, drawn from the non-test remainder.
    pub dev: Vec<LabeledPair>,
    /// Test pairs, drawn from the full population.
    pub test: Vec<LabeledPair>,
}

impl DatasetSplits {
    /// Pairs assigned to `label`.
    pub fn get(&self, label: SplitLabel) -> &[LabeledPair] {
        match label {
            SplitLabel::Train => &self.train,
            SplitLabel::Dev => &self.dev,
            SplitLabel::Test => &self.test,
        }
    }

    /// Pairs across all three splits.
    pub fn total(&self) -> usize {
        self.train.len() + self.dev.len() + self.test.len()
    }

    /// Per-split diagnostics in canonical order.
    pub fn summaries(&self) -> Vec<SplitSummary> {
        SplitLabel::ALL
            .into_iter()
            .map(|label| summarize(label, self.get(label)))
            .collect()
    }
}

/// Number of items a `fraction` holdout takes from `total` (rounded up).
pub fn holdout_count(total: usize, fraction: f64) -> usize {
    ((total as f64) * fraction).ceil().min(total as f64) as usize
}

/// Seeded holdout: permute `items`, the first `holdout_count` go to the
/// second vector and the rest (in permuted order) to the first.
pub fn holdout_split<T>(items: Vec<T>, fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let total = items.len();
    let held = holdout_count(total, fraction);
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut kept = Vec::with_capacity(total - held);
    let mut holdout = Vec::with_capacity(held);
    for (pos, idx) in seeded_permutation(total, seed).into_iter().enumerate() {
        if let Some(item) = slots[idx].take() {
            if pos < held {
                holdout.push(item);
            } else {
                kept.push(item);
            }
        }
    }
    (kept, holdout)
}

/// Two-stage split: test from the full population, then dev from the rest.
///
/// Identical pairs, fractions, and seed always give identical membership and
/// order.
pub fn split(
    pairs: Vec<LabeledPair>,
    fractions: SplitFractions,
    seed: u64,
) -> Result<DatasetSplits, PipelineError> {
    let fractions = fractions.normalized()?;
    let total = pairs.len();
    let (remainder, test) = holdout_split(pairs, fractions.test, seed);
    let (train, dev) = holdout_split(remainder, fractions.dev, seed);
    info!(
        total,
        train = train.len(),
        dev = dev.len(),
        test = test.len(),
        "split labeled pairs"
    );
    Ok(DatasetSplits { train, dev, test })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PairLabel;
    use std::collections::HashSet;

    fn population(count: usize) -> Vec<LabeledPair> {
        (0..count)
            .map(|idx| {
                let label = PairLabel::ALL[idx % 3];
                LabeledPair::new(format!("abstract {idx}"), format!("text {idx}"), label)
            })
            .collect()
    }

    fn fractions() -> SplitFractions {
        SplitFractions {
            test: 0.1,
            dev: 0.1,
        }
    }

    #[test]
    fn hundred_pairs_split_10_9_81() {
        let splits = split(population(100), fractions(), 13).unwrap();
        assert_eq!(splits.test.len(), 10);
        assert_eq!(splits.dev.len(), 9);
        assert_eq!(splits.train.len(), 81);
    }

    #[test]
    fn union_equals_population_without_duplicates() {
        let source = population(100);
        let splits = split(source.clone(), fractions(), 13).unwrap();
        let mut seen = HashSet::new();
        for label in SplitLabel::ALL {
            for pair in splits.get(label) {
                assert!(seen.insert((pair.abstract_text.clone(), pair.text.clone())));
            }
        }
        let expected: HashSet<_> = source
            .into_iter()
            .map(|pair| (pair.abstract_text, pair.text))
            .collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn pairs_keep_their_labels() {
        let splits = split(population(60), fractions(), 13).unwrap();
        for label in SplitLabel::ALL {
            for pair in splits.get(label) {
                let idx: usize = pair.text["text ".len()..].parse().unwrap();
                assert_eq!(pair.abstract_text, format!("abstract {idx}"));
                assert_eq!(pair.pair_label(), Some(PairLabel::ALL[idx % 3]));
            }
        }
    }

    #[test]
    fn same_seed_gives_identical_splits() {
        let first = split(population(200), fractions(), 13).unwrap();
        let second = split(population(200), fractions(), 13).unwrap();
        assert_eq!(first, second);
        let other = split(population(200), fractions(), 14).unwrap();
        assert_ne!(first.test, other.test);
    }

    #[test]
    fn holdout_rounds_up() {
        assert_eq!(holdout_count(95, 0.1), 10);
        assert_eq!(holdout_count(90, 0.1), 9);
        assert_eq!(holdout_count(0, 0.1), 0);
        assert_eq!(holdout_count(3, 0.0), 0);
    }

    #[test]
    fn empty_population_gives_empty_splits() {
        let splits = split(Vec::new(), fractions(), 13).unwrap();
        assert_eq!(splits.total(), 0);
    }

    #[test]
    fn invalid_fractions_are_rejected() {
        let bad = SplitFractions {
            test: -0.1,
            dev: 0.1,
        };
        assert!(matches!(
            split(population(10), bad, 13),
            Err(PipelineError::Configuration(_))
        ));
    }
}
