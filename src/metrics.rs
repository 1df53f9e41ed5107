use serde::Serialize;

use crate::data::{LabeledPair, PairLabel};
use crate::splits::SplitLabel;

/// Share of one label within a set of pairs.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LabelShare {
    /// Label being counted.
    pub label: PairLabel,
    /// Pairs carrying the label.
    pub count: usize,
    /// `count / total`, 0 for an empty set.
    pub share: f64,
}

/// Aggregate size metrics for one split. Diagnostic only.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SplitSummary {
    /// Split the summary describes.
    pub split: SplitLabel,
    /// Pair count.
    pub pairs: usize,
    /// Characters across abstracts and texts.
    pub chars: usize,
    /// Whitespace-delimited tokens across abstracts and texts.
    pub tokens: usize,
    /// Per-label counts in taxonomy order.
    pub labels: Vec<LabelShare>,
    /// Pairs whose score is outside the label taxonomy.
    pub unlabeled: usize,
}

/// Per-label counts and shares, in taxonomy order.
pub fn label_distribution(pairs: &[LabeledPair]) -> (Vec<LabelShare>, usize) {
    let mut counts = [0_usize; PairLabel::ALL.len()];
    let mut unlabeled = 0_usize;
    for pair in pairs {
        match pair
            .pair_label()
            .and_then(|label| PairLabel::ALL.iter().position(|known| *known == label))
        {
            Some(slot) => counts[slot] += 1,
            None => unlabeled += 1,
        }
    }
    let total = pairs.len();
    let shares = PairLabel::ALL
        .into_iter()
        .zip(counts)
        .map(|(label, count)| LabelShare {
            label,
            count,
            share: if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            },
        })
        .collect();
    (shares, unlabeled)
}

/// Compute split diagnostics.
pub fn summarize(split: SplitLabel, pairs: &[LabeledPair]) -> SplitSummary {
    let (labels, unlabeled) = label_distribution(pairs);
    SplitSummary {
        split,
        pairs: pairs.len(),
        chars: pairs.iter().map(LabeledPair::char_volume).sum(),
        tokens: pairs
            .iter()
            .map(|pair| {
                pair.abstract_text.split_whitespace().count() + pair.text.split_whitespace().count()
            })
            .sum(),
        labels,
        unlabeled,
    }
}

/// Group digits in thousands for log output (`1234567` → `1,234,567`).
pub fn format_with_commas(value: usize) -> String {
    let raw = value.to_string();
    let mut grouped_reversed = String::with_capacity(raw.len() + (raw.len() / 3));
    for (idx, ch) in raw.chars().rev().enumerate() {
        if idx > 0 && idx % 3 == 0 {
            grouped_reversed.push(',');
        }
        grouped_reversed.push(ch);
    }
    grouped_reversed.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_reports_volume_and_labels() {
        let pairs = vec![
            LabeledPair::new("ab", "cde f", PairLabel::SamePaper),
            LabeledPair::new("g", "h", PairLabel::SamePaper),
            LabeledPair::new("i j", "k", PairLabel::CrossField),
        ];
        let summary = summarize(SplitLabel::Train, &pairs);
        assert_eq!(summary.pairs, 3);
        assert_eq!(summary.chars, 2 + 5 + 1 + 1 + 3 + 1);
        assert_eq!(summary.tokens, 1 + 2 + 1 + 1 + 2 + 1);
        assert_eq!(summary.unlabeled, 0);
        assert_eq!(summary.labels[0].label, PairLabel::SamePaper);
        assert_eq!(summary.labels[0].count, 2);
        assert_eq!(summary.labels[1].count, 0);
        assert_eq!(summary.labels[2].count, 1);
        assert!((summary.labels[0].share - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn foreign_scores_are_counted_as_unlabeled() {
        let mut pair = LabeledPair::new("a", "b", PairLabel::SameField);
        pair.label = 0.7;
        let (shares, unlabeled) = label_distribution(&[pair]);
        assert_eq!(unlabeled, 1);
        assert!(shares.iter().all(|share| share.count == 0));
    }

    #[test]
    fn empty_split_has_zero_shares() {
        let summary = summarize(SplitLabel::Dev, &[]);
        assert_eq!(summary.pairs, 0);
        assert!(summary.labels.iter().all(|share| share.share == 0.0));
    }

    #[test]
    fn commas_group_thousands() {
        assert_eq!(format_with_commas(0), "0");
        assert_eq!(format_with_commas(999), "999");
        assert_eq!(format_with_commas(440_488_728), "440,488,728");
    }
}
