use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::labels::{CROSS_FIELD_LABEL, SAME_FIELD_LABEL, SAME_PAPER_LABEL};

pub use crate::types::{AbstractText, BodyText, FieldName, PaperId};

/// Canonical paper payload read from a per-field corpus.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaperRecord {
    /// Stable paper identifier (`paper_id` on disk).
    #[serde(rename = "paper_id", alias = "id")]
    pub id: PaperId,
    /// Abstract text.
    #[serde(rename = "abstract")]
    pub abstract_text: AbstractText,
    /// Body text.
    pub text: BodyText,
    /// Any other members of the source line, carried through untouched so
    /// held-out records are persisted with their original structure.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PaperRecord {
    /// Build a record with no extra members.
    pub fn new(
        id: impl Into<PaperId>,
        abstract_text: impl Into<AbstractText>,
        text: impl Into<BodyText>,
    ) -> Self {
        Self {
            id: id.into(),
            abstract_text: abstract_text.into(),
            text: text.into(),
            extra: Map::new(),
        }
    }
}

/// Graded relevance of an abstract to a text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PairLabel {
    /// Abstract and text come from the same paper.
    SamePaper,
    /// Different papers from the same field.
    SameField,
    /// Papers from different fields.
    CrossField,
}

impl PairLabel {
    /// Every label, highest relevance first.
    pub const ALL: [PairLabel; 3] = [
        PairLabel::SamePaper,
        PairLabel::SameField,
        PairLabel::CrossField,
    ];

    /// Numeric target written to disk.
    pub fn score(self) -> f32 {
        match self {
            PairLabel::SamePaper => SAME_PAPER_LABEL,
            PairLabel::SameField => SAME_FIELD_LABEL,
            PairLabel::CrossField => CROSS_FIELD_LABEL,
        }
    }

    /// Map a persisted score back to its label, if it is one of ours.
    pub fn from_score(score: f32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|label| (label.score() - score).abs() < 1e-6)
    }
}

/// One labeled (abstract, text) training example.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabeledPair {
    /// Abstract side (`abstract` on disk).
    #[serde(rename = "abstract")]
    pub abstract_text: AbstractText,
    /// Text side.
    pub text: BodyText,
    /// Relevance score, see [`PairLabel::score`].
    pub label: f32,
}

impl LabeledPair {
    /// Pair `abstract_text` with `text` under `label`.
    pub fn new(
        abstract_text: impl Into<AbstractText>,
        text: impl Into<BodyText>,
        label: PairLabel,
    ) -> Self {
        Self {
            abstract_text: abstract_text.into(),
            text: text.into(),
            label: label.score(),
        }
    }

    /// Taxonomy label for this pair's score, when it matches one.
    pub fn pair_label(&self) -> Option<PairLabel> {
        PairLabel::from_score(self.label)
    }

    /// Character volume of abstract plus text.
    pub fn char_volume(&self) -> usize {
        self.abstract_text.chars().count() + self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paper_record_reads_paper_id_and_keeps_extra_members() {
        let line = r#"{"paper_id":"p1","abstract":"a","text":"t","year":1999}"#;
        let record: PaperRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.id, "p1");
        assert_eq!(record.abstract_text, "a");
        assert_eq!(record.extra.get("year"), Some(&Value::from(1999)));

        let written = serde_json::to_value(&record).unwrap();
        assert_eq!(written["paper_id"], "p1");
        assert_eq!(written["abstract"], "a");
        assert_eq!(written["year"], 1999);
    }

    #[test]
    fn paper_record_accepts_id_alias() {
        let record: PaperRecord =
            serde_json::from_str(r#"{"id":"p2","abstract":"a","text":"t"}"#).unwrap();
        assert_eq!(record.id, "p2");
    }

    #[test]
    fn labeled_pair_serializes_abstract_key_and_score() {
        let pair = LabeledPair::new("abs", "body", PairLabel::SameField);
        let value = serde_json::to_value(&pair).unwrap();
        assert_eq!(value["abstract"], "abs");
        assert_eq!(value["text"], "body");
        assert!((value["label"].as_f64().unwrap() - 0.5).abs() < 1e-6);
        assert_eq!(pair.pair_label(), Some(PairLabel::SameField));
    }

    #[test]
    fn unknown_score_has_no_label() {
        assert_eq!(PairLabel::from_score(0.7), None);
        assert_eq!(PairLabel::from_score(0.05), Some(PairLabel::CrossField));
    }
}
