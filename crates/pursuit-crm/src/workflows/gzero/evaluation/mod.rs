mod config;
mod policy;
mod rules;

pub use config::DecisionThresholds;

pub(crate) use policy::classify;

use std::collections::BTreeMap;

use serde::Serialize;

use super::catalog::{CriterionCatalog, CriterionCategory};
use super::domain::{Decision, ScoreEntry};

/// Stateless scorer that applies the criterion catalog and canonical
/// thresholds to a set of score entries.
pub struct ScoringEngine {
    catalog: CriterionCatalog,
    thresholds: DecisionThresholds,
}

impl ScoringEngine {
    pub fn new(catalog: CriterionCatalog, thresholds: DecisionThresholds) -> Self {
        Self {
            catalog,
            thresholds,
        }
    }

    pub fn standard(thresholds: DecisionThresholds) -> Self {
        Self::new(CriterionCatalog::standard(), thresholds)
    }

    pub fn catalog(&self) -> &CriterionCatalog {
        &self.catalog
    }

    pub fn thresholds(&self) -> &DecisionThresholds {
        &self.thresholds
    }

    /// Score against the canonical thresholds. This is what the pending
    /// queue and all persisted state use.
    pub fn evaluate(&self, scores: &BTreeMap<String, ScoreEntry>) -> ScoreSummary {
        self.evaluate_with(scores, &self.thresholds)
    }

    /// Score against caller-supplied thresholds. Only the live score preview
    /// uses this; persisted decisions never do.
    pub fn evaluate_with(
        &self,
        scores: &BTreeMap<String, ScoreEntry>,
        thresholds: &DecisionThresholds,
    ) -> ScoreSummary {
        let tally = rules::tally(scores, &self.catalog);
        let total_criteria = self.catalog.len();
        let all_scored = tally.scored == total_criteria && total_criteria > 0;

        ScoreSummary {
            weighted_total: tally.weighted_total,
            max_possible: self.catalog.max_possible(),
            scored_criteria: tally.scored,
            total_criteria,
            all_scored,
            decision: classify(tally.weighted_total, thresholds),
            contributions: tally.contributions,
            weight_warning: self.catalog.weight_warning(),
        }
    }
}

/// Per-criterion slice of the weighted total, allowing transparent audits of
/// how a score came together. Unscored criteria appear with no score and a
/// zero contribution; they are omitted from the sum, not zero-penalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionContribution {
    pub criterion_id: &'static str,
    pub name: &'static str,
    pub category: CriterionCategory,
    pub weight: f64,
    pub score: Option<u8>,
    pub weighted: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

/// Evaluation output consumed by the assessment editor, the approvals queue,
/// and the project-detail gate alike.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub weighted_total: f64,
    pub max_possible: f64,
    pub scored_criteria: usize,
    pub total_criteria: usize,
    pub all_scored: bool,
    pub decision: Decision,
    pub contributions: Vec<CriterionContribution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_warning: Option<String>,
}
