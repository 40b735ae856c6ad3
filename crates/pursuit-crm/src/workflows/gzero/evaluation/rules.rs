use std::collections::BTreeMap;

use super::super::catalog::CriterionCatalog;
use super::super::domain::ScoreEntry;
use super::CriterionContribution;

pub(crate) struct ScoreTally {
    pub weighted_total: f64,
    pub scored: usize,
    pub contributions: Vec<CriterionContribution>,
}

/// Weighted aggregation over the catalog: each scored criterion adds
/// `score * weight / 100`; unscored criteria add nothing. A partial entry set
/// therefore yields its literal partial sum, never a rescaled one.
pub(crate) fn tally(
    scores: &BTreeMap<String, ScoreEntry>,
    catalog: &CriterionCatalog,
) -> ScoreTally {
    let mut weighted_total = 0.0;
    let mut scored = 0;
    let mut contributions = Vec::with_capacity(catalog.len());

    for criterion in catalog.criteria() {
        let entry = scores.get(criterion.key);
        let (score, weighted, comment) = match entry {
            Some(entry) => {
                let weighted = f64::from(entry.score) * criterion.weight / 100.0;
                weighted_total += weighted;
                scored += 1;
                (Some(entry.score), weighted, entry.comment.clone())
            }
            None => (None, 0.0, String::new()),
        };

        contributions.push(CriterionContribution {
            criterion_id: criterion.key,
            name: criterion.name,
            category: criterion.category,
            weight: criterion.weight,
            score,
            weighted,
            comment,
        });
    }

    ScoreTally {
        weighted_total,
        scored,
        contributions,
    }
}
