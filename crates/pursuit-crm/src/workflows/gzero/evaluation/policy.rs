use super::super::domain::Decision;
use super::config::DecisionThresholds;

/// Band classification. Ties resolve upward: a score exactly on a threshold
/// lands in the higher band.
pub(crate) fn classify(weighted_score: f64, thresholds: &DecisionThresholds) -> Decision {
    if weighted_score >= thresholds.go {
        Decision::Go
    } else if weighted_score >= thresholds.conditional {
        Decision::ConditionalGo
    } else {
        Decision::NoGo
    }
}
