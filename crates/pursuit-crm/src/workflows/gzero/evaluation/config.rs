use serde::{Deserialize, Serialize};

const DEFAULT_GO_THRESHOLD: f64 = 2.5;
const DEFAULT_CONDITIONAL_THRESHOLD: f64 = 1.8;

/// Score cutoffs separating the no-go / conditional-go / go bands on the
/// 0-3 scale. Both comparisons are inclusive on the lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionThresholds {
    pub go: f64,
    pub conditional: f64,
}

impl DecisionThresholds {
    /// Non-finite or inverted inputs fall back to the defaults.
    pub fn new(go: f64, conditional: f64) -> Self {
        if go.is_finite() && conditional.is_finite() && go >= conditional && conditional >= 0.0 {
            Self { go, conditional }
        } else {
            Self::default()
        }
    }
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            go: DEFAULT_GO_THRESHOLD,
            conditional: DEFAULT_CONDITIONAL_THRESHOLD,
        }
    }
}
