use serde::{Deserialize, Serialize};

use super::domain::ScoreEntry;

/// Dimension grouping for catalog criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionCategory {
    Strategic,
    Client,
    Competitive,
    Financial,
    Delivery,
    Risk,
}

impl CriterionCategory {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Strategic,
            Self::Client,
            Self::Competitive,
            Self::Financial,
            Self::Delivery,
            Self::Risk,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Strategic => "Strategic Fit",
            Self::Client => "Client",
            Self::Competitive => "Competitive Position",
            Self::Financial => "Financial",
            Self::Delivery => "Delivery",
            Self::Risk => "Risk",
        }
    }
}

/// One evaluation criterion: fixed weight plus the discrete scores assessors
/// may assign. Binary criteria use {1, 3}, graded criteria {1, 2, 3}.
#[derive(Debug, Clone)]
pub struct Criterion {
    pub key: &'static str,
    pub name: &'static str,
    pub category: CriterionCategory,
    pub description: &'static str,
    pub weight: f64,
    pub allowed_scores: &'static [u8],
}

impl Criterion {
    pub fn max_allowed(&self) -> u8 {
        self.allowed_scores.iter().copied().max().unwrap_or(0)
    }

    pub fn min_allowed(&self) -> u8 {
        self.allowed_scores.iter().copied().min().unwrap_or(0)
    }
}

const GRADED: &[u8] = &[1, 2, 3];
const BINARY: &[u8] = &[1, 3];

/// Immutable reference data. Weights are expected to sum to 100; the catalog
/// reports a warning when they do not, it never corrects them.
#[derive(Debug, Clone)]
pub struct CriterionCatalog {
    criteria: Vec<Criterion>,
}

impl CriterionCatalog {
    pub fn standard() -> Self {
        Self {
            criteria: standard_criteria(),
        }
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn get(&self, key: &str) -> Option<&Criterion> {
        self.criteria.iter().find(|criterion| criterion.key == key)
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn weight_total(&self) -> f64 {
        self.criteria.iter().map(|criterion| criterion.weight).sum()
    }

    /// Maximum weighted total reachable when every criterion is scored at its
    /// highest allowed value; 3.0 for the standard catalog.
    pub fn max_possible(&self) -> f64 {
        self.criteria
            .iter()
            .map(|criterion| f64::from(criterion.max_allowed()) * criterion.weight / 100.0)
            .sum()
    }

    pub fn weight_warning(&self) -> Option<String> {
        let total = self.weight_total();
        if (total - 100.0).abs() > 1e-9 {
            Some(format!(
                "criterion weights sum to {total:.2}, expected 100.00"
            ))
        } else {
            None
        }
    }

    /// Reject entries naming unknown criteria or scores outside the allowed
    /// set for their criterion.
    pub fn validate_entry(&self, entry: &ScoreEntry) -> Result<(), ScoreError> {
        let criterion = self
            .get(&entry.criterion_id)
            .ok_or_else(|| ScoreError::UnknownCriterion(entry.criterion_id.clone()))?;

        if !criterion.allowed_scores.contains(&entry.score) {
            return Err(ScoreError::DisallowedScore {
                criterion: entry.criterion_id.clone(),
                score: entry.score,
                allowed: criterion.allowed_scores,
            });
        }

        Ok(())
    }

    pub fn view(&self) -> CatalogView {
        CatalogView {
            criteria: self
                .criteria
                .iter()
                .map(|criterion| CriterionView {
                    key: criterion.key,
                    name: criterion.name,
                    category: criterion.category,
                    category_label: criterion.category.label(),
                    description: criterion.description,
                    weight: criterion.weight,
                    allowed_scores: criterion.allowed_scores,
                })
                .collect(),
            weight_total: self.weight_total(),
            weight_warning: self.weight_warning(),
        }
    }
}

/// Validation errors for submitted score entries.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScoreError {
    #[error("unknown criterion '{0}'")]
    UnknownCriterion(String),
    #[error("score {score} is not allowed for criterion '{criterion}' (allowed: {allowed:?})")]
    DisallowedScore {
        criterion: String,
        score: u8,
        allowed: &'static [u8],
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct CriterionView {
    pub key: &'static str,
    pub name: &'static str,
    pub category: CriterionCategory,
    pub category_label: &'static str,
    pub description: &'static str,
    pub weight: f64,
    pub allowed_scores: &'static [u8],
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogView {
    pub criteria: Vec<CriterionView>,
    pub weight_total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_warning: Option<String>,
}

fn standard_criteria() -> Vec<Criterion> {
    vec![
        Criterion {
            key: "strategic_fit",
            name: "Strategic Fit",
            category: CriterionCategory::Strategic,
            description: "Alignment of the opportunity with the firm's multi-year growth strategy and target markets.",
            weight: 12.0,
            allowed_scores: GRADED,
        },
        Criterion {
            key: "account_growth",
            name: "Account Growth Potential",
            category: CriterionCategory::Strategic,
            description: "Likelihood the engagement opens follow-on work or expands the existing account footprint.",
            weight: 6.0,
            allowed_scores: GRADED,
        },
        Criterion {
            key: "reference_value",
            name: "Reference Value",
            category: CriterionCategory::Strategic,
            description: "Whether a win would produce a citable reference in a market the firm is building credentials in.",
            weight: 4.0,
            allowed_scores: BINARY,
        },
        Criterion {
            key: "client_relationship",
            name: "Client Relationship Strength",
            category: CriterionCategory::Client,
            description: "Depth and warmth of existing relationships with the buying organization.",
            weight: 10.0,
            allowed_scores: GRADED,
        },
        Criterion {
            key: "decision_maker_access",
            name: "Decision-Maker Access",
            category: CriterionCategory::Client,
            description: "Direct access to the economic buyer rather than intermediaries only.",
            weight: 6.0,
            allowed_scores: BINARY,
        },
        Criterion {
            key: "budget_confirmed",
            name: "Budget Confirmed",
            category: CriterionCategory::Client,
            description: "The client has a named, approved budget line for this initiative.",
            weight: 8.0,
            allowed_scores: BINARY,
        },
        Criterion {
            key: "competitive_position",
            name: "Competitive Position",
            category: CriterionCategory::Competitive,
            description: "Relative standing against the expected competitor field for this pursuit.",
            weight: 9.0,
            allowed_scores: GRADED,
        },
        Criterion {
            key: "incumbent_advantage",
            name: "Incumbent Advantage",
            category: CriterionCategory::Competitive,
            description: "Whether the firm (rather than a rival) holds incumbency or privileged context.",
            weight: 5.0,
            allowed_scores: BINARY,
        },
        Criterion {
            key: "deal_size",
            name: "Deal Size",
            category: CriterionCategory::Financial,
            description: "Expected contract value relative to the practice's qualification bands.",
            weight: 9.0,
            allowed_scores: GRADED,
        },
        Criterion {
            key: "margin_potential",
            name: "Margin Potential",
            category: CriterionCategory::Financial,
            description: "Achievable contribution margin given rate expectations and delivery model.",
            weight: 8.0,
            allowed_scores: GRADED,
        },
        Criterion {
            key: "payment_risk",
            name: "Payment Risk",
            category: CriterionCategory::Financial,
            description: "Creditworthiness and payment discipline of the client entity.",
            weight: 4.0,
            allowed_scores: BINARY,
        },
        Criterion {
            key: "delivery_capacity",
            name: "Delivery Capacity",
            category: CriterionCategory::Delivery,
            description: "Availability of the staffing profile the engagement would require in its expected window.",
            weight: 8.0,
            allowed_scores: GRADED,
        },
        Criterion {
            key: "domain_expertise",
            name: "Domain Expertise",
            category: CriterionCategory::Delivery,
            description: "Depth of in-house expertise in the industry and solution domain.",
            weight: 7.0,
            allowed_scores: GRADED,
        },
        Criterion {
            key: "contract_risk",
            name: "Contract Risk",
            category: CriterionCategory::Risk,
            description: "Acceptability of the expected contractual terms, liabilities, and compliance obligations.",
            weight: 4.0,
            allowed_scores: BINARY,
        },
    ]
}
