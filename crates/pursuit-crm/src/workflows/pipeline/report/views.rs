use serde::Serialize;

use crate::workflows::gzero::catalog::CriterionCategory;
use crate::workflows::gzero::domain::{AssessmentStatus, Decision};

#[derive(Debug, Clone, Serialize)]
pub struct StatusCountEntry {
    pub status: AssessmentStatus,
    pub status_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionMixEntry {
    pub decision: Decision,
    pub decision_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryScoreEntry {
    pub category: CriterionCategory,
    pub category_label: &'static str,
    pub average_score: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockedProjectView {
    pub code: String,
    pub name: String,
    pub reason: String,
}

/// Dashboard payload: every figure here is recomputed from repository
/// snapshots at request time.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummary {
    pub total_projects: usize,
    pub total_stakeholders: usize,
    pub total_activities: usize,
    pub assessments: usize,
    pub fully_scored: usize,
    pub status_counts: Vec<StatusCountEntry>,
    pub decision_mix: Vec<DecisionMixEntry>,
    pub category_scores: Vec<CategoryScoreEntry>,
    pub blocked_projects: Vec<BlockedProjectView>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PortfolioHealth {
    Healthy,
    Watch,
    AtRisk,
}

impl PortfolioHealth {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::Watch => "Watch",
            Self::AtRisk => "At Risk",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioInsights {
    pub health: PortfolioHealth,
    pub health_label: &'static str,
    pub go_rate_pct: f64,
    pub blocked_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_category: Option<&'static str>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub observations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommended_actions: Vec<String>,
}
