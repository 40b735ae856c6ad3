use crate::workflows::gzero::catalog::CriterionCategory;
use crate::workflows::gzero::domain::Decision;

use super::views::{PortfolioHealth, PortfolioInsights, PortfolioSummary};

pub(crate) fn generate_insights(summary: &PortfolioSummary) -> PortfolioInsights {
    let decided: usize = summary
        .decision_mix
        .iter()
        .filter(|entry| entry.decision != Decision::Pending)
        .map(|entry| entry.count)
        .sum();
    let go_count = summary
        .decision_mix
        .iter()
        .find(|entry| entry.decision == Decision::Go)
        .map(|entry| entry.count)
        .unwrap_or(0);
    let no_go_count = summary
        .decision_mix
        .iter()
        .find(|entry| entry.decision == Decision::NoGo)
        .map(|entry| entry.count)
        .unwrap_or(0);

    let go_rate_pct = if decided == 0 {
        0.0
    } else {
        go_count as f64 / decided as f64 * 100.0
    };

    let blocked_count = summary.blocked_projects.len();
    let blocked_majority =
        summary.total_projects > 0 && blocked_count * 2 > summary.total_projects;

    let health = if summary.assessments == 0 || blocked_majority {
        PortfolioHealth::AtRisk
    } else if decided > 0 && no_go_count * 2 > decided {
        PortfolioHealth::AtRisk
    } else if blocked_count == 0 && (decided == 0 || go_count * 2 >= decided) {
        PortfolioHealth::Healthy
    } else {
        PortfolioHealth::Watch
    };

    // The weakest-scoring category is where qualification effort pays off.
    let focus = summary
        .category_scores
        .iter()
        .filter(|entry| entry.samples > 0)
        .min_by(|a, b| {
            a.average_score
                .partial_cmp(&b.average_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let mut observations = Vec::new();
    if summary.assessments > 0 {
        observations.push(format!(
            "{} of {} assessments fully scored",
            summary.fully_scored, summary.assessments
        ));
    } else {
        observations.push("no opportunity assessments recorded yet".to_string());
    }
    if decided > 0 {
        observations.push(format!(
            "{go_count} go / {no_go_count} no-go across {decided} decided assessments"
        ));
    }
    if blocked_count > 0 {
        observations.push(format!(
            "{blocked_count} project(s) cannot open activities until their assessment clears"
        ));
    }

    let mut recommended_actions = Vec::new();
    if let Some(entry) = focus {
        recommended_actions.push(format!(
            "Qualify {} more rigorously before the next gate (portfolio average {:.2})",
            entry.category_label, entry.average_score
        ));

        match entry.category {
            CriterionCategory::Client => {
                recommended_actions.push(
                    "Map buying-center relationships and secure economic-buyer access early"
                        .to_string(),
                );
            }
            CriterionCategory::Financial => {
                recommended_actions.push(
                    "Pressure-test deal size and margin assumptions with finance".to_string(),
                );
            }
            CriterionCategory::Delivery => {
                recommended_actions.push(
                    "Confirm staffing availability before committing pursuit budget".to_string(),
                );
            }
            CriterionCategory::Strategic
            | CriterionCategory::Competitive
            | CriterionCategory::Risk => {
                recommended_actions.push(
                    "Review pursuit selection against the practice growth plan".to_string(),
                );
            }
        }
    }
    if blocked_count > 0 {
        recommended_actions.push(
            "Complete and score the open assessments so gated projects can progress".to_string(),
        );
    }

    PortfolioInsights {
        health,
        health_label: health.label(),
        go_rate_pct,
        blocked_count,
        focus_category: focus.map(|entry| entry.category_label),
        observations,
        recommended_actions,
    }
}
