use std::collections::HashMap;

use crate::workflows::gzero::catalog::CriterionCategory;
use crate::workflows::gzero::domain::{AssessmentStatus, Decision, ProjectId};
use crate::workflows::gzero::gate::activity_gate;
use crate::workflows::gzero::repository::AssessmentRecord;
use crate::workflows::gzero::ScoringEngine;

use super::super::domain::{Activity, Project, Stakeholder};
use super::views::{
    BlockedProjectView, CategoryScoreEntry, DecisionMixEntry, PortfolioInsights, PortfolioSummary,
    StatusCountEntry,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct CategoryScore {
    pub total: f64,
    pub samples: usize,
}

/// Aggregation over repository snapshots. The aggregator and classifier are
/// re-run here with the canonical thresholds; nothing is read from cached
/// decision fields except the recorded status.
#[derive(Debug, Default)]
pub struct PortfolioReport {
    pub total_projects: usize,
    pub total_stakeholders: usize,
    pub total_activities: usize,
    pub assessments: usize,
    pub fully_scored: usize,
    pub status_counts: HashMap<AssessmentStatus, usize>,
    pub decision_mix: HashMap<Decision, usize>,
    pub category_scores: HashMap<CriterionCategory, CategoryScore>,
    pub blocked_projects: Vec<BlockedProjectView>,
}

impl PortfolioReport {
    pub fn build(
        projects: &[Project],
        stakeholders: &[Stakeholder],
        activities: &[Activity],
        assessments: &[AssessmentRecord],
        engine: &ScoringEngine,
    ) -> Self {
        let mut report = PortfolioReport {
            total_projects: projects.len(),
            total_stakeholders: stakeholders.len(),
            total_activities: activities.len(),
            assessments: assessments.len(),
            ..PortfolioReport::default()
        };

        let by_project: HashMap<&ProjectId, &AssessmentRecord> = assessments
            .iter()
            .map(|record| (&record.project_id, record))
            .collect();

        for record in assessments {
            *report.status_counts.entry(record.status).or_default() += 1;

            let summary = engine.evaluate(&record.scores);
            if summary.all_scored {
                report.fully_scored += 1;
            }

            // Unscored assessments stay pending rather than reading as no-go.
            let band = if record.scores.is_empty() {
                Decision::Pending
            } else {
                summary.decision
            };
            *report.decision_mix.entry(band).or_default() += 1;

            for contribution in &summary.contributions {
                if let Some(score) = contribution.score {
                    let entry = report
                        .category_scores
                        .entry(contribution.category)
                        .or_default();
                    entry.total += f64::from(score);
                    entry.samples += 1;
                }
            }
        }

        for project in projects {
            let record = by_project.get(&project.project_id).copied();
            let gate = activity_gate(record, engine);
            if !gate.allowed {
                report.blocked_projects.push(BlockedProjectView {
                    code: project.code.clone(),
                    name: project.name.clone(),
                    reason: gate.reason,
                });
            }
        }
        report.blocked_projects.sort_by(|a, b| a.code.cmp(&b.code));

        report
    }

    pub fn summary(&self) -> PortfolioSummary {
        let status_counts = AssessmentStatus::ordered()
            .into_iter()
            .filter_map(|status| {
                self.status_counts.get(&status).map(|count| StatusCountEntry {
                    status,
                    status_label: status.label(),
                    count: *count,
                })
            })
            .collect();

        let decision_mix = Decision::ordered()
            .into_iter()
            .filter_map(|decision| {
                self.decision_mix.get(&decision).map(|count| DecisionMixEntry {
                    decision,
                    decision_label: decision.label(),
                    count: *count,
                })
            })
            .collect();

        let category_scores = CriterionCategory::ordered()
            .into_iter()
            .filter_map(|category| {
                self.category_scores.get(&category).map(|score| {
                    let average = if score.samples == 0 {
                        0.0
                    } else {
                        score.total / score.samples as f64
                    };
                    CategoryScoreEntry {
                        category,
                        category_label: category.label(),
                        average_score: average,
                        samples: score.samples,
                    }
                })
            })
            .collect();

        PortfolioSummary {
            total_projects: self.total_projects,
            total_stakeholders: self.total_stakeholders,
            total_activities: self.total_activities,
            assessments: self.assessments,
            fully_scored: self.fully_scored,
            status_counts,
            decision_mix,
            category_scores,
            blocked_projects: self.blocked_projects.clone(),
        }
    }
}

impl PortfolioSummary {
    pub fn insights(&self) -> PortfolioInsights {
        super::generate_insights(self)
    }
}
