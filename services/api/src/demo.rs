use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, Local};
use clap::Args;

use pursuit_crm::config::AppConfig;
use pursuit_crm::error::AppError;
use pursuit_crm::workflows::gzero::{
    ActivityGatekeeper, ConditionItem, ConditionStatus, Decision, GzeroAssessmentService,
    ScoreEntry,
};
use pursuit_crm::workflows::pipeline::{
    ActivityKind, NewActivity, NewProject, NewStakeholder, PipelineService, PortfolioImporter,
    PortfolioReport,
};

use crate::infra::{
    scoring_engine, InMemoryAssessmentRepository, InMemoryAuditLog, InMemoryPipelineRepository,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Optional portfolio CSV export to hydrate the registry
    #[arg(long)]
    pub(crate) portfolio_csv: Option<PathBuf>,
}

pub(crate) fn run_catalog() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let engine = scoring_engine(&config);
    let catalog = engine.catalog();

    println!("G0 criterion catalog");
    for criterion in catalog.criteria() {
        println!(
            "- {:<24} {:<20} weight {:>5.1}  scores {:?}",
            criterion.key,
            criterion.category.label(),
            criterion.weight,
            criterion.allowed_scores
        );
    }
    println!("Weight total: {:.2}", catalog.weight_total());
    match catalog.weight_warning() {
        Some(warning) => println!("WARNING: {warning}"),
        None => println!("Weight check: ok"),
    }
    println!(
        "Thresholds: go >= {:.2}, conditional >= {:.2}",
        engine.thresholds().go,
        engine.thresholds().conditional
    );

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;

    let assessments = Arc::new(InMemoryAssessmentRepository::default());
    let registry = Arc::new(InMemoryPipelineRepository::default());
    let audit = Arc::new(InMemoryAuditLog::default());
    let gzero = Arc::new(GzeroAssessmentService::new(
        assessments.clone(),
        audit.clone(),
        scoring_engine(&config),
    ));
    let pipeline = PipelineService::new(registry.clone(), gzero.clone(), audit.clone());

    println!("Pursuit CRM workflow demo");

    if let Some(path) = args.portfolio_csv {
        let rows = PortfolioImporter::from_path(path)?;
        match pipeline.import_portfolio(rows, "demo") {
            Ok(summary) => println!(
                "Imported portfolio: {} project(s), {} stakeholder(s), {} duplicate(s) skipped",
                summary.projects_created, summary.stakeholders_created, summary.skipped
            ),
            Err(err) => println!("Portfolio import failed: {err}"),
        }
    } else {
        let client = match pipeline.register_stakeholder(
            NewStakeholder {
                name: "Northwind Utilities".to_string(),
                kind: pursuit_crm::workflows::pipeline::StakeholderKind::Client,
                contact: "procurement@northwind.example".to_string(),
            },
            "demo",
        ) {
            Ok(stakeholder) => stakeholder,
            Err(err) => {
                println!("Could not seed demo stakeholder: {err}");
                return Ok(());
            }
        };
        if let Err(err) = pipeline.create_project(
            NewProject {
                code: "PRJ-001".to_string(),
                name: "Regional ERP Replacement".to_string(),
                client: Some(client.stakeholder_id),
                owner: "taylor".to_string(),
            },
            "demo",
        ) {
            println!("Could not seed demo project: {err}");
            return Ok(());
        }
    }

    let projects = match pipeline.list_projects() {
        Ok(projects) if !projects.is_empty() => projects,
        Ok(_) => {
            println!("No projects available to assess");
            return Ok(());
        }
        Err(err) => {
            println!("Registry unavailable: {err}");
            return Ok(());
        }
    };
    let project = &projects[0];
    println!(
        "\nAssessing project {} ({}) owned by {}",
        project.code, project.name, project.owner
    );

    let record = match gzero.assessment_for_project(&project.project_id, "taylor") {
        Ok(record) => record,
        Err(err) => {
            println!("Assessment unavailable: {err}");
            return Ok(());
        }
    };
    println!(
        "Created assessment {} in status {}",
        record.assessment_id.0,
        record.status.label()
    );

    // Partial scoring first, to show the gate and the submit guard.
    let partial = demo_scores()
        .into_iter()
        .take(3)
        .collect::<Vec<ScoreEntry>>();
    if let Err(err) = gzero.save_scores(&record.assessment_id, partial, false, "taylor") {
        println!("Could not save partial scores: {err}");
        return Ok(());
    }

    match gzero.activity_gate(&project.project_id) {
        Ok(gate) => println!(
            "Activity gate after partial scoring: {} ({})",
            if gate.allowed { "open" } else { "blocked" },
            gate.reason
        ),
        Err(err) => println!("Gate unavailable: {err}"),
    }

    match gzero.submit(&record.assessment_id, "taylor") {
        Ok(_) => println!("Unexpected: partial submission accepted"),
        Err(err) => println!("Submission refused as expected: {err}"),
    }

    // Full scoring.
    if let Err(err) = gzero.save_scores(&record.assessment_id, demo_scores(), false, "taylor") {
        println!("Could not save full scores: {err}");
        return Ok(());
    }
    let summary = match gzero.preview(demo_scores(), None) {
        Ok(summary) => summary,
        Err(err) => {
            println!("Scoring unavailable: {err}");
            return Ok(());
        }
    };
    println!(
        "\nWeighted total {:.2} of {:.2} ({}/{} criteria) -> {}",
        summary.weighted_total,
        summary.max_possible,
        summary.scored_criteria,
        summary.total_criteria,
        summary.decision.label()
    );
    println!("Contributions by criterion:");
    for contribution in &summary.contributions {
        if let Some(score) = contribution.score {
            println!(
                "  - {:<24} score {} x {:>4.1}% = {:.3}",
                contribution.criterion_id, score, contribution.weight, contribution.weighted
            );
        }
    }

    let submitted = match gzero.submit(&record.assessment_id, "taylor") {
        Ok(record) => record,
        Err(err) => {
            println!("Submission failed: {err}");
            return Ok(());
        }
    };
    println!(
        "\nSubmitted for review; status {}",
        submitted.status.label()
    );

    match gzero.pending_queue(10) {
        Ok(queue) => println!("Pending approvals queue holds {} item(s)", queue.len()),
        Err(err) => println!("Queue unavailable: {err}"),
    }

    if let Err(err) = gzero.start_review(&record.assessment_id, "morgan") {
        println!("Review could not start: {err}");
        return Ok(());
    }

    let conditions = if summary.decision == Decision::ConditionalGo {
        vec![ConditionItem {
            condition: "Confirm budget line with the client CFO".to_string(),
            responsible_id: Some("usr-taylor".to_string()),
            due_date: Local::now().date_naive() + Duration::days(30),
            notes: "Raised during G0 review".to_string(),
            status: ConditionStatus::Pending,
        }]
    } else {
        Vec::new()
    };

    let decided = match gzero.decide(&record.assessment_id, summary.decision, conditions, "morgan")
    {
        Ok(record) => record,
        Err(err) => {
            println!("Decision failed: {err}");
            return Ok(());
        }
    };
    println!(
        "Reviewer recorded {} -> status {} ({} condition(s))",
        decided.decision.label(),
        decided.status.label(),
        decided.conditions.len()
    );

    match pipeline.create_activity(
        &project.project_id,
        NewActivity {
            name: "Proposal sprint".to_string(),
            kind: ActivityKind::Sales,
        },
        "taylor",
    ) {
        Ok(activity) => {
            println!("\nActivity {} created under {}", activity.name, project.code);
            if let Err(err) =
                pipeline.add_comment(&activity.activity_id, "riley", "Storyboard review booked")
            {
                println!("Comment failed: {err}");
            }
            match pipeline.comments(&activity.activity_id) {
                Ok(comments) => {
                    println!("Comment log:");
                    for comment in comments {
                        let origin = if comment.system { "system" } else { "user" };
                        println!(
                            "  {}. [{origin}] {}: {}",
                            comment.seq, comment.author, comment.body
                        );
                    }
                }
                Err(err) => println!("Comments unavailable: {err}"),
            }
        }
        Err(err) => println!("\nActivity creation blocked: {err}"),
    }

    render_portfolio(&registry, &assessments, &config)?;

    let events = audit.events();
    println!("\nAudit trail ({} event(s), most recent last):", events.len());
    for event in events.iter().rev().take(8).rev() {
        println!("  - {} {} {}", event.actor, event.action, event.entity);
    }

    Ok(())
}

fn render_portfolio(
    registry: &Arc<InMemoryPipelineRepository>,
    assessments: &Arc<InMemoryAssessmentRepository>,
    config: &AppConfig,
) -> Result<(), AppError> {
    use pursuit_crm::workflows::gzero::AssessmentRepository;
    use pursuit_crm::workflows::pipeline::PipelineRepository;

    let engine = scoring_engine(config);
    let (projects, stakeholders, activities, records) = match (
        registry.list_projects(),
        registry.list_stakeholders(),
        registry.list_activities(),
        assessments.all(),
    ) {
        (Ok(p), Ok(s), Ok(a), Ok(r)) => (p, s, a, r),
        _ => {
            println!("\nPortfolio snapshot unavailable");
            return Ok(());
        }
    };

    let summary =
        PortfolioReport::build(&projects, &stakeholders, &activities, &records, &engine).summary();
    let insights = summary.insights();

    println!("\nPortfolio snapshot");
    println!(
        "- {} project(s), {} stakeholder(s), {} activity(ies)",
        summary.total_projects, summary.total_stakeholders, summary.total_activities
    );
    for entry in &summary.decision_mix {
        println!("- {}: {}", entry.decision_label, entry.count);
    }
    if summary.blocked_projects.is_empty() {
        println!("- Gated projects: none");
    } else {
        println!("- Gated projects:");
        for blocked in &summary.blocked_projects {
            println!("    {} ({})", blocked.code, blocked.reason);
        }
    }

    println!(
        "Health: {} | go rate {:.0}%",
        insights.health_label, insights.go_rate_pct
    );
    for note in &insights.observations {
        println!("  note: {note}");
    }
    for action in &insights.recommended_actions {
        println!("  next: {action}");
    }

    Ok(())
}

/// A realistic mixed scorecard: weighted total 2.40, a conditional go under
/// the default thresholds.
fn demo_scores() -> Vec<ScoreEntry> {
    let raw: &[(&str, u8, &str)] = &[
        ("strategic_fit", 3, "Anchors the utilities growth plan"),
        ("account_growth", 2, "Phase two scope plausible"),
        ("reference_value", 3, "First regulated-market reference"),
        ("client_relationship", 2, "Two warm contacts, no sponsor yet"),
        ("decision_maker_access", 3, "CFO joined the briefing"),
        ("budget_confirmed", 3, "Budget line approved in April"),
        ("competitive_position", 2, "Two credible rivals"),
        ("incumbent_advantage", 1, "Rival holds the AMS contract"),
        ("deal_size", 2, "Mid-band contract value"),
        ("margin_potential", 2, "Rate card under pressure"),
        ("payment_risk", 3, "Public utility, prompt payer"),
        ("delivery_capacity", 2, "Staffing tight in Q3"),
        ("domain_expertise", 3, "Deep utilities bench"),
        ("contract_risk", 3, "Standard master agreement"),
    ];

    raw.iter()
        .map(|(criterion_id, score, comment)| ScoreEntry {
            criterion_id: (*criterion_id).to_string(),
            score: *score,
            comment: (*comment).to_string(),
        })
        .collect()
}
