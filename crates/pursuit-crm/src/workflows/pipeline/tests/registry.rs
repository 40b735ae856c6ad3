use super::common::*;
use crate::workflows::pipeline::domain::StakeholderId;
use crate::workflows::pipeline::import::PortfolioImporter;
use crate::workflows::pipeline::service::PipelineServiceError;

#[test]
fn duplicate_project_codes_are_rejected() {
    let (service, _, _) = build_service(StaticGate::open());

    service
        .create_project(new_project("PRJ-100", "Core Banking Replatform"), "taylor")
        .expect("first project stored");

    match service.create_project(new_project("PRJ-100", "Duplicate"), "taylor") {
        Err(PipelineServiceError::DuplicateCode(code)) => assert_eq!(code, "PRJ-100"),
        other => panic!("expected duplicate code, got {other:?}"),
    }
}

#[test]
fn project_client_must_exist() {
    let (service, _, _) = build_service(StaticGate::open());

    let mut request = new_project("PRJ-101", "Data Platform Tender");
    request.client = Some(StakeholderId("stk-999999".to_string()));

    match service.create_project(request, "taylor") {
        Err(PipelineServiceError::UnknownStakeholder(id)) => assert_eq!(id, "stk-999999"),
        other => panic!("expected unknown stakeholder, got {other:?}"),
    }
}

#[test]
fn blocked_gate_refuses_activity_creation_with_reason() {
    let (service, _, _) = build_service(StaticGate::closed(
        "assessment has no recorded scores",
    ));
    let project = service
        .create_project(new_project("PRJ-102", "Harbor Modernization"), "taylor")
        .expect("project stored");

    match service.create_activity(&project.project_id, new_activity("Kickoff pursuit"), "taylor") {
        Err(PipelineServiceError::ActivityBlocked { reason }) => {
            assert_eq!(reason, "assessment has no recorded scores");
        }
        other => panic!("expected blocked activity, got {other:?}"),
    }
}

#[test]
fn open_gate_creates_activity_with_system_comment() {
    let (service, _, audit) = build_service(StaticGate::open());
    let project = service
        .create_project(new_project("PRJ-103", "Regional ERP"), "taylor")
        .expect("project stored");

    let activity = service
        .create_activity(&project.project_id, new_activity("Proposal draft"), "taylor")
        .expect("activity created");

    assert_eq!(activity.comments.len(), 1);
    let first = &activity.comments.entries()[0];
    assert!(first.system);
    assert_eq!(first.seq, 1);
    assert!(first.body.contains("taylor"));

    assert!(audit
        .events()
        .iter()
        .any(|event| event.action == "activity_created"));
}

#[test]
fn comments_append_in_order_and_reject_empty_bodies() {
    let (service, _, _) = build_service(StaticGate::open());
    let project = service
        .create_project(new_project("PRJ-104", "Fleet Telemetry"), "taylor")
        .expect("project stored");
    let activity = service
        .create_activity(&project.project_id, new_activity("Client workshop"), "taylor")
        .expect("activity created");

    service
        .add_comment(&activity.activity_id, "riley", "Workshop booked for Tuesday")
        .expect("first comment");
    service
        .add_comment(&activity.activity_id, "taylor", "Agenda circulated")
        .expect("second comment");

    match service.add_comment(&activity.activity_id, "riley", "   ") {
        Err(PipelineServiceError::EmptyComment) => {}
        other => panic!("expected empty-comment refusal, got {other:?}"),
    }

    let comments = service
        .comments(&activity.activity_id)
        .expect("comments listed");
    assert_eq!(comments.len(), 3);
    let seqs: Vec<u64> = comments.iter().map(|entry| entry.seq).collect();
    assert_eq!(seqs, vec![1, 2, 3]);
    assert_eq!(comments[1].author, "riley");
    assert!(!comments[1].system);
}

#[test]
fn search_matches_across_entities_case_insensitively() {
    let (service, _, _) = build_service(StaticGate::open());
    service
        .register_stakeholder(new_stakeholder("Northwind Utilities"), "taylor")
        .expect("stakeholder stored");
    let project = service
        .create_project(new_project("PRJ-105", "Northwind Billing Revamp"), "taylor")
        .expect("project stored");
    service
        .create_activity(&project.project_id, new_activity("northwind demo"), "taylor")
        .expect("activity created");

    let results = service.search("NORTHWIND").expect("search runs");
    assert_eq!(results.projects.len(), 1);
    assert_eq!(results.stakeholders.len(), 1);
    assert_eq!(results.activities.len(), 1);

    let empty = service.search("   ").expect("search runs");
    assert!(empty.projects.is_empty());
    assert!(empty.stakeholders.is_empty());
    assert!(empty.activities.is_empty());
}

#[test]
fn portfolio_import_dedupes_by_code_and_client_name() {
    let (service, _, _) = build_service(StaticGate::open());
    let csv = "Project Code,Project Name,Client,Client Kind,Owner\n\
PRJ-200,Warehouse Automation,Globex,client,casey\n\
PRJ-201,Fulfillment Analytics,Globex,client,casey\n\
PRJ-200,Warehouse Automation Again,Globex,client,casey\n";
    let rows = PortfolioImporter::from_reader(std::io::Cursor::new(csv)).expect("rows parse");

    let summary = service.import_portfolio(rows, "casey").expect("import runs");

    assert_eq!(summary.projects_created, 2);
    assert_eq!(summary.stakeholders_created, 1);
    assert_eq!(summary.skipped, 1);

    let stakeholders = service.list_stakeholders().expect("list");
    assert_eq!(stakeholders.len(), 1);
    let projects = service.list_projects().expect("list");
    assert!(projects
        .iter()
        .all(|project| project.client == Some(stakeholders[0].stakeholder_id.clone())));
}
