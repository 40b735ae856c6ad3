use chrono::NaiveDate;

use super::common::*;
use crate::workflows::gzero::domain::{
    AssessmentStatus, ConditionItem, ConditionStatus, Decision,
};
use crate::workflows::gzero::lifecycle::LifecycleError;
use crate::workflows::gzero::service::GzeroServiceError;

fn condition(text: &str) -> ConditionItem {
    ConditionItem {
        condition: text.to_string(),
        responsible_id: Some("usr-000002".to_string()),
        due_date: NaiveDate::from_ymd_opt(2026, 9, 30).expect("valid date"),
        notes: String::new(),
        status: ConditionStatus::Pending,
    }
}

#[test]
fn first_visit_creates_a_draft_and_second_visit_reuses_it() {
    let (service, _, audit) = build_service();
    let project_id = project("prj-first");

    let created = service
        .assessment_for_project(&project_id, "taylor")
        .expect("assessment created");
    assert_eq!(created.status, AssessmentStatus::Draft);
    assert_eq!(created.decision, Decision::Pending);
    assert!(created.scores.is_empty());

    let fetched = service
        .assessment_for_project(&project_id, "taylor")
        .expect("assessment fetched");
    assert_eq!(fetched.assessment_id, created.assessment_id);

    let creations = audit
        .events()
        .iter()
        .filter(|event| event.action == "assessment_created")
        .count();
    assert_eq!(creations, 1);
}

#[test]
fn submit_requires_every_criterion_scored() {
    let (service, _, _) = build_service();
    let id = scored_assessment(
        &service,
        &project("prj-incomplete"),
        vec![
            entry("strategic_fit", 3),
            entry("client_relationship", 2),
            entry("deal_size", 2),
        ],
    );

    match service.submit(&id, "taylor") {
        Err(GzeroServiceError::Lifecycle(LifecycleError::IncompleteScores { scored, total })) => {
            assert_eq!(scored, 3);
            assert_eq!(total, 14);
        }
        other => panic!("expected incomplete-scores refusal, got {other:?}"),
    }
}

#[test]
fn submit_is_idempotent_from_submitted() {
    let (service, _, _) = build_service();
    let id = scored_assessment(&service, &project("prj-resubmit"), uniform_scores(3));

    let first = service.submit(&id, "taylor").expect("first submit");
    assert_eq!(first.status, AssessmentStatus::Submitted);

    let second = service.submit(&id, "taylor").expect("second submit");
    assert_eq!(second.status, AssessmentStatus::Submitted);
}

#[test]
fn decision_from_draft_is_rejected() {
    let (service, _, _) = build_service();
    let id = scored_assessment(&service, &project("prj-early"), uniform_scores(3));

    match service.decide(&id, Decision::Go, Vec::new(), "morgan") {
        Err(GzeroServiceError::Lifecycle(LifecycleError::IllegalTransition { from, .. })) => {
            assert_eq!(from, AssessmentStatus::Draft);
        }
        other => panic!("expected illegal transition, got {other:?}"),
    }
}

#[test]
fn review_and_approval_walk_the_state_machine() {
    let (service, _, audit) = build_service();
    let id = scored_assessment(&service, &project("prj-approve"), uniform_scores(3));

    service.submit(&id, "taylor").expect("submitted");
    let reviewing = service.start_review(&id, "morgan").expect("review started");
    assert_eq!(reviewing.status, AssessmentStatus::UnderReview);

    let decided = service
        .decide(&id, Decision::Go, Vec::new(), "morgan")
        .expect("decision recorded");
    assert_eq!(decided.status, AssessmentStatus::Approved);
    assert_eq!(decided.decision, Decision::Go);

    let decision_events: Vec<_> = audit
        .events()
        .into_iter()
        .filter(|event| event.action == "decision_recorded")
        .collect();
    assert_eq!(decision_events.len(), 1);
    assert_eq!(
        decision_events[0].details.get("decision").map(String::as_str),
        Some("Go")
    );
}

#[test]
fn conditional_decision_stores_conditions() {
    let (service, _, _) = build_service();
    let id = scored_assessment(
        &service,
        &project("prj-conditional"),
        scores_at_conditional_threshold(),
    );

    service.submit(&id, "taylor").expect("submitted");
    let decided = service
        .decide(
            &id,
            Decision::ConditionalGo,
            vec![condition("Confirm budget line with client CFO")],
            "morgan",
        )
        .expect("conditional decision recorded");

    assert_eq!(decided.status, AssessmentStatus::Conditional);
    assert_eq!(decided.conditions.len(), 1);
    assert_eq!(decided.conditions[0].status, ConditionStatus::Pending);
}

#[test]
fn conditions_are_rejected_outside_conditional_go() {
    let (service, _, _) = build_service();
    let id = scored_assessment(&service, &project("prj-badcond"), uniform_scores(3));
    service.submit(&id, "taylor").expect("submitted");

    match service.decide(&id, Decision::Go, vec![condition("n/a")], "morgan") {
        Err(GzeroServiceError::Lifecycle(LifecycleError::UnexpectedConditions)) => {}
        other => panic!("expected unexpected-conditions error, got {other:?}"),
    }
}

#[test]
fn pending_is_not_a_recordable_decision() {
    let (service, _, _) = build_service();
    let id = scored_assessment(&service, &project("prj-pending"), uniform_scores(3));
    service.submit(&id, "taylor").expect("submitted");

    match service.decide(&id, Decision::Pending, Vec::new(), "morgan") {
        Err(GzeroServiceError::Lifecycle(LifecycleError::InvalidDecision(Decision::Pending))) => {}
        other => panic!("expected invalid decision, got {other:?}"),
    }
}

#[test]
fn revert_to_draft_clears_decision_and_conditions() {
    let (service, _, _) = build_service();
    let id = scored_assessment(
        &service,
        &project("prj-revert"),
        scores_at_conditional_threshold(),
    );
    service.submit(&id, "taylor").expect("submitted");
    service
        .decide(
            &id,
            Decision::ConditionalGo,
            vec![condition("Staffing plan sign-off")],
            "morgan",
        )
        .expect("decision recorded");

    let reverted = service
        .save_scores(&id, vec![entry("deal_size", 2)], true, "taylor")
        .expect("revert saved");

    assert_eq!(reverted.status, AssessmentStatus::Draft);
    assert_eq!(reverted.decision, Decision::Pending);
    assert!(reverted.conditions.is_empty());
}

#[test]
fn save_without_revert_keeps_current_status() {
    let (service, _, _) = build_service();
    let id = scored_assessment(&service, &project("prj-keep"), uniform_scores(3));
    service.submit(&id, "taylor").expect("submitted");

    let saved = service
        .save_scores(&id, vec![entry("margin_potential", 2)], false, "taylor")
        .expect("scores saved");

    assert_eq!(saved.status, AssessmentStatus::Submitted);
}

#[test]
fn pending_queue_lists_submitted_and_under_review() {
    let (service, _, _) = build_service();

    let submitted = scored_assessment(&service, &project("prj-q1"), uniform_scores(3));
    service.submit(&submitted, "taylor").expect("submitted");

    let reviewing = scored_assessment(&service, &project("prj-q2"), uniform_scores(3));
    service.submit(&reviewing, "taylor").expect("submitted");
    service.start_review(&reviewing, "morgan").expect("review");

    // Still in draft, must not appear.
    scored_assessment(&service, &project("prj-q3"), uniform_scores(3));

    let queue = service.pending_queue(10).expect("queue lists");
    assert_eq!(queue.len(), 2);
}

#[test]
fn invalid_score_value_is_rejected_on_save() {
    use crate::workflows::gzero::catalog::ScoreError;

    let (service, _, _) = build_service();
    let record = service
        .assessment_for_project(&project("prj-badscore"), "taylor")
        .expect("assessment created");

    match service.save_scores(
        &record.assessment_id,
        vec![entry("budget_confirmed", 2)],
        false,
        "taylor",
    ) {
        Err(GzeroServiceError::Score(ScoreError::DisallowedScore { criterion, .. })) => {
            assert_eq!(criterion, "budget_confirmed");
        }
        other => panic!("expected disallowed score, got {other:?}"),
    }
}
