use super::domain::{AssessmentStatus, Decision};

/// Transition violations surfaced to callers as typed errors rather than
/// trusted-client conventions.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum LifecycleError {
    #[error("cannot {action} an assessment in status {from:?}")]
    IllegalTransition {
        from: AssessmentStatus,
        action: &'static str,
    },
    #[error("cannot submit with {scored} of {total} criteria scored")]
    IncompleteScores { scored: usize, total: usize },
    #[error("a reviewer cannot record a {0:?} decision")]
    InvalidDecision(Decision),
    #[error("conditions may only accompany a conditional-go decision")]
    UnexpectedConditions,
}

/// Submission is idempotent from `Submitted`; everything past review is
/// final unless reverted to draft first.
pub(crate) fn ensure_can_submit(status: AssessmentStatus) -> Result<(), LifecycleError> {
    match status {
        AssessmentStatus::Draft | AssessmentStatus::Submitted => Ok(()),
        from => Err(LifecycleError::IllegalTransition {
            from,
            action: "submit",
        }),
    }
}

pub(crate) fn ensure_can_start_review(status: AssessmentStatus) -> Result<(), LifecycleError> {
    match status {
        AssessmentStatus::Submitted => Ok(()),
        from => Err(LifecycleError::IllegalTransition {
            from,
            action: "start review on",
        }),
    }
}

pub(crate) fn ensure_can_decide(status: AssessmentStatus) -> Result<(), LifecycleError> {
    match status {
        AssessmentStatus::Submitted | AssessmentStatus::UnderReview => Ok(()),
        from => Err(LifecycleError::IllegalTransition {
            from,
            action: "record a decision on",
        }),
    }
}

pub(crate) fn status_for_decision(decision: Decision) -> Result<AssessmentStatus, LifecycleError> {
    match decision {
        Decision::Go => Ok(AssessmentStatus::Approved),
        Decision::ConditionalGo => Ok(AssessmentStatus::Conditional),
        Decision::NoGo => Ok(AssessmentStatus::Rejected),
        Decision::Pending => Err(LifecycleError::InvalidDecision(Decision::Pending)),
    }
}
