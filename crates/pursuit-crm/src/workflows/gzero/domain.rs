use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use crate::workflows::pipeline::domain::ProjectId;

/// Identifier wrapper for go/no-go assessments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

/// Lifecycle status of an assessment. Transition legality is enforced by the
/// service, never by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Draft,
    Submitted,
    UnderReview,
    Approved,
    Conditional,
    Rejected,
}

impl AssessmentStatus {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Draft,
            Self::Submitted,
            Self::UnderReview,
            Self::Approved,
            Self::Conditional,
            Self::Rejected,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Submitted => "Submitted",
            Self::UnderReview => "Under Review",
            Self::Approved => "Approved",
            Self::Conditional => "Conditional",
            Self::Rejected => "Rejected",
        }
    }
}

/// Go/no-go decision bands. `Pending` is the stored state before a reviewer
/// records an outcome; the classifier only ever produces the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Pending,
    Go,
    ConditionalGo,
    NoGo,
}

impl Decision {
    pub const fn ordered() -> [Self; 4] {
        [Self::Pending, Self::Go, Self::ConditionalGo, Self::NoGo]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Go => "Go",
            Self::ConditionalGo => "Conditional Go",
            Self::NoGo => "No Go",
        }
    }
}

/// One recorded score against a catalog criterion. Assessments keep exactly
/// one entry per criterion; later writes overwrite earlier ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub criterion_id: String,
    pub score: u8,
    #[serde(default)]
    pub comment: String,
}

/// Follow-up item attached to a conditional-go decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionItem {
    pub condition: String,
    #[serde(default)]
    pub responsible_id: Option<String>,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub notes: String,
    pub status: ConditionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionStatus {
    Pending,
    Met,
    NotMet,
}

impl ConditionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Met => "Met",
            Self::NotMet => "Not Met",
        }
    }
}
