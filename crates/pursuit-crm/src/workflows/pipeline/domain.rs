use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for registered projects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub String);

/// Identifier wrapper for stakeholders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StakeholderId(pub String);

/// Identifier wrapper for pursuit activities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityId(pub String);

/// External parties linkable to projects and pursuits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakeholderKind {
    Client,
    Consultant,
    Partner,
}

impl StakeholderKind {
    pub const fn ordered() -> [Self; 3] {
        [Self::Client, Self::Consultant, Self::Partner]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Client => "Client",
            Self::Consultant => "Consultant",
            Self::Partner => "Partner",
        }
    }
}

/// Whether a pursuit tracks a sales effort or delivery work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Sales,
    Delivery,
}

impl ActivityKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sales => "Sales",
            Self::Delivery => "Delivery",
        }
    }
}

/// A tracked business-development engagement. Activity creation under a
/// project is gated on its go/no-go assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: ProjectId,
    pub code: String,
    pub name: String,
    pub client: Option<StakeholderId>,
    pub owner: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stakeholder {
    pub stakeholder_id: StakeholderId,
    pub name: String,
    pub kind: StakeholderKind,
    pub contact: String,
    pub created_at: DateTime<Utc>,
}

/// A pursuit under a project, carrying its own comment log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub activity_id: ActivityId,
    pub project_id: ProjectId,
    pub name: String,
    pub kind: ActivityKind,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub comments: CommentLog,
}

/// One authored entry in an activity's discussion thread. System entries are
/// machine-generated workflow breadcrumbs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentEntry {
    pub seq: u64,
    pub author: String,
    pub posted_at: DateTime<Utc>,
    pub body: String,
    pub system: bool,
}

/// Append-only ordered log of authored, timestamped entries. Append is the
/// only mutation; ordering follows insertion sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentLog {
    entries: Vec<CommentEntry>,
}

impl CommentLog {
    pub fn append(
        &mut self,
        author: impl Into<String>,
        body: impl Into<String>,
        system: bool,
        posted_at: DateTime<Utc>,
    ) -> &CommentEntry {
        let entry = CommentEntry {
            seq: self.entries.len() as u64 + 1,
            author: author.into(),
            posted_at,
            body: body.into(),
            system,
        };
        self.entries.push(entry);
        self.entries.last().expect("entry just pushed")
    }

    pub fn entries(&self) -> &[CommentEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
