use serde::{Deserialize, Serialize};

/// Identifier wrapper for registered users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Closed set of roles recognized by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    CLevel,
    Manager,
    Contributor,
}

impl Role {
    pub const fn ordered() -> [Self; 4] {
        [Self::Admin, Self::CLevel, Self::Manager, Self::Contributor]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::CLevel => "C-Level",
            Self::Manager => "Manager",
            Self::Contributor => "Contributor",
        }
    }

    /// Authorization predicate over the closed capability set.
    pub const fn permits(self, capability: Capability) -> bool {
        match (self, capability) {
            (Role::Admin, _) => true,
            (
                Role::CLevel,
                Capability::ApproveAssessment | Capability::ViewAnalytics | Capability::ViewAudit,
            ) => true,
            (
                Role::Manager,
                Capability::EditScores | Capability::SubmitAssessment | Capability::ManagePipeline,
            ) => true,
            (Role::Contributor, Capability::EditScores) => true,
            _ => false,
        }
    }
}

/// Actions that routes guard on, independent of any role naming scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    EditScores,
    SubmitAssessment,
    ApproveAssessment,
    ManagePipeline,
    ViewAnalytics,
    ViewAudit,
    ManageUsers,
}

impl Capability {
    pub const fn label(self) -> &'static str {
        match self {
            Self::EditScores => "edit assessment scores",
            Self::SubmitAssessment => "submit assessments",
            Self::ApproveAssessment => "review and approve assessments",
            Self::ManagePipeline => "manage the pipeline registry",
            Self::ViewAnalytics => "view portfolio analytics",
            Self::ViewAudit => "view the audit trail",
            Self::ManageUsers => "administer user accounts",
        }
    }
}

/// Directory record for a platform user. The access code is an opaque
/// server-held secret, never exposed through views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub user_id: UserId,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub access_code: String,
    pub active: bool,
}

impl UserAccount {
    pub fn view(&self) -> UserView {
        UserView {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
            role_label: self.role.label(),
            active: self.active,
        }
    }
}

/// Sanitized representation of a user account for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub user_id: UserId,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub role_label: &'static str,
    pub active: bool,
}
