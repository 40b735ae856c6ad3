use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::audit::{AuditError, AuditEvent, AuditSink};

use super::domain::{Role, UserAccount, UserId};
use super::repository::{DirectoryError, UserDirectory};
use super::session::{mint_token, Session, SessionError, SessionStore, SessionToken};

/// Service composing the user directory, session store, and audit trail.
pub struct AccessService<D, S, A> {
    directory: Arc<D>,
    sessions: Arc<S>,
    audit: Arc<A>,
}

/// Request payload for registering a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub access_code: String,
}

static USER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_user_id() -> UserId {
    let id = USER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    UserId(format!("usr-{id:06}"))
}

impl<D, S, A> AccessService<D, S, A>
where
    D: UserDirectory + 'static,
    S: SessionStore + 'static,
    A: AuditSink + 'static,
{
    pub fn new(directory: Arc<D>, sessions: Arc<S>, audit: Arc<A>) -> Self {
        Self {
            directory,
            sessions,
            audit,
        }
    }

    /// Exchange credentials for a bearer session. Failure modes are folded
    /// into `InvalidCredentials` except for disabled accounts.
    pub fn login(&self, username: &str, access_code: &str) -> Result<Session, AccessError> {
        let account = self
            .directory
            .fetch_by_username(username.trim())?
            .ok_or(AccessError::InvalidCredentials)?;

        if account.access_code != access_code {
            return Err(AccessError::InvalidCredentials);
        }
        if !account.active {
            return Err(AccessError::AccountDisabled);
        }

        let session = Session {
            token: mint_token(),
            user_id: account.user_id.clone(),
            username: account.username.clone(),
            role: account.role,
            issued_at: Utc::now(),
        };
        self.sessions.insert(session.clone())?;

        self.audit.record(
            AuditEvent::new(
                account.username.as_str(),
                "session_opened",
                account.user_id.0.clone(),
            )
            .detail("role", account.role.label()),
        )?;

        Ok(session)
    }

    /// Tear down a session. Returns false when the token was already gone.
    pub fn logout(&self, token: &SessionToken, actor: &str) -> Result<bool, AccessError> {
        let revoked = self.sessions.revoke(token)?;
        if revoked {
            self.audit
                .record(AuditEvent::new(actor, "session_closed", token.0.clone()))?;
        }
        Ok(revoked)
    }

    pub fn create_user(&self, request: NewUser, actor: &str) -> Result<UserAccount, AccessError> {
        let username = request.username.trim().to_string();
        if username.is_empty() {
            return Err(AccessError::EmptyUsername);
        }
        if request.access_code.trim().is_empty() {
            return Err(AccessError::EmptyAccessCode);
        }
        if self.directory.fetch_by_username(&username)?.is_some() {
            return Err(AccessError::UsernameTaken(username));
        }

        let account = UserAccount {
            user_id: next_user_id(),
            username,
            display_name: request.display_name,
            role: request.role,
            access_code: request.access_code,
            active: true,
        };
        let stored = self.directory.insert(account)?;

        self.audit.record(
            AuditEvent::new(actor, "user_created", stored.user_id.0.clone())
                .detail("username", stored.username.clone())
                .detail("role", stored.role.label()),
        )?;

        Ok(stored)
    }

    /// Disable an account and drop any sessions it still holds.
    pub fn deactivate_user(&self, user_id: &UserId, actor: &str) -> Result<UserAccount, AccessError> {
        let mut account = self
            .directory
            .fetch(user_id)?
            .ok_or_else(|| AccessError::UnknownUser(user_id.0.clone()))?;

        account.active = false;
        self.directory.update(account.clone())?;
        let dropped = self.sessions.revoke_user(user_id)?;

        self.audit.record(
            AuditEvent::new(actor, "user_deactivated", account.user_id.0.clone())
                .detail("sessions_revoked", dropped.to_string()),
        )?;

        Ok(account)
    }

    pub fn list_users(&self) -> Result<Vec<UserAccount>, AccessError> {
        Ok(self.directory.list()?)
    }
}

/// Error raised by the access service.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("invalid username or access code")]
    InvalidCredentials,
    #[error("account is disabled")]
    AccountDisabled,
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("access code must not be empty")]
    EmptyAccessCode,
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),
    #[error("user '{0}' is not registered")]
    UnknownUser(String),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Audit(#[from] AuditError),
}
