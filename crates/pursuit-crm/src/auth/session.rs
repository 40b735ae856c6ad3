use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Role, UserId};

/// Opaque bearer token attached to every authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(pub String);

/// Server-side session state hydrated from the token on each request and torn
/// down explicitly on logout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: SessionToken,
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
}

/// Storage abstraction for live sessions.
pub trait SessionStore: Send + Sync {
    fn insert(&self, session: Session) -> Result<(), SessionError>;
    fn resolve(&self, token: &SessionToken) -> Result<Option<Session>, SessionError>;
    fn revoke(&self, token: &SessionToken) -> Result<bool, SessionError>;
    fn revoke_user(&self, user_id: &UserId) -> Result<usize, SessionError>;
}

/// Error enumeration for session store failures.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

static TOKEN_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Tokens are opaque server-minted identifiers; no cryptographic scheme is
/// implied or required here.
pub(crate) fn mint_token() -> SessionToken {
    let sequence = TOKEN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionToken(format!(
        "pct-{sequence:06}-{:x}",
        Utc::now().timestamp_micros()
    ))
}
