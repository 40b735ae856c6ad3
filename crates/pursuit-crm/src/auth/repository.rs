use super::domain::{UserAccount, UserId};

/// Storage abstraction for the user directory so the access service can be
/// exercised in isolation.
pub trait UserDirectory: Send + Sync {
    fn insert(&self, account: UserAccount) -> Result<UserAccount, DirectoryError>;
    fn update(&self, account: UserAccount) -> Result<(), DirectoryError>;
    fn fetch(&self, id: &UserId) -> Result<Option<UserAccount>, DirectoryError>;
    fn fetch_by_username(&self, username: &str) -> Result<Option<UserAccount>, DirectoryError>;
    fn list(&self) -> Result<Vec<UserAccount>, DirectoryError>;
}

/// Error enumeration for directory failures.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("user already exists")]
    Conflict,
    #[error("user not found")]
    NotFound,
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}
