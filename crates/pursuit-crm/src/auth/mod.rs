//! Bearer-token session handling and the closed role/capability model.

pub mod domain;
pub mod extract;
pub mod repository;
pub mod router;
pub mod service;
pub mod session;

pub use domain::{Capability, Role, UserAccount, UserId, UserView};
pub use extract::{AuthContext, AuthRejection, Authenticated};
pub use repository::{DirectoryError, UserDirectory};
pub use router::{auth_router, session_router, user_admin_router};
pub use service::{AccessError, AccessService, NewUser};
pub use session::{Session, SessionError, SessionStore, SessionToken};
