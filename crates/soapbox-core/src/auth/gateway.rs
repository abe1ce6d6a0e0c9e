//! Network seam for the authentication endpoints.
//!
//! The session state machine talks to the backend through this trait so its
//! transition logic can be exercised against an in-memory fake. `ApiClient`
//! provides the real implementation.

use async_trait::async_trait;

use crate::api::ApiError;
use crate::models::{Profile, Role};

/// A successful login: the bearer token plus the profile it belongs to.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: Profile,
}

#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// `POST /auth/login`. No token is attached.
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ApiError>;

    /// `POST /auth/register`. Success carries no payload and does not
    /// authenticate; the caller routes the user to the login form.
    async fn register(&self, email: &str, password: &str, role: Role) -> Result<(), ApiError>;

    /// `GET /auth/me`. Resolves a bearer token into the profile it proves.
    async fn current_user(&self, token: &str) -> Result<Profile, ApiError>;
}
