//! User identity types returned by the authentication endpoints.

use serde::{Deserialize, Deserializer, Serialize};

/// Role assigned to an account at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Moderator,
    Admin,
}

impl Role {
    /// Moderation surfaces are available to moderators and admins alike.
    pub fn is_moderator(&self) -> bool {
        matches!(self, Role::Moderator | Role::Admin)
    }

    /// Wire representation used in the register request body.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

/// The authenticated user's profile, owned exclusively by the session.
///
/// Created by a successful login or by resolving a persisted token through
/// `GET /auth/me`; destroyed on logout or credential rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// `/auth/login` returns the id as a JSON integer while `/auth/me`
    /// echoes the JWT identity, which is a string. Accept both.
    #[serde(deserialize_with = "deserialize_user_id")]
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

fn deserialize_user_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Number(i64),
        Text(String),
    }

    match IdRepr::deserialize(deserializer)? {
        IdRepr::Number(n) => Ok(n),
        IdRepr::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
