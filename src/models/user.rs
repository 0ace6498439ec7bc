//! User model

use serde::{Deserialize, Serialize};

/// A site account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Database ID
    pub id: i64,
    /// Username, unique
    pub username: String,
    /// Email address, unique
    pub email: String,
    /// Password hash (not serialized to JSON)
    #[serde(skip_serializing)]
    pub password: String,
    /// Admin accounts receive contact-form mail
    pub admin: bool,
}

impl User {
    /// Identity carried in the session token
    pub fn to_payload(&self) -> UserPayload {
        UserPayload {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }

    /// Serialize without id, password or admin flag (for API responses)
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Identity of the signed-in user as stored in the session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPayload {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl UserPayload {
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Public user info
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub username: String,
    pub email: String,
}
