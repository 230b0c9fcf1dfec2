use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::Identity;

/// Local account linked one-to-one with an identity provider subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub subject_id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for first-login provisioning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub subject_id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

impl From<&Identity> for NewUser {
    fn from(identity: &Identity) -> Self {
        Self {
            subject_id: identity.subject_id.clone(),
            email: identity.email.clone(),
            name: identity.display_name.clone(),
            avatar: identity.avatar_url.clone(),
        }
    }
}
