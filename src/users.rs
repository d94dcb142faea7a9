//! BD users and their roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contacts::email_re;
use crate::error::{CrmError, CrmResult};
use crate::types::AppRole;

/// A row from the `profiles` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Up to two uppercase initials, e.g. "Ana Ruiz" -> "AR".
    pub fn initials(&self) -> String {
        self.full_name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

/// Input for registering a BD user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub id: String,
    pub email: String,
    pub full_name: String,
}

impl NewProfile {
    pub fn into_profile(self, as_of: DateTime<Utc>) -> CrmResult<Profile> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(CrmError::InvalidInput("id: User id is required".into()));
        }
        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            return Err(CrmError::InvalidInput("full_name: Name is required".into()));
        }
        let email = self.email.trim();
        if !email_re().is_match(email) {
            return Err(CrmError::InvalidInput(
                "email: Please enter a valid email address".into(),
            ));
        }
        Ok(Profile {
            id: id.to_string(),
            email: email.to_string(),
            full_name: full_name.to_string(),
            is_active: true,
            created_at: as_of,
            updated_at: as_of,
        })
    }
}

/// True if `roles` (a user's granted roles) includes `role`.
pub fn has_role(roles: &[AppRole], role: AppRole) -> bool {
    roles.contains(&role)
}
