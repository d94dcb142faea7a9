// User service: registration and role grants.
// A new user starts as a BD user; only an admin hands out further roles.

use chrono::{DateTime, Utc};

use super::require_admin;
use crate::db::CrmDb;
use crate::error::{CrmError, CrmResult};
use crate::types::AppRole;
use crate::users::{NewProfile, Profile};

/// Create a profile and grant it the BD user role.
pub fn register_user(db: &CrmDb, input: NewProfile, as_of: DateTime<Utc>) -> CrmResult<Profile> {
    let profile = input.into_profile(as_of)?;
    db.with_transaction(|tx| {
        if tx.get_profile(&profile.id)?.is_some() {
            return Err(CrmError::InvalidInput(format!(
                "User {} already exists",
                profile.id
            )));
        }
        tx.upsert_profile(&profile)?;
        tx.grant_role(&profile.id, AppRole::BdUser)?;
        log::info!("Registered user {} ({})", profile.id, profile.email);
        Ok(profile)
    })
}

/// Grant `role` to `target_id` and return the target's roles.
///
/// Admin only, except that the first admin of an empty store may be granted
/// by anyone.
pub fn grant_role(
    db: &CrmDb,
    user_id: &str,
    target_id: &str,
    role: AppRole,
) -> CrmResult<Vec<AppRole>> {
    db.with_transaction(|tx| {
        let bootstrap = role == AppRole::Admin && tx.count_role_holders(AppRole::Admin)? == 0;
        if !bootstrap {
            require_admin(tx, user_id)?;
        }
        if tx.get_profile(target_id)?.is_none() {
            return Err(CrmError::not_found("user", target_id));
        }

        tx.grant_role(target_id, role)?;
        if bootstrap {
            log::warn!("{} granted first admin role to {}", user_id, target_id);
        } else {
            log::info!("{} granted {} to {}", user_id, role, target_id);
        }
        Ok(tx.roles_for(target_id)?)
    })
}
