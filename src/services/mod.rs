//! Business operations over the store.
//!
//! Each service loads the rows it needs, applies the pure rules, and writes
//! the result back together with its audit entry in one transaction.

pub mod contacts;
pub mod events;
pub mod finance;
pub mod follow_ups;
pub mod reports;
pub mod users;

use crate::contacts::Contact;
use crate::db::CrmDb;
use crate::error::{CrmError, CrmResult};
use crate::types::AppRole;
use crate::users::has_role;

/// Load a contact that has not been soft-deleted.
pub(crate) fn active_contact(db: &CrmDb, contact_id: &str) -> CrmResult<Contact> {
    match db.get_contact(contact_id)? {
        Some(contact) if !contact.is_deleted => Ok(contact),
        _ => Err(CrmError::not_found("contact", contact_id)),
    }
}

/// Fail with `Forbidden` unless `user_id` holds the admin role.
pub fn require_admin(db: &CrmDb, user_id: &str) -> CrmResult<()> {
    let roles = db.roles_for(user_id)?;
    if has_role(&roles, AppRole::Admin) {
        Ok(())
    } else {
        Err(CrmError::Forbidden(format!("{} is not an admin", user_id)))
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
