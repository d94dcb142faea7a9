// Contact service: creation, pipeline mutations and lifecycle flags.
// Every mutation writes the contact row and its audit entries in one transaction.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{active_contact, new_id, require_admin};
use crate::audit::{AuditEntry, NewAuditEntry, CONTACT_ENTITY};
use crate::contacts::{Contact, NewContact};
use crate::db::CrmDb;
use crate::error::{CrmError, CrmResult};
use crate::events::WarmLeadEvent;
use crate::finance::{Deal, Expense};
use crate::followups::FollowUp;
use crate::pipeline::{self, PointsOutcome, Stage, StageChange};

/// Validate and store a new lead.
///
/// A non-deleted contact with the same email and/or phone blocks creation
/// unless `allow_duplicate` is set, in which case the match is only logged.
pub fn create_contact(
    db: &CrmDb,
    input: NewContact,
    allow_duplicate: bool,
    as_of: DateTime<Utc>,
) -> CrmResult<Contact> {
    let contact = input.into_contact(new_id(), as_of)?;

    let duplicates = db.find_duplicate_contacts(contact.email.as_deref(), contact.phone.as_deref())?;
    if let Some(existing) = duplicates.first() {
        if !allow_duplicate {
            return Err(CrmError::InvalidInput(format!(
                "A contact with similar info already exists: {} ({}). \
                 Create it anyway with --allow-duplicate",
                existing.full_name(),
                existing.id
            )));
        }
        log::warn!(
            "Creating contact {} despite matching {} ({})",
            contact.id,
            existing.full_name(),
            existing.id
        );
    }

    db.insert_contact(&contact)?;
    log::info!("Created contact {} for {}", contact.id, contact.bd_user_id);
    Ok(contact)
}

/// Everything recorded against one contact, newest history first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetail {
    pub contact: Contact,
    pub follow_ups: Vec<FollowUp>,
    pub deals: Vec<Deal>,
    pub expenses: Vec<Expense>,
    pub warm_lead_events: Vec<WarmLeadEvent>,
    pub history: Vec<AuditEntry>,
}

/// Load a contact with its follow-ups, finances, events and audit trail.
/// Soft-deleted contacts are not found.
pub fn contact_detail(db: &CrmDb, contact_id: &str) -> CrmResult<ContactDetail> {
    let contact = active_contact(db, contact_id)?;
    Ok(ContactDetail {
        follow_ups: db.list_follow_ups_for_contact(contact_id)?,
        deals: db.list_deals_for_contact(contact_id)?,
        expenses: db.list_expenses_for_contact(contact_id)?,
        warm_lead_events: db.list_warm_lead_events(contact_id)?,
        history: db.list_audit_for_entity(CONTACT_ENTITY, contact_id)?,
        contact,
    })
}

/// Award engagement points to a contact.
///
/// Returns `None` without touching the store when `points < 1`. A promotion
/// to warm prospect also records a `stage_change` audit entry.
pub fn add_points(
    db: &CrmDb,
    user_id: &str,
    contact_id: &str,
    points: i64,
    reason: &str,
    as_of: DateTime<Utc>,
) -> CrmResult<Option<PointsOutcome>> {
    db.with_transaction(|tx| {
        let contact = active_contact(tx, contact_id)?;
        let Some(outcome) = pipeline::add_points(&contact.pipeline_state(), points, as_of) else {
            log::debug!("Ignored award of {} points to {}", points, contact_id);
            return Ok(None);
        };
        record_points(tx, user_id, &contact, &outcome, reason, as_of)?;
        Ok(Some(outcome))
    })
}

/// Persist a point award and its audit entries. Caller owns the transaction.
pub(crate) fn record_points(
    tx: &CrmDb,
    user_id: &str,
    contact: &Contact,
    outcome: &PointsOutcome,
    reason: &str,
    as_of: DateTime<Utc>,
) -> CrmResult<()> {
    tx.update_contact_pipeline(&contact.id, &outcome.state, as_of)?;
    tx.insert_audit_entry(
        &NewAuditEntry::add_points(user_id, &contact.id, outcome, reason),
        as_of,
    )?;

    if outcome.promoted {
        let change = StageChange {
            state: outcome.state,
            old_stage: contact.stage,
            new_stage: outcome.state.stage,
        };
        tx.insert_audit_entry(
            &NewAuditEntry::stage_change(user_id, &contact.id, &change),
            as_of,
        )?;
        log::info!(
            "Contact {} auto-promoted {} -> {} at {} points",
            contact.id,
            change.old_stage,
            change.new_stage,
            outcome.new_points
        );
    }
    Ok(())
}

/// Move a contact to `target`. `reason` is stored when entering warm prospect.
pub fn change_stage(
    db: &CrmDb,
    user_id: &str,
    contact_id: &str,
    target: Stage,
    reason: Option<&str>,
    as_of: DateTime<Utc>,
) -> CrmResult<StageChange> {
    db.with_transaction(|tx| {
        let contact = active_contact(tx, contact_id)?;
        let change = pipeline::change_stage(&contact.pipeline_state(), target, as_of);

        tx.update_contact_pipeline(contact_id, &change.state, as_of)?;
        if target == Stage::WarmProspect {
            let reason = reason.map(str::trim).filter(|r| !r.is_empty());
            tx.set_warm_prospect_reason(contact_id, reason, as_of)?;
        }
        tx.insert_audit_entry(
            &NewAuditEntry::stage_change(user_id, contact_id, &change),
            as_of,
        )?;

        log::info!(
            "Contact {} moved {} -> {}",
            contact_id,
            change.old_stage,
            change.new_stage
        );
        Ok(change)
    })
}

/// Flag a contact do-not-contact.
pub fn mark_dnc(
    db: &CrmDb,
    user_id: &str,
    contact_id: &str,
    as_of: DateTime<Utc>,
) -> CrmResult<Contact> {
    db.with_transaction(|tx| {
        let contact = active_contact(tx, contact_id)?;
        if contact.is_dnc {
            return Err(CrmError::InvalidInput(format!(
                "Contact {} is already marked do-not-contact",
                contact_id
            )));
        }
        tx.mark_contact_dnc(contact_id, as_of)?;
        tx.insert_audit_entry(&NewAuditEntry::mark_dnc(user_id, contact_id), as_of)?;
        log::info!("Contact {} marked do-not-contact by {}", contact_id, user_id);
        active_contact(tx, contact_id)
    })
}

/// Hide a contact from every listing. The row and its history are kept.
pub fn soft_delete(
    db: &CrmDb,
    user_id: &str,
    contact_id: &str,
    as_of: DateTime<Utc>,
) -> CrmResult<()> {
    db.with_transaction(|tx| {
        active_contact(tx, contact_id)?;
        tx.soft_delete_contact(contact_id, user_id, as_of)?;
        tx.insert_audit_entry(&NewAuditEntry::soft_delete(user_id, contact_id), as_of)?;
        log::info!("Contact {} deleted by {}", contact_id, user_id);
        Ok(())
    })
}

/// Bring back a soft-deleted contact. Admin only.
pub fn restore(
    db: &CrmDb,
    user_id: &str,
    contact_id: &str,
    as_of: DateTime<Utc>,
) -> CrmResult<Contact> {
    require_admin(db, user_id)?;
    db.with_transaction(|tx| {
        if !tx.restore_contact(contact_id, as_of)? {
            return Err(match tx.get_contact(contact_id)? {
                Some(_) => CrmError::InvalidInput(format!("Contact {} is not deleted", contact_id)),
                None => CrmError::not_found("contact", contact_id),
            });
        }
        tx.insert_audit_entry(&NewAuditEntry::restore(user_id, contact_id), as_of)?;
        log::info!("Contact {} restored by {}", contact_id, user_id);
        active_contact(tx, contact_id)
    })
}
