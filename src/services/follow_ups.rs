// Follow-up service: scheduling and completion.
// Completion awards the owning contact one engagement point through the pipeline rules.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::contacts::record_points;
use super::{active_contact, new_id};
use crate::db::CrmDb;
use crate::error::{CrmError, CrmResult};
use crate::followups::{FollowUp, FollowUpStatus, NewFollowUp};
use crate::pipeline::{self, PointsOutcome};

/// Audit reason recorded for the point awarded on completion.
pub const COMPLETION_REASON: &str = "follow-up completed";

/// A follow-up together with its status on a given day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedFollowUp {
    #[serde(flatten)]
    pub follow_up: FollowUp,
    pub status: FollowUpStatus,
}

pub fn schedule(db: &CrmDb, input: NewFollowUp, as_of: DateTime<Utc>) -> CrmResult<FollowUp> {
    active_contact(db, &input.contact_id)?;
    let follow_up = input.into_follow_up(new_id(), as_of);
    db.insert_follow_up(&follow_up)?;
    log::debug!(
        "Scheduled follow-up {} for contact {} on {}",
        follow_up.id,
        follow_up.contact_id,
        follow_up.follow_up_date
    );
    Ok(follow_up)
}

/// Mark a follow-up done and award its contact one point.
///
/// Completing an already completed follow-up is rejected and awards nothing.
pub fn complete(
    db: &CrmDb,
    user_id: &str,
    follow_up_id: &str,
    as_of: DateTime<Utc>,
) -> CrmResult<PointsOutcome> {
    db.with_transaction(|tx| {
        let follow_up = tx
            .get_follow_up(follow_up_id)?
            .ok_or_else(|| CrmError::not_found("follow-up", follow_up_id))?;
        if !tx.mark_follow_up_completed(follow_up_id, as_of)? {
            return Err(CrmError::InvalidInput(format!(
                "Follow-up {} is already completed",
                follow_up.id
            )));
        }

        let contact = active_contact(tx, &follow_up.contact_id)?;
        let outcome = pipeline::on_follow_up_completed(&contact.pipeline_state(), as_of);
        record_points(tx, user_id, &contact, &outcome, COMPLETION_REASON, as_of)?;

        log::info!(
            "Follow-up {} completed; contact {} now at {} points",
            follow_up_id,
            contact.id,
            outcome.new_points
        );
        Ok(outcome)
    })
}

/// Follow-ups for `owner` (or everyone), each classified against `today`.
pub fn list_classified(
    db: &CrmDb,
    owner: Option<&str>,
    pending_only: bool,
    today: NaiveDate,
) -> CrmResult<Vec<ClassifiedFollowUp>> {
    let follow_ups = db.list_follow_ups(owner, pending_only)?;
    Ok(follow_ups
        .into_iter()
        .map(|follow_up| ClassifiedFollowUp {
            status: follow_up.status_on(today),
            follow_up,
        })
        .collect())
}
