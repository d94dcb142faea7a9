// Report service: loads the rows in scope and hands them to the pure tallies in `crate::reports`.

use chrono::{DateTime, Duration, Utc};

use super::require_admin;
use crate::contacts::{Contact, ContactFilter};
use crate::db::CrmDb;
use crate::error::CrmResult;
use crate::reports::{self, Dashboard, FinanceReport, OverdueProspect, TeamOverview};

fn owned_contacts(db: &CrmDb, owner: Option<&str>) -> CrmResult<Vec<Contact>> {
    Ok(db.list_contacts(&ContactFilter {
        bd_user_id: owner.map(str::to_string),
        ..Default::default()
    })?)
}

pub fn dashboard(db: &CrmDb, user_id: &str, as_of: DateTime<Utc>) -> CrmResult<Dashboard> {
    let contacts = owned_contacts(db, Some(user_id))?;
    let follow_ups = db.list_follow_ups(Some(user_id), false)?;
    Ok(reports::personal_dashboard(&contacts, &follow_ups, as_of))
}

/// Overdue warm prospects for one owner, or across the team when `owner` is None.
pub fn overdue_warm_prospects(
    db: &CrmDb,
    owner: Option<&str>,
    as_of: DateTime<Utc>,
) -> CrmResult<Vec<OverdueProspect>> {
    let contacts = owned_contacts(db, owner)?;
    Ok(reports::overdue_warm_prospects(&contacts, as_of))
}

/// Team-wide activity. Admin only.
pub fn team_overview(db: &CrmDb, user_id: &str, as_of: DateTime<Utc>) -> CrmResult<TeamOverview> {
    require_admin(db, user_id)?;
    let profiles = db.list_profiles(false)?;
    let contacts = owned_contacts(db, None)?;
    let follow_ups = db.list_follow_ups(None, true)?;
    let since = (as_of - Duration::days(reports::RECENT_EVENT_DAYS)).date_naive();
    let events = db.list_events(None, Some(since))?;
    Ok(reports::team_overview(
        &profiles,
        &contacts,
        &follow_ups,
        &events,
        as_of,
    ))
}

pub fn finance_report(
    db: &CrmDb,
    user_id: &str,
    as_of: DateTime<Utc>,
) -> CrmResult<FinanceReport> {
    let contacts = owned_contacts(db, Some(user_id))?;
    let deals = db.list_deals(Some(user_id))?;
    let expenses = db.list_expenses(Some(user_id))?;
    let follow_ups = db.list_follow_ups(Some(user_id), false)?;
    Ok(reports::finance_report(
        &contacts,
        &deals,
        &expenses,
        &follow_ups,
        as_of,
    ))
}
