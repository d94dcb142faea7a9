// Event service: networking events and warm-lead touchpoints.

use chrono::{DateTime, Utc};

use super::{active_contact, new_id};
use crate::db::CrmDb;
use crate::error::CrmResult;
use crate::events::{NetworkingEvent, NewNetworkingEvent, NewWarmLeadEvent, WarmLeadEvent};

pub fn log_event(
    db: &CrmDb,
    input: NewNetworkingEvent,
    as_of: DateTime<Utc>,
) -> CrmResult<NetworkingEvent> {
    let event = input.into_event(new_id(), as_of)?;
    db.insert_event(&event)?;
    log::info!(
        "Logged event '{}' on {} for {}",
        event.name,
        event.event_date,
        event.user_id
    );
    Ok(event)
}

pub fn log_warm_lead_event(
    db: &CrmDb,
    input: NewWarmLeadEvent,
    as_of: DateTime<Utc>,
) -> CrmResult<WarmLeadEvent> {
    active_contact(db, &input.contact_id)?;
    let event = input.into_event(new_id(), as_of)?;
    db.insert_warm_lead_event(&event)?;
    log::debug!(
        "Logged {} warm-lead event for contact {}",
        event.event_type,
        event.contact_id
    );
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;
    use crate::services::test_support::{now, seed_contact};
    use crate::types::WarmLeadEventType;

    #[test]
    fn test_log_event_validates_name() {
        let db = test_db();
        let input = |name: &str| NewNetworkingEvent {
            user_id: "u1".into(),
            name: name.into(),
            event_date: now().date_naive(),
            summary: Some("Met three agents".into()),
            followup_details: None,
            connections_count: 3,
        };
        assert!(log_event(&db, input("   "), now()).is_err());
        let event = log_event(&db, input("Spring mixer"), now()).unwrap();
        assert_eq!(db.list_events(Some("u1"), None).unwrap(), vec![event]);
    }

    #[test]
    fn test_warm_lead_event_needs_contact() {
        let db = test_db();
        let input = |contact: &str| NewWarmLeadEvent {
            contact_id: contact.into(),
            event_type: WarmLeadEventType::Type1,
            where_we_met: "Open house".into(),
            event_date: now().date_naive(),
        };
        assert!(log_warm_lead_event(&db, input("ghost"), now()).is_err());

        seed_contact(&db, "c1", "u1");
        let event = log_warm_lead_event(&db, input("c1"), now()).unwrap();
        assert_eq!(db.list_warm_lead_events("c1").unwrap(), vec![event]);
    }
}
