use chrono::NaiveDate;
use rusqlite::{params, Row};

use super::*;
use crate::events::{NetworkingEvent, WarmLeadEvent};

impl CrmDb {
    // =========================================================================
    // Networking events
    // =========================================================================

    pub fn insert_event(&self, event: &NetworkingEvent) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO events (id, user_id, name, event_date, summary, followup_details,
                                 connections_count, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                event.id,
                event.user_id,
                event.name,
                event.event_date,
                event.summary,
                event.followup_details,
                event.connections_count,
                event.created_at,
            ],
        )?;
        Ok(())
    }

    /// Events attended by `user_id` (or everyone) on or after `since`,
    /// most recent first.
    pub fn list_events(
        &self,
        user_id: Option<&str>,
        since: Option<NaiveDate>,
    ) -> Result<Vec<NetworkingEvent>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, name, event_date, summary, followup_details,
                    connections_count, created_at
             FROM events
             WHERE (?1 IS NULL OR user_id = ?1)
               AND (?2 IS NULL OR event_date >= ?2)
             ORDER BY event_date DESC, created_at DESC",
        )?;
        let rows = stmt.query_map(params![user_id, since], Self::map_event_row)?;
        collect_rows(rows)
    }

    fn map_event_row(row: &Row) -> rusqlite::Result<NetworkingEvent> {
        Ok(NetworkingEvent {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            event_date: row.get(3)?,
            summary: row.get(4)?,
            followup_details: row.get(5)?,
            connections_count: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    // =========================================================================
    // Warm-lead events
    // =========================================================================

    pub fn insert_warm_lead_event(&self, event: &WarmLeadEvent) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO warm_lead_events (id, contact_id, event_type, where_we_met,
                                           event_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                event.id,
                event.contact_id,
                event.event_type,
                event.where_we_met,
                event.event_date,
                event.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn list_warm_lead_events(&self, contact_id: &str) -> Result<Vec<WarmLeadEvent>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, contact_id, event_type, where_we_met, event_date, created_at
             FROM warm_lead_events
             WHERE contact_id = ?1
             ORDER BY event_date DESC, created_at DESC",
        )?;
        let rows = stmt.query_map(params![contact_id], |row| {
            Ok(WarmLeadEvent {
                id: row.get(0)?,
                contact_id: row.get(1)?,
                event_type: row.get(2)?,
                where_we_met: row.get(3)?,
                event_date: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;
        collect_rows(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::test_utils::test_db;
    use super::*;
    use crate::contacts::tests::sample_input;
    use crate::events::{NewNetworkingEvent, NewWarmLeadEvent};
    use crate::types::WarmLeadEventType;
    use chrono::{DateTime, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 15, 0, 0).unwrap()
    }

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    fn event(id: &str, user: &str, date: NaiveDate) -> NetworkingEvent {
        NewNetworkingEvent {
            user_id: user.into(),
            name: "Realtor mixer".into(),
            event_date: date,
            summary: None,
            followup_details: None,
            connections_count: 4,
        }
        .into_event(id.into(), now())
        .unwrap()
    }

    #[test]
    fn test_events_filter_by_user_and_window() {
        let db = test_db();
        db.insert_event(&event("e1", "u1", day(4, 20))).unwrap();
        db.insert_event(&event("e2", "u1", day(5, 20))).unwrap();
        db.insert_event(&event("e3", "u2", day(5, 25))).unwrap();

        let recent: Vec<String> = db
            .list_events(Some("u1"), Some(day(5, 2)))
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(recent, vec!["e2"]);

        let all = db.list_events(None, None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, "e3");
        assert_eq!(all[0].connections_count, 4);
    }

    #[test]
    fn test_warm_lead_events_round_trip() {
        let db = test_db();
        let contact = sample_input("u1").into_contact("c1".into(), now()).unwrap();
        db.insert_contact(&contact).unwrap();

        let event = NewWarmLeadEvent {
            contact_id: "c1".into(),
            event_type: WarmLeadEventType::Type2,
            where_we_met: "Chamber breakfast".into(),
            event_date: day(5, 30),
        }
        .into_event("w1".into(), now())
        .unwrap();
        db.insert_warm_lead_event(&event).unwrap();

        assert_eq!(db.list_warm_lead_events("c1").unwrap(), vec![event]);
        assert!(db.list_warm_lead_events("c2").unwrap().is_empty());
    }
}
