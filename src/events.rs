//! Networking events attended by BD users, and in-person touchpoints with
//! warm leads.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CrmError, CrmResult};
use crate::types::WarmLeadEventType;

/// A row from the `events` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkingEvent {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub event_date: NaiveDate,
    pub summary: Option<String>,
    pub followup_details: Option<String>,
    pub connections_count: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNetworkingEvent {
    pub user_id: String,
    pub name: String,
    pub event_date: NaiveDate,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub followup_details: Option<String>,
    #[serde(default)]
    pub connections_count: u32,
}

impl NewNetworkingEvent {
    pub fn into_event(self, id: String, as_of: DateTime<Utc>) -> CrmResult<NetworkingEvent> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CrmError::InvalidInput("name: Event name is required".into()));
        }
        Ok(NetworkingEvent {
            id,
            user_id: self.user_id,
            name: name.to_string(),
            event_date: self.event_date,
            summary: self.summary.filter(|s| !s.trim().is_empty()),
            followup_details: self.followup_details.filter(|s| !s.trim().is_empty()),
            connections_count: self.connections_count,
            created_at: as_of,
        })
    }
}

/// A row from the `warm_lead_events` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarmLeadEvent {
    pub id: String,
    pub contact_id: String,
    pub event_type: WarmLeadEventType,
    pub where_we_met: String,
    pub event_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWarmLeadEvent {
    pub contact_id: String,
    pub event_type: WarmLeadEventType,
    pub where_we_met: String,
    pub event_date: NaiveDate,
}

impl NewWarmLeadEvent {
    pub fn into_event(self, id: String, as_of: DateTime<Utc>) -> CrmResult<WarmLeadEvent> {
        let where_we_met = self.where_we_met.trim();
        if where_we_met.is_empty() {
            return Err(CrmError::InvalidInput(
                "where_we_met: Please say where you met".into(),
            ));
        }
        Ok(WarmLeadEvent {
            id,
            contact_id: self.contact_id,
            event_type: self.event_type,
            where_we_met: where_we_met.to_string(),
            event_date: self.event_date,
            created_at: as_of,
        })
    }
}
