//! Scheduled follow-ups with contacts.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A row from the `follow_ups` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub id: String,
    pub contact_id: String,
    pub bd_user_id: String,
    pub follow_up_date: NaiveDate,
    pub follow_up_time: Option<NaiveTime>,
    pub notes: Option<String>,
    pub reminder_offset: Option<String>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Where a follow-up sits relative to a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpStatus {
    Completed,
    Overdue,
    DueToday,
    Upcoming,
}

impl FollowUp {
    pub fn status_on(&self, today: NaiveDate) -> FollowUpStatus {
        if self.is_completed {
            FollowUpStatus::Completed
        } else if self.follow_up_date < today {
            FollowUpStatus::Overdue
        } else if self.follow_up_date == today {
            FollowUpStatus::DueToday
        } else {
            FollowUpStatus::Upcoming
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.is_completed
    }
}

/// Input for scheduling a follow-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFollowUp {
    pub contact_id: String,
    pub bd_user_id: String,
    pub follow_up_date: NaiveDate,
    #[serde(default)]
    pub follow_up_time: Option<NaiveTime>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub reminder_offset: Option<String>,
}

impl NewFollowUp {
    pub fn into_follow_up(self, id: String, as_of: DateTime<Utc>) -> FollowUp {
        FollowUp {
            id,
            contact_id: self.contact_id,
            bd_user_id: self.bd_user_id,
            follow_up_date: self.follow_up_date,
            follow_up_time: self.follow_up_time,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            reminder_offset: self.reminder_offset,
            is_completed: false,
            completed_at: None,
            created_at: as_of,
        }
    }
}
