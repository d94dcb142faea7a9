use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use super::*;
use crate::followups::FollowUp;

const FOLLOW_UP_COLUMNS: &str = "id, contact_id, bd_user_id, follow_up_date, follow_up_time,
    notes, reminder_offset, is_completed, completed_at, created_at";

impl CrmDb {
    // =========================================================================
    // Follow-ups
    // =========================================================================

    pub fn insert_follow_up(&self, follow_up: &FollowUp) -> Result<(), DbError> {
        self.conn.execute(
            &format!(
                "INSERT INTO follow_ups ({FOLLOW_UP_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            ),
            params![
                follow_up.id,
                follow_up.contact_id,
                follow_up.bd_user_id,
                follow_up.follow_up_date,
                follow_up.follow_up_time,
                follow_up.notes,
                follow_up.reminder_offset,
                follow_up.is_completed,
                follow_up.completed_at,
                follow_up.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_follow_up(&self, id: &str) -> Result<Option<FollowUp>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FOLLOW_UP_COLUMNS} FROM follow_ups WHERE id = ?1"
        ))?;
        let mut rows = stmt.query_map(params![id], Self::map_follow_up_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// All follow-ups for one contact, latest date first.
    pub fn list_follow_ups_for_contact(&self, contact_id: &str) -> Result<Vec<FollowUp>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FOLLOW_UP_COLUMNS} FROM follow_ups
             WHERE contact_id = ?1
             ORDER BY follow_up_date DESC, follow_up_time DESC"
        ))?;
        let rows = stmt.query_map(params![contact_id], Self::map_follow_up_row)?;
        collect_rows(rows)
    }

    /// Follow-ups owned by a user (or everyone when `owner` is None), soonest
    /// first. Follow-ups on soft-deleted contacts are skipped.
    pub fn list_follow_ups(
        &self,
        owner: Option<&str>,
        pending_only: bool,
    ) -> Result<Vec<FollowUp>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT f.id, f.contact_id, f.bd_user_id, f.follow_up_date, f.follow_up_time,
                    f.notes, f.reminder_offset, f.is_completed, f.completed_at, f.created_at
             FROM follow_ups f
             JOIN contacts c ON c.id = f.contact_id
             WHERE c.is_deleted = 0
               AND (?1 IS NULL OR f.bd_user_id = ?1)
               AND (?2 = 0 OR f.is_completed = 0)
             ORDER BY f.follow_up_date ASC, f.follow_up_time ASC",
        )?;
        let rows = stmt.query_map(params![owner, pending_only], Self::map_follow_up_row)?;
        collect_rows(rows)
    }

    /// Mark a follow-up completed. Returns false if it was missing or
    /// already completed.
    pub fn mark_follow_up_completed(
        &self,
        id: &str,
        completed_at: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let changed = self.conn.execute(
            "UPDATE follow_ups SET is_completed = 1, completed_at = ?1
             WHERE id = ?2 AND is_completed = 0",
            params![completed_at, id],
        )?;
        Ok(changed > 0)
    }

    fn map_follow_up_row(row: &Row) -> rusqlite::Result<FollowUp> {
        Ok(FollowUp {
            id: row.get(0)?,
            contact_id: row.get(1)?,
            bd_user_id: row.get(2)?,
            follow_up_date: row.get(3)?,
            follow_up_time: row.get(4)?,
            notes: row.get(5)?,
            reminder_offset: row.get(6)?,
            is_completed: row.get(7)?,
            completed_at: row.get(8)?,
            created_at: row.get(9)?,
        })
    }
}
