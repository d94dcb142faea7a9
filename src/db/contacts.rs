use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use super::*;
use crate::contacts::{Contact, ContactFilter};
use crate::pipeline::PipelineState;

const CONTACT_COLUMNS: &str = "id, bd_user_id, first_name, last_name, phone, email, company,
    parent_company, profession, source, referral_by, social_channel, source_other, intent,
    screenshot_url, stage, engagement_points, warm_prospect_started_at, warm_prospect_reason,
    is_dnc, is_deleted, deleted_at, deleted_by, created_at, updated_at";

impl CrmDb {
    // =========================================================================
    // Contacts
    // =========================================================================

    pub fn insert_contact(&self, contact: &Contact) -> Result<(), DbError> {
        self.conn.execute(
            &format!(
                "INSERT INTO contacts ({CONTACT_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                         ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)"
            ),
            params![
                contact.id,
                contact.bd_user_id,
                contact.first_name,
                contact.last_name,
                contact.phone,
                contact.email,
                contact.company,
                contact.parent_company,
                contact.profession,
                contact.source,
                contact.referral_by,
                contact.social_channel,
                contact.source_other,
                contact.intent,
                contact.screenshot_url,
                contact.stage,
                contact.engagement_points,
                contact.warm_prospect_started_at,
                contact.warm_prospect_reason,
                contact.is_dnc,
                contact.is_deleted,
                contact.deleted_at,
                contact.deleted_by,
                contact.created_at,
                contact.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Look up a contact by id, deleted or not.
    pub fn get_contact(&self, id: &str) -> Result<Option<Contact>, DbError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"))?;
        let mut rows = stmt.query_map(params![id], Self::map_contact_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// List contacts, newest first.
    ///
    /// Owner, stage and deletion are filtered in SQL; the free-text search is
    /// applied to the loaded rows.
    pub fn list_contacts(&self, filter: &ContactFilter) -> Result<Vec<Contact>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts
             WHERE (?1 IS NULL OR bd_user_id = ?1)
               AND (?2 IS NULL OR stage = ?2)
               AND (?3 = 1 OR is_deleted = 0)
             ORDER BY created_at DESC"
        ))?;
        let rows = stmt.query_map(
            params![filter.bd_user_id, filter.stage, filter.include_deleted],
            Self::map_contact_row,
        )?;
        let contacts = collect_rows(rows)?;
        Ok(contacts.into_iter().filter(|c| filter.matches(c)).collect())
    }

    /// Non-deleted contacts sharing the given email and/or phone.
    ///
    /// When both are given both must match. Returns nothing when neither is.
    pub fn find_duplicate_contacts(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Vec<Contact>, DbError> {
        if email.is_none() && phone.is_none() {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts
             WHERE is_deleted = 0
               AND (?1 IS NULL OR email = ?1)
               AND (?2 IS NULL OR phone = ?2)
             ORDER BY created_at ASC"
        ))?;
        let rows = stmt.query_map(params![email, phone], Self::map_contact_row)?;
        collect_rows(rows)
    }

    /// Write back the pipeline fields as a single update.
    pub fn update_contact_pipeline(
        &self,
        id: &str,
        state: &PipelineState,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let changed = self.conn.execute(
            "UPDATE contacts
             SET stage = ?1, engagement_points = ?2, warm_prospect_started_at = ?3,
                 updated_at = ?4
             WHERE id = ?5",
            params![
                state.stage,
                state.engagement_points,
                state.warm_prospect_started_at,
                updated_at,
                id
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn set_warm_prospect_reason(
        &self,
        id: &str,
        reason: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let changed = self.conn.execute(
            "UPDATE contacts SET warm_prospect_reason = ?1, updated_at = ?2 WHERE id = ?3",
            params![reason, updated_at, id],
        )?;
        Ok(changed > 0)
    }

    /// Mark a contact do-not-contact. Returns false if it already was.
    pub fn mark_contact_dnc(&self, id: &str, updated_at: DateTime<Utc>) -> Result<bool, DbError> {
        let changed = self.conn.execute(
            "UPDATE contacts SET is_dnc = 1, updated_at = ?1 WHERE id = ?2 AND is_dnc = 0",
            params![updated_at, id],
        )?;
        Ok(changed > 0)
    }

    /// Soft-delete a contact. Returns false if it was already deleted.
    pub fn soft_delete_contact(
        &self,
        id: &str,
        deleted_by: &str,
        as_of: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let changed = self.conn.execute(
            "UPDATE contacts
             SET is_deleted = 1, deleted_at = ?1, deleted_by = ?2, updated_at = ?1
             WHERE id = ?3 AND is_deleted = 0",
            params![as_of, deleted_by, id],
        )?;
        Ok(changed > 0)
    }

    /// Undo a soft delete. Returns false if the contact was not deleted.
    pub fn restore_contact(&self, id: &str, as_of: DateTime<Utc>) -> Result<bool, DbError> {
        let changed = self.conn.execute(
            "UPDATE contacts
             SET is_deleted = 0, deleted_at = NULL, deleted_by = NULL, updated_at = ?1
             WHERE id = ?2 AND is_deleted = 1",
            params![as_of, id],
        )?;
        Ok(changed > 0)
    }

    fn map_contact_row(row: &Row) -> rusqlite::Result<Contact> {
        Ok(Contact {
            id: row.get(0)?,
            bd_user_id: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            phone: row.get(4)?,
            email: row.get(5)?,
            company: row.get(6)?,
            parent_company: row.get(7)?,
            profession: row.get(8)?,
            source: row.get(9)?,
            referral_by: row.get(10)?,
            social_channel: row.get(11)?,
            source_other: row.get(12)?,
            intent: row.get(13)?,
            screenshot_url: row.get(14)?,
            stage: row.get(15)?,
            engagement_points: row.get(16)?,
            warm_prospect_started_at: row.get(17)?,
            warm_prospect_reason: row.get(18)?,
            is_dnc: row.get(19)?,
            is_deleted: row.get(20)?,
            deleted_at: row.get(21)?,
            deleted_by: row.get(22)?,
            created_at: row.get(23)?,
            updated_at: row.get(24)?,
        })
    }
}
