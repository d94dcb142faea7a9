use chrono::{DateTime, Utc};
use rusqlite::params;

use super::*;
use crate::audit::{AuditEntry, NewAuditEntry};

impl CrmDb {
    // =========================================================================
    // Audit log
    // =========================================================================

    /// Append an audit row and return its id.
    pub fn insert_audit_entry(
        &self,
        entry: &NewAuditEntry,
        created_at: DateTime<Utc>,
    ) -> Result<String, DbError> {
        let id = uuid::Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO audit_logs (id, user_id, action, entity_type, entity_id,
                                     old_value, new_value, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id,
                entry.user_id,
                entry.action,
                entry.entity_type,
                entry.entity_id,
                entry.old_value,
                entry.new_value,
                created_at,
            ],
        )?;
        Ok(id)
    }

    /// Audit history for one entity, newest first.
    pub fn list_audit_for_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Vec<AuditEntry>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, action, entity_type, entity_id, old_value, new_value, created_at
             FROM audit_logs
             WHERE entity_type = ?1 AND entity_id = ?2
             ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt.query_map(params![entity_type, entity_id], |row| {
            Ok(AuditEntry {
                id: row.get(0)?,
                user_id: row.get(1)?,
                action: row.get(2)?,
                entity_type: row.get(3)?,
                entity_id: row.get(4)?,
                old_value: row.get(5)?,
                new_value: row.get(6)?,
                created_at: row.get(7)?,
            })
        })?;
        collect_rows(rows)
    }
}
