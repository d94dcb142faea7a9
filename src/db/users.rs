use rusqlite::{params, OptionalExtension, Row};

use super::*;
use crate::types::AppRole;
use crate::users::Profile;

impl CrmDb {
    // =========================================================================
    // Profiles and roles
    // =========================================================================

    /// Insert or update a profile; `created_at` is kept on update.
    pub fn upsert_profile(&self, profile: &Profile) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO profiles (id, email, full_name, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                email = excluded.email,
                full_name = excluded.full_name,
                is_active = excluded.is_active,
                updated_at = excluded.updated_at",
            params![
                profile.id,
                profile.email,
                profile.full_name,
                profile.is_active,
                profile.created_at,
                profile.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_profile(&self, id: &str) -> Result<Option<Profile>, DbError> {
        let profile = self
            .conn
            .query_row(
                "SELECT id, email, full_name, is_active, created_at, updated_at
                 FROM profiles WHERE id = ?1",
                params![id],
                Self::map_profile_row,
            )
            .optional()?;
        Ok(profile)
    }

    /// Profiles ordered by name. Inactive users are included only on request.
    pub fn list_profiles(&self, include_inactive: bool) -> Result<Vec<Profile>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, email, full_name, is_active, created_at, updated_at
             FROM profiles
             WHERE ?1 = 1 OR is_active = 1
             ORDER BY full_name COLLATE NOCASE",
        )?;
        let rows = stmt.query_map(params![include_inactive], Self::map_profile_row)?;
        collect_rows(rows)
    }

    /// Grant a role. Granting a role the user already holds is a no-op.
    pub fn grant_role(&self, user_id: &str, role: AppRole) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO user_roles (id, user_id, role) VALUES (?1, ?2, ?3)",
            params![uuid::Uuid::new_v4().to_string(), user_id, role],
        )?;
        Ok(())
    }

    pub fn roles_for(&self, user_id: &str) -> Result<Vec<AppRole>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT role FROM user_roles WHERE user_id = ?1 ORDER BY role")?;
        let rows = stmt.query_map(params![user_id], |row| row.get(0))?;
        collect_rows(rows)
    }

    /// Number of users holding `role`.
    pub fn count_role_holders(&self, role: AppRole) -> Result<i64, DbError> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM user_roles WHERE role = ?1",
            params![role],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn map_profile_row(row: &Row) -> rusqlite::Result<Profile> {
        Ok(Profile {
            id: row.get(0)?,
            email: row.get(1)?,
            full_name: row.get(2)?,
            is_active: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}
