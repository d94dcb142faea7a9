//! Audit trail for contact mutations.
//!
//! Entries are append-only rows in `audit_logs`, keyed by entity id and the
//! acting user. This module builds the entries; `db::audit` stores them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ParseEnumError;
use crate::pipeline::{PointsOutcome, StageChange};

/// Entity type label for contact audit rows.
pub const CONTACT_ENTITY: &str = "contact";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    StageChange,
    AddPoints,
    MarkDnc,
    SoftDelete,
    Restore,
}

impl AuditAction {
    const ALL: [AuditAction; 5] = [
        AuditAction::StageChange,
        AuditAction::AddPoints,
        AuditAction::MarkDnc,
        AuditAction::SoftDelete,
        AuditAction::Restore,
    ];

    /// String label for SQL storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::StageChange => "stage_change",
            AuditAction::AddPoints => "add_points",
            AuditAction::MarkDnc => "mark_dnc",
            AuditAction::SoftDelete => "soft_delete",
            AuditAction::Restore => "restore",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AuditAction::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("audit action", s))
    }
}

/// A row from the `audit_logs` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: String,
    pub user_id: String,
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// An audit entry that has not been written yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    pub user_id: String,
    pub action: AuditAction,
    pub entity_type: &'static str,
    pub entity_id: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

impl NewAuditEntry {
    fn contact(user_id: &str, contact_id: &str, action: AuditAction) -> Self {
        Self {
            user_id: user_id.to_string(),
            action,
            entity_type: CONTACT_ENTITY,
            entity_id: contact_id.to_string(),
            old_value: None,
            new_value: None,
        }
    }

    /// `{stage}` before and after a stage move.
    pub fn stage_change(user_id: &str, contact_id: &str, change: &StageChange) -> Self {
        Self {
            old_value: Some(json!({ "stage": change.old_stage })),
            new_value: Some(json!({ "stage": change.new_stage })),
            ..Self::contact(user_id, contact_id, AuditAction::StageChange)
        }
    }

    /// `{points}` before, `{points, reason}` after a point award.
    pub fn add_points(
        user_id: &str,
        contact_id: &str,
        outcome: &PointsOutcome,
        reason: &str,
    ) -> Self {
        Self {
            old_value: Some(json!({ "points": outcome.old_points })),
            new_value: Some(json!({ "points": outcome.new_points, "reason": reason })),
            ..Self::contact(user_id, contact_id, AuditAction::AddPoints)
        }
    }

    pub fn mark_dnc(user_id: &str, contact_id: &str) -> Self {
        Self {
            old_value: Some(json!({ "is_dnc": false })),
            new_value: Some(json!({ "is_dnc": true })),
            ..Self::contact(user_id, contact_id, AuditAction::MarkDnc)
        }
    }

    pub fn soft_delete(user_id: &str, contact_id: &str) -> Self {
        Self::contact(user_id, contact_id, AuditAction::SoftDelete)
    }

    pub fn restore(user_id: &str, contact_id: &str) -> Self {
        Self::contact(user_id, contact_id, AuditAction::Restore)
    }
}
