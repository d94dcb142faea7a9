//! Contact records: the pipeline entity.
//!
//! A contact is owned by the BD user who created it, moves through the
//! pipeline via `crate::pipeline`, and is never hard-deleted.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CrmError, CrmResult};
use crate::pipeline::{self, PipelineState, Stage};
use crate::types::{ContactSource, Profession, SocialChannel};

/// Minimum length of the free-text intent, after trimming.
pub const MIN_INTENT_LEN: usize = 10;

/// A row from the `contacts` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub bd_user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub parent_company: Option<String>,
    pub profession: Option<Profession>,
    pub source: ContactSource,
    pub referral_by: Option<String>,
    pub social_channel: Option<SocialChannel>,
    pub source_other: Option<String>,
    pub intent: String,
    pub screenshot_url: Option<String>,
    pub stage: Stage,
    pub engagement_points: u32,
    pub warm_prospect_started_at: Option<DateTime<Utc>>,
    pub warm_prospect_reason: Option<String>,
    pub is_dnc: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn pipeline_state(&self) -> PipelineState {
        PipelineState {
            stage: self.stage,
            engagement_points: self.engagement_points,
            warm_prospect_started_at: self.warm_prospect_started_at,
        }
    }

    pub fn is_overdue(&self, as_of: DateTime<Utc>) -> bool {
        pipeline::is_overdue(&self.pipeline_state(), as_of)
    }

    /// Whole days since the last modification of any field.
    ///
    /// Used as "days in current stage". Any edit resets it, not only stage
    /// moves.
    pub fn days_in_stage(&self, as_of: DateTime<Utc>) -> i64 {
        (as_of - self.updated_at).num_days()
    }

    pub fn days_since_added(&self, as_of: DateTime<Utc>) -> i64 {
        (as_of - self.created_at).num_days()
    }

    /// Expenses are tracked once a contact has moved past the lead stage.
    pub fn accepts_expenses(&self) -> bool {
        self.stage != Stage::Lead
    }
}

/// A single failed field check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Input for creating a contact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub bd_user_id: String,
    pub source: Option<ContactSource>,
    #[serde(default)]
    pub referral_by: Option<String>,
    #[serde(default)]
    pub social_channel: Option<SocialChannel>,
    #[serde(default)]
    pub source_other: Option<String>,
    #[serde(default)]
    pub profession: Option<Profession>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub parent_company: Option<String>,
    #[serde(default)]
    pub screenshot_url: Option<String>,
    pub intent: String,
}

pub(crate) fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\d\s\-\+\(\)]+$").expect("valid phone regex"))
}

/// Trim and collapse empty strings to `None`.
fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl NewContact {
    /// Check every field and report all failures at once.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        match self.source {
            None => errors.push(FieldError {
                field: "source",
                message: "Please select a source",
            }),
            Some(ContactSource::Referral) if non_blank(&self.referral_by).is_none() => {
                errors.push(FieldError {
                    field: "referral_by",
                    message: "Please enter who referred this contact",
                })
            }
            Some(ContactSource::SocialMedia) if self.social_channel.is_none() => {
                errors.push(FieldError {
                    field: "social_channel",
                    message: "Please select a channel",
                })
            }
            _ => {}
        }

        if self.first_name.trim().is_empty() {
            errors.push(FieldError {
                field: "first_name",
                message: "First name is required",
            });
        }
        if self.last_name.trim().is_empty() {
            errors.push(FieldError {
                field: "last_name",
                message: "Last name is required",
            });
        }
        if let Some(email) = non_blank(&self.email) {
            if !email_re().is_match(&email) {
                errors.push(FieldError {
                    field: "email",
                    message: "Invalid email",
                });
            }
        }
        if let Some(phone) = non_blank(&self.phone) {
            if !phone_re().is_match(&phone) {
                errors.push(FieldError {
                    field: "phone",
                    message: "Invalid phone number",
                });
            }
        }
        if self.intent.trim().chars().count() < MIN_INTENT_LEN {
            errors.push(FieldError {
                field: "intent",
                message: "Please provide at least 10 characters explaining your intent",
            });
        }

        errors
    }

    /// Validate and build the stored record. Source-specific fields that do
    /// not belong to the chosen source are dropped.
    pub fn into_contact(self, id: String, as_of: DateTime<Utc>) -> CrmResult<Contact> {
        let errors = self.validate();
        if !errors.is_empty() {
            let detail = errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(CrmError::InvalidInput(detail));
        }
        let source = self
            .source
            .ok_or_else(|| CrmError::InvalidInput("source: Please select a source".into()))?;

        let initial = PipelineState::new();
        Ok(Contact {
            id,
            bd_user_id: self.bd_user_id,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone: non_blank(&self.phone),
            email: non_blank(&self.email),
            company: non_blank(&self.company),
            parent_company: non_blank(&self.parent_company),
            profession: self.profession,
            referral_by: match source {
                ContactSource::Referral => non_blank(&self.referral_by),
                _ => None,
            },
            social_channel: match source {
                ContactSource::SocialMedia => self.social_channel,
                _ => None,
            },
            source_other: match source {
                ContactSource::Other => non_blank(&self.source_other),
                _ => None,
            },
            source,
            intent: self.intent.trim().to_string(),
            screenshot_url: non_blank(&self.screenshot_url),
            stage: initial.stage,
            engagement_points: initial.engagement_points,
            warm_prospect_started_at: initial.warm_prospect_started_at,
            warm_prospect_reason: None,
            is_dnc: false,
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
            created_at: as_of,
            updated_at: as_of,
        })
    }
}

/// List filter for contacts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactFilter {
    pub stage: Option<Stage>,
    pub search: Option<String>,
    pub bd_user_id: Option<String>,
    #[serde(default)]
    pub include_deleted: bool,
}

impl ContactFilter {
    /// Case-insensitive match over names, email and company; phone is a
    /// plain substring match.
    pub fn matches(&self, contact: &Contact) -> bool {
        if contact.is_deleted && !self.include_deleted {
            return false;
        }
        if let Some(stage) = self.stage {
            if contact.stage != stage {
                return false;
            }
        }
        if let Some(owner) = &self.bd_user_id {
            if &contact.bd_user_id != owner {
                return false;
            }
        }
        let query = match self.search.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => q,
            _ => return true,
        };
        let q = query.to_lowercase();
        let contains = |field: Option<&str>| {
            field
                .map(|v| v.to_lowercase().contains(&q))
                .unwrap_or(false)
        };
        contains(Some(contact.first_name.as_str()))
            || contains(Some(contact.last_name.as_str()))
            || contains(contact.email.as_deref())
            || contains(contact.company.as_deref())
            || contact
                .phone
                .as_deref()
                .map(|p| p.contains(query))
                .unwrap_or(false)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    pub(crate) fn sample_input(owner: &str) -> NewContact {
        NewContact {
            bd_user_id: owner.to_string(),
            source: Some(ContactSource::Event),
            first_name: "  Dana ".to_string(),
            last_name: "Whitfield".to_string(),
            email: Some("dana@harborlending.com".to_string()),
            phone: Some("+1 (555) 010-2000".to_string()),
            company: Some("Harbor Lending".to_string()),
            profession: Some(Profession::Lender),
            intent: "Co-market first-time buyer seminars".to_string(),
            ..Default::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_valid_input_builds_lead() {
        let contact = sample_input("u1").into_contact("c1".into(), now()).unwrap();
        assert_eq!(contact.first_name, "Dana");
        assert_eq!(contact.stage, Stage::Lead);
        assert_eq!(contact.engagement_points, 0);
        assert_eq!(contact.warm_prospect_started_at, None);
        assert_eq!(contact.created_at, now());
        assert!(!contact.is_dnc && !contact.is_deleted);
    }

    #[test]
    fn test_validation_reports_every_failure() {
        let input = NewContact {
            bd_user_id: "u1".into(),
            source: Some(ContactSource::Referral),
            first_name: " ".into(),
            last_name: "".into(),
            email: Some("not-an-email".into()),
            phone: Some("call me".into()),
            intent: "short".into(),
            ..Default::default()
        };
        let fields: Vec<_> = input.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["referral_by", "first_name", "last_name", "email", "phone", "intent"]
        );
        assert!(matches!(
            input.into_contact("c1".into(), now()),
            Err(CrmError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_social_media_requires_channel() {
        let mut input = sample_input("u1");
        input.source = Some(ContactSource::SocialMedia);
        assert_eq!(input.validate()[0].field, "social_channel");

        input.social_channel = Some(SocialChannel::Linkedin);
        assert!(input.validate().is_empty());
    }

    #[test]
    fn test_missing_source_is_rejected() {
        let mut input = sample_input("u1");
        input.source = None;
        assert_eq!(input.validate()[0].field, "source");
    }

    #[test]
    fn test_source_specific_fields_are_dropped_for_other_sources() {
        let mut input = sample_input("u1");
        input.referral_by = Some("Sam".into());
        input.social_channel = Some(SocialChannel::Facebook);
        let contact = input.into_contact("c1".into(), now()).unwrap();
        assert_eq!(contact.referral_by, None);
        assert_eq!(contact.social_channel, None);
    }

    #[test]
    fn test_blank_optionals_become_none() {
        let mut input = sample_input("u1");
        input.email = Some("   ".into());
        input.company = Some(String::new());
        let contact = input.into_contact("c1".into(), now()).unwrap();
        assert_eq!(contact.email, None);
        assert_eq!(contact.company, None);
    }

    #[test]
    fn test_days_in_stage_uses_updated_at() {
        let mut contact = sample_input("u1").into_contact("c1".into(), now()).unwrap();
        contact.updated_at = now() + Duration::days(3);
        let later = now() + Duration::days(10);
        assert_eq!(contact.days_in_stage(later), 7);
        assert_eq!(contact.days_since_added(later), 10);
    }

    #[test]
    fn test_filter_search_and_stage() {
        let mut contact = sample_input("u1").into_contact("c1".into(), now()).unwrap();
        let by_company = ContactFilter {
            search: Some("HARBOR".into()),
            ..Default::default()
        };
        assert!(by_company.matches(&contact));

        let by_phone = ContactFilter {
            search: Some("010-2000".into()),
            ..Default::default()
        };
        assert!(by_phone.matches(&contact));

        let by_stage = ContactFilter {
            stage: Some(Stage::Client),
            ..Default::default()
        };
        assert!(!by_stage.matches(&contact));

        contact.is_deleted = true;
        assert!(!by_company.matches(&contact));
    }

    #[test]
    fn test_expenses_only_past_lead() {
        let mut contact = sample_input("u1").into_contact("c1".into(), now()).unwrap();
        assert!(!contact.accepts_expenses());
        contact.stage = Stage::WarmLead;
        assert!(contact.accepts_expenses());
    }
}
