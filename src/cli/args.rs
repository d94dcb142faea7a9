//! CLI argument definitions using clap

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};

use crate::pipeline::Stage;
use crate::types::{
    AppRole, ContactSource, ExpenseCategory, Profession, SocialChannel, WarmLeadEventType,
};

/// bdcrm - business-development pipeline tracker
#[derive(Parser, Debug)]
#[command(name = "bdcrm")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (default: ~/.bdcrm/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file, overrides `dbPath` from the config
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Acting user id, overrides `userId` from the config
    #[arg(long, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List contacts
    Contacts {
        /// Only contacts at this stage
        #[arg(long)]
        stage: Option<Stage>,

        /// Case-insensitive search over name, email, company and phone
        #[arg(long)]
        search: Option<String>,

        /// Include every owner, not just the acting user
        #[arg(long)]
        all: bool,

        /// Include soft-deleted contacts
        #[arg(long)]
        include_deleted: bool,
    },

    /// One contact with its follow-ups, deals, expenses, events and history
    Show { contact_id: String },

    /// Add a new lead
    AddContact(NewContactArgs),

    /// Award engagement points to a contact
    AddPoints {
        contact_id: String,

        #[arg(allow_negative_numbers = true)]
        points: i64,

        /// Reason stored in the audit log
        #[arg(long, default_value = "manual")]
        reason: String,
    },

    /// Move a contact to another stage
    Stage {
        contact_id: String,

        stage: Stage,

        /// Why the contact became a warm prospect
        #[arg(long)]
        reason: Option<String>,
    },

    /// Schedule a follow-up with a contact
    Schedule {
        contact_id: String,

        /// Day of the follow-up (YYYY-MM-DD)
        date: NaiveDate,

        /// Time of day (HH:MM:SS)
        #[arg(long)]
        time: Option<NaiveTime>,

        #[arg(long)]
        notes: Option<String>,

        /// Reminder offset label, e.g. "1 day before"
        #[arg(long)]
        reminder: Option<String>,
    },

    /// List follow-ups with their status today
    FollowUps {
        /// Every owner, not just the acting user
        #[arg(long)]
        all: bool,

        /// Skip completed follow-ups
        #[arg(long)]
        pending: bool,
    },

    /// Complete a follow-up (awards the contact one point)
    CompleteFollowUp { follow_up_id: String },

    /// Record a closed deal
    AddDeal {
        contact_id: String,

        value: f64,

        /// Deal date (YYYY-MM-DD), today when omitted
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Log an expense against a contact past lead
    AddExpense {
        contact_id: String,

        category: ExpenseCategory,

        amount: f64,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Log a networking event attended by the acting user
    AddEvent {
        name: String,

        /// Event date (YYYY-MM-DD)
        date: NaiveDate,

        #[arg(long)]
        summary: Option<String>,

        #[arg(long)]
        followup_details: Option<String>,

        /// New connections made
        #[arg(long, default_value_t = 0)]
        connections: u32,
    },

    /// Record where a warm lead was met
    WarmLeadEvent {
        contact_id: String,

        event_type: WarmLeadEventType,

        where_we_met: String,

        /// Event date (YYYY-MM-DD), today when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List warm prospects waiting 90 days or more
    Overdue {
        /// Across the whole team instead of the acting user
        #[arg(long)]
        team: bool,
    },

    /// Personal pipeline and follow-up summary
    Dashboard,

    /// Team overview (admin only)
    Team,

    /// Personal finance report
    Report,

    /// Mark a contact do-not-contact
    Dnc { contact_id: String },

    /// Soft-delete a contact
    Delete { contact_id: String },

    /// Restore a soft-deleted contact (admin only)
    Restore { contact_id: String },

    /// Audit history for a contact, newest first
    History { contact_id: String },

    /// Register a BD user
    AddUser {
        id: String,

        email: String,

        /// Full name
        name: String,
    },

    /// Grant a role (admin only, except for the first admin)
    GrantRole { user_id: String, role: AppRole },
}

/// Fields of a new contact.
#[derive(Args, Debug)]
pub struct NewContactArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    /// Why this contact matters, at least 10 characters
    #[arg(long)]
    pub intent: String,

    #[arg(long)]
    pub source: ContactSource,

    /// Who referred the contact (referral source)
    #[arg(long)]
    pub referral_by: Option<String>,

    /// Channel for a social media source
    #[arg(long)]
    pub social_channel: Option<SocialChannel>,

    /// Free text for source "other"
    #[arg(long)]
    pub source_other: Option<String>,

    #[arg(long)]
    pub profession: Option<Profession>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub company: Option<String>,

    #[arg(long)]
    pub parent_company: Option<String>,

    /// Owning BD user, the acting user when omitted
    #[arg(long)]
    pub owner: Option<String>,

    /// Create even when a contact with the same email or phone exists
    #[arg(long)]
    pub allow_duplicate: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
