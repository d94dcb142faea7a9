//! Command-line front end.
//!
//! Resolves configuration, opens the store, runs one command as the acting
//! user and prints the result as JSON on stdout.

mod args;

pub use args::{Cli, Command, NewContactArgs};

use std::io::Write;

use chrono::Utc;
use serde::Serialize;

use crate::audit::CONTACT_ENTITY;
use crate::config::{self, Config};
use crate::contacts::{ContactFilter, NewContact};
use crate::db::CrmDb;
use crate::error::{CrmError, CrmResult};
use crate::events::{NewNetworkingEvent, NewWarmLeadEvent};
use crate::finance::{NewDeal, NewExpense};
use crate::followups::NewFollowUp;
use crate::services;
use crate::users::NewProfile;

/// Parse arguments, run the command and print its JSON result.
pub fn run() -> CrmResult<()> {
    let cli = Cli::parse_args();
    let config = resolve_config(&cli)?;
    init_logging(&config);
    execute(&cli, &config)
}

fn resolve_config(cli: &Cli) -> CrmResult<Config> {
    let mut config = match &cli.config {
        Some(path) => config::load_config_from(path)?,
        None => {
            let path = config::config_path()?;
            if path.exists() {
                config::load_config_from(&path)?
            } else {
                Config::default()
            }
        }
    };
    if let Some(db) = &cli.db {
        config.db_path = Some(db.display().to_string());
    }
    if let Some(user) = &cli.user {
        config.user_id = Some(user.clone());
    }
    Ok(config)
}

/// `RUST_LOG` wins over the configured level.
fn init_logging(config: &Config) {
    let default_level = config.log_level.as_deref().unwrap_or("warn");
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .try_init();
}

fn acting_user(config: &Config) -> CrmResult<&str> {
    config.user_id.as_deref().ok_or_else(|| {
        CrmError::Config(
            "No acting user. Pass --user or set \"userId\" in ~/.bdcrm/config.json".to_string(),
        )
    })
}

/// Run one command against the configured database.
pub fn execute(cli: &Cli, config: &Config) -> CrmResult<()> {
    let user = acting_user(config)?;
    let db = CrmDb::open_at(config.resolved_db_path()?)?;
    let now = Utc::now();
    let mut out = std::io::stdout();

    match &cli.command {
        Command::Contacts {
            stage,
            search,
            all,
            include_deleted,
        } => {
            let filter = ContactFilter {
                stage: *stage,
                search: search.clone(),
                bd_user_id: if *all { None } else { Some(user.to_string()) },
                include_deleted: *include_deleted,
            };
            print_json(&mut out, &db.list_contacts(&filter)?)
        }
        Command::Show { contact_id } => print_json(
            &mut out,
            &services::contacts::contact_detail(&db, contact_id)?,
        ),
        Command::AddContact(args) => {
            let contact = services::contacts::create_contact(
                &db,
                new_contact(args, user),
                args.allow_duplicate,
                now,
            )?;
            print_json(&mut out, &contact)
        }
        Command::AddPoints {
            contact_id,
            points,
            reason,
        } => {
            let outcome = services::contacts::add_points(&db, user, contact_id, *points, reason, now)?;
            print_json(&mut out, &outcome.map(|o| o.state))
        }
        Command::Stage {
            contact_id,
            stage,
            reason,
        } => {
            let change = services::contacts::change_stage(
                &db,
                user,
                contact_id,
                *stage,
                reason.as_deref(),
                now,
            )?;
            print_json(&mut out, &change.state)
        }
        Command::Schedule {
            contact_id,
            date,
            time,
            notes,
            reminder,
        } => {
            let input = NewFollowUp {
                contact_id: contact_id.clone(),
                bd_user_id: user.to_string(),
                follow_up_date: *date,
                follow_up_time: *time,
                notes: notes.clone(),
                reminder_offset: reminder.clone(),
            };
            print_json(&mut out, &services::follow_ups::schedule(&db, input, now)?)
        }
        Command::FollowUps { all, pending } => {
            let owner = if *all { None } else { Some(user) };
            print_json(
                &mut out,
                &services::follow_ups::list_classified(&db, owner, *pending, now.date_naive())?,
            )
        }
        Command::AddDeal {
            contact_id,
            value,
            date,
            notes,
        } => {
            let input = NewDeal {
                contact_id: contact_id.clone(),
                bd_user_id: user.to_string(),
                deal_date: date.unwrap_or_else(|| now.date_naive()),
                deal_value: *value,
                notes: notes.clone(),
            };
            print_json(&mut out, &services::finance::add_deal(&db, input, now)?)
        }
        Command::AddExpense {
            contact_id,
            category,
            amount,
            notes,
        } => {
            let input = NewExpense {
                contact_id: contact_id.clone(),
                category: *category,
                amount: *amount,
                notes: notes.clone(),
            };
            print_json(&mut out, &services::finance::add_expense(&db, input, now)?)
        }
        Command::AddEvent {
            name,
            date,
            summary,
            followup_details,
            connections,
        } => {
            let input = NewNetworkingEvent {
                user_id: user.to_string(),
                name: name.clone(),
                event_date: *date,
                summary: summary.clone(),
                followup_details: followup_details.clone(),
                connections_count: *connections,
            };
            print_json(&mut out, &services::events::log_event(&db, input, now)?)
        }
        Command::WarmLeadEvent {
            contact_id,
            event_type,
            where_we_met,
            date,
        } => {
            let input = NewWarmLeadEvent {
                contact_id: contact_id.clone(),
                event_type: *event_type,
                where_we_met: where_we_met.clone(),
                event_date: date.unwrap_or_else(|| now.date_naive()),
            };
            print_json(
                &mut out,
                &services::events::log_warm_lead_event(&db, input, now)?,
            )
        }
        Command::CompleteFollowUp { follow_up_id } => {
            let outcome = services::follow_ups::complete(&db, user, follow_up_id, now)?;
            print_json(&mut out, &outcome.state)
        }
        Command::Overdue { team } => {
            let owner = if *team { None } else { Some(user) };
            print_json(
                &mut out,
                &services::reports::overdue_warm_prospects(&db, owner, now)?,
            )
        }
        Command::Dashboard => print_json(&mut out, &services::reports::dashboard(&db, user, now)?),
        Command::Team => print_json(&mut out, &services::reports::team_overview(&db, user, now)?),
        Command::Report => print_json(
            &mut out,
            &services::reports::finance_report(&db, user, now)?,
        ),
        Command::Dnc { contact_id } => print_json(
            &mut out,
            &services::contacts::mark_dnc(&db, user, contact_id, now)?,
        ),
        Command::Delete { contact_id } => {
            services::contacts::soft_delete(&db, user, contact_id, now)?;
            print_json(&mut out, &serde_json::json!({ "deleted": contact_id }))
        }
        Command::Restore { contact_id } => print_json(
            &mut out,
            &services::contacts::restore(&db, user, contact_id, now)?,
        ),
        Command::History { contact_id } => print_json(
            &mut out,
            &db.list_audit_for_entity(CONTACT_ENTITY, contact_id)?,
        ),
        Command::AddUser { id, email, name } => {
            let input = NewProfile {
                id: id.clone(),
                email: email.clone(),
                full_name: name.clone(),
            };
            print_json(&mut out, &services::users::register_user(&db, input, now)?)
        }
        Command::GrantRole { user_id, role } => print_json(
            &mut out,
            &services::users::grant_role(&db, user, user_id, *role)?,
        ),
    }
}

/// Owner defaults to the acting user.
fn new_contact(args: &NewContactArgs, user: &str) -> NewContact {
    NewContact {
        bd_user_id: args.owner.clone().unwrap_or_else(|| user.to_string()),
        source: Some(args.source),
        referral_by: args.referral_by.clone(),
        social_channel: args.social_channel,
        source_other: args.source_other.clone(),
        profession: args.profession,
        first_name: args.first_name.clone(),
        last_name: args.last_name.clone(),
        phone: args.phone.clone(),
        email: args.email.clone(),
        company: args.company.clone(),
        parent_company: args.parent_company.clone(),
        screenshot_url: None,
        intent: args.intent.clone(),
    }
}

fn print_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> CrmResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| CrmError::Output(format!("Failed to serialize output: {}", e)))?;
    writeln!(out, "{}", text)
        .map_err(|e| CrmError::Output(format!("Failed to write output: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_flags_override_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config_file = dir.path().join("config.json");
        std::fs::write(&config_file, r#"{ "userId": "from-file", "dbPath": "/x.db" }"#)
            .expect("write config");
        let db_path = dir.path().join("crm.db");

        let cli = Cli::try_parse_from([
            "bdcrm".to_string(),
            "--config".to_string(),
            config_file.display().to_string(),
            "--db".to_string(),
            db_path.display().to_string(),
            "dashboard".to_string(),
        ])
        .expect("parses");
        let config = resolve_config(&cli).expect("config resolves");
        assert_eq!(config.user_id.as_deref(), Some("from-file"));
        assert_eq!(config.resolved_db_path().unwrap(), db_path);
    }

    #[test]
    fn test_execute_requires_acting_user() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config {
            db_path: Some(dir.path().join("crm.db").display().to_string()),
            ..Default::default()
        };
        let cli = Cli::try_parse_from(["bdcrm", "dashboard"]).expect("parses");
        let err = execute(&cli, &config).unwrap_err();
        assert!(matches!(err, CrmError::Config(_)));
        assert!(
            !dir.path().join("crm.db").exists(),
            "no database is created without an acting user"
        );
    }

    #[test]
    fn test_execute_add_contact_then_show() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("crm.db");
        let config = Config {
            db_path: Some(db_path.display().to_string()),
            user_id: Some("u1".into()),
            ..Default::default()
        };
        let add = [
            "bdcrm",
            "add-contact",
            "--first-name",
            "Dee",
            "--last-name",
            "Marsh",
            "--intent",
            "Wants a preferred lender",
            "--source",
            "event",
            "--email",
            "dee@marsh.co",
        ];
        let cli = Cli::try_parse_from(add).expect("parses");
        execute(&cli, &config).expect("first add");
        let err = execute(&cli, &config).unwrap_err();
        assert!(err.to_string().contains("Dee Marsh"));

        let mut forced = add.to_vec();
        forced.push("--allow-duplicate");
        execute(&Cli::try_parse_from(forced).expect("parses"), &config).expect("confirmed add");

        let db = CrmDb::open_at(&db_path).expect("reopen");
        let contacts = db
            .list_contacts(&ContactFilter {
                bd_user_id: Some("u1".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(contacts.len(), 2);

        let show = Cli::try_parse_from(["bdcrm", "show", contacts[0].id.as_str()]).expect("parses");
        execute(&show, &config).expect("show");
    }

    #[test]
    fn test_print_json_pretty() {
        let mut buf = Vec::new();
        print_json(&mut buf, &serde_json::json!({ "a": 1 })).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "{\n  \"a\": 1\n}\n");
    }
}
