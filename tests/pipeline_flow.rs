use chrono::{DateTime, Duration, TimeZone, Utc};

use bdcrm_lib::audit::{AuditAction, CONTACT_ENTITY};
use bdcrm_lib::contacts::{ContactFilter, NewContact};
use bdcrm_lib::db::CrmDb;
use bdcrm_lib::error::CrmError;
use bdcrm_lib::finance::{NewDeal, NewExpense};
use bdcrm_lib::followups::NewFollowUp;
use bdcrm_lib::pipeline::Stage;
use bdcrm_lib::services::{contacts, finance, follow_ups, reports};
use bdcrm_lib::types::{AppRole, ContactSource, ExpenseCategory};
use bdcrm_lib::users::Profile;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 10, 0, 0).unwrap()
}

fn open() -> CrmDb {
    let db = CrmDb::open_in_memory().expect("in-memory db");
    for (id, name, role) in [
        ("admin", "Ada Admin", AppRole::Admin),
        ("u1", "Bo Byrne", AppRole::BdUser),
    ] {
        db.upsert_profile(&Profile {
            id: id.into(),
            email: format!("{id}@example.com"),
            full_name: name.into(),
            is_active: true,
            created_at: t0(),
            updated_at: t0(),
        })
        .expect("profile");
        db.grant_role(id, role).expect("role");
    }
    db
}

fn referral(owner: &str, email: &str) -> NewContact {
    NewContact {
        bd_user_id: owner.into(),
        source: Some(ContactSource::Referral),
        referral_by: Some("Cam at Title Co".into()),
        first_name: "Dee".into(),
        last_name: "Marsh".into(),
        email: Some(email.into()),
        company: Some("Marsh Realty".into()),
        intent: "Wants a preferred lender for buyers".into(),
        ..Default::default()
    }
}

#[test]
fn lead_to_overdue_warm_prospect() {
    let db = open();
    let contact = contacts::create_contact(&db, referral("u1", "dee@marsh.co"), false, t0()).unwrap();
    assert_eq!(contact.stage, Stage::Lead);
    assert_eq!(contact.referral_by.as_deref(), Some("Cam at Title Co"));

    contacts::add_points(&db, "u1", &contact.id, 1, "intro call", t0()).unwrap();

    let follow_up = follow_ups::schedule(
        &db,
        NewFollowUp {
            contact_id: contact.id.clone(),
            bd_user_id: "u1".into(),
            follow_up_date: (t0() + Duration::days(3)).date_naive(),
            follow_up_time: None,
            notes: Some("send buyer guide".into()),
            reminder_offset: None,
        },
        t0(),
    )
    .unwrap();

    let promoted_at = t0() + Duration::days(3);
    follow_ups::complete(&db, "u1", &follow_up.id, t0() + Duration::days(2)).unwrap();
    let outcome = contacts::add_points(&db, "u1", &contact.id, 1, "lunch", promoted_at)
        .unwrap()
        .expect("points applied");
    assert!(outcome.promoted);
    assert_eq!(outcome.new_points, 3);

    let stored = db.get_contact(&contact.id).unwrap().unwrap();
    assert_eq!(stored.stage, Stage::WarmProspect);
    assert_eq!(stored.warm_prospect_started_at, Some(promoted_at));

    // Further points never move a warm prospect.
    contacts::add_points(&db, "u1", &contact.id, 10, "referral sent", promoted_at).unwrap();
    assert_eq!(
        db.get_contact(&contact.id).unwrap().unwrap().stage,
        Stage::WarmProspect
    );

    let day_89 = promoted_at + Duration::days(89);
    let day_90 = promoted_at + Duration::days(90);
    assert!(reports::overdue_warm_prospects(&db, Some("u1"), day_89)
        .unwrap()
        .is_empty());
    let overdue = reports::overdue_warm_prospects(&db, Some("u1"), day_90).unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].name, "Dee Marsh");

    let history = db.list_audit_for_entity(CONTACT_ENTITY, &contact.id).unwrap();
    let add_points_entries = history
        .iter()
        .filter(|e| e.action == AuditAction::AddPoints)
        .count();
    assert_eq!(add_points_entries, 4);
    assert_eq!(
        history
            .iter()
            .filter(|e| e.action == AuditAction::StageChange)
            .count(),
        1
    );
}

#[test]
fn client_finances_and_reports() {
    let db = open();
    let contact = contacts::create_contact(&db, referral("u1", "dee@marsh.co"), false, t0()).unwrap();

    let err = finance::add_expense(
        &db,
        NewExpense {
            contact_id: contact.id.clone(),
            category: ExpenseCategory::Meal,
            amount: 42.0,
            notes: None,
        },
        t0(),
    )
    .unwrap_err();
    assert!(err.is_caller_error());

    contacts::change_stage(&db, "u1", &contact.id, Stage::Client, None, t0()).unwrap();
    finance::add_expense(
        &db,
        NewExpense {
            contact_id: contact.id.clone(),
            category: ExpenseCategory::Meal,
            amount: 42.0,
            notes: None,
        },
        t0(),
    )
    .unwrap();
    finance::add_deal(
        &db,
        NewDeal {
            contact_id: contact.id.clone(),
            bd_user_id: "u1".into(),
            deal_date: t0().date_naive(),
            deal_value: 420.0,
            notes: None,
        },
        t0(),
    )
    .unwrap();

    let report = reports::finance_report(&db, "u1", t0()).unwrap();
    assert_eq!(report.total_income, 420.0);
    assert_eq!(report.total_expenses, 42.0);
    assert_eq!(report.expense_ratio, Some(10.0));
    assert_eq!(report.top_contacts[0].contact_id, contact.id);
    assert_eq!(report.conversion_rate, 100.0);

    let dashboard = reports::dashboard(&db, "u1", t0()).unwrap();
    assert_eq!(dashboard.stages.client, 1);

    assert!(matches!(
        reports::team_overview(&db, "u1", t0()).unwrap_err(),
        CrmError::Forbidden(_)
    ));
    let team = reports::team_overview(&db, "admin", t0()).unwrap();
    assert_eq!(team.total_contacts, 1);
}

#[test]
fn delete_and_admin_restore() {
    let db = open();
    let contact = contacts::create_contact(&db, referral("u1", "dee@marsh.co"), false, t0()).unwrap();
    contacts::mark_dnc(&db, "u1", &contact.id, t0()).unwrap();
    contacts::soft_delete(&db, "u1", &contact.id, t0()).unwrap();

    let visible = db
        .list_contacts(&ContactFilter {
            bd_user_id: Some("u1".into()),
            ..Default::default()
        })
        .unwrap();
    assert!(visible.is_empty());

    assert!(contacts::restore(&db, "u1", &contact.id, t0()).is_err());
    let restored = contacts::restore(&db, "admin", &contact.id, t0()).unwrap();
    assert!(restored.is_dnc, "restore keeps the do-not-contact flag");

    let actions: Vec<AuditAction> = db
        .list_audit_for_entity(CONTACT_ENTITY, &contact.id)
        .unwrap()
        .into_iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(actions.len(), 3);
    for action in [AuditAction::MarkDnc, AuditAction::SoftDelete, AuditAction::Restore] {
        assert!(actions.contains(&action));
    }
}
