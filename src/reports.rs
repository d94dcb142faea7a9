//! KPI tallies over loaded rows.
//!
//! Everything here is a pure function of the rows passed in and an explicit
//! `as_of` instant. Callers decide which rows are in scope (one user, the
//! whole team, deleted contacts excluded).

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::contacts::Contact;
use crate::events::NetworkingEvent;
use crate::finance::{Deal, Expense};
use crate::followups::{FollowUp, FollowUpStatus};
use crate::pipeline::Stage;
use crate::types::ExpenseCategory;
use crate::users::Profile;

/// Window for "recent" networking events in the team overview.
pub const RECENT_EVENT_DAYS: i64 = 30;
/// Number of months in the finance trend, ending at the as-of month.
pub const TREND_MONTHS: u32 = 6;
/// Number of contacts listed in the top-by-deal-value table.
pub const TOP_CONTACTS: usize = 5;

// =============================================================================
// Stage counts
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageCounts {
    pub lead: usize,
    pub warm_lead: usize,
    pub prospect: usize,
    pub warm_prospect: usize,
    pub client: usize,
    pub active_client: usize,
}

impl StageCounts {
    pub fn tally<'a>(contacts: impl IntoIterator<Item = &'a Contact>) -> Self {
        let mut counts = Self::default();
        for contact in contacts {
            *counts.slot(contact.stage) += 1;
        }
        counts
    }

    fn slot(&mut self, stage: Stage) -> &mut usize {
        match stage {
            Stage::Lead => &mut self.lead,
            Stage::WarmLead => &mut self.warm_lead,
            Stage::Prospect => &mut self.prospect,
            Stage::WarmProspect => &mut self.warm_prospect,
            Stage::Client => &mut self.client,
            Stage::ActiveClient => &mut self.active_client,
        }
    }

    pub fn get(&self, stage: Stage) -> usize {
        match stage {
            Stage::Lead => self.lead,
            Stage::WarmLead => self.warm_lead,
            Stage::Prospect => self.prospect,
            Stage::WarmProspect => self.warm_prospect,
            Stage::Client => self.client,
            Stage::ActiveClient => self.active_client,
        }
    }

    pub fn total(&self) -> usize {
        Stage::ALL.iter().map(|s| self.get(*s)).sum()
    }

    pub fn clients(&self) -> usize {
        self.client + self.active_client
    }

    /// Clients as a percentage of all contacts; 0 when there are none.
    pub fn conversion_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.clients() as f64 / total as f64 * 100.0
        }
    }
}

// =============================================================================
// Follow-up stats
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpStats {
    pub pending: usize,
    pub due_today: usize,
    pub overdue: usize,
    pub completed: usize,
}

impl FollowUpStats {
    pub fn tally<'a>(follow_ups: impl IntoIterator<Item = &'a FollowUp>, today: NaiveDate) -> Self {
        let mut stats = Self::default();
        for follow_up in follow_ups {
            match follow_up.status_on(today) {
                FollowUpStatus::Completed => stats.completed += 1,
                FollowUpStatus::Overdue => {
                    stats.pending += 1;
                    stats.overdue += 1;
                }
                FollowUpStatus::DueToday => {
                    stats.pending += 1;
                    stats.due_today += 1;
                }
                FollowUpStatus::Upcoming => stats.pending += 1,
            }
        }
        stats
    }
}

// =============================================================================
// Personal dashboard
// =============================================================================

/// A warm prospect past the overdue window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueProspect {
    pub contact_id: String,
    pub name: String,
    pub company: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub days_as_warm_prospect: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub as_of: DateTime<Utc>,
    pub stages: StageCounts,
    pub total_contacts: usize,
    pub conversion_rate: f64,
    pub follow_ups: FollowUpStats,
    pub overdue_warm_prospects: Vec<OverdueProspect>,
}

/// Warm prospects that are overdue at `as_of`, longest-waiting first.
pub fn overdue_warm_prospects<'a>(
    contacts: impl IntoIterator<Item = &'a Contact>,
    as_of: DateTime<Utc>,
) -> Vec<OverdueProspect> {
    let mut overdue: Vec<OverdueProspect> = contacts
        .into_iter()
        .filter(|c| !c.is_deleted && c.is_overdue(as_of))
        .map(|c| OverdueProspect {
            contact_id: c.id.clone(),
            name: c.full_name(),
            company: c.company.clone(),
            started_at: c.warm_prospect_started_at,
            days_as_warm_prospect: c
                .warm_prospect_started_at
                .map(|started| (as_of - started).num_days())
                .unwrap_or(0),
        })
        .collect();
    overdue.sort_by(|a, b| b.days_as_warm_prospect.cmp(&a.days_as_warm_prospect));
    overdue
}

pub fn personal_dashboard(
    contacts: &[Contact],
    follow_ups: &[FollowUp],
    as_of: DateTime<Utc>,
) -> Dashboard {
    let stages = StageCounts::tally(contacts);
    Dashboard {
        as_of,
        stages,
        total_contacts: stages.total(),
        conversion_rate: stages.conversion_rate(),
        follow_ups: FollowUpStats::tally(follow_ups, as_of.date_naive()),
        overdue_warm_prospects: overdue_warm_prospects(contacts, as_of),
    }
}

// =============================================================================
// Team overview
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub user_id: String,
    pub full_name: String,
    pub initials: String,
    pub stages: StageCounts,
    pub total_contacts: usize,
    pub events_last_30_days: usize,
    pub pending_follow_ups: usize,
    pub overdue_follow_ups: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamOverview {
    pub as_of: DateTime<Utc>,
    pub members: Vec<MemberSummary>,
    pub total_contacts: usize,
    pub total_pending_follow_ups: usize,
    pub total_overdue_follow_ups: usize,
    pub total_events_last_30_days: usize,
}

/// Per-member activity across the team. Rows owned by users not in
/// `profiles` still count toward the global totals.
pub fn team_overview(
    profiles: &[Profile],
    contacts: &[Contact],
    follow_ups: &[FollowUp],
    events: &[NetworkingEvent],
    as_of: DateTime<Utc>,
) -> TeamOverview {
    let today = as_of.date_naive();
    let window_start = (as_of - Duration::days(RECENT_EVENT_DAYS)).date_naive();
    let recent_events: Vec<&NetworkingEvent> = events
        .iter()
        .filter(|e| e.event_date >= window_start)
        .collect();
    let pending: Vec<&FollowUp> = follow_ups.iter().filter(|f| f.is_pending()).collect();

    let members = profiles
        .iter()
        .map(|profile| {
            let owned: Vec<&Contact> = contacts
                .iter()
                .filter(|c| c.bd_user_id == profile.id)
                .collect();
            let stats = FollowUpStats::tally(
                pending.iter().copied().filter(|f| f.bd_user_id == profile.id),
                today,
            );
            MemberSummary {
                user_id: profile.id.clone(),
                full_name: profile.full_name.clone(),
                initials: profile.initials(),
                stages: StageCounts::tally(owned.iter().copied()),
                total_contacts: owned.len(),
                events_last_30_days: recent_events
                    .iter()
                    .filter(|e| e.user_id == profile.id)
                    .count(),
                pending_follow_ups: stats.pending,
                overdue_follow_ups: stats.overdue,
            }
        })
        .collect();

    TeamOverview {
        as_of,
        members,
        total_contacts: contacts.len(),
        total_pending_follow_ups: pending.len(),
        total_overdue_follow_ups: pending
            .iter()
            .filter(|f| f.follow_up_date < today)
            .count(),
        total_events_last_30_days: recent_events.len(),
    }
}

// =============================================================================
// Personal finance report
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactValue {
    pub contact_id: String,
    pub name: String,
    pub stage: Stage,
    pub total_value: f64,
    pub deal_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotals {
    pub year: i32,
    pub month: u32,
    pub income: f64,
    pub expenses: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub label: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceReport {
    pub as_of: DateTime<Utc>,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net: f64,
    /// Expenses as a percentage of income; None when there is no income.
    pub expense_ratio: Option<f64>,
    pub stages: StageCounts,
    pub conversion_rate: f64,
    pub top_contacts: Vec<ContactValue>,
    pub monthly_trend: Vec<MonthlyTotals>,
    pub expenses_by_category: Vec<CategoryTotal>,
    pub completed_follow_ups: usize,
    pub overdue_follow_ups: usize,
}

/// The `count` months ending at the month of `as_of`, oldest first.
fn trailing_months(as_of: DateTime<Utc>, count: u32) -> Vec<(i32, u32)> {
    let end = as_of.year() * 12 + as_of.month0() as i32;
    (0..count as i32)
        .rev()
        .map(|back| {
            let index = end - back;
            (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
        })
        .collect()
}

fn month_of(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

pub fn finance_report(
    contacts: &[Contact],
    deals: &[Deal],
    expenses: &[Expense],
    follow_ups: &[FollowUp],
    as_of: DateTime<Utc>,
) -> FinanceReport {
    let total_income: f64 = deals.iter().map(|d| d.deal_value).sum();
    let total_expenses: f64 = expenses.iter().map(|e| e.amount).sum();
    let expense_ratio = if total_income > 0.0 {
        Some(total_expenses / total_income * 100.0)
    } else {
        None
    };

    let mut by_contact: HashMap<&str, (f64, usize)> = HashMap::new();
    for deal in deals {
        let entry = by_contact.entry(deal.contact_id.as_str()).or_default();
        entry.0 += deal.deal_value;
        entry.1 += 1;
    }
    let mut top_contacts: Vec<ContactValue> = contacts
        .iter()
        .filter_map(|c| {
            by_contact.get(c.id.as_str()).map(|(total, count)| ContactValue {
                contact_id: c.id.clone(),
                name: c.full_name(),
                stage: c.stage,
                total_value: *total,
                deal_count: *count,
            })
        })
        .collect();
    top_contacts.sort_by(|a, b| b.total_value.total_cmp(&a.total_value));
    top_contacts.truncate(TOP_CONTACTS);

    let monthly_trend = trailing_months(as_of, TREND_MONTHS)
        .into_iter()
        .map(|(year, month)| MonthlyTotals {
            year,
            month,
            income: deals
                .iter()
                .filter(|d| month_of(d.deal_date) == (year, month))
                .map(|d| d.deal_value)
                .sum(),
            expenses: expenses
                .iter()
                .filter(|e| month_of(e.created_at.date_naive()) == (year, month))
                .map(|e| e.amount)
                .sum(),
        })
        .collect();

    let mut category_totals: HashMap<ExpenseCategory, f64> = HashMap::new();
    for expense in expenses {
        *category_totals.entry(expense.category).or_default() += expense.amount;
    }
    let mut expenses_by_category: Vec<CategoryTotal> = category_totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category,
            label: category.label(),
            total,
        })
        .collect();
    expenses_by_category.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.as_str().cmp(b.category.as_str()))
    });

    let stages = StageCounts::tally(contacts);
    let follow_up_stats = FollowUpStats::tally(follow_ups, as_of.date_naive());

    FinanceReport {
        as_of,
        total_income,
        total_expenses,
        net: total_income - total_expenses,
        expense_ratio,
        stages,
        conversion_rate: stages.conversion_rate(),
        top_contacts,
        monthly_trend,
        expenses_by_category,
        completed_follow_ups: follow_up_stats.completed,
        overdue_follow_ups: follow_up_stats.overdue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::tests::sample_input;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 10, 12, 0, 0).unwrap()
    }

    fn contact(id: &str, owner: &str, stage: Stage) -> Contact {
        let mut contact = sample_input(owner)
            .into_contact(id.into(), now() - Duration::days(200))
            .unwrap();
        contact.stage = stage;
        contact
    }

    fn follow_up(id: &str, owner: &str, date: NaiveDate, done: bool) -> FollowUp {
        FollowUp {
            id: id.into(),
            contact_id: "c1".into(),
            bd_user_id: owner.into(),
            follow_up_date: date,
            follow_up_time: None,
            notes: None,
            reminder_offset: None,
            is_completed: done,
            completed_at: None,
            created_at: now(),
        }
    }

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    fn deal(contact_id: &str, date: NaiveDate, value: f64) -> Deal {
        Deal {
            id: format!("d-{contact_id}-{date}"),
            contact_id: contact_id.into(),
            bd_user_id: "u1".into(),
            deal_date: date,
            deal_value: value,
            notes: None,
            created_at: now(),
        }
    }

    fn expense(category: ExpenseCategory, amount: f64, at: DateTime<Utc>) -> Expense {
        Expense {
            id: format!("e-{}-{amount}", category.as_str()),
            contact_id: "c1".into(),
            category,
            amount,
            notes: None,
            created_at: at,
        }
    }

    #[test]
    fn test_stage_counts_and_conversion() {
        let contacts = vec![
            contact("c1", "u1", Stage::Lead),
            contact("c2", "u1", Stage::Client),
            contact("c3", "u1", Stage::ActiveClient),
            contact("c4", "u1", Stage::WarmLead),
        ];
        let counts = StageCounts::tally(&contacts);
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.clients(), 2);
        assert_eq!(counts.get(Stage::WarmLead), 1);
        assert_eq!(counts.conversion_rate(), 50.0);
        assert_eq!(StageCounts::default().conversion_rate(), 0.0);
    }

    #[test]
    fn test_follow_up_stats_split_by_day() {
        let today = now().date_naive();
        let follow_ups = vec![
            follow_up("f1", "u1", day(6, 1), false),
            follow_up("f2", "u1", today, false),
            follow_up("f3", "u1", day(6, 20), false),
            follow_up("f4", "u1", day(5, 1), true),
        ];
        let stats = FollowUpStats::tally(&follow_ups, today);
        assert_eq!(
            stats,
            FollowUpStats {
                pending: 3,
                due_today: 1,
                overdue: 1,
                completed: 1,
            }
        );
    }

    #[test]
    fn test_dashboard_lists_overdue_warm_prospects() {
        let warm_since = |id: &str, days: i64| {
            let mut c = contact(id, "u1", Stage::WarmProspect);
            c.engagement_points = 3;
            c.warm_prospect_started_at = Some(now() - Duration::days(days));
            c.updated_at = now() - Duration::days(days);
            c
        };
        let stale = warm_since("c1", 120);
        let fresh = warm_since("c2", 10);
        let mut deleted = stale.clone();
        deleted.id = "c3".into();
        deleted.is_deleted = true;

        let dashboard = personal_dashboard(&[stale, fresh, deleted], &[], now());
        assert_eq!(dashboard.stages.warm_prospect, 3);
        assert_eq!(dashboard.overdue_warm_prospects.len(), 1);
        assert_eq!(dashboard.overdue_warm_prospects[0].contact_id, "c1");
        assert_eq!(dashboard.overdue_warm_prospects[0].days_as_warm_prospect, 120);
    }

    #[test]
    fn test_team_overview_per_member() {
        let profiles = vec![
            Profile {
                id: "u1".into(),
                email: "ana@example.com".into(),
                full_name: "Ana Ruiz".into(),
                is_active: true,
                created_at: now(),
                updated_at: now(),
            },
            Profile {
                id: "u2".into(),
                email: "ben@example.com".into(),
                full_name: "Ben Ode".into(),
                is_active: true,
                created_at: now(),
                updated_at: now(),
            },
        ];
        let contacts = vec![
            contact("c1", "u1", Stage::Lead),
            contact("c2", "u1", Stage::Client),
            contact("c3", "u2", Stage::Prospect),
        ];
        let follow_ups = vec![
            follow_up("f1", "u1", day(6, 1), false),
            follow_up("f2", "u1", day(6, 30), false),
            follow_up("f3", "u2", day(6, 2), true),
        ];
        let event = |id: &str, user: &str, date: NaiveDate| NetworkingEvent {
            id: id.into(),
            user_id: user.into(),
            name: "Mixer".into(),
            event_date: date,
            summary: None,
            followup_details: None,
            connections_count: 0,
            created_at: now(),
        };
        let events = vec![
            event("e1", "u1", day(6, 1)),
            event("e2", "u1", day(4, 1)),
            event("e3", "u2", day(5, 20)),
        ];

        let overview = team_overview(&profiles, &contacts, &follow_ups, &events, now());
        assert_eq!(overview.total_contacts, 3);
        assert_eq!(overview.total_pending_follow_ups, 2);
        assert_eq!(overview.total_overdue_follow_ups, 1);
        assert_eq!(overview.total_events_last_30_days, 2);

        let ana = &overview.members[0];
        assert_eq!(ana.initials, "AR");
        assert_eq!(ana.total_contacts, 2);
        assert_eq!(ana.stages.client, 1);
        assert_eq!(ana.events_last_30_days, 1);
        assert_eq!(ana.pending_follow_ups, 2);
        assert_eq!(ana.overdue_follow_ups, 1);

        let ben = &overview.members[1];
        assert_eq!(ben.pending_follow_ups, 0);
        assert_eq!(ben.events_last_30_days, 1);
    }

    #[test]
    fn test_trailing_months_cross_year() {
        let as_of = Utc.with_ymd_and_hms(2026, 2, 3, 0, 0, 0).unwrap();
        assert_eq!(
            trailing_months(as_of, 6),
            vec![(2025, 9), (2025, 10), (2025, 11), (2025, 12), (2026, 1), (2026, 2)]
        );
    }

    #[test]
    fn test_finance_report_totals_and_rankings() {
        let contacts = vec![
            contact("c1", "u1", Stage::Client),
            contact("c2", "u1", Stage::ActiveClient),
            contact("c3", "u1", Stage::Prospect),
        ];
        let deals = vec![
            deal("c1", day(6, 1), 1000.0),
            deal("c1", day(3, 1), 500.0),
            deal("c2", day(5, 15), 2000.0),
            deal("c2", day(1, 15), 50.0),
        ];
        let expenses = vec![
            expense(ExpenseCategory::Meal, 40.0, now()),
            expense(ExpenseCategory::EventTicket, 150.0, now() - Duration::days(40)),
            expense(ExpenseCategory::Meal, 60.0, now() - Duration::days(1)),
        ];
        let follow_ups = vec![
            follow_up("f1", "u1", day(6, 1), true),
            follow_up("f2", "u1", day(6, 2), true),
        ];

        let report = finance_report(&contacts, &deals, &expenses, &follow_ups, now());
        assert_eq!(report.total_income, 3550.0);
        assert_eq!(report.total_expenses, 250.0);
        assert_eq!(report.net, 3300.0);
        let ratio = report.expense_ratio.expect("income is positive");
        assert!((ratio - 250.0 / 3550.0 * 100.0).abs() < 1e-9);
        assert_eq!(report.completed_follow_ups, 2);

        let top: Vec<(&str, f64)> = report
            .top_contacts
            .iter()
            .map(|c| (c.contact_id.as_str(), c.total_value))
            .collect();
        assert_eq!(top, vec![("c2", 2050.0), ("c1", 1500.0)]);

        assert_eq!(report.monthly_trend.len(), 6);
        let first = &report.monthly_trend[0];
        assert_eq!((first.year, first.month), (2026, 1));
        assert_eq!(first.income, 50.0);
        let last = &report.monthly_trend[5];
        assert_eq!((last.year, last.month, last.income), (2026, 6, 1000.0));
        assert_eq!(last.expenses, 100.0);
        assert_eq!(report.monthly_trend[4].expenses, 150.0);

        assert_eq!(report.expenses_by_category[0].category, ExpenseCategory::EventTicket);
        assert_eq!(report.expenses_by_category[0].label, "Event ticket");
        assert_eq!(report.expenses_by_category[1].total, 100.0);
    }

    #[test]
    fn test_expense_ratio_absent_without_income() {
        let expenses = vec![expense(ExpenseCategory::Gift, 25.0, now())];
        let report = finance_report(&[], &[], &expenses, &[], now());
        assert_eq!(report.expense_ratio, None);
        assert_eq!(report.net, -25.0);
        assert!(report.top_contacts.is_empty());
    }
}
