// Finance service: deals and expenses logged against contacts.

use chrono::{DateTime, Utc};

use super::{active_contact, new_id};
use crate::db::CrmDb;
use crate::error::{CrmError, CrmResult};
use crate::finance::{Deal, Expense, NewDeal, NewExpense};

pub fn add_deal(db: &CrmDb, input: NewDeal, as_of: DateTime<Utc>) -> CrmResult<Deal> {
    active_contact(db, &input.contact_id)?;
    let deal = input.into_deal(new_id(), as_of)?;
    db.insert_deal(&deal)?;
    log::info!(
        "Recorded deal {} of {:.2} for contact {}",
        deal.id,
        deal.deal_value,
        deal.contact_id
    );
    Ok(deal)
}

/// Log an expense. Contacts still at lead do not accept expenses.
pub fn add_expense(db: &CrmDb, input: NewExpense, as_of: DateTime<Utc>) -> CrmResult<Expense> {
    let contact = active_contact(db, &input.contact_id)?;
    if !contact.accepts_expenses() {
        return Err(CrmError::InvalidInput(format!(
            "Expenses cannot be logged for {} while at {}",
            contact.full_name(),
            contact.stage.label()
        )));
    }
    let expense = input.into_expense(new_id(), as_of)?;
    db.insert_expense(&expense)?;
    log::info!(
        "Recorded {} expense {} for contact {}",
        expense.category,
        expense.id,
        expense.contact_id
    );
    Ok(expense)
}
