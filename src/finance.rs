//! Deals (income) and expenses recorded against contacts.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CrmError, CrmResult};
use crate::types::ExpenseCategory;

/// A row from the `deals` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: String,
    pub contact_id: String,
    pub bd_user_id: String,
    pub deal_date: NaiveDate,
    pub deal_value: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A row from the `expenses` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub contact_id: String,
    pub category: ExpenseCategory,
    pub amount: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Reject zero, negative, NaN and infinite money amounts.
pub fn validate_amount(field: &str, value: f64) -> CrmResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(CrmError::InvalidInput(format!(
            "{field}: enter a valid amount greater than zero"
        )))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeal {
    pub contact_id: String,
    pub bd_user_id: String,
    pub deal_date: NaiveDate,
    pub deal_value: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewDeal {
    pub fn into_deal(self, id: String, as_of: DateTime<Utc>) -> CrmResult<Deal> {
        let deal_value = validate_amount("deal_value", self.deal_value)?;
        Ok(Deal {
            id,
            contact_id: self.contact_id,
            bd_user_id: self.bd_user_id,
            deal_date: self.deal_date,
            deal_value,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            created_at: as_of,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub contact_id: String,
    pub category: ExpenseCategory,
    pub amount: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewExpense {
    pub fn into_expense(self, id: String, as_of: DateTime<Utc>) -> CrmResult<Expense> {
        let amount = validate_amount("amount", self.amount)?;
        Ok(Expense {
            id,
            contact_id: self.contact_id,
            category: self.category,
            amount,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            created_at: as_of,
        })
    }
}
