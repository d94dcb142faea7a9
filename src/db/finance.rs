use rusqlite::{params, Row};

use super::*;
use crate::finance::{Deal, Expense};

impl CrmDb {
    // =========================================================================
    // Deals
    // =========================================================================

    pub fn insert_deal(&self, deal: &Deal) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO deals (id, contact_id, bd_user_id, deal_date, deal_value, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                deal.id,
                deal.contact_id,
                deal.bd_user_id,
                deal.deal_date,
                deal.deal_value,
                deal.notes,
                deal.created_at,
            ],
        )?;
        Ok(())
    }

    /// Deals closed by a user (or everyone), most recent deal date first.
    pub fn list_deals(&self, owner: Option<&str>) -> Result<Vec<Deal>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, contact_id, bd_user_id, deal_date, deal_value, notes, created_at
             FROM deals
             WHERE ?1 IS NULL OR bd_user_id = ?1
             ORDER BY deal_date DESC, created_at DESC",
        )?;
        let rows = stmt.query_map(params![owner], Self::map_deal_row)?;
        collect_rows(rows)
    }

    pub fn list_deals_for_contact(&self, contact_id: &str) -> Result<Vec<Deal>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, contact_id, bd_user_id, deal_date, deal_value, notes, created_at
             FROM deals
             WHERE contact_id = ?1
             ORDER BY deal_date DESC, created_at DESC",
        )?;
        let rows = stmt.query_map(params![contact_id], Self::map_deal_row)?;
        collect_rows(rows)
    }

    fn map_deal_row(row: &Row) -> rusqlite::Result<Deal> {
        Ok(Deal {
            id: row.get(0)?,
            contact_id: row.get(1)?,
            bd_user_id: row.get(2)?,
            deal_date: row.get(3)?,
            deal_value: row.get(4)?,
            notes: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    // =========================================================================
    // Expenses
    // =========================================================================

    pub fn insert_expense(&self, expense: &Expense) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO expenses (id, contact_id, category, amount, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                expense.id,
                expense.contact_id,
                expense.category,
                expense.amount,
                expense.notes,
                expense.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn list_expenses_for_contact(&self, contact_id: &str) -> Result<Vec<Expense>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, contact_id, category, amount, notes, created_at
             FROM expenses
             WHERE contact_id = ?1
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![contact_id], Self::map_expense_row)?;
        collect_rows(rows)
    }

    /// Expenses logged against contacts owned by `owner` (or everyone).
    pub fn list_expenses(&self, owner: Option<&str>) -> Result<Vec<Expense>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT e.id, e.contact_id, e.category, e.amount, e.notes, e.created_at
             FROM expenses e
             JOIN contacts c ON c.id = e.contact_id
             WHERE ?1 IS NULL OR c.bd_user_id = ?1
             ORDER BY e.created_at DESC",
        )?;
        let rows = stmt.query_map(params![owner], Self::map_expense_row)?;
        collect_rows(rows)
    }

    fn map_expense_row(row: &Row) -> rusqlite::Result<Expense> {
        Ok(Expense {
            id: row.get(0)?,
            contact_id: row.get(1)?,
            category: row.get(2)?,
            amount: row.get(3)?,
            notes: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::test_utils::test_db;
    use super::*;
    use crate::contacts::tests::sample_input;
    use crate::finance::{NewDeal, NewExpense};
    use crate::types::ExpenseCategory;
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 15, 0, 0).unwrap()
    }

    fn seed_contact(db: &CrmDb, id: &str, owner: &str) {
        let contact = sample_input(owner).into_contact(id.into(), now()).unwrap();
        db.insert_contact(&contact).expect("insert contact");
    }

    fn deal(id: &str, contact_id: &str, owner: &str, month: u32, value: f64) -> Deal {
        NewDeal {
            contact_id: contact_id.into(),
            bd_user_id: owner.into(),
            deal_date: NaiveDate::from_ymd_opt(2026, month, 15).unwrap(),
            deal_value: value,
            notes: None,
        }
        .into_deal(id.into(), now())
        .unwrap()
    }

    #[test]
    fn test_deals_by_owner_and_contact() {
        let db = test_db();
        seed_contact(&db, "c1", "u1");
        seed_contact(&db, "c2", "u2");
        db.insert_deal(&deal("d1", "c1", "u1", 3, 2500.0)).unwrap();
        db.insert_deal(&deal("d2", "c1", "u1", 5, 1200.5)).unwrap();
        db.insert_deal(&deal("d3", "c2", "u2", 4, 900.0)).unwrap();

        let mine: Vec<String> = db
            .list_deals(Some("u1"))
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(mine, vec!["d2", "d1"]);
        assert_eq!(db.list_deals(None).unwrap().len(), 3);

        let for_c2 = db.list_deals_for_contact("c2").unwrap();
        assert_eq!(for_c2.len(), 1);
        assert_eq!(for_c2[0].deal_value, 900.0);
    }

    #[test]
    fn test_expenses_follow_contact_owner() {
        let db = test_db();
        seed_contact(&db, "c1", "u1");
        seed_contact(&db, "c2", "u2");
        for (id, contact, offset) in [("e1", "c1", 0), ("e2", "c1", 1), ("e3", "c2", 2)] {
            let expense = NewExpense {
                contact_id: contact.into(),
                category: ExpenseCategory::Meal,
                amount: 45.25,
                notes: Some("lunch".into()),
            }
            .into_expense(id.into(), now() + Duration::minutes(offset))
            .unwrap();
            db.insert_expense(&expense).unwrap();
        }

        let mine: Vec<String> = db
            .list_expenses(Some("u1"))
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(mine, vec!["e2", "e1"]);

        let for_c2 = db.list_expenses_for_contact("c2").unwrap();
        assert_eq!(for_c2.len(), 1);
        assert_eq!(for_c2[0].category, ExpenseCategory::Meal);
    }

    #[test]
    fn test_schema_rejects_non_positive_amounts() {
        let db = test_db();
        seed_contact(&db, "c1", "u1");
        let mut bad = deal("d1", "c1", "u1", 3, 10.0);
        bad.deal_value = 0.0;
        assert!(db.insert_deal(&bad).is_err());
    }
}
