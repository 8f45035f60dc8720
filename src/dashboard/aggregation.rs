//! Groups expenses into calendar-day buckets.

use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{
    catalog::EntryRef,
    expense::{Expense, ExpenseId},
};

/// A snapshot of an expense as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayExpense {
    pub id: ExpenseId,
    pub title: String,
    pub amount: f64,
    #[serde(with = "crate::dates::date_format")]
    pub date: Date,
    pub note: Option<String>,
    pub category: EntryRef,
    pub payment_method: EntryRef,
    #[serde(with = "crate::dates::timestamp_format")]
    pub created_at: OffsetDateTime,
}

impl From<Expense> for DayExpense {
    fn from(expense: Expense) -> Self {
        Self {
            id: expense.id,
            title: expense.title,
            amount: expense.amount,
            date: expense.date,
            note: expense.note,
            category: expense.category,
            payment_method: expense.payment_method,
            created_at: expense.created_at,
        }
    }
}

/// The expenses that fall on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBucket {
    #[serde(with = "crate::dates::date_format")]
    pub day: Date,
    pub expenses: Vec<DayExpense>,
}

/// Group `expenses` by their expense date.
///
/// `expenses` must already be sorted by date, oldest first. The buckets come
/// out in the same order and days without expenses are left out.
pub fn group_by_day(expenses: Vec<Expense>) -> Vec<DayBucket> {
    let mut buckets: Vec<DayBucket> = Vec::new();

    for expense in expenses {
        match buckets.last_mut() {
            Some(bucket) if bucket.day == expense.date => bucket.expenses.push(expense.into()),
            _ => buckets.push(DayBucket {
                day: expense.date,
                expenses: vec![expense.into()],
            }),
        }
    }

    buckets
}
