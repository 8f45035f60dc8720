//! Database query helpers for reading a user's expenses.

use rusqlite::{Connection, Row, named_params};
use time::Date;

use crate::{
    Error,
    catalog::{CatalogId, EntryRef},
    expense::{Expense, ExpenseId},
    pagination::PageRequest,
    user::UserID,
};

/// The order to sort expenses in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// The order the expenses were created in.
    Created,
    /// Oldest expense date first, ties broken by creation order.
    DateAscending,
    /// Newest expense date first, ties broken by newest creation.
    DateDescending,
}

impl SortOrder {
    fn order_clause(self) -> &'static str {
        match self {
            SortOrder::Created => "ORDER BY e.id ASC",
            SortOrder::DateAscending => "ORDER BY e.date ASC, e.id ASC",
            SortOrder::DateDescending => "ORDER BY e.date DESC, e.id DESC",
        }
    }
}

/// The structured conditions an expense must satisfy to be returned.
///
/// Every filter is scoped to a single user. Unset fields do not constrain
/// the result and date bounds are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseFilter {
    pub user_id: UserID,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub category_id: Option<CatalogId>,
    pub payment_method_id: Option<CatalogId>,
}

impl ExpenseFilter {
    /// A filter that matches every expense owned by `user_id`.
    pub fn for_user(user_id: UserID) -> Self {
        Self {
            user_id,
            start_date: None,
            end_date: None,
            category_id: None,
            payment_method_id: None,
        }
    }
}

const SELECT_EXPENSE: &str = "SELECT e.id, e.user_id, e.title, e.amount, e.date, e.note, \
    c.id, c.title, p.id, p.title, e.created_at, e.updated_at \
    FROM expense e \
    INNER JOIN category c ON c.id = e.category_id \
    INNER JOIN payment_method p ON p.id = e.payment_method_id";

/// Get the expense `id` if it is owned by `user_id`.
///
/// # Errors
/// Returns an [Error::ExpenseNotFound] if the expense does not exist or belongs to another user.
pub fn get_expense(id: ExpenseId, user_id: UserID, connection: &Connection) -> Result<Expense, Error> {
    connection
        .prepare(&format!(
            "{SELECT_EXPENSE} WHERE e.id = :id AND e.user_id = :user_id"
        ))?
        .query_row(
            named_params! { ":id": id, ":user_id": user_id.as_i64() },
            map_expense_row,
        )
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::ExpenseNotFound,
            error => error,
        })
}

/// Get every expense that satisfies `filter`, sorted by `sort_order`.
///
/// # Errors
/// Returns [Error::SqlError] if the query or row mapping fails.
pub fn query_expenses(
    filter: &ExpenseFilter,
    sort_order: SortOrder,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    let query = format!(
        "{SELECT_EXPENSE} \
        WHERE e.user_id = :user_id \
        AND (:start_date IS NULL OR e.date >= :start_date) \
        AND (:end_date IS NULL OR e.date <= :end_date) \
        AND (:category_id IS NULL OR e.category_id = :category_id) \
        AND (:payment_method_id IS NULL OR e.payment_method_id = :payment_method_id) \
        {}",
        sort_order.order_clause()
    );

    connection
        .prepare(&query)?
        .query_map(
            named_params! {
                ":user_id": filter.user_id.as_i64(),
                ":start_date": filter.start_date,
                ":end_date": filter.end_date,
                ":category_id": filter.category_id,
                ":payment_method_id": filter.payment_method_id,
            },
            map_expense_row,
        )?
        .map(|expense_result| expense_result.map_err(Error::SqlError))
        .collect()
}

/// Get one page of the expenses owned by `user_id`, newest date first.
pub fn get_expense_page(
    user_id: UserID,
    page: PageRequest,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    let limit = i64::try_from(page.limit).unwrap_or(i64::MAX);
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);

    connection
        .prepare(&format!(
            "{SELECT_EXPENSE} WHERE e.user_id = :user_id {} LIMIT :limit OFFSET :offset",
            SortOrder::DateDescending.order_clause()
        ))?
        .query_map(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":limit": limit,
                ":offset": offset,
            },
            map_expense_row,
        )?
        .map(|expense_result| expense_result.map_err(Error::SqlError))
        .collect()
}

/// Count the expenses owned by `user_id`.
pub fn count_expenses(user_id: UserID, connection: &Connection) -> Result<u64, Error> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM expense WHERE user_id = ?1",
        [user_id.as_i64()],
        |row| row.get(0),
    )?;

    u64::try_from(count)
        .map_err(|_| Error::SqlError(rusqlite::Error::IntegralValueOutOfRange(0, count)))
}

fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        title: row.get(2)?,
        amount: row.get(3)?,
        date: row.get(4)?,
        note: row.get(5)?,
        category: EntryRef {
            id: row.get(6)?,
            title: row.get(7)?,
        },
        payment_method: EntryRef {
            id: row.get(8)?,
            title: row.get(9)?,
        },
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}
