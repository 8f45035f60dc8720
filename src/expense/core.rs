//! Defines the core data models and counter-maintaining writes for expenses.

use rusqlite::Connection;
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    catalog::{CatalogId, CatalogKind, EntryRef, adjust_count, entry_exists},
    expense::get_expense,
    user::UserID,
};

// ============================================================================
// MODELS
// ============================================================================

/// Database identifier for an expense.
pub type ExpenseId = i64;

/// A single recorded spend event owned by one user.
///
/// The category and payment method are resolved to their current titles
/// whenever an expense is read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: ExpenseId,
    /// The owner of the expense, fixed at creation.
    #[serde(rename = "user")]
    pub user_id: UserID,
    pub title: String,
    /// The amount of money spent, always positive.
    pub amount: f64,
    /// The calendar date of the spend, distinct from `created_at`.
    #[serde(with = "crate::dates::date_format")]
    pub date: Date,
    pub note: Option<String>,
    pub category: EntryRef,
    pub payment_method: EntryRef,
    #[serde(with = "crate::dates::timestamp_format")]
    pub created_at: OffsetDateTime,
    #[serde(with = "crate::dates::timestamp_format")]
    pub updated_at: OffsetDateTime,
}

/// The validated fields of an expense that is about to be created or updated.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub title: String,
    pub amount: f64,
    pub date: Date,
    pub note: Option<String>,
    pub category_id: CatalogId,
    pub payment_method_id: CatalogId,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the expense table and its indexes.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            amount REAL NOT NULL,
            date TEXT NOT NULL,
            note TEXT,
            category_id INTEGER NOT NULL,
            payment_method_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(payment_method_id) REFERENCES payment_method(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_expense_user_date ON expense(user_id, date);",
    )?;

    Ok(())
}

/// Create a new expense owned by `user_id` and count it against its category
/// and payment method.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category does not exist,
/// - [Error::InvalidPaymentMethod] if the payment method does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_expense(
    user_id: UserID,
    new_expense: NewExpense,
    connection: &Connection,
) -> Result<Expense, Error> {
    let transaction = connection.unchecked_transaction()?;
    check_references(&new_expense, &transaction)?;

    let now = OffsetDateTime::now_utc();
    transaction.execute(
        "INSERT INTO expense
            (user_id, title, amount, date, note, category_id, payment_method_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        (
            user_id.as_i64(),
            &new_expense.title,
            new_expense.amount,
            new_expense.date,
            &new_expense.note,
            new_expense.category_id,
            new_expense.payment_method_id,
            now,
            now,
        ),
    )?;
    let id = transaction.last_insert_rowid();

    adjust_count(CatalogKind::Category, new_expense.category_id, 1, &transaction)?;
    adjust_count(
        CatalogKind::PaymentMethod,
        new_expense.payment_method_id,
        1,
        &transaction,
    )?;

    let expense = get_expense(id, user_id, &transaction)?;
    transaction.commit()?;

    Ok(expense)
}

/// Overwrite every field of the expense `id` owned by `user_id`.
///
/// If the category or payment method changed, the count is moved from the
/// old entry to the new one.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] or [Error::InvalidPaymentMethod] if a reference does not exist,
/// - [Error::ExpenseNotFound] if the expense does not exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_expense(
    id: ExpenseId,
    user_id: UserID,
    new_expense: NewExpense,
    connection: &Connection,
) -> Result<Expense, Error> {
    let transaction = connection.unchecked_transaction()?;
    check_references(&new_expense, &transaction)?;
    let existing = get_expense(id, user_id, &transaction)?;

    transaction.execute(
        "UPDATE expense
         SET title = ?1, amount = ?2, date = ?3, note = ?4, category_id = ?5,
             payment_method_id = ?6, updated_at = ?7
         WHERE id = ?8 AND user_id = ?9",
        (
            &new_expense.title,
            new_expense.amount,
            new_expense.date,
            &new_expense.note,
            new_expense.category_id,
            new_expense.payment_method_id,
            OffsetDateTime::now_utc(),
            id,
            user_id.as_i64(),
        ),
    )?;

    if existing.category.id != new_expense.category_id {
        adjust_count(CatalogKind::Category, existing.category.id, -1, &transaction)?;
        adjust_count(CatalogKind::Category, new_expense.category_id, 1, &transaction)?;
    }

    if existing.payment_method.id != new_expense.payment_method_id {
        adjust_count(
            CatalogKind::PaymentMethod,
            existing.payment_method.id,
            -1,
            &transaction,
        )?;
        adjust_count(
            CatalogKind::PaymentMethod,
            new_expense.payment_method_id,
            1,
            &transaction,
        )?;
    }

    let expense = get_expense(id, user_id, &transaction)?;
    transaction.commit()?;

    Ok(expense)
}

/// Delete the expense `id` owned by `user_id` and uncount it.
///
/// # Errors
/// This function will return a:
/// - [Error::ExpenseNotFound] if the expense does not exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_expense(id: ExpenseId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;
    let existing = get_expense(id, user_id, &transaction)?;

    transaction.execute(
        "DELETE FROM expense WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    adjust_count(CatalogKind::Category, existing.category.id, -1, &transaction)?;
    adjust_count(
        CatalogKind::PaymentMethod,
        existing.payment_method.id,
        -1,
        &transaction,
    )?;

    transaction.commit()?;

    Ok(())
}

fn check_references(new_expense: &NewExpense, connection: &Connection) -> Result<(), Error> {
    if !entry_exists(CatalogKind::Category, new_expense.category_id, connection)? {
        return Err(Error::InvalidCategory);
    }

    if !entry_exists(
        CatalogKind::PaymentMethod,
        new_expense.payment_method_id,
        connection,
    )? {
        return Err(Error::InvalidPaymentMethod);
    }

    Ok(())
}

#[cfg(test)]
mod expense_write_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        catalog::{CatalogEntry, CatalogKind, get_entry},
        expense::{create_expense, delete_expense, get_expense, update_expense},
        test_utils::{get_test_connection, must_create_entry, must_create_user, new_expense},
        user::{AccountType, User},
    };

    struct Fixture {
        connection: Connection,
        user: User,
        food: CatalogEntry,
        travel: CatalogEntry,
        cash: CatalogEntry,
        card: CatalogEntry,
    }

    fn fixture() -> Fixture {
        let connection = get_test_connection();
        let user = must_create_user("alice@example.com", AccountType::User, &connection);
        let food = must_create_entry(CatalogKind::Category, "Food", &connection);
        let travel = must_create_entry(CatalogKind::Category, "Travel", &connection);
        let cash = must_create_entry(CatalogKind::PaymentMethod, "Cash", &connection);
        let card = must_create_entry(CatalogKind::PaymentMethod, "Card", &connection);

        Fixture {
            connection,
            user,
            food,
            travel,
            cash,
            card,
        }
    }

    fn count(kind: CatalogKind, id: i64, connection: &Connection) -> i64 {
        get_entry(kind, id, connection)
            .expect("Could not get catalog entry")
            .count
    }

    #[test]
    fn create_increments_both_counters() {
        let f = fixture();

        let expense = create_expense(
            f.user.id,
            new_expense("Lunch", 12.5, date!(2024 - 03 - 01), f.food.id, f.cash.id),
            &f.connection,
        )
        .expect("Could not create expense");

        assert!(expense.id > 0);
        assert_eq!(expense.user_id, f.user.id);
        assert_eq!(expense.category.title, "Food");
        assert_eq!(expense.payment_method.title, "Cash");
        assert_eq!(count(CatalogKind::Category, f.food.id, &f.connection), 1);
        assert_eq!(count(CatalogKind::PaymentMethod, f.cash.id, &f.connection), 1);
    }

    #[test]
    fn create_fails_on_unknown_category() {
        let f = fixture();

        let result = create_expense(
            f.user.id,
            new_expense("Lunch", 12.5, date!(2024 - 03 - 01), 999, f.cash.id),
            &f.connection,
        );

        assert_eq!(result, Err(Error::InvalidCategory));
        assert_eq!(count(CatalogKind::PaymentMethod, f.cash.id, &f.connection), 0);
    }

    #[test]
    fn create_fails_on_unknown_payment_method() {
        let f = fixture();

        let result = create_expense(
            f.user.id,
            new_expense("Lunch", 12.5, date!(2024 - 03 - 01), f.food.id, 999),
            &f.connection,
        );

        assert_eq!(result, Err(Error::InvalidPaymentMethod));
        assert_eq!(count(CatalogKind::Category, f.food.id, &f.connection), 0);
    }

    #[test]
    fn update_moves_counters() {
        let f = fixture();
        let expense = create_expense(
            f.user.id,
            new_expense("Lunch", 12.5, date!(2024 - 03 - 01), f.food.id, f.cash.id),
            &f.connection,
        )
        .unwrap();

        let updated = update_expense(
            expense.id,
            f.user.id,
            new_expense("Train", 40.0, date!(2024 - 03 - 02), f.travel.id, f.card.id),
            &f.connection,
        )
        .expect("Could not update expense");

        assert_eq!(updated.title, "Train");
        assert_eq!(updated.date, date!(2024 - 03 - 02));
        assert_eq!(updated.created_at, expense.created_at);
        assert_eq!(count(CatalogKind::Category, f.food.id, &f.connection), 0);
        assert_eq!(count(CatalogKind::Category, f.travel.id, &f.connection), 1);
        assert_eq!(count(CatalogKind::PaymentMethod, f.cash.id, &f.connection), 0);
        assert_eq!(count(CatalogKind::PaymentMethod, f.card.id, &f.connection), 1);
    }

    #[test]
    fn update_with_same_references_keeps_counters() {
        let f = fixture();
        let expense = create_expense(
            f.user.id,
            new_expense("Lunch", 12.5, date!(2024 - 03 - 01), f.food.id, f.cash.id),
            &f.connection,
        )
        .unwrap();

        update_expense(
            expense.id,
            f.user.id,
            new_expense("Brunch", 20.0, date!(2024 - 03 - 01), f.food.id, f.cash.id),
            &f.connection,
        )
        .unwrap();

        assert_eq!(count(CatalogKind::Category, f.food.id, &f.connection), 1);
        assert_eq!(count(CatalogKind::PaymentMethod, f.cash.id, &f.connection), 1);
    }

    #[test]
    fn update_of_other_users_expense_is_not_found() {
        let f = fixture();
        let mallory = must_create_user("mallory@example.com", AccountType::User, &f.connection);
        let expense = create_expense(
            f.user.id,
            new_expense("Lunch", 12.5, date!(2024 - 03 - 01), f.food.id, f.cash.id),
            &f.connection,
        )
        .unwrap();

        let result = update_expense(
            expense.id,
            mallory.id,
            new_expense("Mine now", 1.0, date!(2024 - 03 - 01), f.travel.id, f.card.id),
            &f.connection,
        );

        assert_eq!(result, Err(Error::ExpenseNotFound));
        assert_eq!(get_expense(expense.id, f.user.id, &f.connection), Ok(expense));
        assert_eq!(count(CatalogKind::Category, f.travel.id, &f.connection), 0);
    }

    #[test]
    fn delete_decrements_counters() {
        let f = fixture();
        let expense = create_expense(
            f.user.id,
            new_expense("Lunch", 12.5, date!(2024 - 03 - 01), f.food.id, f.cash.id),
            &f.connection,
        )
        .unwrap();

        delete_expense(expense.id, f.user.id, &f.connection).expect("Could not delete expense");

        assert_eq!(
            get_expense(expense.id, f.user.id, &f.connection),
            Err(Error::ExpenseNotFound)
        );
        assert_eq!(count(CatalogKind::Category, f.food.id, &f.connection), 0);
        assert_eq!(count(CatalogKind::PaymentMethod, f.cash.id, &f.connection), 0);
    }

    #[test]
    fn delete_of_other_users_expense_is_not_found() {
        let f = fixture();
        let mallory = must_create_user("mallory@example.com", AccountType::User, &f.connection);
        let expense = create_expense(
            f.user.id,
            new_expense("Lunch", 12.5, date!(2024 - 03 - 01), f.food.id, f.cash.id),
            &f.connection,
        )
        .unwrap();

        let result = delete_expense(expense.id, mallory.id, &f.connection);

        assert_eq!(result, Err(Error::ExpenseNotFound));
        assert_eq!(count(CatalogKind::Category, f.food.id, &f.connection), 1);
    }
}
