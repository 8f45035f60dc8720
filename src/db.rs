//! Database schema initialisation.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    budget::create_category_budget_table, catalog::create_catalog_tables,
    expense::create_expense_table, user::create_user_table,
};

/// Create every table the application needs.
///
/// Foreign key enforcement is switched on for `connection` first, since
/// deleting a user, category or payment method relies on cascades.
/// The tables are created inside one exclusive transaction so a partially
/// initialised database is never left behind.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_catalog_tables(&transaction)?;
    create_expense_table(&transaction)?;
    create_category_budget_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
