//! Database operations for categories and payment methods.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    catalog::{CatalogEntry, CatalogId, CatalogKind, Title},
};

/// Initialize the category and payment method tables.
pub fn create_catalog_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL UNIQUE,
            description TEXT,
            count INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS payment_method (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL UNIQUE,
            description TEXT,
            count INTEGER NOT NULL DEFAULT 0
        );",
    )?;

    Ok(())
}

/// Create a catalog entry with a zero count and return it with its generated ID.
///
/// # Errors
///
/// Returns an [Error::DuplicateTitle] if an entry of the same kind already has `title`.
pub fn create_entry(
    kind: CatalogKind,
    title: Title,
    description: Option<String>,
    connection: &Connection,
) -> Result<CatalogEntry, Error> {
    connection.execute(
        &format!(
            "INSERT INTO {} (title, description, count) VALUES (?1, ?2, 0);",
            kind.table()
        ),
        (title.as_ref(), &description),
    )?;

    let id = connection.last_insert_rowid();

    Ok(CatalogEntry {
        id,
        title,
        description,
        count: 0,
    })
}

/// Retrieve a single catalog entry by ID.
///
/// # Errors
///
/// Returns an [Error::CatalogEntryNotFound] if there is no entry with `id`.
pub fn get_entry(
    kind: CatalogKind,
    id: CatalogId,
    connection: &Connection,
) -> Result<CatalogEntry, Error> {
    connection
        .prepare(&format!(
            "SELECT id, title, description, count FROM {} WHERE id = :id;",
            kind.table()
        ))?
        .query_row(&[(":id", &id)], map_row)
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::CatalogEntryNotFound(kind),
            error => error,
        })
}

/// Retrieve all entries of `kind` in the order they were created.
pub fn get_all_entries(
    kind: CatalogKind,
    connection: &Connection,
) -> Result<Vec<CatalogEntry>, Error> {
    connection
        .prepare(&format!(
            "SELECT id, title, description, count FROM {} ORDER BY id ASC;",
            kind.table()
        ))?
        .query_map([], map_row)?
        .map(|maybe_entry| maybe_entry.map_err(|error| error.into()))
        .collect()
}

/// Whether an entry of `kind` with `id` exists.
pub fn entry_exists(
    kind: CatalogKind,
    id: CatalogId,
    connection: &Connection,
) -> Result<bool, Error> {
    connection
        .query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1);", kind.table()),
            [id],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Add `delta` to the expense count of an entry.
///
/// The count never drops below zero.
pub(crate) fn adjust_count(
    kind: CatalogKind,
    id: CatalogId,
    delta: i64,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        &format!(
            "UPDATE {} SET count = MAX(count + ?1, 0) WHERE id = ?2;",
            kind.table()
        ),
        (delta, id),
    )?;

    Ok(())
}

/// Delete an entry along with every expense that references it.
///
/// The counts of the other kind of entry are reduced by the number of
/// deleted expenses that referenced them. All changes happen in a single
/// transaction.
///
/// Returns the number of deleted expenses.
///
/// # Errors
///
/// Returns an [Error::CatalogEntryNotFound] if there is no entry with `id`.
pub fn delete_entry_with_expenses(
    kind: CatalogKind,
    id: CatalogId,
    connection: &Connection,
) -> Result<usize, Error> {
    let transaction = connection.unchecked_transaction()?;

    if !entry_exists(kind, id, &transaction)? {
        return Err(Error::CatalogEntryNotFound(kind));
    }

    let other = kind.other();
    transaction.execute(
        &format!(
            "UPDATE {other_table} SET count = MAX(count - (
                SELECT COUNT(*) FROM expense
                WHERE expense.{column} = ?1 AND expense.{other_column} = {other_table}.id
             ), 0)
             WHERE id IN (SELECT {other_column} FROM expense WHERE {column} = ?1);",
            other_table = other.table(),
            column = kind.expense_column(),
            other_column = other.expense_column(),
        ),
        [id],
    )?;

    let deleted_expenses = transaction.execute(
        &format!("DELETE FROM expense WHERE {} = ?1;", kind.expense_column()),
        [id],
    )?;

    transaction.execute(&format!("DELETE FROM {} WHERE id = ?1;", kind.table()), [id])?;

    transaction.commit()?;

    Ok(deleted_expenses)
}

fn map_row(row: &Row) -> Result<CatalogEntry, rusqlite::Error> {
    let raw_title: String = row.get(1)?;

    Ok(CatalogEntry {
        id: row.get(0)?,
        title: Title::new_unchecked(&raw_title),
        description: row.get(2)?,
        count: row.get(3)?,
    })
}
