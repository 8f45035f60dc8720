//! Database operations for per-category budget overrides.

use rusqlite::{Connection, Row};
use serde::Serialize;

use crate::{
    Error,
    catalog::{CatalogId, CatalogKind, EntryRef, entry_exists},
    user::UserID,
};

/// The limit stored for categories the user spends in but has not budgeted.
pub const UNTRACKED_LIMIT: f64 = -1.0;

/// A user's spending limit for one category.
///
/// A limit of [UNTRACKED_LIMIT] means the category was added by a sync and
/// the user has not set a limit yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBudget {
    pub category: EntryRef,
    pub limit: f64,
}

/// Create the category budget table.
///
/// Overrides are kept in the order they were first added.
pub fn create_category_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category_budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            limit_amount REAL NOT NULL,
            UNIQUE(user_id, category_id),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Get the category budgets of `user_id` in the order they were added.
pub fn get_category_budgets(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<CategoryBudget>, Error> {
    connection
        .prepare(
            "SELECT c.id, c.title, b.limit_amount FROM category_budget b
             INNER JOIN category c ON c.id = b.category_id
             WHERE b.user_id = ?1
             ORDER BY b.id ASC",
        )?
        .query_map([user_id.as_i64()], map_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// Set the limit for a category, adding the override if it does not exist.
///
/// An existing override keeps its position in the list.
///
/// # Errors
///
/// Returns an [Error::InvalidCategory] if the category does not exist.
pub fn set_category_budget(
    user_id: UserID,
    category_id: CatalogId,
    limit: f64,
    connection: &Connection,
) -> Result<(), Error> {
    if !entry_exists(CatalogKind::Category, category_id, connection)? {
        return Err(Error::InvalidCategory);
    }

    connection.execute(
        "INSERT INTO category_budget (user_id, category_id, limit_amount) VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id, category_id) DO UPDATE SET limit_amount = excluded.limit_amount",
        (user_id.as_i64(), category_id, limit),
    )?;

    Ok(())
}

/// Remove the override for a category. Removing a missing override is not an error.
pub fn delete_category_budget(
    user_id: UserID,
    category_id: CatalogId,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "DELETE FROM category_budget WHERE user_id = ?1 AND category_id = ?2",
        (user_id.as_i64(), category_id),
    )?;

    Ok(())
}

/// Get the distinct categories used in the expenses of `user_id`, in order of first use.
pub fn get_used_categories(user_id: UserID, connection: &Connection) -> Result<Vec<EntryRef>, Error> {
    connection
        .prepare(
            "SELECT c.id, c.title FROM expense e
             INNER JOIN category c ON c.id = e.category_id
             WHERE e.user_id = ?1
             GROUP BY c.id
             ORDER BY MIN(e.id) ASC",
        )?
        .query_map([user_id.as_i64()], |row| {
            Ok(EntryRef {
                id: row.get(0)?,
                title: row.get(1)?,
            })
        })?
        .map(|maybe_entry| maybe_entry.map_err(|error| error.into()))
        .collect()
}

/// Add an untracked override for every category used in the expenses of
/// `user_id` that does not have one yet.
///
/// Calling this again without new categories in between adds nothing.
/// Returns the number of overrides added.
pub fn sync_category_budgets(user_id: UserID, connection: &Connection) -> Result<usize, Error> {
    let added = connection.execute(
        "INSERT INTO category_budget (user_id, category_id, limit_amount)
         SELECT ?1, e.category_id, ?2 FROM expense e
         WHERE e.user_id = ?1
           AND e.category_id NOT IN (SELECT category_id FROM category_budget WHERE user_id = ?1)
         GROUP BY e.category_id
         ORDER BY MIN(e.id) ASC",
        (user_id.as_i64(), UNTRACKED_LIMIT),
    )?;

    Ok(added)
}

fn map_row(row: &Row) -> Result<CategoryBudget, rusqlite::Error> {
    Ok(CategoryBudget {
        category: EntryRef {
            id: row.get(0)?,
            title: row.get(1)?,
        },
        limit: row.get(2)?,
    })
}
