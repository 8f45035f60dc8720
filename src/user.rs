//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use email_address::EmailAddress;
use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{Error, PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Whether a user has admin rights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    #[default]
    User,
    Admin,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::User => "User",
            AccountType::Admin => "Admin",
        }
    }
}

impl ToSql for AccountType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for AccountType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "User" => Ok(AccountType::User),
            "Admin" => Ok(AccountType::Admin),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// A validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Create and validate an email address.
    ///
    /// Surrounding whitespace is removed.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidEmail] if `raw_email` is not a valid email address.
    pub fn new(raw_email: &str) -> Result<Self, Error> {
        let raw_email = raw_email.trim();

        if EmailAddress::is_valid(raw_email) {
            Ok(Self(raw_email.to_string()))
        } else {
            Err(Error::InvalidEmail(raw_email.to_string()))
        }
    }

    /// Create a new `Email` without any validation.
    ///
    /// For emails coming from the user, this function should **not** be used, instead use the checked version.
    pub fn new_unchecked(raw_email: &str) -> Self {
        Self(raw_email.to_string())
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    pub name: String,
    pub email: Email,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    pub account_type: AccountType,
    /// The amount the user intends to spend per month, zero when unset.
    pub total_monthly_budget: f64,
}

/// The public view of a user, safe to send to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserID,
    pub name: String,
    pub email: Email,
    pub account_type: AccountType,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            account_type: user.account_type,
        }
    }
}

/// The data needed to register a new user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password_hash: PasswordHash,
    pub account_type: AccountType,
    pub total_monthly_budget: f64,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                account_type TEXT NOT NULL DEFAULT 'User',
                total_monthly_budget REAL NOT NULL DEFAULT 0
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if the email is already registered,
/// - [Error::SqlError] if another SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (name, email, password, account_type, total_monthly_budget)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            &new_user.name,
            new_user.email.as_ref(),
            new_user.password_hash.as_ref(),
            new_user.account_type,
            new_user.total_monthly_budget,
        ),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        name: new_user.name,
        email: new_user.email,
        password_hash: new_user.password_hash,
        account_type: new_user.account_type,
        total_monthly_budget: new_user.total_monthly_budget,
    })
}

const SELECT_USER: &str =
    "SELECT id, name, email, password, account_type, total_monthly_budget FROM user";

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_email: String = row.get(2)?;
    let raw_password_hash: String = row.get(3)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        name: row.get(1)?,
        email: Email::new_unchecked(&raw_email),
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        account_type: row.get(4)?,
        total_monthly_budget: row.get(5)?,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare(&format!("{SELECT_USER} WHERE id = :id"))?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user registered with `email`.
///
/// # Errors
///
/// Returns an [Error::NotFound] if no user has registered with `email`.
pub fn get_user_by_email(email: &str, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare(&format!("{SELECT_USER} WHERE email = :email"))?
        .query_row(&[(":email", &email)], map_user_row)
        .map_err(|error| error.into())
}

/// Set the total monthly budget of the user with `user_id`.
///
/// # Errors
///
/// Returns an [Error::NotFound] if the user does not exist.
pub fn set_total_monthly_budget(
    user_id: UserID,
    total_monthly_budget: f64,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET total_monthly_budget = ?1 WHERE id = ?2",
        (total_monthly_budget, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Get the total monthly budget of the user with `user_id`.
pub fn get_total_monthly_budget(user_id: UserID, connection: &Connection) -> Result<f64, Error> {
    connection
        .query_row(
            "SELECT total_monthly_budget FROM user WHERE id = ?1",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}


#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{
        PasswordHash,
        user::{
            AccountType, Email, NewUser, UserID, create_user, get_total_monthly_budget,
            get_user_by_email, get_user_by_id, set_total_monthly_budget,
        },
    };

    use super::{Error, create_user_table};

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_user_table(&conn).expect("Could not create user table");

        conn
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Alice".to_owned(),
            email: Email::new_unchecked(email),
            password_hash: PasswordHash::new_unchecked("hunter2"),
            account_type: AccountType::User,
            total_monthly_budget: 0.0,
        }
    }

    #[test]
    fn insert_user_succeeds() {
        let db_connection = get_db_connection();

        let inserted_user = create_user(new_user("alice@example.com"), &db_connection).unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.email.as_ref(), "alice@example.com");
        assert_eq!(inserted_user.account_type, AccountType::User);
    }

    #[test]
    fn insert_user_fails_with_duplicate_email() {
        let db_connection = get_db_connection();
        create_user(new_user("alice@example.com"), &db_connection).unwrap();

        let result = create_user(new_user("alice@example.com"), &db_connection);

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_user_fails_with_non_existent_id() {
        let db_connection = get_db_connection();

        let id = UserID::new(42);

        assert_eq!(get_user_by_id(id, &db_connection), Err(Error::NotFound));
    }

    #[test]
    fn get_user_succeeds_with_existing_id() {
        let db_connection = get_db_connection();
        let test_user = create_user(new_user("alice@example.com"), &db_connection).unwrap();

        let retrieved_user = get_user_by_id(test_user.id, &db_connection).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn get_user_by_email_round_trips_account_type() {
        let db_connection = get_db_connection();
        let admin = create_user(
            NewUser {
                account_type: AccountType::Admin,
                ..new_user("admin@example.com")
            },
            &db_connection,
        )
        .unwrap();

        let retrieved_user = get_user_by_email("admin@example.com", &db_connection).unwrap();

        assert_eq!(retrieved_user, admin);
        assert_eq!(
            get_user_by_email("nobody@example.com", &db_connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn set_and_get_monthly_budget() {
        let db_connection = get_db_connection();
        let user = create_user(new_user("alice@example.com"), &db_connection).unwrap();

        set_total_monthly_budget(user.id, 1500.5, &db_connection).unwrap();

        assert_eq!(
            get_total_monthly_budget(user.id, &db_connection),
            Ok(1500.5)
        );
        assert_eq!(
            set_total_monthly_budget(UserID::new(999), 1.0, &db_connection),
            Err(Error::NotFound)
        );
    }
}
