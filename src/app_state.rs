//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use time::Duration;

use crate::{
    Error,
    auth::{DEFAULT_TOKEN_DURATION, JwtKeys},
    db::initialize,
    pagination::PaginationConfig,
    password::PasswordHash,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The keys used to sign and verify JSON web tokens.
    pub jwt_keys: JwtKeys,

    /// The duration for which issued tokens are valid.
    pub token_duration: Duration,

    /// The code required to register an admin account, if admin sign-up is enabled.
    pub admin_code: Option<String>,

    /// The bcrypt cost used when hashing new passwords.
    pub password_cost: u32,

    /// The config that controls the default page sizes.
    pub pagination_config: PaginationConfig,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        jwt_secret: &str,
        admin_code: Option<String>,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Ok(Self {
            jwt_keys: JwtKeys::new(jwt_secret),
            token_duration: DEFAULT_TOKEN_DURATION,
            admin_code,
            password_cost: PasswordHash::DEFAULT_COST,
            pagination_config,
            db_connection: connection,
        })
    }

    /// Set how long issued tokens remain valid.
    pub fn with_token_duration(mut self, token_duration: Duration) -> Self {
        self.token_duration = token_duration;
        self
    }

    /// Set the bcrypt cost for new password hashes.
    pub fn with_password_cost(mut self, password_cost: u32) -> Self {
        self.password_cost = password_cost;
        self
    }
}

/// Acquire the database lock, mapping lock poisoning to [Error::DatabaseLockError].
pub(crate) fn lock_connection(
    db_connection: &Mutex<Connection>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}
