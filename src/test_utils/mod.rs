#![allow(missing_docs)]

use axum_test::TestServer;
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, PasswordHash,
    auth::encode_token,
    catalog::{CatalogEntry, CatalogId, CatalogKind, Title, create_entry},
    db::initialize,
    expense::NewExpense,
    pagination::PaginationConfig,
    routing::build_router,
    user::{AccountType, Email, NewUser, User, create_user},
};

/// The bcrypt cost used in tests, the lowest bcrypt accepts.
pub(crate) const TEST_PASSWORD_COST: u32 = 4;

/// The password given to every user made by [must_create_user].
pub(crate) const TEST_PASSWORD: &str = "hunter2hunter2";

pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not create in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");
    connection
}

pub(crate) fn get_test_app_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not create in-memory SQLite database");

    AppState::new(
        connection,
        "test-secret",
        None,
        PaginationConfig::default(),
    )
    .expect("Could not create app state")
    .with_password_cost(TEST_PASSWORD_COST)
}

pub(crate) fn get_test_server(state: AppState) -> TestServer {
    TestServer::try_new(build_router(state)).expect("Could not create test server.")
}

#[track_caller]
pub(crate) fn must_create_user(
    email: &str,
    account_type: AccountType,
    connection: &Connection,
) -> User {
    create_user(
        NewUser {
            name: "Test User".to_owned(),
            email: Email::new_unchecked(email),
            password_hash: PasswordHash::new(TEST_PASSWORD, TEST_PASSWORD_COST)
                .expect("Could not hash password"),
            account_type,
            total_monthly_budget: 0.0,
        },
        connection,
    )
    .expect("Could not create test user")
}

#[track_caller]
pub(crate) fn must_create_entry(
    kind: CatalogKind,
    title: &str,
    connection: &Connection,
) -> CatalogEntry {
    create_entry(kind, Title::new_unchecked(title), None, connection)
        .expect("Could not create catalog entry")
}

pub(crate) fn new_expense(
    title: &str,
    amount: f64,
    date: Date,
    category_id: CatalogId,
    payment_method_id: CatalogId,
) -> NewExpense {
    NewExpense {
        title: title.to_owned(),
        amount,
        date,
        note: None,
        category_id,
        payment_method_id,
    }
}

#[track_caller]
pub(crate) fn token_for(user: &User, state: &AppState) -> String {
    encode_token(user, &state.jwt_keys, state.token_duration).expect("Could not create token")
}
