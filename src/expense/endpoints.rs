//! Handlers for listing, creating, updating and deleting the caller's expenses.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    app_state::lock_connection,
    auth::AuthUser,
    expense::{
        ExpenseForm, ExpenseId, count_expenses, create_expense, delete_expense, get_expense_page,
        update_expense,
    },
    pagination::{PageQuery, Pagination, PaginationConfig},
};

/// The state needed by the expense endpoints.
#[derive(Debug, Clone)]
pub struct ExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// A route handler for one page of the caller's expenses, newest first.
pub async fn list_expenses(
    State(state): State<ExpenseState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Query(query), _): WithRejection<Query<PageQuery>, Error>,
) -> Result<Json<Value>, Error> {
    let page = query.resolve(
        &state.pagination_config,
        state.pagination_config.default_page_size,
    );

    let (expenses, total) = {
        let connection = lock_connection(&state.db_connection)?;
        (
            get_expense_page(user.id, page, &connection)?,
            count_expenses(user.id, &connection)?,
        )
    };
    let pagination = Pagination::new(total, page);

    if expenses.is_empty() {
        return Ok(Json(json!({
            "success": true,
            "message": "No expenses found for this user.",
            "expenses": expenses,
            "pagination": pagination,
        })));
    }

    Ok(Json(json!({
        "success": true,
        "expenses": expenses,
        "pagination": pagination,
    })))
}

/// A route handler for recording a new expense for the caller.
pub async fn create_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(form), _): WithRejection<Json<ExpenseForm>, Error>,
) -> Result<impl IntoResponse, Error> {
    let new_expense = form.validate()?;

    let expense = {
        let connection = lock_connection(&state.db_connection)?;
        create_expense(user.id, new_expense, &connection)?
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Expense created successfully",
            "expense": expense,
        })),
    ))
}

/// A route handler for replacing the fields of one of the caller's expenses.
pub async fn update_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(expense_id), _): WithRejection<Path<ExpenseId>, Error>,
    WithRejection(Json(form), _): WithRejection<Json<ExpenseForm>, Error>,
) -> Result<Json<Value>, Error> {
    let new_expense = form.validate()?;

    let expense = {
        let connection = lock_connection(&state.db_connection)?;
        update_expense(expense_id, user.id, new_expense, &connection)?
    };

    Ok(Json(json!({
        "success": true,
        "message": "Expense updated successfully",
        "expense": expense,
    })))
}

/// A route handler for deleting one of the caller's expenses.
pub async fn delete_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(expense_id), _): WithRejection<Path<ExpenseId>, Error>,
) -> Result<Json<Value>, Error> {
    {
        let connection = lock_connection(&state.db_connection)?;
        delete_expense(expense_id, user.id, &connection)?;
    }

    Ok(Json(json!({
        "success": true,
        "message": "Expense deleted successfully",
    })))
}
