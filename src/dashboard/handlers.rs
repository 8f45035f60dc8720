//! Dashboard HTTP handlers.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
};
use axum_extra::extract::WithRejection;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    auth::AuthUser,
    dashboard::group_by_day,
    dates::{month_of, parse_optional_date},
    expense::{ExpenseFilter, SortOrder, query_expenses},
};

/// The state needed for the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The optional date range of the expenses-by-day query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// A route handler for the caller's expenses grouped by day.
///
/// A missing bound defaults to the start or end of the current UTC month.
pub async fn get_expenses_by_day(
    State(state): State<DashboardState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Query(params), _): WithRejection<Query<DashboardParams>, Error>,
) -> Result<Json<Value>, Error> {
    let current_month = month_of(OffsetDateTime::now_utc().date())?;
    let start_date = parse_optional_date(params.start_date.as_deref(), Error::InvalidDate)?
        .unwrap_or(current_month.start);
    let end_date = parse_optional_date(params.end_date.as_deref(), Error::InvalidDate)?
        .unwrap_or(current_month.end);

    let filter = ExpenseFilter {
        start_date: Some(start_date),
        end_date: Some(end_date),
        ..ExpenseFilter::for_user(user.id)
    };

    let expenses = {
        let connection = lock_connection(&state.db_connection)?;
        query_expenses(&filter, SortOrder::DateAscending, &connection)?
    };

    Ok(Json(json!({
        "success": true,
        "data": group_by_day(expenses),
    })))
}
