//! Handlers for keyword search and structured filtering of the caller's expenses.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
};
use axum_extra::extract::WithRejection;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    app_state::lock_connection,
    auth::AuthUser,
    expense::{Expense, ExpenseFilter, SortOrder, query_expenses},
    pagination::{PageQuery, PaginationConfig, paginate},
    search::{FilterParams, matches_keyword, rank_by_relevance},
};

/// The state needed by the search endpoints.
#[derive(Debug, Clone)]
pub struct SearchState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for SearchState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query parameters of the search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// A route handler that searches the caller's expenses for `q` and returns
/// the matches most relevant first.
pub async fn search_expenses(
    State(state): State<SearchState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Query(params), _): WithRejection<Query<SearchParams>, Error>,
) -> Result<Json<Value>, Error> {
    let query = params
        .q
        .as_deref()
        .filter(|q| !q.trim().is_empty())
        .ok_or(Error::SearchQueryMissing)?;

    let page = PageQuery {
        page: params.page.clone(),
        limit: params.limit.clone(),
    }
    .resolve(
        &state.pagination_config,
        state.pagination_config.default_page_size,
    );

    let candidates = fetch(&state, &ExpenseFilter::for_user(user.id), SortOrder::Created)?;

    let matches = candidates
        .into_iter()
        .filter(|expense| matches_keyword(expense, query))
        .collect();
    let ranked = rank_by_relevance(matches, query);

    let (expenses, pagination) = paginate(ranked, page);

    Ok(Json(json!({
        "success": true,
        "expenses": expenses,
        "pagination": pagination,
    })))
}

/// A route handler that filters the caller's expenses by date range,
/// category, payment method and an optional keyword, newest first.
pub async fn filter_expenses(
    State(state): State<SearchState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Query(params), _): WithRejection<Query<FilterParams>, Error>,
) -> Result<Json<Value>, Error> {
    let filter = params.to_filter(user.id)?;
    let page = params.page_query().resolve(
        &state.pagination_config,
        state.pagination_config.filter_page_size,
    );

    let mut expenses = fetch(&state, &filter, SortOrder::DateDescending)?;

    if let Some(keyword) = params.keyword() {
        expenses.retain(|expense| matches_keyword(expense, keyword));
    }

    let (expenses, pagination) = paginate(expenses, page);

    Ok(Json(json!({
        "success": true,
        "expenses": expenses,
        "pagination": pagination,
    })))
}

fn fetch(
    state: &SearchState,
    filter: &ExpenseFilter,
    sort_order: SortOrder,
) -> Result<Vec<Expense>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    query_expenses(filter, sort_order, &connection)
}
