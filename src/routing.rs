//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router, middleware,
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    auth::{auth_guard, log_in, log_out, sign_up},
    budget::{
        delete_category_budget_endpoint, get_monthly_budget, list_used_categories,
        set_category_budget_endpoint, set_monthly_budget, sync_category_budgets_endpoint,
    },
    catalog::{
        create_category, create_payment_method, delete_category, delete_payment_method,
        list_categories, list_payment_methods,
    },
    dashboard::get_expenses_by_day,
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, list_expenses, update_expense_endpoint,
    },
    search::{filter_expenses, search_expenses},
};

/// Return a router with all the app's routes.
///
/// Every route other than the health check and the sign-up, log-in and
/// log-out routes requires a valid token.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_health))
        .route(endpoints::SIGN_UP, post(sign_up))
        .route(endpoints::LOG_IN, post(log_in))
        .route(endpoints::LOG_OUT, post(log_out));

    let protected_routes = Router::new()
        .route(
            endpoints::EXPENSES,
            get(list_expenses).post(create_expense_endpoint),
        )
        .route(
            endpoints::EXPENSE,
            put(update_expense_endpoint).delete(delete_expense_endpoint),
        )
        .route(
            endpoints::MONTHLY_BUDGET,
            get(get_monthly_budget).patch(set_monthly_budget),
        )
        .route(
            endpoints::CATEGORIES,
            get(list_categories).post(create_category),
        )
        .route(endpoints::CATEGORY, delete(delete_category))
        .route(
            endpoints::CATEGORY_BUDGET,
            post(set_category_budget_endpoint).delete(delete_category_budget_endpoint),
        )
        .route(
            endpoints::USER_EXPENSE_CATEGORIES,
            get(list_used_categories),
        )
        .route(
            endpoints::SYNC_CATEGORY_BUDGETS,
            post(sync_category_budgets_endpoint),
        )
        .route(
            endpoints::PAYMENT_METHODS,
            get(list_payment_methods).post(create_payment_method),
        )
        .route(endpoints::PAYMENT_METHOD, delete(delete_payment_method))
        .route(endpoints::SEARCH, get(search_expenses))
        .route(endpoints::FILTER, get(filter_expenses))
        .route(endpoints::EXPENSES_BY_DAY, get(get_expenses_by_day))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Report that the server is up.
async fn get_health() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Expense tracker server is up and running",
    }))
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}

#[cfg(test)]
mod routing_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{get_test_app_state, get_test_server},
    };

    #[tokio::test]
    async fn health_check_is_public() {
        let server = get_test_server(get_test_app_state());

        let response = server.get(endpoints::ROOT).await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "success": true,
            "message": "Expense tracker server is up and running",
        }));
    }

    #[tokio::test]
    async fn unknown_route_gives_json_404() {
        let server = get_test_server(get_test_app_state());

        let response = server.get("/does/not/exist").await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&json!({
            "success": false,
            "message": "The requested resource could not be found.",
        }));
    }

    #[tokio::test]
    async fn protected_routes_require_token() {
        let server = get_test_server(get_test_app_state());

        for path in [
            endpoints::EXPENSES.to_owned(),
            endpoints::MONTHLY_BUDGET.to_owned(),
            endpoints::CATEGORIES.to_owned(),
            endpoints::USER_EXPENSE_CATEGORIES.to_owned(),
            endpoints::PAYMENT_METHODS.to_owned(),
            endpoints::SEARCH.to_owned(),
            endpoints::FILTER.to_owned(),
            endpoints::EXPENSES_BY_DAY.to_owned(),
        ] {
            let response = server.get(&path).await;

            response.assert_status(StatusCode::UNAUTHORIZED);
            response.assert_json(&json!({ "success": false, "message": "Token Missing" }));
        }

        let response = server
            .delete(&format_endpoint(endpoints::CATEGORY, 1))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}
