//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/expenses/{expense_id}', use [format_endpoint].

/// The root route which reports that the server is up.
pub const ROOT: &str = "/";

/// The route for registering a new user.
pub const SIGN_UP: &str = "/auth/signup";
/// The route for logging in a user.
pub const LOG_IN: &str = "/auth/login";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/auth/logout";

/// The route to list and create the caller's expenses.
pub const EXPENSES: &str = "/expenses";
/// The route to update or delete a single expense.
pub const EXPENSE: &str = "/expenses/{expense_id}";
/// The route to get and set the caller's total monthly budget.
pub const MONTHLY_BUDGET: &str = "/expenses/budget";

/// The route to list and create categories.
pub const CATEGORIES: &str = "/categories";
/// The route to delete a category.
pub const CATEGORY: &str = "/categories/{category_id}";
/// The route to set or remove a per-category budget.
pub const CATEGORY_BUDGET: &str = "/categories/budget";
/// The route to list the categories used in the caller's expenses.
pub const USER_EXPENSE_CATEGORIES: &str = "/categories/user-expense-categories";
/// The route to add untracked budgets for newly used categories.
pub const SYNC_CATEGORY_BUDGETS: &str = "/categories/sync-category-budgets";

/// The route to list and create payment methods.
pub const PAYMENT_METHODS: &str = "/payment-methods";
/// The route to delete a payment method.
pub const PAYMENT_METHOD: &str = "/payment-methods/{payment_method_id}";

/// The route for keyword search ranked by relevance.
pub const SEARCH: &str = "/search/search";
/// The route for structured filtering.
pub const FILTER: &str = "/search/filter";

/// The route for the caller's expenses grouped by day.
pub const EXPENSES_BY_DAY: &str = "/dashboard/expenses-by-day";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/expenses/{expense_id}', '{expense_id}' is the parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |end| param_start + end + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok(), "{uri} is not a valid URI");
    }

    #[test]
    fn endpoints_are_valid_uris() {
        for endpoint in [
            endpoints::ROOT,
            endpoints::SIGN_UP,
            endpoints::LOG_IN,
            endpoints::LOG_OUT,
            endpoints::EXPENSES,
            endpoints::MONTHLY_BUDGET,
            endpoints::CATEGORIES,
            endpoints::CATEGORY_BUDGET,
            endpoints::USER_EXPENSE_CATEGORIES,
            endpoints::SYNC_CATEGORY_BUDGETS,
            endpoints::PAYMENT_METHODS,
            endpoints::SEARCH,
            endpoints::FILTER,
            endpoints::EXPENSES_BY_DAY,
        ] {
            assert_endpoint_is_valid_uri(endpoint);
        }

        for endpoint in [
            endpoints::EXPENSE,
            endpoints::CATEGORY,
            endpoints::PAYMENT_METHOD,
        ] {
            assert_endpoint_is_valid_uri(&format_endpoint(endpoint, 1));
        }
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
    }

    #[test]
    fn keeps_suffix_after_parameter() {
        let formatted_path = format_endpoint("/hello/{world_id}/edit", 42);

        assert_eq!(formatted_path, "/hello/42/edit");
    }

    #[test]
    fn returns_path_without_parameter_unchanged() {
        let formatted_path = format_endpoint(endpoints::EXPENSES, 1);

        assert_eq!(formatted_path, endpoints::EXPENSES);
    }
}
