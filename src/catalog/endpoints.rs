//! Handlers for listing, creating and deleting categories and payment methods.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    app_state::lock_connection,
    auth::AdminUser,
    catalog::{
        CatalogForm, CatalogId, CatalogKind, Title, create_entry, delete_entry_with_expenses,
        get_all_entries,
    },
};

/// The state needed by the catalog endpoints.
#[derive(Debug, Clone)]
pub struct CatalogState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CatalogState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List every category.
pub async fn list_categories(State(state): State<CatalogState>) -> Result<Json<Value>, Error> {
    list_entries(CatalogKind::Category, &state)
}

/// List every payment method.
pub async fn list_payment_methods(State(state): State<CatalogState>) -> Result<Json<Value>, Error> {
    list_entries(CatalogKind::PaymentMethod, &state)
}

/// Create a category. Any authenticated user may do this.
pub async fn create_category(
    State(state): State<CatalogState>,
    WithRejection(Json(form), _): WithRejection<Json<CatalogForm>, Error>,
) -> Result<impl IntoResponse, Error> {
    create(CatalogKind::Category, &state, form)
}

/// Create a payment method. Any authenticated user may do this.
pub async fn create_payment_method(
    State(state): State<CatalogState>,
    WithRejection(Json(form), _): WithRejection<Json<CatalogForm>, Error>,
) -> Result<impl IntoResponse, Error> {
    create(CatalogKind::PaymentMethod, &state, form)
}

/// Delete a category and every expense in it. Admins only.
pub async fn delete_category(
    State(state): State<CatalogState>,
    AdminUser(admin): AdminUser,
    WithRejection(Path(id), _): WithRejection<Path<CatalogId>, Error>,
) -> Result<Json<Value>, Error> {
    delete(CatalogKind::Category, &state, id, &admin.email.to_string())
}

/// Delete a payment method and every expense paid with it. Admins only.
pub async fn delete_payment_method(
    State(state): State<CatalogState>,
    AdminUser(admin): AdminUser,
    WithRejection(Path(id), _): WithRejection<Path<CatalogId>, Error>,
) -> Result<Json<Value>, Error> {
    delete(CatalogKind::PaymentMethod, &state, id, &admin.email.to_string())
}

fn list_entries(kind: CatalogKind, state: &CatalogState) -> Result<Json<Value>, Error> {
    let entries = {
        let connection = lock_connection(&state.db_connection)?;
        get_all_entries(kind, &connection)?
    };

    let mut body = json!({ "success": true });
    body[kind.plural_key()] = json!(entries);

    Ok(Json(body))
}

fn create(
    kind: CatalogKind,
    state: &CatalogState,
    form: CatalogForm,
) -> Result<(StatusCode, Json<Value>), Error> {
    let title = Title::new(form.title.as_deref().unwrap_or_default(), kind)?;
    let description = form
        .description
        .map(|description| description.trim().to_owned())
        .filter(|description| !description.is_empty());

    let entry = {
        let connection = lock_connection(&state.db_connection)?;
        create_entry(kind, title, description, &connection)?
    };

    let mut body = json!({
        "success": true,
        "message": format!("{} created successfully.", kind.label()),
    });
    body[kind.singular_key()] = json!(entry);

    Ok((StatusCode::CREATED, Json(body)))
}

fn delete(
    kind: CatalogKind,
    state: &CatalogState,
    id: CatalogId,
    admin_email: &str,
) -> Result<Json<Value>, Error> {
    let deleted_expenses = {
        let connection = lock_connection(&state.db_connection)?;
        delete_entry_with_expenses(kind, id, &connection)?
    };

    tracing::info!(
        "{admin_email} deleted {} {id} and {deleted_expenses} expenses",
        kind.label().to_lowercase()
    );

    Ok(Json(json!({
        "success": true,
        "message": format!("{} and all related expenses deleted successfully.", kind.label()),
    })))
}

#[cfg(test)]
mod catalog_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use time::macros::date;

    use crate::{
        AppState,
        app_state::lock_connection,
        catalog::{CatalogKind, get_entry},
        endpoints::{self, format_endpoint},
        expense::{create_expense, query_expenses, ExpenseFilter, SortOrder},
        test_utils::{
            get_test_app_state, get_test_server, must_create_entry, must_create_user,
            new_expense, token_for,
        },
        user::{AccountType, User},
    };

    fn state_with_users() -> (AppState, User, User) {
        let state = get_test_app_state();
        let (user, admin) = {
            let connection = lock_connection(&state.db_connection).unwrap();
            (
                must_create_user("alice@example.com", AccountType::User, &connection),
                must_create_user("root@example.com", AccountType::Admin, &connection),
            )
        };

        (state, user, admin)
    }

    #[tokio::test]
    async fn create_and_list_categories() {
        let (state, user, _) = state_with_users();
        let token = token_for(&user, &state);
        let server = get_test_server(state);

        let response = server
            .post(endpoints::CATEGORIES)
            .authorization_bearer(&token)
            .json(&json!({ "title": " Food ", "description": "Eating" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<Value>();
        assert_eq!(body["message"], "Category created successfully.");
        assert_eq!(body["category"]["title"], "Food");
        assert_eq!(body["category"]["count"], 0);

        let response = server
            .get(endpoints::CATEGORIES)
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["categories"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["categories"][0]["description"], "Eating");
    }

    #[tokio::test]
    async fn create_payment_method_with_duplicate_title_conflicts() {
        let (state, user, _) = state_with_users();
        let token = token_for(&user, &state);
        let server = get_test_server(state);
        let body = json!({ "title": "Cash" });

        server
            .post(endpoints::PAYMENT_METHODS)
            .authorization_bearer(&token)
            .json(&body)
            .await
            .assert_status(StatusCode::CREATED);
        let response = server
            .post(endpoints::PAYMENT_METHODS)
            .authorization_bearer(&token)
            .json(&body)
            .await;

        response.assert_status(StatusCode::CONFLICT);
        response.assert_json(&json!({
            "success": false,
            "message": "Payment method with this title already exists.",
        }));
    }

    #[tokio::test]
    async fn create_with_blank_title_fails() {
        let (state, user, _) = state_with_users();
        let token = token_for(&user, &state);
        let server = get_test_server(state);

        let response = server
            .post(endpoints::CATEGORIES)
            .authorization_bearer(&token)
            .json(&json!({ "title": "   " }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({
            "success": false,
            "message": "Category title is required.",
        }));
    }

    #[tokio::test]
    async fn list_requires_token() {
        let server = get_test_server(get_test_app_state());

        server
            .get(endpoints::PAYMENT_METHODS)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_admin_cannot_delete() {
        let (state, user, _) = state_with_users();
        let food = {
            let connection = lock_connection(&state.db_connection).unwrap();
            must_create_entry(CatalogKind::Category, "Food", &connection)
        };
        let token = token_for(&user, &state);
        let server = get_test_server(state);

        let response = server
            .delete(&format_endpoint(endpoints::CATEGORY, food.id))
            .authorization_bearer(&token)
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_delete_cascades_to_expenses() {
        let (state, user, admin) = state_with_users();
        let (food, cash) = {
            let connection = lock_connection(&state.db_connection).unwrap();
            let food = must_create_entry(CatalogKind::Category, "Food", &connection);
            let cash = must_create_entry(CatalogKind::PaymentMethod, "Cash", &connection);
            create_expense(
                user.id,
                new_expense("Lunch", 10.0, date!(2024 - 03 - 01), food.id, cash.id),
                &connection,
            )
            .unwrap();
            (food, cash)
        };
        let token = token_for(&admin, &state);
        let server = get_test_server(state.clone());

        let response = server
            .delete(&format_endpoint(endpoints::CATEGORY, food.id))
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "success": true,
            "message": "Category and all related expenses deleted successfully.",
        }));
        let connection = lock_connection(&state.db_connection).unwrap();
        let remaining = query_expenses(
            &ExpenseFilter::for_user(user.id),
            SortOrder::Created,
            &connection,
        )
        .unwrap();
        assert!(remaining.is_empty());
        assert_eq!(
            get_entry(CatalogKind::PaymentMethod, cash.id, &connection)
                .unwrap()
                .count,
            0
        );
    }

    #[tokio::test]
    async fn admin_delete_of_missing_entry_is_not_found() {
        let (state, _, admin) = state_with_users();
        let token = token_for(&admin, &state);
        let server = get_test_server(state);

        let response = server
            .delete(&format_endpoint(endpoints::PAYMENT_METHOD, 404))
            .authorization_bearer(&token)
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&json!({
            "success": false,
            "message": "Payment method not found.",
        }));
    }
}
