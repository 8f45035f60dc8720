//! The endpoint for registering a new user.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    AppState, Error, PasswordHash,
    app_state::lock_connection,
    user::{AccountType, Email, NewUser, UserSummary, create_user, get_user_by_email},
};

/// The state needed for registering a user.
#[derive(Debug, Clone)]
pub struct SignUpState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub admin_code: Option<String>,
    pub password_cost: u32,
}

impl FromRef<AppState> for SignUpState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            admin_code: state.admin_code.clone(),
            password_cost: state.password_cost,
        }
    }
}

/// The JSON body of a sign-up request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    /// "Admin" requests an admin account, anything else gives a regular account.
    pub account_type: Option<String>,
    #[serde(default, deserialize_with = "crate::numbers::optional_number::deserialize")]
    pub total_monthly_budget: Option<f64>,
    pub admin_code: Option<String>,
}

/// Register a new user and return their public details.
pub async fn sign_up(
    State(state): State<SignUpState>,
    WithRejection(Json(form), _): WithRejection<Json<SignUpForm>, Error>,
) -> Result<impl IntoResponse, Error> {
    let (Some(name), Some(raw_email), Some(password), Some(confirm_password), Some(account_type)) = (
        non_blank(form.name),
        non_blank(form.email),
        non_blank(form.password),
        non_blank(form.confirm_password),
        non_blank(form.account_type),
    ) else {
        return Err(Error::IncompleteSignUp);
    };

    let email = Email::new(&raw_email)?;

    let total_monthly_budget = form.total_monthly_budget.unwrap_or(0.0);
    if !total_monthly_budget.is_finite() || total_monthly_budget < 0.0 {
        return Err(Error::InvalidMonthlyBudget);
    }

    let account_type = if account_type == AccountType::Admin.as_str() {
        check_admin_code(form.admin_code.as_deref(), state.admin_code.as_deref())?;
        AccountType::Admin
    } else {
        AccountType::User
    };

    {
        let connection = lock_connection(&state.db_connection)?;
        match get_user_by_email(email.as_ref(), &connection) {
            Ok(_) => return Err(Error::DuplicateEmail),
            Err(Error::NotFound) => {}
            Err(error) => return Err(error),
        }
    }

    if password != confirm_password {
        return Err(Error::PasswordMismatch);
    }

    let password_hash = PasswordHash::new(&password, state.password_cost)?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        create_user(
            NewUser {
                name: name.trim().to_owned(),
                email,
                password_hash,
                account_type,
                total_monthly_budget,
            },
            &connection,
        )?
    };

    tracing::info!("Registered user {} as {}", user.id, account_type.as_str());

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully",
            "user": UserSummary::from(&user),
        })),
    ))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn check_admin_code(provided: Option<&str>, configured: Option<&str>) -> Result<(), Error> {
    match (provided, configured) {
        (Some(provided), Some(configured)) if provided == configured => Ok(()),
        _ => Err(Error::InvalidAdminCode),
    }
}
