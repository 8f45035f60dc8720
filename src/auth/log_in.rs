//! The endpoint for logging in with an email and password.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::IntoResponse,
};
use axum_extra::extract::{CookieJar, WithRejection};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::Duration;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    auth::{JwtKeys, cookie::set_token_cookie, token::encode_token},
    user::{UserSummary, get_user_by_email},
};

/// The state needed for logging in.
#[derive(Debug, Clone)]
pub struct LogInState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub jwt_keys: JwtKeys,
    pub token_duration: Duration,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            jwt_keys: state.jwt_keys.clone(),
            token_duration: state.token_duration,
        }
    }
}

/// The JSON body of a log-in request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogInForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Check the user's credentials and issue a token.
///
/// The token is returned in the body and also set as the `token` cookie.
pub async fn log_in(
    State(state): State<LogInState>,
    jar: CookieJar,
    WithRejection(Json(form), _): WithRejection<Json<LogInForm>, Error>,
) -> Result<impl IntoResponse, Error> {
    let (Some(email), Some(password)) = (
        form.email.filter(|email| !email.trim().is_empty()),
        form.password.filter(|password| !password.is_empty()),
    ) else {
        return Err(Error::MissingCredentials);
    };

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        get_user_by_email(email.trim(), &connection)
    }
    .map_err(|error| match error {
        Error::NotFound => Error::UserNotFound,
        error => error,
    })?;

    let is_password_correct = user.password_hash.verify(&password).map_err(|error| {
        tracing::error!("Error verifying password: {error}");
        Error::HashingError(error.to_string())
    })?;

    if !is_password_correct {
        return Err(Error::InvalidCredentials);
    }

    let token = encode_token(&user, &state.jwt_keys, state.token_duration)?;
    let jar = set_token_cookie(jar, token.clone(), state.token_duration);

    Ok((
        jar,
        Json(json!({
            "success": true,
            "message": "Login successful",
            "token": token,
            "user": UserSummary::from(&user),
        })),
    ))
}
