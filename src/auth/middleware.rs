//! Authentication middleware that verifies the caller's token and attaches their identity.

use std::sync::{Arc, Mutex};

use axum::{
    body::{Body, to_bytes},
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header::CONTENT_TYPE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    extract::CookieJar,
    headers::{Authorization, authorization::Bearer},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    auth::{
        JwtKeys,
        cookie::get_token_from_cookies,
        token::decode_token,
    },
    user::{AccountType, Email, UserID, get_user_by_id},
};

/// The largest request body that is buffered while looking for a token field.
const MAX_TOKEN_BODY_BYTES: usize = 1024 * 1024;

/// The state needed for the auth middleware
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The keys used to verify JSON web tokens.
    pub jwt_keys: JwtKeys,
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            jwt_keys: state.jwt_keys.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The identity of an authenticated caller.
///
/// The account type is read from the database on every request, so a
/// changed role takes effect without waiting for old tokens to expire.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: UserID,
    pub email: Email,
    pub account_type: AccountType,
}

/// An authenticated caller with an admin account.
///
/// Use as a handler argument on routes behind [auth_guard] to restrict them
/// to admins. Rejects other callers with [Error::Forbidden].
#[derive(Debug, Clone, PartialEq)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(Error::TokenMissing)?;

        match user.account_type {
            AccountType::Admin => Ok(Self(user)),
            AccountType::User => Err(Error::Forbidden),
        }
    }
}

#[derive(Deserialize)]
struct TokenField {
    token: Option<String>,
}

/// Middleware function that checks for a valid token.
///
/// The token is looked for in the `token` cookie, then in the `token` field
/// of a JSON body, and then in an `Authorization: Bearer` header. If the
/// token is valid and its user still exists, an [AuthUser] is placed into the
/// request and the request executed normally, otherwise a 401 response is
/// returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user): Extension<AuthUser>` to receive the caller.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    match authenticate(&state, request).await {
        Ok(request) => next.run(request).await,
        Err(error) => error.into_response(),
    }
}

async fn authenticate(state: &AuthState, request: Request) -> Result<Request, Error> {
    let (mut parts, body) = request.into_parts();

    let cookie_token = get_token_from_cookies(&CookieJar::from_headers(&parts.headers));

    let (body, body_token) = if cookie_token.is_none() && is_json(&parts) {
        let bytes = to_bytes(body, MAX_TOKEN_BODY_BYTES)
            .await
            .map_err(|error| Error::InvalidRequest(error.to_string()))?;
        let body_token = serde_json::from_slice::<TokenField>(&bytes)
            .ok()
            .and_then(|field| field.token)
            .filter(|token| !token.trim().is_empty());

        (Body::from(bytes), body_token)
    } else {
        (body, None)
    };

    let header_token = if cookie_token.is_none() && body_token.is_none() {
        TypedHeader::<Authorization<Bearer>>::from_request_parts(&mut parts, &())
            .await
            .ok()
            .map(|TypedHeader(Authorization(bearer))| bearer.token().to_owned())
    } else {
        None
    };

    let token = cookie_token
        .or(body_token)
        .or(header_token)
        .ok_or(Error::TokenMissing)?;

    let claims = decode_token(&token, &state.jwt_keys)?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        get_user_by_id(UserID::new(claims.id), &connection)
    }
    .map_err(|error| match error {
        Error::NotFound => Error::UserMissing,
        error => error,
    })?;

    parts.extensions.insert(AuthUser {
        id: user.id,
        email: user.email,
        account_type: user.account_type,
    });

    Ok(Request::from_parts(parts, body))
}

fn is_json(parts: &Parts) -> bool {
    parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}
