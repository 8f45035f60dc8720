//! Defines the app level error type and its conversion to JSON responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::catalog::CatalogKind;

/// The errors that may occur in the application.
///
/// The `Display` text of each variant is the human readable message sent to
/// the client, except for the internal errors which are replaced with a
/// generic message.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request could not be parsed, e.g. malformed JSON or a bad path ID.
    #[error("{0}")]
    InvalidRequest(String),

    /// One or more of the fields needed to create or update an expense was
    /// missing.
    #[error("All required fields must be provided.")]
    IncompleteExpense,

    /// One or more of the fields needed to register a user was missing.
    #[error("All fields are required")]
    IncompleteSignUp,

    /// The email or password was missing from a log-in request.
    #[error("Email and password are required")]
    MissingCredentials,

    /// An expense amount was zero, negative or not a finite number.
    #[error("Amount must be a positive number.")]
    InvalidAmount,

    /// The category ID did not refer to an existing category.
    #[error("Invalid category.")]
    InvalidCategory,

    /// The payment method ID did not refer to an existing payment method.
    #[error("Invalid payment method.")]
    InvalidPaymentMethod,

    /// An empty or blank string was used as a category or payment method title.
    #[error("{} title is required.", .0.label())]
    EmptyTitle(CatalogKind),

    /// The `startDate` query parameter is not a calendar date.
    #[error("Invalid startDate format. Use YYYY-MM-DD.")]
    InvalidStartDate,

    /// The `endDate` query parameter is not a calendar date.
    #[error("Invalid endDate format. Use YYYY-MM-DD.")]
    InvalidEndDate,

    /// A date in a request body or dashboard query is not a calendar date.
    #[error("Invalid date format. Use YYYY-MM-DD.")]
    InvalidDate,

    /// The search endpoint was called without a search string.
    #[error("Search string (q) is required.")]
    SearchQueryMissing,

    /// The total monthly budget was missing, negative or not a number.
    #[error("A valid totalMonthlyBudget is required.")]
    InvalidMonthlyBudget,

    /// A category budget was missing its category or had an invalid limit.
    #[error("categoryId and a non-negative limit are required.")]
    InvalidCategoryBudget,

    /// A category budget deletion did not name a category.
    #[error("categoryId is required.")]
    MissingCategoryId,

    /// The email address is not a valid email address.
    #[error("{0} is not a valid email address")]
    InvalidEmail(String),

    /// The password and password confirmation did not match.
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// A user with the same email address is already registered.
    #[error("User already exists")]
    DuplicateEmail,

    /// No credential was found in the cookies, body or `Authorization` header.
    #[error("Token Missing")]
    TokenMissing,

    /// The credential could not be verified or has expired.
    #[error("token is invalid")]
    InvalidToken,

    /// The credential is valid but the user it refers to no longer exists.
    #[error("User does not exist.")]
    UserMissing,

    /// The user provided an incorrect password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// A log-in request used an email address that is not registered.
    #[error("User not found")]
    UserNotFound,

    /// An admin account was requested without the correct admin code.
    #[error("Invalid admin code")]
    InvalidAdminCode,

    /// The user is authenticated but is not allowed to perform the action.
    #[error("Only admins can perform this action.")]
    Forbidden,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("The requested resource could not be found.")]
    NotFound,

    /// The expense does not exist or belongs to another user.
    #[error("Expense not found")]
    ExpenseNotFound,

    /// The category or payment method does not exist.
    #[error("{} not found.", .0.label())]
    CatalogEntryNotFound(CatalogKind),

    /// A category or payment method with the same title already exists.
    #[error("{} with this title already exists.", .0.label())]
    DuplicateTitle(CatalogKind),

    /// An unexpected error occurred with the underlying hashing library.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A JSON web token could not be created.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl Error {
    /// The HTTP status code the error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidRequest(_)
            | Error::IncompleteExpense
            | Error::IncompleteSignUp
            | Error::MissingCredentials
            | Error::InvalidAmount
            | Error::InvalidCategory
            | Error::InvalidPaymentMethod
            | Error::EmptyTitle(_)
            | Error::InvalidStartDate
            | Error::InvalidEndDate
            | Error::InvalidDate
            | Error::SearchQueryMissing
            | Error::InvalidMonthlyBudget
            | Error::InvalidCategoryBudget
            | Error::MissingCategoryId
            | Error::InvalidEmail(_)
            | Error::PasswordMismatch
            | Error::DuplicateEmail => StatusCode::BAD_REQUEST,
            Error::TokenMissing
            | Error::InvalidToken
            | Error::UserMissing
            | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::InvalidAdminCode | Error::Forbidden => StatusCode::FORBIDDEN,
            Error::NotFound
            | Error::ExpenseNotFound
            | Error::CatalogEntryNotFound(_)
            | Error::UserNotFound => StatusCode::NOT_FOUND,
            Error::DuplicateTitle(_) => StatusCode::CONFLICT,
            Error::HashingError(_)
            | Error::TokenCreation(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("payment_method.title") =>
            {
                Error::DuplicateTitle(CatalogKind::PaymentMethod)
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("category.title") =>
            {
                Error::DuplicateTitle(CatalogKind::Category)
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let body = if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            // The details of internal errors are not intended to be shown as
            // the main message to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            json!({
                "success": false,
                "message": "Internal server error",
                "error": self.to_string(),
            })
        } else {
            json!({
                "success": false,
                "message": self.to_string(),
            })
        };

        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
    use serde_json::Value;

    use crate::{Error, catalog::CatalogKind};

    async fn into_json(error: Error) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not read response body");

        (
            status,
            serde_json::from_slice(&body).expect("Could not parse response body"),
        )
    }

    #[tokio::test]
    async fn validation_error_renders_message() {
        let (status, body) = into_json(Error::SearchQueryMissing).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Search string (q) is required.");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn catalog_errors_name_the_kind() {
        let (status, body) = into_json(Error::DuplicateTitle(CatalogKind::PaymentMethod)).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body["message"],
            "Payment method with this title already exists."
        );
    }

    #[tokio::test]
    async fn internal_error_hides_detail_in_message() {
        let (status, body) = into_json(Error::HashingError("bad salt".to_owned())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
        assert_eq!(body["error"], "hashing failed: bad salt");
    }

    #[test]
    fn auth_errors_are_unauthorized() {
        assert_eq!(Error::TokenMissing.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::UserMissing.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::Forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }
}
