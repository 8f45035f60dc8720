//! The endpoint for logging out.

use axum::{Json, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde_json::json;

use crate::auth::cookie::invalidate_token_cookie;

/// Expire the token cookie.
///
/// Tokens are stateless, so a client that kept a copy of the token can keep
/// using it until it expires.
pub async fn log_out(jar: CookieJar) -> impl IntoResponse {
    (
        invalidate_token_cookie(jar),
        Json(json!({ "success": true, "message": "Logged out" })),
    )
}

#[cfg(test)]
mod log_out_tests {
    use time::Duration;

    use crate::{
        auth::COOKIE_TOKEN,
        endpoints,
        test_utils::{get_test_app_state, get_test_server},
    };

    #[tokio::test]
    async fn log_out_expires_cookie() {
        let server = get_test_server(get_test_app_state());

        let response = server.post(endpoints::LOG_OUT).await;

        response.assert_status_ok();
        let cookie = response.cookie(COOKIE_TOKEN);
        assert_eq!(cookie.value(), "deleted");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }
}
