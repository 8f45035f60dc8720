//! Defines functions for handling the token cookie.

use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

/// The name of the cookie that carries the JSON web token.
pub const COOKIE_TOKEN: &str = "token";

/// Add the token cookie to the cookie jar, indicating that a user is logged in.
///
/// Sets the expiry of the cookie to `duration` from the current time.
pub(crate) fn set_token_cookie(jar: CookieJar, token: String, duration: Duration) -> CookieJar {
    let expiry = OffsetDateTime::now_utc() + duration;

    jar.add(
        Cookie::build((COOKIE_TOKEN, token))
            .expires(expiry)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Set the token cookie to an invalid value and set its max age to zero, which should delete the cookie on the client side.
pub(crate) fn invalidate_token_cookie(jar: CookieJar) -> CookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Get the raw token from the cookie jar, if a non-empty one is present.
pub(crate) fn get_token_from_cookies(jar: &CookieJar) -> Option<String> {
    jar.get(COOKIE_TOKEN)
        .map(|cookie| cookie.value_trimmed().to_owned())
        .filter(|token| !token.is_empty())
}
