//! Signed JSON web tokens that identify a logged-in user.

use std::fmt::Debug;

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    user::{AccountType, User},
};

/// The default duration for which tokens are valid.
pub const DEFAULT_TOKEN_DURATION: Duration = Duration::hours(72);

/// The keys used to sign and verify tokens, derived from a shared secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys").finish_non_exhaustive()
    }
}

/// The contents of a JSON Web Token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub id: i64,
    /// Email associated with the token.
    pub email: String,
    /// The account type at the time the token was issued.
    ///
    /// Informational only, authorization reads the account type from the database.
    pub account_type: AccountType,
    /// The time the token was issued.
    pub iat: i64,
    /// The expiry time of the token.
    pub exp: i64,
}

/// Issue a token for `user` that expires after `duration`.
///
/// # Errors
///
/// Returns an [Error::TokenCreation] if the token could not be signed.
pub fn encode_token(user: &User, keys: &JwtKeys, duration: Duration) -> Result<String, Error> {
    let now = OffsetDateTime::now_utc();
    let claims = Claims {
        id: user.id.as_i64(),
        email: user.email.to_string(),
        account_type: user.account_type,
        iat: now.unix_timestamp(),
        exp: (now + duration).unix_timestamp(),
    };

    encode(&Header::default(), &claims, &keys.encoding_key)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Verify the signature and expiry of `token` and return its claims.
///
/// # Errors
///
/// Returns an [Error::InvalidToken] if the token is malformed, has a bad signature or has expired.
pub fn decode_token(token: &str, keys: &JwtKeys) -> Result<Claims, Error> {
    decode::<Claims>(token, &keys.decoding_key, &Validation::default())
        .map(|token_data| token_data.claims)
        .map_err(|error| {
            tracing::debug!("rejected token: {error}");
            Error::InvalidToken
        })
}

#[cfg(test)]
mod tests {
    use time::Duration;

    use crate::{
        Error, PasswordHash,
        auth::{JwtKeys, decode_token, encode_token},
        user::{AccountType, Email, User, UserID},
    };

    fn test_user() -> User {
        User {
            id: UserID::new(7),
            name: "Alice".to_owned(),
            email: Email::new_unchecked("alice@example.com"),
            password_hash: PasswordHash::new_unchecked("hunter2"),
            account_type: AccountType::Admin,
            total_monthly_budget: 0.0,
        }
    }

    #[test]
    fn decode_gives_issued_claims() {
        let keys = JwtKeys::new("foobar");

        let token = encode_token(&test_user(), &keys, Duration::hours(1)).unwrap();
        let claims = decode_token(&token, &keys).unwrap();

        assert_eq!(claims.id, 7);
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.account_type, AccountType::Admin);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn claims_use_camel_case() {
        let keys = JwtKeys::new("foobar");
        let token = encode_token(&test_user(), &keys, Duration::hours(1)).unwrap();
        let claims = decode_token(&token, &keys).unwrap();

        let json = serde_json::to_value(claims).unwrap();

        assert_eq!(json["accountType"], "Admin");
    }

    #[test]
    fn decode_fails_with_wrong_secret() {
        let token = encode_token(&test_user(), &JwtKeys::new("foobar"), Duration::hours(1)).unwrap();

        assert_eq!(
            decode_token(&token, &JwtKeys::new("not foobar")),
            Err(Error::InvalidToken)
        );
    }

    #[test]
    fn decode_fails_when_expired() {
        let keys = JwtKeys::new("foobar");
        let token = encode_token(&test_user(), &keys, Duration::hours(-1)).unwrap();

        assert_eq!(decode_token(&token, &keys), Err(Error::InvalidToken));
    }

    #[test]
    fn decode_fails_on_garbage() {
        assert_eq!(
            decode_token("not.a.jwt", &JwtKeys::new("foobar")),
            Err(Error::InvalidToken)
        );
    }
}
