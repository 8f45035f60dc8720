//! Token based authentication: issuing, verifying and clearing credentials.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod sign_up;
mod token;

pub use cookie::COOKIE_TOKEN;
pub use log_in::{LogInForm, log_in};
pub use log_out::log_out;
pub use middleware::{AdminUser, AuthState, AuthUser, auth_guard};
pub use sign_up::{SignUpForm, sign_up};
pub use token::{Claims, DEFAULT_TOKEN_DURATION, JwtKeys, decode_token, encode_token};
