//! `token inspect`: show what an access token claims without verifying it.

#[cfg(test)]
#[path = "inspect_test.rs"]
mod inspect_test;

use serde_json::{Value, json};
use session::token::{self, TokenError};

/// Claims of `access` as printable JSON, evaluated at `now`.
///
/// # Errors
///
/// Returns [`TokenError`] when `access` is not a decodable JWT.
pub fn describe(access: &str, now: u64) -> Result<Value, TokenError> {
    let claims = token::decode_claims(access)?;
    let expires_in = claims.seconds_remaining(now);
    let expired = claims.is_expired(now, 0);
    let refresh_due = claims.expires_within(now, token::DEFAULT_REFRESH_WINDOW_SECS);
    let mut out = json!({
        "sub": claims.sub,
        "role": claims.role,
        "iat": claims.iat,
        "exp": claims.exp,
        "expires_in": expires_in,
        "expired": expired,
        "refresh_due": refresh_due,
    });
    if !claims.extra.is_empty() {
        out["extra"] = Value::Object(claims.extra);
    }
    Ok(out)
}
