// src/api/auth.rs
// HTTP basic access authentication for the /api/v1 routes

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use tracing::warn;

use super::error::ApiError;
use crate::config::Credentials;
use crate::state::AppState;

pub const REALM: &str = "Basic realm=\"htrest\"";

/// Reject requests without matching credentials; a no-op when the server
/// was started without `--user`
pub async fn require_basic_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.credentials.as_deref() else {
        return next.run(request).await;
    };

    let supplied = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(decode_basic);

    match supplied {
        Some(creds) if credentials_match(&creds, expected) => next.run(request).await,
        Some(creds) => {
            warn!("Rejected credentials for user '{}'", creds.username);
            unauthorized()
        }
        None => unauthorized(),
    }
}

fn unauthorized() -> Response {
    let mut response = ApiError::unauthorized("Authentication required").into_response();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(REALM));
    response
}

/// Compare both fields without an early exit on the first differing byte
fn credentials_match(supplied: &Credentials, expected: &Credentials) -> bool {
    let username = constant_time_eq(supplied.username.as_bytes(), expected.username.as_bytes());
    let password = constant_time_eq(supplied.password.as_bytes(), expected.password.as_bytes());
    username & password
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Parse an `Authorization: Basic <base64(user:password)>` header value
fn decode_basic(value: &str) -> Option<Credentials> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = String::from_utf8(BASE64.decode(encoded.trim()).ok()?).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}
