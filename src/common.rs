// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "healthai_session";

/// Response for the health check endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    pub message: String,
}

/// Liveness check.
pub async fn ping() -> Json<PingResponse> {
    info!("Health check received");
    Json(PingResponse {
        message: "pong".to_string(),
    })
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Read the session id from the request cookies, if present and well formed.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` header pinning the browser to `id`.
pub fn session_cookie(id: Uuid) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.insert(SET_COOKIE, value);
    }
    headers
}

/// `Set-Cookie` header that expires the session cookie.
pub fn expired_session_cookie() -> HeaderMap {
    let mut headers = HeaderMap::new();
    let cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.insert(SET_COOKIE, value);
    }
    headers
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reads_session_among_other_cookies() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={id}; lang=en")).unwrap(),
        );
        assert_eq!(session_id_from_headers(&headers), Some(id));
    }

    #[test]
    fn ignores_missing_or_garbled_session() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_id_from_headers(&headers), None);

        headers.insert(COOKIE, HeaderValue::from_static("healthai_session=not-a-uuid"));
        assert_eq!(session_id_from_headers(&headers), None);
    }

    #[test]
    fn issued_cookie_round_trips() {
        let id = Uuid::new_v4();
        let issued = session_cookie(id);
        let value = issued.get(SET_COOKIE).unwrap().to_str().unwrap();
        let pair = value.split(';').next().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(pair).unwrap());
        assert_eq!(session_id_from_headers(&headers), Some(id));
    }

    #[test]
    fn expiry_targets_the_session_cookie() {
        let expired = expired_session_cookie();
        let value = expired.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(value.starts_with(&format!("{SESSION_COOKIE}=;")));
        assert!(value.contains("Max-Age=0"));

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value.split(';').next().unwrap()).unwrap());
        assert_eq!(session_id_from_headers(&headers), None);
    }
}
