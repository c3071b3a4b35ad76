use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;
use tracing::info;

type HmacSha256 = Hmac<Sha256>;

pub const AUTH_COOKIE: &str = "auth_token";

/// Page slugs that require a valid session. Everything the portal serves
/// except the login page.
pub const PROTECTED_PAGES: &[&str] = &[
    "home",
    "factcheck",
    "social-media",
    "phone-intel",
    "emailintelligence",
    "domain-intel",
    "breach-data",
    "darkweb-tools",
    "blockchain-tools",
    "aitools",
    "learning",
    "github",
    "contact",
    "osint-books",
    "cyber",
];

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub session_timeout: Duration,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub id: i64,
    pub username: Option<String>,
    /// Unix milliseconds of the moment this token was minted.
    pub login_time: i64,
    /// Unix seconds; tokens at or past this instant are rejected.
    pub exp: i64,
}

impl Claims {
    pub fn new(id: i64, username: Option<String>, now: DateTime<Utc>, lifetime: Duration) -> Self {
        Self {
            id,
            username,
            login_time: now.timestamp_millis(),
            exp: now.timestamp() + lifetime.as_secs() as i64,
        }
    }
}

#[derive(Debug)]
pub enum TokenError {
    Malformed,
    BadSignature,
    Expired,
    Json(String),
}

/// Compact HS256 JWT: `base64url(header).base64url(claims).base64url(mac)`.
pub fn sign(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        serde_json::to_vec(claims).map_err(|err| TokenError::Json(err.to_string()))?,
    );
    let signing_input = format!("{header}.{payload}");
    let signature = URL_SAFE_NO_PAD.encode(hmac_sha256(secret, signing_input.as_bytes()));
    Ok(format!("{signing_input}.{signature}"))
}

pub fn verify(token: &str, secret: &str) -> Result<Claims, TokenError> {
    verify_at(Utc::now(), token, secret)
}

pub fn verify_at(now: DateTime<Utc>, token: &str, secret: &str) -> Result<Claims, TokenError> {
    let mut parts = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed);
    };

    let expected = hmac_sha256(secret, format!("{header}.{payload}").as_bytes());
    let given = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| TokenError::Malformed)?;
    if !constant_time_eq(&expected, &given) {
        return Err(TokenError::BadSignature);
    }

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| TokenError::Malformed)?;
    let claims: Claims = serde_json::from_slice(&payload_bytes)
        .map_err(|err| TokenError::Json(err.to_string()))?;

    if claims.exp <= now.timestamp() {
        return Err(TokenError::Expired);
    }
    Ok(claims)
}

fn hmac_sha256(secret: &str, input: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac key");
    mac.update(input);
    mac.finalize().into_bytes().to_vec()
}

pub fn session_cookie(token: &str, lifetime: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{AUTH_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        lifetime.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn expired_cookie() -> String {
    format!("{AUTH_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == AUTH_COOKIE).then(|| value.to_string())
    })
}

/// Middleware guarding the protected pages. A valid cookie slides the session
/// window forward via a refreshed token; anything else clears the cookie and
/// bounces the client to the login page.
pub async fn guard_pages(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path();
    if path == "/" || path.starts_with("/api/") || path.starts_with("/auth/") || path.contains('.')
    {
        return next.run(req).await;
    }

    let slug = path.trim_start_matches('/').to_string();
    if !PROTECTED_PAGES.contains(&slug.as_str()) {
        return next.run(req).await;
    }

    let Some(token) = token_from_headers(req.headers()) else {
        info!("no token for protected page: {slug}");
        return redirect_to_login();
    };

    let auth = state.auth.clone();
    match verify(&token, &auth.secret) {
        Ok(claims) => {
            let refreshed = Claims::new(claims.id, claims.username, Utc::now(), auth.session_timeout);
            let mut response = next.run(req).await;
            if let Ok(token) = sign(&refreshed, &auth.secret) {
                let cookie = session_cookie(&token, auth.session_timeout, auth.cookie_secure);
                if let Ok(value) = HeaderValue::from_str(&cookie) {
                    response.headers_mut().append(header::SET_COOKIE, value);
                }
            }
            response
        }
        Err(err) => {
            info!("invalid token for protected page {slug}: {err:?}");
            redirect_to_login()
        }
    }
}

fn redirect_to_login() -> Response {
    let mut response = Redirect::to("/").into_response();
    if let Ok(value) = HeaderValue::from_str(&expired_cookie()) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}
