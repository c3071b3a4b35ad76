use crate::auth::{self, Claims};
use crate::db::User;
use crate::errors::AppError;
use crate::models::{
    AuthResponse, AuthStatusResponse, LoginRequest, LogoutRequest, PublicUser,
    VisitorStatsResponse,
};
use crate::state::AppState;
use crate::storage::persist_data;
use crate::ui;
use crate::visitors;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::net::SocketAddr;
use tracing::{debug, error, info};

/// Counts qualifying page views before routing. Qualifying means a GET whose
/// path is neither under the API prefix nor the auth prefix; the stats API
/// itself therefore never inflates the numbers it reports.
pub async fn track_page_view(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path();
    if req.method() == Method::GET && !path.starts_with("/api/") && !path.starts_with("/auth/") {
        let addr = client_ip(req.headers(), peer);
        let agent = req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        let mut data = state.visitors.lock().await;
        if visitors::record_visit(&mut data, &addr, &agent) {
            info!(
                "new unique visit for {path}, totals: {} all-time, {} unique",
                data.total_visitors,
                data.unique_visitors.len()
            );
            if let Err(err) = persist_data(&state.data_path, &data).await {
                // In-memory state stays authoritative; the write retries on
                // the next counted visit.
                error!("failed to persist visitor data: {}", err.message);
            }
        } else {
            debug!("repeat visit ignored for {path}");
        }
    }

    next.run(req).await
}

/// First X-Forwarded-For entry when running behind a proxy, peer address
/// otherwise.
fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| peer.ip().to_string())
}

pub async fn index() -> Html<&'static str> {
    Html(ui::login_page())
}

pub async fn healthz() -> &'static str {
    "ok"
}

/// Fallback route: clean-URL redirects plus the embedded page registry.
pub async fn serve_page(req: Request) -> Response {
    let path = req.uri().path().to_string();

    if let Some(stripped) = path.strip_suffix(".html") {
        let target = if stripped.is_empty() || stripped == "/index" {
            "/"
        } else {
            stripped
        };
        return (
            StatusCode::MOVED_PERMANENTLY,
            [(header::LOCATION, target.to_string())],
        )
            .into_response();
    }

    match ui::render_page(path.trim_start_matches('/')) {
        Some(html) => Html(html).into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

pub async fn visitor_stats(
    State(state): State<AppState>,
) -> Result<Json<VisitorStatsResponse>, AppError> {
    let data = state.visitors.lock().await;
    Ok(Json(visitors::build_snapshot(&data)))
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>, AppError> {
    Ok(Json(state.db.list_users().await?))
}

pub async fn auth_status(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(token) = auth::token_from_headers(&headers) else {
        return Json(AuthStatusResponse {
            authenticated: false,
            username: None,
        })
        .into_response();
    };

    match auth::verify(&token, &state.auth.secret) {
        Ok(claims) => Json(AuthStatusResponse {
            authenticated: true,
            username: claims.username,
        })
        .into_response(),
        Err(_) => (
            [(header::SET_COOKIE, auth::expired_cookie())],
            Json(AuthStatusResponse {
                authenticated: false,
                username: None,
            }),
        )
            .into_response(),
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let password = payload.password.as_deref().unwrap_or("");
    let username = payload.username.as_deref().filter(|value| !value.is_empty());
    let email = payload.email.as_deref().filter(|value| !value.is_empty());

    if (username.is_none() && email.is_none()) || password.is_empty() {
        return Ok(auth_failure(
            StatusCode::BAD_REQUEST,
            "Username or email and password required",
        ));
    }

    if let Some(username) = username {
        info!("login attempt for username {username}");
        return match state
            .db
            .find_by_username_and_password(username, password)
            .await?
        {
            Some(user) => grant_session(&state, user).await,
            None => {
                info!("invalid credentials for username {username}");
                Ok(auth_failure(
                    StatusCode::UNAUTHORIZED,
                    "Invalid username or password",
                ))
            }
        };
    }

    if let Some(email) = email {
        info!("login attempt for email {email}");
        return match state.db.find_by_email_and_password(email, password).await? {
            Some(user) if user.email_verified => grant_session(&state, user).await,
            Some(_) => Ok(auth_failure(
                StatusCode::UNAUTHORIZED,
                "Please verify your email before logging in.",
            )),
            None if state.db.email_exists(email).await? => {
                info!("invalid password for email {email}");
                Ok(auth_failure(
                    StatusCode::UNAUTHORIZED,
                    "Invalid password for this email",
                ))
            }
            None => Ok(auth_failure(
                StatusCode::UNAUTHORIZED,
                "Invalid email or password",
            )),
        };
    }

    Ok(auth_failure(
        StatusCode::BAD_REQUEST,
        "Username or email and password required",
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    payload: Option<Json<LogoutRequest>>,
) -> Response {
    let payload = payload.map(|Json(body)| body).unwrap_or_default();

    if payload.username.is_some() || payload.email.is_some() {
        match state
            .db
            .find_by_username_or_email(payload.username.as_deref(), payload.email.as_deref())
            .await
        {
            Ok(Some(user)) => {
                if let Err(err) = state.db.record_logout(&user).await {
                    error!("failed to record logout: {err}");
                }
            }
            Ok(None) => {}
            Err(err) => error!("failed to look up user on logout: {err}"),
        }
    }

    (
        [(header::SET_COOKIE, auth::expired_cookie())],
        Json(AuthResponse {
            success: true,
            message: "Logged out successfully.".to_string(),
        }),
    )
        .into_response()
}

async fn grant_session(state: &AppState, user: User) -> Result<Response, AppError> {
    if let Err(err) = state.db.record_login(&user).await {
        error!("failed to record login: {err}");
    }

    let claims = Claims::new(
        user.id,
        user.username.clone(),
        Utc::now(),
        state.auth.session_timeout,
    );
    let token = auth::sign(&claims, &state.auth.secret).map_err(|err| AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: format!("failed to sign session token: {err:?}"),
    })?;
    let cookie = auth::session_cookie(&token, state.auth.session_timeout, state.auth.cookie_secure);

    info!("login successful for user id {}", user.id);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            success: true,
            message: "Login successful".to_string(),
        }),
    )
        .into_response())
}

fn auth_failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(AuthResponse {
            success: false,
            message: message.to_string(),
        }),
    )
        .into_response()
}
