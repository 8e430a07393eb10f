//! HTTP Basic Authentication for the operator surface

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, Response, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use base64::Engine;
use std::sync::Arc;

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Username for the operator surface (None = auth disabled)
    pub username: Option<String>,
    /// Password for the operator surface
    pub password: Option<String>,
}

impl AuthConfig {
    /// Load auth config from environment variables.
    /// OPERATOR_USERNAME and OPERATOR_PASSWORD must both be set to enable auth
    pub fn from_env() -> Self {
        let username = std::env::var("OPERATOR_USERNAME")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let password = std::env::var("OPERATOR_PASSWORD")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        if username.is_some() && password.is_some() {
            tracing::info!("Operator authentication enabled");
            Self { username, password }
        } else {
            if username.is_some() || password.is_some() {
                tracing::warn!(
                    "OPERATOR_USERNAME and OPERATOR_PASSWORD must both be set to enable authentication"
                );
            }
            tracing::warn!("Operator authentication DISABLED - anyone can run the raffle!");
            Self {
                username: None,
                password: None,
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    /// Validate credentials
    pub fn validate(&self, username: &str, password: &str) -> bool {
        match (&self.username, &self.password) {
            (Some(u), Some(p)) => {
                constant_time_eq(u.as_bytes(), username.as_bytes())
                    && constant_time_eq(p.as_bytes(), password.as_bytes())
            }
            _ => true, // Auth disabled, allow all
        }
    }
}

/// Constant-time byte comparison to prevent timing attacks
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Whether the request carries valid Basic credentials for this config.
fn authorized(headers: &HeaderMap, config: &AuthConfig) -> bool {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return false;
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return false;
    };
    let Some(credentials) = auth_str.strip_prefix("Basic ") else {
        return false;
    };
    let Ok(decoded) = base64::engine::general_purpose::STANDARD.decode(credentials) else {
        return false;
    };
    let Ok(decoded_str) = String::from_utf8(decoded) else {
        return false;
    };
    let Some((username, password)) = decoded_str.split_once(':') else {
        return false;
    };
    config.validate(username, password)
}

fn unauthorized_response() -> Response<Body> {
    Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .header(header::WWW_AUTHENTICATE, "Basic realm=\"Sorteo Operator\"")
        .body(Body::from("Unauthorized"))
        .unwrap()
}

/// Middleware for HTTP Basic Authentication on operator routes
pub async fn operator_auth_middleware(
    State(auth_config): State<Arc<AuthConfig>>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    if !auth_config.is_enabled() || authorized(request.headers(), &auth_config) {
        return next.run(request).await;
    }
    unauthorized_response()
}

fn query_param_equals(request: &Request<Body>, key: &str, expected: &str) -> bool {
    let Some(query) = request.uri().query() else {
        return false;
    };
    for pair in query.split('&') {
        let Some((k, v)) = pair.split_once('=') else {
            continue;
        };
        if k == key && v == expected {
            return true;
        }
    }
    false
}

/// Middleware to require HTTP Basic Auth for operator WebSocket connections.
///
/// This prevents clients from taking over by connecting to `/ws?role=operator`.
pub async fn operator_ws_auth_middleware(
    State(auth_config): State<Arc<AuthConfig>>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let is_operator_ws =
        request.uri().path() == "/ws" && query_param_equals(&request, "role", "operator");

    if !is_operator_ws {
        return next.run(request).await;
    }

    if !auth_config.is_enabled() {
        tracing::warn!(
            "Operator WebSocket requested but operator authentication is DISABLED; set OPERATOR_USERNAME and OPERATOR_PASSWORD to prevent takeover"
        );
        return next.run(request).await;
    }

    if authorized(request.headers(), &auth_config) {
        return next.run(request).await;
    }
    unauthorized_response()
}

/// Handler to serve operator.html (used with auth middleware)
pub async fn serve_operator() -> impl IntoResponse {
    match tokio::fs::read_to_string("static/operator.html").await {
        Ok(content) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
            .body(Body::from(content))
            .unwrap(),
        Err(_) => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::from("Operator page not found"))
            .unwrap(),
    }
}
