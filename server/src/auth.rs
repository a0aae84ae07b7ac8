use anyhow::Result;
use axum::extract::State;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use geonear_core::OwnerId;

use crate::errors::ApiError;
use crate::state::AppState;

mod env;
pub(crate) mod jwt;

use self::env::parse_auth_mode;
use self::jwt::JwtConfig;

const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthMode {
    /// Identity is taken from the `x-user-id` header without verification.
    Disabled,
    Jwt,
}

#[derive(Debug, Clone)]
pub(crate) struct AuthConfig {
    pub(crate) mode: AuthMode,
    pub(crate) jwt: Option<JwtConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::Disabled,
            jwt: None,
        }
    }
}

impl AuthConfig {
    pub(crate) fn from_env() -> Result<Self> {
        let mode = parse_auth_mode(std::env::var("GEONEAR_AUTH_MODE").ok().as_deref())?;
        let jwt = match mode {
            AuthMode::Jwt => Some(JwtConfig::from_env()?),
            AuthMode::Disabled => None,
        };
        Ok(Self { mode, jwt })
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<Requester, ApiError> {
        match self.mode {
            AuthMode::Disabled => requester_from_header(headers),
            AuthMode::Jwt => {
                if !headers.contains_key(axum::http::header::AUTHORIZATION) {
                    return Ok(Requester::anonymous("jwt"));
                }
                self.jwt
                    .as_ref()
                    .ok_or_else(|| ApiError::unauthorized("jwt auth is not configured"))?
                    .authenticate(headers)
            }
        }
    }
}

fn requester_from_header(headers: &HeaderMap) -> Result<Requester, ApiError> {
    let Some(raw) = headers.get(USER_ID_HEADER) else {
        return Ok(Requester::anonymous("disabled"));
    };
    raw.to_str()
        .ok()
        .and_then(|value| value.trim().parse::<OwnerId>().ok())
        .map(|user_id| Requester::user(user_id, "disabled"))
        .ok_or_else(|| ApiError::unauthorized(format!("{USER_ID_HEADER} must be a user id")))
}

/// Identity attached to each request by [`auth_audit`].
#[derive(Debug, Clone)]
pub(crate) struct Requester {
    user_id: Option<OwnerId>,
    auth_scheme: &'static str,
}

impl Requester {
    pub(crate) fn anonymous(auth_scheme: &'static str) -> Self {
        Self {
            user_id: None,
            auth_scheme,
        }
    }

    pub(crate) fn user(user_id: OwnerId, auth_scheme: &'static str) -> Self {
        Self {
            user_id: Some(user_id),
            auth_scheme,
        }
    }

    pub(crate) fn require_user(&self) -> Result<OwnerId, ApiError> {
        self.user_id
            .ok_or_else(|| ApiError::unauthorized("authentication required"))
    }

    fn principal(&self) -> String {
        self.user_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "anonymous".to_string())
    }
}

pub(crate) async fn auth_audit(
    State(state): State<AppState>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let requester = match state.auth_config.authenticate(request.headers()) {
        Ok(requester) => requester,
        Err(error) => {
            tracing::warn!(method = %method, path = %path, "authentication failed");
            return error.into_response();
        }
    };

    request.extensions_mut().insert(requester.clone());
    let response = next.run(request).await;

    tracing::info!(
        target: "audit",
        principal = %requester.principal(),
        auth_scheme = %requester.auth_scheme,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        "audit_log"
    );

    response
}
