use anyhow::{Context, Result};
use axum::http::HeaderMap;
use geonear_core::OwnerId;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::Value;

use crate::env_utils::{csv_env, optional_env};
use crate::errors::ApiError;

use super::Requester;

#[derive(Clone)]
pub(crate) struct JwtConfig {
    decoding_key: DecodingKey,
    issuer: Option<String>,
    audience: Vec<String>,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl JwtConfig {
    pub(crate) fn from_env() -> Result<Self> {
        let secret = std::env::var("GEONEAR_AUTH_JWT_HS256_SECRET")
            .with_context(|| "GEONEAR_AUTH_MODE jwt requires GEONEAR_AUTH_JWT_HS256_SECRET")?;
        let issuer = optional_env("GEONEAR_AUTH_JWT_ISSUER");
        let audience = csv_env("GEONEAR_AUTH_JWT_AUDIENCE");

        Self::from_parts(secret, issuer, audience)
    }

    #[cfg(test)]
    pub(crate) fn for_tests(secret: impl AsRef<str>) -> Self {
        Self::from_parts(secret.as_ref().to_string(), None, Vec::new())
            .expect("test jwt config should be valid")
    }

    /// Validates the bearer token and resolves the `sub` claim to a user id.
    pub(crate) fn authenticate(&self, headers: &HeaderMap) -> Result<Requester, ApiError> {
        let token = bearer_token(headers)?;
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.insert("exp".to_string());
        if let Some(issuer) = self.issuer.as_deref() {
            validation.set_issuer(&[issuer]);
        }
        if !self.audience.is_empty() {
            validation.set_audience(&self.audience);
        }

        let token_data =
            decode::<Value>(token, &self.decoding_key, &validation).map_err(map_jwt_error)?;
        let user_id = subject_claim(&token_data.claims)
            .ok_or_else(|| ApiError::unauthorized("jwt sub claim must be a user id"))?;

        Ok(Requester::user(user_id, "jwt"))
    }

    fn from_parts(secret: String, issuer: Option<String>, audience: Vec<String>) -> Result<Self> {
        if secret.trim().is_empty() {
            anyhow::bail!("GEONEAR_AUTH_JWT_HS256_SECRET must not be empty");
        }

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("missing Authorization header"))?;

    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .ok_or_else(|| ApiError::unauthorized("invalid Authorization format"))
}

fn subject_claim(claims: &Value) -> Option<OwnerId> {
    match claims.get("sub")? {
        Value::String(raw) => raw.trim().parse().ok(),
        Value::Number(number) => number.as_u64(),
        _ => None,
    }
}

fn map_jwt_error(error: jsonwebtoken::errors::Error) -> ApiError {
    match error.kind() {
        ErrorKind::ExpiredSignature => ApiError::unauthorized("expired jwt token"),
        _ => ApiError::unauthorized("invalid jwt token"),
    }
}
