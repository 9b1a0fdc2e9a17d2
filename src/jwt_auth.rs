use axum::extract::State;
use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::error::ServiceError;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
    /// Employee linked to the user, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: String,
    pub employee: Option<String>,
}

impl CurrentUser {
    pub fn employee(&self) -> Result<&str, ServiceError> {
        self.employee
            .as_deref()
            .ok_or_else(|| ServiceError::NotFound("Employee not found for current user".to_string()))
    }
}

pub async fn auth<B>(
    State(state): State<AppState>,
    mut req: Request<B>,
    next: Next<B>,
) -> Result<Response, ServiceError> {
    let header_token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_header| auth_header.to_str().ok())
        .and_then(|auth_value| auth_value.strip_prefix("Bearer "))
        .map(str::to_owned);

    // browsers cannot set headers on a websocket upgrade
    let token = header_token.or_else(|| {
        req.uri().query().and_then(|query| {
            query
                .split('&')
                .find_map(|pair| pair.strip_prefix("access_token="))
                .map(str::to_owned)
        })
    });

    let token = token.ok_or_else(|| {
        ServiceError::Unauthorized("You are not logged in, please provide token".to_string())
    })?;

    let claims = decode::<TokenClaims>(
        &token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|e| {
        debug!("Rejected token: {}", e);
        ServiceError::Unauthorized("Invalid token".to_string())
    })?
    .claims;

    req.extensions_mut().insert(CurrentUser {
        user_id: claims.sub,
        employee: claims.employee,
    });
    Ok(next.run(req).await)
}
