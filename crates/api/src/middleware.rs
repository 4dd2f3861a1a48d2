use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use artisan_auth::{AuthError, TokenVerifier, bearer_token};

use crate::app::errors::ApiError;
use crate::context::AccountContext;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn TokenVerifier>,
}

/// Reject the request with 403 unless it carries a valid, unexpired bearer
/// token. On success the caller's [`AccountContext`] is attached.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let account_id = match authenticate(&state, req.headers()) {
        Ok(id) => id,
        Err(e) => {
            tracing::debug!(reason = %e, path = %req.uri().path(), "request not authenticated");
            return ApiError::from(e).into_response();
        }
    };

    req.extensions_mut().insert(AccountContext::new(account_id));
    next.run(req).await
}

fn authenticate(state: &AuthState, headers: &HeaderMap) -> Result<artisan_core::AccountId, AuthError> {
    // A header that is not valid visible ASCII is treated as absent.
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let token = bearer_token(header)?;
    state.tokens.verify(token, Utc::now())
}
