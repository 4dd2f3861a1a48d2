use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use artisan_auth::Credentials;

use crate::app::dto::{self, AccountView, MessageResponse, SessionResponse};
use crate::app::errors::ApiError;
use crate::app::services::{AppServices, Session};
use crate::context::AccountContext;

pub fn public_router() -> Router {
    Router::new()
        .route("/api/users/register", post(register))
        .route("/api/users/login", post(login))
}

pub fn protected_router() -> Router {
    Router::new().route(
        "/api/users/profile",
        get(get_profile).put(update_profile).delete(delete_profile),
    )
}

fn credentials(body: Result<Json<dto::CredentialsRequest>, JsonRejection>) -> Result<Credentials, ApiError> {
    let Json(body) = body?;
    Ok(Credentials::new(body.name, body.phone, body.password)?)
}

fn session_response(session: Session) -> SessionResponse {
    SessionResponse {
        account: AccountView::from(&session.account),
        expires_at: session.token.claims.expires_at(),
        token: session.token.token,
    }
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CredentialsRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let session = services.register(credentials(body)?).await?;
    Ok((StatusCode::CREATED, Json(session_response(session))).into_response())
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CredentialsRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let session = services.login(credentials(body)?).await?;
    Ok(Json(session_response(session)).into_response())
}

pub async fn get_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AccountContext>,
) -> Result<Response, ApiError> {
    let account = services.profile(caller.account_id()).await?;
    Ok(Json(AccountView::from(&account)).into_response())
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AccountContext>,
    body: Result<Json<dto::UpdateProfileRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let account = services
        .update_profile(caller.account_id(), body.name, body.phone, body.password)
        .await?;
    Ok(Json(AccountView::from(&account)).into_response())
}

pub async fn delete_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AccountContext>,
) -> Result<Response, ApiError> {
    services.delete_profile(caller.account_id()).await?;
    Ok(Json(MessageResponse::new("account deleted")).into_response())
}
