use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use artisan_catalog::{CraftChanges, NewCraft};
use artisan_core::CraftId;

use crate::app::dto::{self, MessageResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::AccountContext;

pub fn public_router() -> Router {
    Router::new()
        .route("/api/crafts", get(list_crafts))
        .route("/api/crafts/:id", get(get_craft))
}

pub fn protected_router() -> Router {
    Router::new()
        .route("/api/crafts", post(create_craft))
        .route("/api/crafts/:id", axum::routing::put(update_craft).delete(delete_craft))
}

pub async fn list_crafts(Extension(services): Extension<Arc<AppServices>>) -> Result<Response, ApiError> {
    Ok(Json(services.list_crafts().await?).into_response())
}

pub async fn get_craft(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: CraftId = id.parse()?;
    Ok(Json(services.get_craft(id).await?).into_response())
}

pub async fn create_craft(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AccountContext>,
    body: Result<Json<dto::CreateCraftRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let new = NewCraft::new(body.title, body.description, body.price)?;
    let craft = services.create_craft(new, caller.account_id()).await?;
    Ok((StatusCode::CREATED, Json(craft)).into_response())
}

pub async fn update_craft(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AccountContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateCraftRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id: CraftId = id.parse()?;
    let Json(body) = body?;
    let changes = CraftChanges::new(body.title, body.description, body.price)?;
    let craft = services.update_craft(id, changes, caller.account_id()).await?;
    Ok(Json(craft).into_response())
}

pub async fn delete_craft(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AccountContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: CraftId = id.parse()?;
    services.delete_craft(id, caller.account_id()).await?;
    Ok(Json(MessageResponse::new("craft deleted")).into_response())
}
