use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use artisan_catalog::{CategoryChanges, NewCategory};
use artisan_core::CategoryId;

use crate::app::dto::{self, MessageResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::AccountContext;

pub fn public_router() -> Router {
    Router::new()
        .route("/api/categories", get(list_categories))
        .route("/api/categories/:id", get(get_category))
}

pub fn protected_router() -> Router {
    Router::new()
        .route("/api/categories", post(create_category))
        .route("/api/categories/:id", axum::routing::put(update_category).delete(delete_category))
}

pub async fn list_categories(Extension(services): Extension<Arc<AppServices>>) -> Result<Response, ApiError> {
    Ok(Json(services.list_categories().await?).into_response())
}

pub async fn get_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: CategoryId = id.parse()?;
    Ok(Json(services.get_category(id).await?).into_response())
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AccountContext>,
    body: Result<Json<dto::CreateCategoryRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let new = NewCategory::new(body.name, body.description)?;
    let category = services.create_category(new, caller.account_id()).await?;
    Ok((StatusCode::CREATED, Json(category)).into_response())
}

pub async fn update_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AccountContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateCategoryRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id: CategoryId = id.parse()?;
    let Json(body) = body?;
    let changes = CategoryChanges::new(body.name, body.description)?;
    let category = services.update_category(id, changes, caller.account_id()).await?;
    Ok(Json(category).into_response())
}

pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AccountContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: CategoryId = id.parse()?;
    services.delete_category(id, caller.account_id()).await?;
    Ok(Json(MessageResponse::new("category deleted")).into_response())
}
