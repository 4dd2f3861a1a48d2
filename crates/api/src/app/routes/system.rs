use axum::{Json, http::StatusCode, response::IntoResponse};

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn banner() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
    }))
}
