//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the operations handlers call
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Extension, Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use artisan_auth::{Hs256SessionTokens, PasswordHasher};
use artisan_infra::{Stores, db};

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let stores = build_stores(config).await?;
    let tokens = Arc::new(Hs256SessionTokens::new(&config.jwt_secret, config.token_ttl_secs));
    let hasher = Arc::new(PasswordHasher::new(config.password_cost).context("invalid password cost")?);

    let services = Arc::new(AppServices::new(stores, tokens, hasher));
    let cors = cors_layer(config.cors_allowed_origins.as_deref())?;
    Ok(router(services, cors))
}

/// Assemble routes and layers around already-built services.
pub fn router(services: Arc<AppServices>, cors: CorsLayer) -> Router {
    let auth_state = middleware::AuthState {
        tokens: services.tokens(),
    };

    // Protected routes: require a valid session token.
    let protected = routes::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/", get(routes::system::banner))
        .route("/health", get(routes::system::health))
        .merge(routes::public_router())
        .merge(protected)
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

async fn build_stores(config: &AppConfig) -> anyhow::Result<Stores> {
    match &config.database_url {
        Some(url) => {
            let pool = db::connect(url, db::DEFAULT_MAX_CONNECTIONS).await?;
            db::ensure_schema(&pool).await?;
            tracing::info!("using postgres stores");
            Ok(Stores::postgres(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory stores (data is lost on restart)");
            Ok(Stores::in_memory())
        }
    }
}

/// CORS for browser clients. `None` allows any origin.
pub fn cors_layer(origins: Option<&[String]>) -> anyhow::Result<CorsLayer> {
    let allow_origin = match origins {
        None => AllowOrigin::from(Any),
        Some(list) => {
            let values = list
                .iter()
                .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin '{o}'")))
                .collect::<anyhow::Result<Vec<_>>>()?;
            AllowOrigin::list(values)
        }
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600)))
}
