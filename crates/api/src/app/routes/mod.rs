use axum::Router;

pub mod accounts;
pub mod categories;
pub mod crafts;
pub mod system;

/// Endpoints anyone may call.
pub fn public_router() -> Router {
    Router::new()
        .merge(accounts::public_router())
        .merge(crafts::public_router())
        .merge(categories::public_router())
}

/// Endpoints that require a valid session token.
pub fn protected_router() -> Router {
    Router::new()
        .merge(accounts::protected_router())
        .merge(crafts::protected_router())
        .merge(categories::protected_router())
}
