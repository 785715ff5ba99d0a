use axum::Router;

pub mod producers;
pub mod system;

/// Router for all domain endpoints.
pub fn router() -> Router {
    Router::new().nest("/producers", producers::router())
}
