use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use agrobase_core::ProducerId;
use agrobase_producers::ProducerFilter;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 1000;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_producers).post(create_producer))
        .route("/dashboard", get(dashboard))
        .route(
            "/:id",
            get(get_producer)
                .patch(update_producer)
                .delete(remove_producer),
        )
}

/// GET /producers?state_code=SC&city=Ibirama&limit=50&skip=0
///
/// `limit` defaults to 50 and is capped at 1000. An explicit `limit=0` is
/// honored and yields zero rows; `total` still counts every match.
#[derive(Debug, Deserialize)]
pub struct ListProducersQuery {
    pub state_code: Option<String>,
    pub city: Option<String>,
    pub limit: Option<u32>,
    pub skip: Option<u32>,
}

pub async fn create_producer(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateProducerRequest>,
) -> axum::response::Response {
    let input = match body.validate() {
        Ok(input) => input,
        Err(field_errors) => return errors::validation_error_to_response(&field_errors),
    };

    match services.producers.create(input).await {
        Ok(p) => (StatusCode::CREATED, Json(dto::producer_to_json(&p))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_producers(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ListProducersQuery>,
) -> axum::response::Response {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let skip = query.skip.unwrap_or(0);
    let filter = ProducerFilter {
        state_code: query.state_code,
        city: query.city,
    };

    match services.producers.find_all(&filter, limit, skip).await {
        Ok(page) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "items": page.results.iter().map(dto::producer_to_json).collect::<Vec<_>>(),
                "total": page.total,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_producer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProducerId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid producer id")
        }
    };

    match services.producers.find_one(id).await {
        Ok(p) => (StatusCode::OK, Json(dto::producer_to_json(&p))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_producer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateProducerRequest>,
) -> axum::response::Response {
    let id: ProducerId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid producer id")
        }
    };

    let patch = match body.validate() {
        Ok(patch) => patch,
        Err(field_errors) => return errors::validation_error_to_response(&field_errors),
    };

    match services.producers.update(id, patch).await {
        Ok(p) => (StatusCode::OK, Json(dto::producer_to_json(&p))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn remove_producer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProducerId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid producer id")
        }
    };

    match services.producers.remove(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn dashboard(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.producers.dashboard().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
