use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::query::SupplierQuery;
use super::resolve::SearchError;
use super::service::SupplierSearch;
use crate::suppliers::SupplierRepository;

/// Router builder exposing the public supplier search.
pub fn search_router<R>(service: Arc<SupplierSearch<R>>) -> Router
where
    R: SupplierRepository + 'static,
{
    Router::new()
        .route("/api/v1/siaes/search", post(search_handler::<R>))
        .with_state(service)
}

pub(crate) async fn search_handler<R>(
    State(service): State<Arc<SupplierSearch<R>>>,
    axum::Json(query): axum::Json<SupplierQuery>,
) -> Response
where
    R: SupplierRepository + 'static,
{
    match service.search(&query) {
        Ok(page) => (StatusCode::OK, axum::Json(page)).into_response(),
        Err(error @ SearchError::UnknownReferent { .. }) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
