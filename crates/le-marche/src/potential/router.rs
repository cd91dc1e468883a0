use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;

use super::domain::PotentialQuery;
use super::service::InclusivePotential;
use crate::search::SearchError;
use crate::suppliers::SupplierRepository;

/// Router builder exposing the inclusive-potential analysis.
pub fn potential_router<R>(service: Arc<InclusivePotential<R>>) -> Router
where
    R: SupplierRepository + 'static,
{
    Router::new()
        .route("/api/v1/inclusive-potential", get(potential_handler::<R>))
        .with_state(service)
}

pub(crate) async fn potential_handler<R>(
    State(service): State<Arc<InclusivePotential<R>>>,
    Query(query): Query<PotentialQuery>,
) -> Response
where
    R: SupplierRepository + 'static,
{
    match service.analyse(&query) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
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
