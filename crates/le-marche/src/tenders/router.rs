use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{InteractionKind, Tender, TenderDraft, TenderId};
use super::repository::{DispatchPublisher, TenderRepository};
use super::service::{TenderService, TenderServiceError};
use crate::repository::RepositoryError;
use crate::search::SearchError;
use crate::suppliers::{SupplierId, SupplierRepository};

/// Optional body of a transition request.
#[derive(Debug, Default, Deserialize)]
pub struct TransitionRequest {
    #[serde(default)]
    pub actor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InteractionRequest {
    pub supplier_id: SupplierId,
    pub kind: InteractionKind,
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Router builder exposing tender creation, transitions and interaction ingestion.
pub fn tender_router<R, S, A>(service: Arc<TenderService<R, S, A>>) -> Router
where
    R: TenderRepository + 'static,
    S: SupplierRepository + 'static,
    A: DispatchPublisher + 'static,
{
    Router::new()
        .route("/api/v1/tenders", post(create_handler::<R, S, A>))
        .route("/api/v1/tenders/:tender_id", get(detail_handler::<R, S, A>))
        .route(
            "/api/v1/tenders/:tender_id/submit",
            post(submit_handler::<R, S, A>),
        )
        .route(
            "/api/v1/tenders/:tender_id/approve",
            post(approve_handler::<R, S, A>),
        )
        .route(
            "/api/v1/tenders/:tender_id/reject",
            post(reject_handler::<R, S, A>),
        )
        .route(
            "/api/v1/tenders/:tender_id/request-changes",
            post(request_changes_handler::<R, S, A>),
        )
        .route(
            "/api/v1/tenders/:tender_id/dispatch",
            post(dispatch_handler::<R, S, A>),
        )
        .route(
            "/api/v1/tenders/:tender_id/interactions",
            post(interaction_handler::<R, S, A>),
        )
        .with_state(service)
}

pub(crate) async fn create_handler<R, S, A>(
    State(service): State<Arc<TenderService<R, S, A>>>,
    Json(draft): Json<TenderDraft>,
) -> Response
where
    R: TenderRepository + 'static,
    S: SupplierRepository + 'static,
    A: DispatchPublisher + 'static,
{
    match service.create(draft) {
        Ok(tender) => (StatusCode::CREATED, Json(tender)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn detail_handler<R, S, A>(
    State(service): State<Arc<TenderService<R, S, A>>>,
    Path(tender_id): Path<u64>,
) -> Response
where
    R: TenderRepository + 'static,
    S: SupplierRepository + 'static,
    A: DispatchPublisher + 'static,
{
    match service.get(TenderId(tender_id)) {
        Ok(tender) => (StatusCode::OK, Json(tender)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_handler<R, S, A>(
    State(service): State<Arc<TenderService<R, S, A>>>,
    Path(tender_id): Path<u64>,
    body: Option<Json<TransitionRequest>>,
) -> Response
where
    R: TenderRepository + 'static,
    S: SupplierRepository + 'static,
    A: DispatchPublisher + 'static,
{
    let actor = actor(body);
    transition_response(service.submit(TenderId(tender_id), actor.as_deref()))
}

pub(crate) async fn approve_handler<R, S, A>(
    State(service): State<Arc<TenderService<R, S, A>>>,
    Path(tender_id): Path<u64>,
    body: Option<Json<TransitionRequest>>,
) -> Response
where
    R: TenderRepository + 'static,
    S: SupplierRepository + 'static,
    A: DispatchPublisher + 'static,
{
    let actor = actor(body);
    transition_response(service.approve(TenderId(tender_id), actor.as_deref()))
}

pub(crate) async fn reject_handler<R, S, A>(
    State(service): State<Arc<TenderService<R, S, A>>>,
    Path(tender_id): Path<u64>,
    body: Option<Json<TransitionRequest>>,
) -> Response
where
    R: TenderRepository + 'static,
    S: SupplierRepository + 'static,
    A: DispatchPublisher + 'static,
{
    let actor = actor(body);
    transition_response(service.reject(TenderId(tender_id), actor.as_deref()))
}

pub(crate) async fn request_changes_handler<R, S, A>(
    State(service): State<Arc<TenderService<R, S, A>>>,
    Path(tender_id): Path<u64>,
    body: Option<Json<TransitionRequest>>,
) -> Response
where
    R: TenderRepository + 'static,
    S: SupplierRepository + 'static,
    A: DispatchPublisher + 'static,
{
    let actor = actor(body);
    transition_response(service.request_changes(TenderId(tender_id), actor.as_deref()))
}

pub(crate) async fn dispatch_handler<R, S, A>(
    State(service): State<Arc<TenderService<R, S, A>>>,
    Path(tender_id): Path<u64>,
    body: Option<Json<TransitionRequest>>,
) -> Response
where
    R: TenderRepository + 'static,
    S: SupplierRepository + 'static,
    A: DispatchPublisher + 'static,
{
    let actor = actor(body);
    match service.dispatch(TenderId(tender_id), actor.as_deref()) {
        Ok(event) => (StatusCode::OK, Json(event)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn interaction_handler<R, S, A>(
    State(service): State<Arc<TenderService<R, S, A>>>,
    Path(tender_id): Path<u64>,
    Json(request): Json<InteractionRequest>,
) -> Response
where
    R: TenderRepository + 'static,
    S: SupplierRepository + 'static,
    A: DispatchPublisher + 'static,
{
    let id = TenderId(tender_id);
    let at = request.at.unwrap_or_else(Utc::now);
    let recorded = service
        .record_interaction(id, request.supplier_id, request.kind, at, request.feedback)
        .and_then(|changed| Ok((changed, service.get(id)?)));
    match recorded {
        Ok((changed, tender)) => {
            let payload = json!({
                "changed": changed,
                "counters": tender.counters,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

fn actor(body: Option<Json<TransitionRequest>>) -> Option<String> {
    body.and_then(|Json(request)| request.actor)
}

fn transition_response(result: Result<Tender, TenderServiceError>) -> Response {
    match result {
        Ok(tender) => {
            let payload = json!({
                "id": tender.id,
                "status": tender.status.label(),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

fn error_response(err: TenderServiceError) -> Response {
    let status = match &err {
        TenderServiceError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        TenderServiceError::Transition(_) => StatusCode::CONFLICT,
        TenderServiceError::Search(SearchError::UnknownReferent { .. }) => StatusCode::BAD_REQUEST,
        TenderServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        TenderServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": err.to_string(),
    });
    (status, Json(payload)).into_response()
}
