use crate::config::ConfigError;
use crate::reference::ReferenceError;
use crate::repository::RepositoryError;
use crate::search::SearchError;
use crate::suppliers::CatalogError;
use crate::telemetry::TelemetryError;
use crate::tenders::TenderServiceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Reference(ReferenceError),
    Search(SearchError),
    Catalog(CatalogError),
    Tender(TenderServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Reference(err) => write!(f, "reference data error: {}", err),
            AppError::Search(err) => write!(f, "search error: {}", err),
            AppError::Catalog(err) => write!(f, "catalog error: {}", err),
            AppError::Tender(err) => write!(f, "tender error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Reference(err) => Some(err),
            AppError::Search(err) => Some(err),
            AppError::Catalog(err) => Some(err),
            AppError::Tender(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Search(SearchError::UnknownReferent { .. })
            | AppError::Tender(TenderServiceError::Search(SearchError::UnknownReferent { .. })) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Catalog(CatalogError::Uniqueness(_))
            | AppError::Catalog(CatalogError::Invalid(_))
            | AppError::Catalog(CatalogError::Activity(_))
            | AppError::Tender(TenderServiceError::Invalid(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Tender(TenderServiceError::Transition(_)) => StatusCode::CONFLICT,
            AppError::Catalog(CatalogError::Repository(RepositoryError::NotFound))
            | AppError::Tender(TenderServiceError::Repository(RepositoryError::NotFound)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Reference(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Search(_)
            | AppError::Catalog(_)
            | AppError::Tender(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ReferenceError> for AppError {
    fn from(value: ReferenceError) -> Self {
        Self::Reference(value)
    }
}

impl From<SearchError> for AppError {
    fn from(value: SearchError) -> Self {
        Self::Search(value)
    }
}

impl From<CatalogError> for AppError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<TenderServiceError> for AppError {
    fn from(value: TenderServiceError) -> Self {
        Self::Tender(value)
    }
}
