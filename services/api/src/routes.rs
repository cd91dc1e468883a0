use crate::infra::{AppState, Market};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use le_marche::potential::potential_router;
use le_marche::search::search_router;
use le_marche::tenders::tender_router;
use serde_json::json;

/// Search, tender and potential APIs plus the operational probes.
pub(crate) fn with_market_routes(market: &Market) -> Router {
    search_router(market.search.clone())
        .merge(tender_router(market.tenders.clone()))
        .merge(potential_router(market.potential.clone()))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::assemble;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use le_marche::config::MarketConfig;
    use le_marche::perimeters::PerimeterRegistry;
    use le_marche::suppliers::{GeoRange, Supplier, SupplierActivity};
    use le_marche::taxonomy::{ServiceType, SupplierKind, Taxonomy};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::collections::BTreeSet;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(ready: bool) -> (Router, Market) {
        let mut taxonomy = Taxonomy::new();
        taxonomy.add_sector(None, "Nettoyage").expect("sector");
        let market = assemble(
            &MarketConfig::default(),
            PerimeterRegistry::with_reference_tables(),
            taxonomy,
            Vec::new(),
        );
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        let router = with_market_routes(&market).layer(Extension(state));
        (router, market)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn probes_report_liveness_and_readiness() {
        let (router, _) = app(false);
        let response = router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .clone()
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["status"], "initializing");

        let response = router
            .oneshot(Request::get("/metrics").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn merged_routers_serve_the_market_apis() {
        let (router, market) = app(true);
        let mut supplier = Supplier::new("12345678900011", "Atelier Isérois", SupplierKind::Ei);
        supplier.post_code = Some("38000".to_string());
        supplier.activities = vec![SupplierActivity {
            sector: "nettoyage".to_string(),
            service_types: BTreeSet::from([ServiceType::Prest]),
            geo_range: GeoRange::Zones {
                locations: vec!["isere".to_string()],
            },
        }];
        market.catalog.create(supplier).expect("supplier created");

        let search = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/siaes/search")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"sectors":["nettoyage"],"perimeters":["isere"]}"#))
            .expect("request");
        let response = router.clone().oneshot(search).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["total"], 1);

        let potential = Request::get("/api/v1/inclusive-potential?sector=nettoyage&perimeter=isere")
            .body(Body::empty())
            .expect("request");
        let response = router.clone().oneshot(potential).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["potential_siaes"], 1);

        let missing = Request::get("/api/v1/tenders/42")
            .body(Body::empty())
            .expect("request");
        let response = router.oneshot(missing).await.expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
