use crate::cli::ServeArgs;
use crate::infra::{build_market, AppState};
use crate::routes::with_market_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use le_marche::config::AppConfig;
use le_marche::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut config: AppConfig, mut args: ServeArgs) -> Result<(), AppError> {
    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let market = build_market(&config.market, &args.reference.into())?;
    let app = with_market_routes(&market)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "matching engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
