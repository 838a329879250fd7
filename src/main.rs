// delay-risk-server main.rs
// HTTP API serving live delay risk scores to the driver dashboard

use delay_risk_server::{
    build_router, AppState, DelegateModel, ModelSource, RiskScorer, ServerConfig,
};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "delay_risk_server=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = ServerConfig::from_args(&args);

    let delegate = match &config.model {
        ModelSource::Builtin => {
            tracing::info!("Training builtin five-row logistic model");
            Some(DelegateModel::train_builtin())
        }
        ModelSource::File(path) => match DelegateModel::load(path) {
            Ok(Some(model)) => {
                tracing::info!("Delegate model loaded from {}", path.display());
                Some(model)
            }
            Ok(None) => {
                tracing::warn!(
                    "Model file {} not found. Using heuristic fallback.",
                    path.display()
                );
                None
            }
            Err(err) => {
                tracing::error!("Failed to load model: {err}");
                std::process::exit(1);
            }
        },
    };

    tracing::info!("Variant: {}", config.variant.as_str());
    tracing::info!("Port: {}", config.port);

    let scorer = RiskScorer::new(delegate, config.variant);
    let state = Arc::new(AppState::new(scorer));
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Delay risk service running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for ctrl+c");
    tracing::info!("Shutting down...");
}
