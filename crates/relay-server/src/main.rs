use std::net::SocketAddr;
use std::sync::Arc;

use relay_server::http::{AppState, CorsPolicy, build_router};
use shared::config::{RelayConfig, load_dotenv};
use shared::llm::{AnthropicGateway, AnthropicGatewayConfig, CompletionGateway};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(err) = load_dotenv() {
        eprintln!("{err}");
        std::process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "relay_server=info,shared=info".to_string()),
        )
        .json()
        .flatten_event(true)
        .with_current_span(true)
        .init();

    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "failed to load relay config");
            std::process::exit(1);
        }
    };

    let gateway: Option<Arc<dyn CompletionGateway>> =
        match AnthropicGatewayConfig::from_upstream(&config.upstream) {
            Some(gateway_config) => match AnthropicGateway::new(gateway_config) {
                Ok(gateway) => {
                    info!(model = gateway.model(), "completion gateway configured");
                    Some(Arc::new(gateway))
                }
                Err(err) => {
                    error!(error = %err, "failed to build completion gateway");
                    std::process::exit(1);
                }
            },
            None => {
                warn!("ANTHROPIC_API_KEY is not set; /chat will answer with a configuration error");
                None
            }
        };

    let app = build_router(AppState {
        environment: config.environment.clone(),
        cors: CorsPolicy::new(config.allowed_origins()),
        gateway,
    });

    let addr: SocketAddr = match config.bind_addr.parse() {
        Ok(addr) => addr,
        Err(err) => {
            error!(bind_addr = %config.bind_addr, error = %err, "invalid RELAY_BIND_ADDR");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%addr, error = %err, "failed to bind relay listener");
            std::process::exit(1);
        }
    };

    info!(
        environment = %config.environment,
        "relay server listening on {}",
        listener.local_addr().unwrap_or(addr)
    );

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %err, "relay server stopped unexpectedly");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
