//! HTTP gateway entrypoint: accepts `POST /ingest` and feeds the task queue.
use anyhow::{Context, Result};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::net::TcpListener;
use wisdom_ingest::{api, config, logging, queue::RedisQueue};

#[tokio::main]
async fn main() -> Result<()> {
    let gateway = config::load_gateway_config().context("failed to load configuration")?;
    logging::init_tracing("ingest-gateway");

    let queue = RedisQueue::connect(&gateway.redis_url, gateway.queue_name.clone())
        .await
        .context("failed to connect to the task queue")?;
    let app = api::create_router(Arc::new(queue));

    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, gateway.port))
        .await
        .with_context(|| format!("failed to bind port {}", gateway.port))?;
    tracing::info!(queue = %gateway.queue_name, "Gateway listening on http://0.0.0.0:{}", gateway.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Shutdown requested"),
                Err(err) => {
                    tracing::warn!(error = %err, "Unable to listen for Ctrl-C");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await
        .context("gateway server failed")?;
    Ok(())
}
