use std::sync::Arc;

use anyhow::Context;
use docserve::config::Config;
use docserve::server::{self, ServeContext};

const DEFAULT_CONFIG: &str = "docserve.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("DOCSERVE_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());

    let cfg = Config::load(&path).with_context(|| format!("loading {}", path))?;
    let ctx = Arc::new(ServeContext::new(&cfg)?);
    let addr = cfg.listen_addr();

    tracing::info!("Launching web server");
    tracing::info!("Port: {}", cfg.server.port);
    tracing::info!("doc_root: {}", cfg.doc_root().display());

    tokio::select! {
        res = server::listener::run(ctx, &addr, cfg.server.max_connections) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
