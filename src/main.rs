use std::net::TcpStream;
use std::sync::Arc;

use pyrmont::config::Config;
use pyrmont::server::dispatch::Dispatcher;
use pyrmont::server::handlers::{ServletRegistry, StaticResourceHandler};
use pyrmont::server::listener;
use pyrmont::server::pool::ProcessorPool;
use pyrmont::server::processor::ProcessorSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let dispatcher = Arc::new(Dispatcher::new(
        cfg.server.servlet_prefix.clone(),
        Arc::new(ServletRegistry::with_defaults(cfg.server.servlet_prefix.clone())),
        Arc::new(StaticResourceHandler::new(cfg.static_files.root.clone())),
    ));
    let pool = ProcessorPool::<TcpStream>::start(
        dispatcher,
        ProcessorSettings::from(&cfg.server),
        cfg.server.min_processors,
        cfg.server.max_processors,
    )?;

    tokio::select! {
        res = listener::run(&cfg, Arc::clone(&pool)) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    pool.shutdown();
    // in-flight connections finish before the process exits
    tokio::task::spawn_blocking(move || pool.join()).await?;
    Ok(())
}
