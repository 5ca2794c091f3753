use std::io;
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::Config;
use crate::server::connection::Connection;
use crate::server::pool::ProcessorPool;

pub async fn run(cfg: &Config, pool: Arc<ProcessorPool<TcpStream>>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.server.listen_addr).await?;
    info!("Listening on {}", cfg.server.listen_addr);

    serve(listener, pool, cfg.server.read_timeout()).await
}

/// Accept loop: every socket goes to an idle processor, or is closed when
/// the pool is exhausted.
pub async fn serve(
    listener: TcpListener,
    pool: Arc<ProcessorPool<TcpStream>>,
    read_timeout: Option<Duration>,
) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = listener.accept().await?;
        info!("Accepted connection from {}", peer);

        let mut stream = match into_blocking(socket, read_timeout) {
            Ok(stream) => stream,
            Err(e) => {
                warn!(%peer, error = %e, "Failed to prepare socket");
                continue;
            }
        };

        match pool.create_processor() {
            // a processor from the idle stack has an empty slot, so this
            // does not block the runtime
            Some(processor) => processor.assign(Some(stream)),
            None => {
                warn!(%peer, "No processor available, closing connection");
                let _ = stream.close();
            }
        }
    }
}

/// Processors do blocking reads, so the socket leaves the runtime here.
fn into_blocking(
    socket: tokio::net::TcpStream,
    read_timeout: Option<Duration>,
) -> io::Result<TcpStream> {
    let stream = socket.into_std()?;
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(read_timeout)?;
    Ok(stream)
}
