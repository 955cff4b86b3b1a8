use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tracing::info;

use crate::http::connection::Connection;
use crate::server::context::ServeContext;

/// Binds `addr` and serves connections on it forever.
pub async fn run(ctx: Arc<ServeContext>, addr: &str, max_connections: usize) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);
    info!("Serving {}", ctx.doc_root.path().display());

    serve(listener, ctx, max_connections).await
}

/// A source of incoming connections.
pub trait Accept {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    fn accept(&mut self) -> impl Future<Output = io::Result<(Self::Stream, SocketAddr)>> + Send;
}

impl Accept for TcpListener {
    type Stream = TcpStream;

    async fn accept(&mut self) -> io::Result<(TcpStream, SocketAddr)> {
        TcpListener::accept(self).await
    }
}

/// Pause after a failed `accept`, so persistent errors such as running out
/// of file descriptors do not spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Accepts connections and serves each on its own task.
///
/// At most `max_connections` connections are served at once; further
/// clients wait in the listen backlog until a slot frees up.
pub async fn serve<L: Accept>(
    mut listener: L,
    ctx: Arc<ServeContext>,
    max_connections: usize,
) -> anyhow::Result<()> {
    let slots = Arc::new(Semaphore::new(max_connections));

    loop {
        let permit = slots.clone().acquire_owned().await?;

        let (socket, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!("accept() failed: {}", e);
                drop(permit);
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let ctx = ctx.clone();
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, ctx, peer.to_string());
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
            drop(permit);
        });
    }
}
