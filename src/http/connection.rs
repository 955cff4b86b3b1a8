use std::collections::VecDeque;
use std::sync::Arc;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::http::parser::parse_request;
use crate::http::reassembler::{FrameError, StreamReassembler};
use crate::http::response::{Response, build_response};
use crate::http::writer::ResponseWriter;
use crate::server::context::ServeContext;

const READ_SIZE: usize = 4096;

pub struct Connection<S> {
    stream: S,
    reassembler: StreamReassembler,
    ctx: Arc<ServeContext>,
    peer: String,
    state: ConnectionState,
}

pub enum ConnectionState {
    AwaitingData,
    Framing(Vec<u8>),
    Dispatching(VecDeque<Result<Bytes, FrameError>>),
    Closing,
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, ctx: Arc<ServeContext>, peer: impl Into<String>) -> Self {
        Self {
            stream,
            reassembler: StreamReassembler::new(ctx.max_request_bytes),
            ctx,
            peer: peer.into(),
            state: ConnectionState::AwaitingData,
        }
    }

    /// Drives the connection until it is closed.
    ///
    /// Transport failures end this connection only and are logged here.
    /// The returned error reports a failed close, or a second call after
    /// the connection was already closed.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);
            self.state = match state {
                ConnectionState::AwaitingData => self.await_data().await,

                ConnectionState::Framing(bytes) => {
                    let frames: VecDeque<_> = self.reassembler.feed(&bytes).into();
                    if frames.is_empty() {
                        ConnectionState::AwaitingData
                    } else {
                        ConnectionState::Dispatching(frames)
                    }
                }

                ConnectionState::Dispatching(mut frames) => match frames.pop_front() {
                    None => ConnectionState::AwaitingData,
                    Some(frame) => {
                        if self.dispatch(frame).await {
                            ConnectionState::Dispatching(frames)
                        } else {
                            // Remaining pipelined frames are dropped unanswered.
                            ConnectionState::Closing
                        }
                    }
                },

                ConnectionState::Closing => return self.close().await,

                // Only reachable when `run` is called again after closing.
                ConnectionState::Closed => anyhow::bail!("connection already closed"),
            };
        }
    }

    async fn await_data(&mut self) -> ConnectionState {
        let mut temp = vec![0u8; READ_SIZE];
        match timeout(self.ctx.idle_timeout, self.stream.read(&mut temp)).await {
            Ok(Ok(0)) => {
                tracing::debug!(peer = %self.peer, "Client closed connection");
                ConnectionState::Closing
            }
            Ok(Ok(n)) => {
                temp.truncate(n);
                ConnectionState::Framing(temp)
            }
            Ok(Err(e)) => {
                tracing::warn!(peer = %self.peer, error = %e, "Read failed");
                ConnectionState::Closing
            }
            Err(_) => {
                if self.reassembler.has_pending() {
                    tracing::info!(
                        peer = %self.peer,
                        pending = self.reassembler.pending_len(),
                        "Idle timeout with partial request"
                    );
                    // Best effort; the connection closes either way.
                    if let Err(e) = self.send(Response::timeout()).await {
                        tracing::debug!(peer = %self.peer, error = %e, "Timeout notice failed");
                    }
                } else {
                    tracing::debug!(peer = %self.peer, "Idle timeout");
                }
                ConnectionState::Closing
            }
        }
    }

    /// Answers one frame. Returns whether the connection stays open.
    async fn dispatch(&mut self, frame: Result<Bytes, FrameError>) -> bool {
        let response = match frame {
            Err(e) => {
                tracing::debug!(peer = %self.peer, error = %e, "Framing failed");
                Response::malformed()
            }
            Ok(frame) => match parse_request(&frame) {
                Err(e) => {
                    tracing::debug!(peer = %self.peer, error = %e, "Malformed request");
                    Response::malformed()
                }
                Ok(request) => {
                    let resolved = self.ctx.doc_root.resolve(&request.target).await;
                    if let Err(e) = &resolved {
                        tracing::debug!(
                            peer = %self.peer,
                            target = %request.target,
                            reason = %e,
                            "Not served"
                        );
                    }
                    let response = build_response(&request, resolved, &self.ctx.mime);
                    tracing::info!(
                        peer = %self.peer,
                        method = ?request.method,
                        target = %request.target,
                        status = response.status.as_u16(),
                        "Request"
                    );
                    response
                }
            },
        };

        let keep_alive = response.keep_alive;
        match self.send(response).await {
            Ok(()) => keep_alive,
            Err(e) => {
                tracing::warn!(peer = %self.peer, error = %e, "Send failed");
                false
            }
        }
    }

    async fn send(&mut self, response: Response) -> anyhow::Result<()> {
        let mut writer = ResponseWriter::new(&response, self.ctx.write_timeout);
        let sent = writer.send(&mut self.stream, response.body).await?;
        tracing::trace!(peer = %self.peer, bytes = sent, "Response sent");
        Ok(())
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        tracing::debug!(peer = %self.peer, "Closing connection");
        match timeout(self.ctx.write_timeout, self.stream.shutdown()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(anyhow::anyhow!("close failed: {}", e)),
            Err(_) => Err(anyhow::anyhow!("close timed out")),
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }
}
