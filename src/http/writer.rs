use anyhow::Context;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::http::response::{Body, Response};

/// Size of each file read/write step.
const BUFFER_SIZE: usize = 8192;

/// Serializes the status line and headers, blank line included.
pub fn serialize_head(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);

    buf.extend_from_slice(resp.status_line().as_bytes());
    buf.extend_from_slice(b"\r\n");

    for (k, v) in &resp.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    buf.extend_from_slice(b"\r\n");

    buf
}

/// Writes a response head followed by its body, if any.
pub struct ResponseWriter {
    head: Vec<u8>,
    written: usize,
    write_timeout: Duration,
}

impl ResponseWriter {
    pub fn new(response: &Response, write_timeout: Duration) -> Self {
        Self {
            head: serialize_head(response),
            written: 0,
            write_timeout,
        }
    }

    /// Sends the whole response and returns the number of body bytes sent.
    ///
    /// Any error leaves the connection in an unknown state and must close it.
    pub async fn send<S>(&mut self, stream: &mut S, body: Body) -> anyhow::Result<u64>
    where
        S: AsyncWrite + Unpin,
    {
        self.write_head(stream).await?;

        let sent = match body {
            Body::Empty => 0,
            Body::File { mut file, len } => self.write_body(stream, &mut file, len).await?,
        };

        timeout(self.write_timeout, stream.flush())
            .await
            .context("write timeout")?
            .context("flush failed")?;

        Ok(sent)
    }

    async fn write_head<S>(&mut self, stream: &mut S) -> anyhow::Result<()>
    where
        S: AsyncWrite + Unpin,
    {
        while self.written < self.head.len() {
            let n = timeout(self.write_timeout, stream.write(&self.head[self.written..]))
                .await
                .context("write timeout")??;

            if n == 0 {
                anyhow::bail!("connection closed while writing");
            }

            self.written += n;
        }

        Ok(())
    }

    async fn write_body<S, R>(&self, stream: &mut S, source: &mut R, len: u64) -> anyhow::Result<u64>
    where
        S: AsyncWrite + Unpin,
        R: AsyncRead + Unpin,
    {
        let mut buf = vec![0u8; BUFFER_SIZE];
        let mut sent = 0u64;

        while sent < len {
            let want = (len - sent).min(BUFFER_SIZE as u64) as usize;
            let n = source
                .read(&mut buf[..want])
                .await
                .context("file read failed")?;

            if n == 0 {
                anyhow::bail!("file ended after {} of {} bytes", sent, len);
            }

            timeout(self.write_timeout, stream.write_all(&buf[..n]))
                .await
                .context("write timeout")??;

            sent += n as u64;
        }

        Ok(sent)
    }
}
