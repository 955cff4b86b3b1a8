//! HTTP protocol implementation.
//!
//! This module implements the per-connection HTTP/1.1 core of the file
//! server: retrieval only, with keep-alive and pipelining on one connection.
//!
//! # Architecture
//!
//! - **`reassembler`**: Splits the incoming byte stream into request frames
//! - **`parser`**: Validates a frame and turns it into a [`request::Request`]
//! - **`request`**: HTTP request representation
//! - **`resolve`**: Maps a request target to a file inside the document root
//! - **`mime`**: Content type lookup by file extension
//! - **`response`**: Status, headers and body source for a reply
//! - **`writer`**: Writes the head and streams the file body
//! - **`connection`**: The state machine tying the above together
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌───────────────┐
//!   ┌──▶ │ AwaitingData  │ ← read with idle timeout
//!   │    └──────┬────────┘
//!   │           │ bytes read          (EOF, error, timeout → Closing)
//!   │           ▼
//!   │    ┌───────────────┐
//!   ├─── │   Framing     │ ← no complete frame yet
//!   │    └──────┬────────┘
//!   │           │ one or more frames
//!   │           ▼
//!   │    ┌───────────────┐
//!   └─── │  Dispatching  │ ← parse, resolve, build, send; in order
//!        └──────┬────────┘
//!               │ 400, or client sent `Connection: close`
//!               ▼
//!        ┌───────────────┐
//!        │   Closing     │ → Closed
//!        └───────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use docserve::http::connection::Connection;
//! use tokio::net::TcpListener;
//!
//! let listener = TcpListener::bind("127.0.0.1:8080").await?;
//! loop {
//!     let (socket, addr) = listener.accept().await?;
//!     let ctx = ctx.clone();
//!     tokio::spawn(async move {
//!         let mut conn = Connection::new(socket, ctx, addr.to_string());
//!         if let Err(e) = conn.run().await {
//!             eprintln!("Connection error: {}", e);
//!         }
//!     });
//! }
//! ```

pub mod connection;
pub mod mime;
pub mod parser;
pub mod reassembler;
pub mod request;
pub mod resolve;
pub mod response;
pub mod writer;
