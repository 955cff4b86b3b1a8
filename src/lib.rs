//! docserve - static file daemon
//!
//! Core library for the HTTP/1.1 file-serving protocol.

pub mod config;
pub mod http;
pub mod server;
