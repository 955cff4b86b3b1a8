//! Accept loop and the state it shares with connections.

pub mod context;
pub mod listener;

pub use context::ServeContext;
