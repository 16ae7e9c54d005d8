//! Mock responders for typed HTTP operations.
//!
//! # Design
//! - [`Responder`] turns one operation plus a typed handler into a wire
//!   request interceptor using the operation's server codec.
//! - [`MockServer`] collects responders. It is a [`wirebind_core::Transport`]
//!   for in-process tests and an axum [`Router`] for real sockets.
//! - [`TodoStore`] is an in-memory todo backend wired through those mocks.

use axum::Router;
use tokio::net::TcpListener;

pub mod config;
pub mod error;
pub mod responder;
pub mod server;
pub mod store;

pub use config::{ConfigError, ServerConfig};
pub use error::{HandlerError, MockError};
pub use responder::{responder, Responder};
pub use server::MockServer;
pub use store::TodoStore;

/// Router serving a fresh, empty todo store.
pub fn app() -> Result<Router, MockError> {
    TodoStore::new().app()
}

pub async fn run(listener: TcpListener) -> Result<(), MockError> {
    axum::serve(listener, app()?).await?;
    Ok(())
}
