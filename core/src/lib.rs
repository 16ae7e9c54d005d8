//! Typed HTTP binding layer.
//!
//! # Overview
//! Converts between typed API operations and untyped wire requests and
//! responses, in both directions: as a client (typed request out, typed
//! response in) and as a server or mock (the mirror).
//!
//! # Design
//! - [`Endpoint`] describes one operation: name, method, path template,
//!   typed request/response and their client/server codecs.
//! - [`Serialization`] is an injected strategy, never process-wide state.
//! - [`Dispatcher`] maps operation names to callables built once at
//!   construction; duplicate names are rejected eagerly.
//! - [`Transport`] is the single I/O boundary; [`UreqTransport`] is the
//!   real-network implementation.
//! - [`todo`] is one concrete descriptor family.

pub mod client;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod path;
pub mod serialization;
pub mod todo;
pub mod transport;
pub mod types;

pub use client::{Dispatcher, DispatcherBuilder, Operation};
pub use endpoint::{ClientCodec, Descriptor, Endpoint, ServerCodec};
pub use error::ApiError;
pub use http::{HttpMethod, WireRequest, WireResponse};
pub use path::PathTemplate;
pub use serialization::{decode, encode, JsonSerialization, Serialization};
pub use transport::{Transport, UreqTransport};
pub use types::{Date, Todo, TodoError, TodoInput};
