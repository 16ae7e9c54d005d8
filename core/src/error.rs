//! Error types for the binding layer.
//!
//! # Design
//! Every failure here is either a programming error (unknown operation,
//! missing path parameter) or a wire shape the operation never declared
//! (unexpected status, undecodable body). Declared failure responses such
//! as a `500 { reason }` are ordinary typed values and never show up here.

use thiserror::Error;

use crate::http::HttpMethod;

/// Errors produced while encoding, dispatching, or decoding an operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No operation with this name was registered on the dispatcher.
    #[error("cannot find api with name: {0}")]
    UnknownOperation(String),

    /// Two registered operations share a name.
    #[error("operation {0} is registered more than once")]
    DuplicateOperation(String),

    /// The operation was invoked with request or response types that do
    /// not belong to it.
    #[error("operation {0} was invoked with foreign request or response types")]
    OperationTypeMismatch(String),

    /// The response status matches none of the operation's declared variants.
    #[error("{operation} cannot internalize response with status: {status}")]
    UnexpectedStatus { operation: &'static str, status: u16 },

    #[error("path template {template} has no value for parameter :{name}")]
    MissingPathParam { template: String, name: String },

    #[error("path /{} does not match template {template}", .path.join("/"))]
    PathMismatch { template: String, path: Vec<String> },

    #[error("unknown HTTP method: {0}")]
    UnknownMethod(String),

    #[error("{0} requests cannot carry a body")]
    BodyNotAllowed(HttpMethod),

    /// A typed value could not be converted to its wire representation.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// A wire value could not be converted to the expected typed shape.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The transport could not complete the round trip.
    #[error("transport failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}
