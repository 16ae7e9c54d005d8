//! Operation descriptors and their client/server codec pairs.
//!
//! # Design
//! An [`Endpoint`] is the static description of one HTTP operation: its
//! name, method, path template, typed request and response, and the four
//! conversions between those types and the wire. A client uses
//! `to`/`from` to send requests and read responses; a server (or mock)
//! uses the mirror pair to read requests and write responses.
//!
//! Response types are enums keyed by status. `decode_response`
//! implementations match the status exhaustively and return
//! [`ApiError::UnexpectedStatus`] for anything undeclared.

use std::marker::PhantomData;

use crate::error::ApiError;
use crate::http::{HttpMethod, WireRequest, WireResponse};
use crate::path::PathTemplate;
use crate::serialization::Serialization;

/// Untyped identity of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub name: &'static str,
    pub method: HttpMethod,
    pub path: &'static str,
}

impl Descriptor {
    pub fn template(&self) -> PathTemplate {
        PathTemplate::parse(self.path)
    }
}

pub trait Endpoint: Send + Sync + 'static {
    /// Unique name within a dispatcher, e.g. `getTodos`.
    const NAME: &'static str;
    const METHOD: HttpMethod;
    /// Path template with `:name` placeholders, e.g. `todos/:id`.
    const PATH: &'static str;
    /// Response headers this operation reads. Everything else is dropped
    /// by the dispatcher before decoding.
    const RESPONSE_HEADERS: &'static [&'static str] = &[];

    type Request: Send + 'static;
    type Response: Send + 'static;

    fn encode_request(
        request: &Self::Request,
        serialization: &dyn Serialization,
    ) -> Result<WireRequest, ApiError>;

    fn decode_response(
        response: WireResponse,
        serialization: &dyn Serialization,
    ) -> Result<Self::Response, ApiError>;

    fn decode_request(
        request: WireRequest,
        serialization: &dyn Serialization,
    ) -> Result<Self::Request, ApiError>;

    fn encode_response(
        response: &Self::Response,
        serialization: &dyn Serialization,
    ) -> Result<WireResponse, ApiError>;

    fn descriptor() -> Descriptor
    where
        Self: Sized,
    {
        Descriptor {
            name: Self::NAME,
            method: Self::METHOD,
            path: Self::PATH,
        }
    }

    fn template() -> PathTemplate
    where
        Self: Sized,
    {
        PathTemplate::parse(Self::PATH)
    }

    fn client(serialization: &dyn Serialization) -> ClientCodec<'_, Self>
    where
        Self: Sized,
    {
        ClientCodec {
            serialization,
            endpoint: PhantomData,
        }
    }

    fn server(serialization: &dyn Serialization) -> ServerCodec<'_, Self>
    where
        Self: Sized,
    {
        ServerCodec {
            serialization,
            endpoint: PhantomData,
        }
    }
}

/// Client side of an operation: typed request out, typed response in.
pub struct ClientCodec<'s, E> {
    serialization: &'s dyn Serialization,
    endpoint: PhantomData<fn() -> E>,
}

impl<E: Endpoint> ClientCodec<'_, E> {
    pub fn to(&self, request: &E::Request) -> Result<WireRequest, ApiError> {
        E::encode_request(request, self.serialization)
    }

    pub fn from(&self, response: WireResponse) -> Result<E::Response, ApiError> {
        E::decode_response(response, self.serialization)
    }
}

/// Server side of an operation: typed request in, typed response out.
pub struct ServerCodec<'s, E> {
    serialization: &'s dyn Serialization,
    endpoint: PhantomData<fn() -> E>,
}

impl<E: Endpoint> ServerCodec<'_, E> {
    pub fn from(&self, request: WireRequest) -> Result<E::Request, ApiError> {
        E::decode_request(request, self.serialization)
    }

    pub fn to(&self, response: &E::Response) -> Result<WireResponse, ApiError> {
        E::encode_response(response, self.serialization)
    }
}
