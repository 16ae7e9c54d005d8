//! Mock responder generator.
//!
//! # Design
//! A [`Responder`] binds one [`Endpoint`] to a typed handler. Each incoming
//! wire request is decoded with the endpoint's server codec, handed to the
//! handler, and the handler's typed response is encoded back with the same
//! codec. Handler failures are returned as [`MockError::Handler`] so they
//! reach whoever drives the responder instead of becoming a canned 500.

use std::future::Future;
use std::sync::Arc;

use axum::routing::MethodFilter;
use futures::future::BoxFuture;
use tracing::debug;
use wirebind_core::{
    Descriptor, Endpoint, HttpMethod, JsonSerialization, PathTemplate, Serialization,
    WireRequest, WireResponse,
};

use crate::error::{HandlerError, MockError};

type Intercept =
    dyn Fn(WireRequest) -> BoxFuture<'static, Result<WireResponse, MockError>> + Send + Sync;

/// An interceptor for one operation, keyed by method and path template.
#[derive(Clone)]
pub struct Responder {
    descriptor: Descriptor,
    template: PathTemplate,
    filter: MethodFilter,
    intercept: Arc<Intercept>,
}

/// Build a responder for `E` with the default JSON strategy.
pub fn responder<E, H, Fut>(handler: H) -> Result<Responder, MockError>
where
    E: Endpoint,
    H: Fn(E::Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<E::Response, HandlerError>> + Send + 'static,
{
    Responder::new::<E, H, Fut>(Arc::new(JsonSerialization), handler)
}

impl Responder {
    pub fn new<E, H, Fut>(serialization: Arc<dyn Serialization>, handler: H) -> Result<Self, MockError>
    where
        E: Endpoint,
        H: Fn(E::Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<E::Response, HandlerError>> + Send + 'static,
    {
        let filter = method_filter(E::METHOD).ok_or_else(|| MockError::UnsupportedMethod {
            method: E::METHOD,
            path: E::template().as_str().to_string(),
        })?;

        let handler = Arc::new(handler);
        let intercept = move |wire: WireRequest| -> BoxFuture<'static, Result<WireResponse, MockError>> {
            let serialization = serialization.clone();
            let handler = handler.clone();
            Box::pin(async move {
                debug!(operation = E::NAME, target = %wire.target(), "intercepted request");
                let request = E::server(serialization.as_ref()).from(wire)?;
                let response = handler(request)
                    .await
                    .map_err(|source| MockError::Handler {
                        operation: E::NAME,
                        source,
                    })?;
                Ok(E::server(serialization.as_ref()).to(&response)?)
            })
        };

        Ok(Self {
            descriptor: E::descriptor(),
            template: E::template(),
            filter,
            intercept: Arc::new(intercept),
        })
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    /// The axum route this responder is mounted on, e.g. `/todos/{id}`.
    pub fn route(&self) -> String {
        self.template.route()
    }

    pub(crate) fn filter(&self) -> MethodFilter {
        self.filter
    }

    pub fn matches(&self, request: &WireRequest) -> bool {
        request.method == self.descriptor.method && self.template.matches(&request.path)
    }

    pub async fn respond(&self, request: WireRequest) -> Result<WireResponse, MockError> {
        (self.intercept)(request).await
    }
}

fn method_filter(method: HttpMethod) -> Option<MethodFilter> {
    match method {
        HttpMethod::Get => Some(MethodFilter::GET),
        HttpMethod::Post => Some(MethodFilter::POST),
        HttpMethod::Put => Some(MethodFilter::PUT),
        HttpMethod::Delete => Some(MethodFilter::DELETE),
        _ => None,
    }
}
