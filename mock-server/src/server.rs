//! A registry of [`Responder`]s that can be driven in-process or mounted on
//! an axum [`Router`].
//!
//! # Design
//! In-process, [`MockServer`] implements [`Transport`], so a dispatcher can
//! talk to it directly and handler failures come back as
//! [`ApiError::Transport`] wrapping the original [`MockError`]. Over a socket
//! the same responders are mounted one route per path shape, with the
//! method filters merged onto a single [`MethodRouter`].
//!
//! A shape is the template with parameter names erased, so `todos/:id` and
//! `todos/:key` share a route and one method may claim a shape only once.
//! When several templates match a request, the one with a literal at the
//! first differing segment wins, as it does in the axum router.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::Query;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::MethodRouter;
use axum::{Json, Router};
use tracing::{debug, warn};
use wirebind_core::http::{APPLICATION_JSON, CONTENT_TYPE};
use wirebind_core::{
    ApiError, Endpoint, HttpMethod, JsonSerialization, Serialization, Transport, WireRequest,
    WireResponse,
};

use crate::error::{HandlerError, MockError};
use crate::responder::Responder;

#[derive(Clone)]
pub struct MockServer {
    serialization: Arc<dyn Serialization>,
    responders: Vec<Responder>,
}

impl Default for MockServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockServer {
    pub fn new() -> Self {
        Self::with_serialization(Arc::new(JsonSerialization))
    }

    /// Strategy used by responders created through [`MockServer::mock`].
    pub fn with_serialization(serialization: Arc<dyn Serialization>) -> Self {
        Self {
            serialization,
            responders: Vec::new(),
        }
    }

    pub fn register(mut self, responder: Responder) -> Result<Self, MockError> {
        let descriptor = *responder.descriptor();
        let shape = responder.template().shape();
        let taken = self.responders.iter().any(|existing| {
            existing.descriptor().method == descriptor.method && existing.template().shape() == shape
        });
        if taken {
            return Err(MockError::DuplicateRoute {
                method: descriptor.method,
                path: descriptor.path.to_string(),
            });
        }
        debug!(
            operation = descriptor.name,
            method = %descriptor.method,
            path = descriptor.path,
            "mock registered"
        );
        self.responders.push(responder);
        Ok(self)
    }

    /// Register a typed handler for `E`.
    pub fn mock<E, H, Fut>(self, handler: H) -> Result<Self, MockError>
    where
        E: Endpoint,
        H: Fn(E::Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<E::Response, HandlerError>> + Send + 'static,
    {
        let responder = Responder::new::<E, H, Fut>(self.serialization.clone(), handler)?;
        self.register(responder)
    }

    pub fn responders(&self) -> &[Responder] {
        &self.responders
    }

    pub async fn handle(&self, request: WireRequest) -> Result<WireResponse, MockError> {
        let responder = self
            .responders
            .iter()
            .filter(|responder| responder.matches(&request))
            .max_by_key(|responder| responder.template().literal_mask())
            .ok_or_else(|| MockError::NoRoute {
                method: request.method,
                target: request.target(),
            })?;
        let mut response = responder.respond(request).await?;
        if response.body.is_some() && response.header(CONTENT_TYPE).is_none() {
            response = response.with_header(CONTENT_TYPE, Some(APPLICATION_JSON.to_string()));
        }
        Ok(response)
    }

    /// Mount every responder on an axum router.
    pub fn into_router(self) -> Router {
        let mut routes: BTreeMap<String, MethodRouter> = BTreeMap::new();
        for responder in self.responders {
            let route = responder.template().shape();
            let filter = responder.filter();
            let handler = move |method: Method,
                                uri: Uri,
                                Query(query): Query<BTreeMap<String, String>>,
                                headers: HeaderMap,
                                body: String| {
                let responder = responder.clone();
                async move { serve(&responder, method, uri, query, headers, body).await }
            };
            let methods = routes.remove(&route).unwrap_or_else(MethodRouter::new);
            routes.insert(route, methods.on(filter, handler));
        }
        routes
            .into_iter()
            .fold(Router::new(), |router, (route, methods)| {
                router.route(&route, methods)
            })
    }
}

#[async_trait]
impl Transport for MockServer {
    async fn send(&self, request: WireRequest) -> Result<WireResponse, ApiError> {
        self.handle(request)
            .await
            .map_err(|err| ApiError::Transport(Box::new(err)))
    }
}

async fn serve(
    responder: &Responder,
    method: Method,
    uri: Uri,
    query: BTreeMap<String, String>,
    headers: HeaderMap,
    body: String,
) -> Result<Response, MockError> {
    let method: HttpMethod = method.as_str().parse()?;
    let has_body = headers.contains_key(CONTENT_TYPE) && !body.is_empty();

    let mut wire = WireRequest::new(method, split_path(uri.path()))
        .with_body(has_body.then_some(body));
    wire.query = query;
    for (name, value) in &headers {
        match value.to_str() {
            Ok(value) => wire = wire.with_header(name.as_str(), Some(value.to_string())),
            Err(_) => warn!(header = %name, "dropping non-text request header"),
        }
    }

    let response = responder.respond(wire).await?;
    into_http(response)
}

/// `/todos/1` becomes `["todos", "1"]`.
fn split_path(path: &str) -> Vec<String> {
    let path = path.strip_prefix('/').unwrap_or(path);
    path.split('/').map(str::to_string).collect()
}

fn into_http(wire: WireResponse) -> Result<Response, MockError> {
    let status = StatusCode::from_u16(wire.status).map_err(|_| MockError::InvalidStatus(wire.status))?;
    let mut response = match wire.body {
        Some(body) => match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(value) => (status, Json(value)).into_response(),
            Err(_) => (status, body).into_response(),
        },
        None => status.into_response(),
    };
    for (name, value) in wire.headers {
        let header = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| MockError::InvalidHeader(name.clone()))?;
        let value = HeaderValue::from_str(&value).map_err(|_| MockError::InvalidHeader(name))?;
        response.headers_mut().insert(header, value);
    }
    Ok(response)
}
