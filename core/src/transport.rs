//! The "perform one HTTP round trip" boundary.
//!
//! # Design
//! The dispatcher only needs something that turns a [`WireRequest`] into a
//! [`WireResponse`]. [`UreqTransport`] does that over real HTTP with a
//! blocking `ureq` agent run on tokio's blocking pool; status codes of every
//! kind come back as data so the codecs decide what they mean. Test code can
//! supply any other implementation, such as an in-process mock server.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::debug;
use ureq::typestate::{WithBody, WithoutBody};
use ureq::RequestBuilder;

use crate::error::ApiError;
use crate::http::{
    is_bodiless, HttpMethod, WireRequest, WireResponse, APPLICATION_JSON, CONTENT_LENGTH,
    CONTENT_TYPE,
};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: WireRequest) -> Result<WireResponse, ApiError>;
}

/// HTTP transport backed by a `ureq` agent.
///
/// Requests run on tokio's blocking pool, so `send` must be awaited inside a
/// Tokio runtime; it panics otherwise.
#[derive(Clone)]
pub struct UreqTransport {
    base_url: String,
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, request: &WireRequest) -> String {
        format!("{}{}", self.base_url, request.target())
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn send(&self, request: WireRequest) -> Result<WireResponse, ApiError> {
        let url = self.url(&request);
        let agent = self.agent.clone();
        debug!(method = %request.method, %url, "executing request");
        tokio::task::spawn_blocking(move || execute(&agent, &url, request))
            .await
            .map_err(|e| ApiError::Transport(Box::new(e)))?
    }
}

fn execute(agent: &ureq::Agent, url: &str, request: WireRequest) -> Result<WireResponse, ApiError> {
    let WireRequest {
        method,
        headers,
        body,
        ..
    } = request;

    let result = match method {
        HttpMethod::Get => without_body(with_headers(agent.get(url), &headers), method, body),
        HttpMethod::Delete => without_body(with_headers(agent.delete(url), &headers), method, body),
        HttpMethod::Head => without_body(with_headers(agent.head(url), &headers), method, body),
        HttpMethod::Options => {
            without_body(with_headers(agent.options(url), &headers), method, body)
        }
        HttpMethod::Trace => without_body(with_headers(agent.trace(url), &headers), method, body),
        HttpMethod::Post => Ok(with_body(with_headers(agent.post(url), &headers), body)),
        HttpMethod::Put => Ok(with_body(with_headers(agent.put(url), &headers), body)),
        HttpMethod::Patch => Ok(with_body(with_headers(agent.patch(url), &headers), body)),
    }?;

    let mut response = result.map_err(|e| ApiError::Transport(Box::new(e)))?;
    let status = response.status().as_u16();
    let headers: BTreeMap<String, String> = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_ascii_lowercase(), value.to_string()))
        })
        .collect();

    let bodiless = is_bodiless(
        headers.get(CONTENT_LENGTH).map(String::as_str),
        headers.get(CONTENT_TYPE).map(String::as_str),
    );
    let body = if bodiless {
        None
    } else {
        Some(
            response
                .body_mut()
                .read_to_string()
                .map_err(|e| ApiError::Transport(Box::new(e)))?,
        )
    };

    Ok(WireResponse {
        status,
        headers,
        body,
    })
}

type UreqResult = Result<ureq::http::Response<ureq::Body>, ureq::Error>;

fn with_headers<B>(
    mut builder: RequestBuilder<B>,
    headers: &BTreeMap<String, String>,
) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn without_body(
    builder: RequestBuilder<WithoutBody>,
    method: HttpMethod,
    body: Option<String>,
) -> Result<UreqResult, ApiError> {
    match body {
        Some(_) => Err(ApiError::BodyNotAllowed(method)),
        None => Ok(builder.call()),
    }
}

fn with_body(builder: RequestBuilder<WithBody>, body: Option<String>) -> UreqResult {
    match body {
        Some(body) => builder.content_type(APPLICATION_JSON).send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let transport = UreqTransport::new("http://localhost:3000/");
        assert_eq!(transport.base_url(), "http://localhost:3000");
    }

    #[test]
    fn url_appends_target() {
        let transport = UreqTransport::new("http://localhost:3000");
        let request = WireRequest::new(HttpMethod::Get, vec!["todos".into()])
            .with_query("limit", Some("10".into()));
        assert_eq!(
            transport.url(&request),
            "http://localhost:3000/todos?limit=10"
        );
    }

    #[test]
    fn bodiless_methods_reject_bodies() {
        let transport = UreqTransport::new("http://127.0.0.1:9");
        let request = WireRequest::new(HttpMethod::Delete, vec!["todos".into(), "1".into()])
            .with_body(Some("{}".into()));
        let err = execute(&transport.agent, &transport.url(&request), request).unwrap_err();
        assert!(matches!(err, ApiError::BodyNotAllowed(HttpMethod::Delete)));
    }
}
