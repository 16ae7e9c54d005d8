//! Untyped wire shapes exchanged with a transport.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. Codecs
//! produce and consume them; transports move them over the network. Header
//! names are normalized to lowercase on insertion so lookups are
//! case-insensitive. Maps are `BTreeMap` so rendering is deterministic.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

pub const CONTENT_TYPE: &str = "content-type";
pub const CONTENT_LENGTH: &str = "content-length";
pub const APPLICATION_JSON: &str = "application/json";

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "PUT" => Ok(HttpMethod::Put),
            "POST" => Ok(HttpMethod::Post),
            "DELETE" => Ok(HttpMethod::Delete),
            "OPTIONS" => Ok(HttpMethod::Options),
            "HEAD" => Ok(HttpMethod::Head),
            "PATCH" => Ok(HttpMethod::Patch),
            "TRACE" => Ok(HttpMethod::Trace),
            _ => Err(ApiError::UnknownMethod(s.to_string())),
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by a client codec (or by the mock server from an incoming HTTP
/// request) and consumed by a transport or a server codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    pub method: HttpMethod,
    pub path: Vec<String>,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl WireRequest {
    pub fn new(method: HttpMethod, path: Vec<String>) -> Self {
        Self {
            method,
            path,
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Add a query pair. Absent values are omitted entirely.
    pub fn with_query(mut self, name: &str, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.query.insert(name.to_string(), value);
        }
        self
    }

    /// Add a header. Absent values are omitted entirely.
    pub fn with_header(mut self, name: &str, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.headers.insert(name.to_ascii_lowercase(), value);
        }
        self
    }

    pub fn with_body(mut self, body: Option<String>) -> Self {
        self.body = body;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// `key=value` pairs joined with `&`, in key order.
    pub fn query_string(&self) -> String {
        self.query
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Relative request target: `/segment/segment?key=value`.
    ///
    /// Segments and query values are joined as-is, without percent-encoding.
    /// A value holding a space, `?`, `&` or `/` yields a target the transport
    /// may reject.
    pub fn target(&self) -> String {
        let mut target = format!("/{}", self.path.join("/"));
        let query = self.query_string();
        if !query.is_empty() {
            target.push('?');
            target.push_str(&query);
        }
        target
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl WireResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Add a header. Absent values are omitted entirely.
    pub fn with_header(mut self, name: &str, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.headers.insert(name.to_ascii_lowercase(), value);
        }
        self
    }

    pub fn with_body(mut self, body: Option<String>) -> Self {
        self.body = body;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Keep only the `declared` headers and return the names that were dropped.
    pub fn retain_headers(&mut self, declared: &[&str]) -> Vec<String> {
        let mut dropped = Vec::new();
        self.headers.retain(|name, _| {
            let keep = declared.iter().any(|d| d.eq_ignore_ascii_case(name));
            if !keep {
                dropped.push(name.clone());
            }
            keep
        });
        dropped
    }
}

/// Whether a response must be treated as carrying no body: its content
/// length is the literal `"0"` or it declares no content type at all.
pub fn is_bodiless(content_length: Option<&str>, content_type: Option<&str>) -> bool {
    content_length == Some("0") || content_type.is_none()
}
