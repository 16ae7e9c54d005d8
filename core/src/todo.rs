//! The todo API: four operations bound to the wire through [`Endpoint`].
//!
//! | name         | method | path        | responses              |
//! |--------------|--------|-------------|------------------------|
//! | `getTodos`   | GET    | `todos`     | 200 (+`total`), 500    |
//! | `postTodo`   | POST   | `todos`     | 200, 500               |
//! | `putTodo`    | PUT    | `todos/:id` | 200, 404 (no body), 500 |
//! | `deleteTodo` | DELETE | `todos/:id` | 200, 500               |

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::client::Dispatcher;
use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::http::{HttpMethod, WireRequest, WireResponse};
use crate::serialization::{decode, encode, Serialization};
use crate::transport::Transport;
use crate::types::{Todo, TodoError, TodoInput};

/// Dispatcher with every todo operation registered.
pub fn client(transport: Arc<dyn Transport>) -> Result<Dispatcher, ApiError> {
    Dispatcher::builder(transport)
        .register::<GetTodos>()
        .register::<PostTodo>()
        .register::<PutTodo>()
        .register::<DeleteTodo>()
        .build()
}

/// Encode a value that must be present, such as a path parameter.
fn encode_path_param<T: Serialize>(
    serialization: &dyn Serialization,
    template: &str,
    name: &str,
    value: &T,
) -> Result<String, ApiError> {
    encode(serialization, value)?.ok_or_else(|| ApiError::MissingPathParam {
        template: template.to_string(),
        name: name.to_string(),
    })
}

// ---------------------------------------------------------------------------
// getTodos
// ---------------------------------------------------------------------------

pub struct GetTodos;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetTodosRequest {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetTodosResponse {
    Ok { total: u64, body: Vec<Todo> },
    ServerError { body: TodoError },
}

impl GetTodosResponse {
    pub fn status(&self) -> u16 {
        match self {
            GetTodosResponse::Ok { .. } => 200,
            GetTodosResponse::ServerError { .. } => 500,
        }
    }
}

impl Endpoint for GetTodos {
    const NAME: &'static str = "getTodos";
    const METHOD: HttpMethod = HttpMethod::Get;
    const PATH: &'static str = "todos";
    const RESPONSE_HEADERS: &'static [&'static str] = &["total"];

    type Request = GetTodosRequest;
    type Response = GetTodosResponse;

    fn encode_request(
        request: &Self::Request,
        serialization: &dyn Serialization,
    ) -> Result<WireRequest, ApiError> {
        Ok(WireRequest::new(Self::METHOD, Self::template().expand(&[])?)
            .with_query("limit", encode(serialization, &request.limit)?)
            .with_query("offset", encode(serialization, &request.offset)?))
    }

    fn decode_response(
        response: WireResponse,
        serialization: &dyn Serialization,
    ) -> Result<Self::Response, ApiError> {
        match response.status {
            200 => Ok(GetTodosResponse::Ok {
                total: decode(serialization, response.header("total"))?,
                body: decode(serialization, response.body.as_deref())?,
            }),
            500 => Ok(GetTodosResponse::ServerError {
                body: decode(serialization, response.body.as_deref())?,
            }),
            status => Err(ApiError::UnexpectedStatus {
                operation: Self::NAME,
                status,
            }),
        }
    }

    fn decode_request(
        request: WireRequest,
        serialization: &dyn Serialization,
    ) -> Result<Self::Request, ApiError> {
        Self::template().ensure_matches(&request.path)?;
        Ok(GetTodosRequest {
            limit: decode(serialization, request.query_param("limit"))?,
            offset: decode(serialization, request.query_param("offset"))?,
        })
    }

    fn encode_response(
        response: &Self::Response,
        serialization: &dyn Serialization,
    ) -> Result<WireResponse, ApiError> {
        Ok(match response {
            GetTodosResponse::Ok { total, body } => WireResponse::new(response.status())
                .with_header("total", encode(serialization, total)?)
                .with_body(encode(serialization, body)?),
            GetTodosResponse::ServerError { body } => {
                WireResponse::new(response.status()).with_body(encode(serialization, body)?)
            }
        })
    }
}

// ---------------------------------------------------------------------------
// postTodo
// ---------------------------------------------------------------------------

pub struct PostTodo;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTodoRequest {
    pub body: TodoInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostTodoResponse {
    Ok { body: Todo },
    ServerError { body: TodoError },
}

impl PostTodoResponse {
    pub fn status(&self) -> u16 {
        match self {
            PostTodoResponse::Ok { .. } => 200,
            PostTodoResponse::ServerError { .. } => 500,
        }
    }
}

impl Endpoint for PostTodo {
    const NAME: &'static str = "postTodo";
    const METHOD: HttpMethod = HttpMethod::Post;
    const PATH: &'static str = "todos";

    type Request = PostTodoRequest;
    type Response = PostTodoResponse;

    fn encode_request(
        request: &Self::Request,
        serialization: &dyn Serialization,
    ) -> Result<WireRequest, ApiError> {
        Ok(WireRequest::new(Self::METHOD, Self::template().expand(&[])?)
            .with_body(encode(serialization, &request.body)?))
    }

    fn decode_response(
        response: WireResponse,
        serialization: &dyn Serialization,
    ) -> Result<Self::Response, ApiError> {
        let body = response.body.as_deref();
        match response.status {
            200 => Ok(PostTodoResponse::Ok {
                body: decode(serialization, body)?,
            }),
            500 => Ok(PostTodoResponse::ServerError {
                body: decode(serialization, body)?,
            }),
            status => Err(ApiError::UnexpectedStatus {
                operation: Self::NAME,
                status,
            }),
        }
    }

    fn decode_request(
        request: WireRequest,
        serialization: &dyn Serialization,
    ) -> Result<Self::Request, ApiError> {
        Self::template().ensure_matches(&request.path)?;
        Ok(PostTodoRequest {
            body: decode(serialization, request.body.as_deref())?,
        })
    }

    fn encode_response(
        response: &Self::Response,
        serialization: &dyn Serialization,
    ) -> Result<WireResponse, ApiError> {
        let body = match response {
            PostTodoResponse::Ok { body } => encode(serialization, body)?,
            PostTodoResponse::ServerError { body } => encode(serialization, body)?,
        };
        Ok(WireResponse::new(response.status()).with_body(body))
    }
}

// ---------------------------------------------------------------------------
// putTodo
// ---------------------------------------------------------------------------

pub struct PutTodo;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutTodoRequest {
    pub id: i64,
    pub body: TodoInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutTodoResponse {
    Ok { body: Todo },
    NotFound,
    ServerError { body: TodoError },
}

impl PutTodoResponse {
    pub fn status(&self) -> u16 {
        match self {
            PutTodoResponse::Ok { .. } => 200,
            PutTodoResponse::NotFound => 404,
            PutTodoResponse::ServerError { .. } => 500,
        }
    }
}

impl Endpoint for PutTodo {
    const NAME: &'static str = "putTodo";
    const METHOD: HttpMethod = HttpMethod::Put;
    const PATH: &'static str = "todos/:id";

    type Request = PutTodoRequest;
    type Response = PutTodoResponse;

    fn encode_request(
        request: &Self::Request,
        serialization: &dyn Serialization,
    ) -> Result<WireRequest, ApiError> {
        let id = encode_path_param(serialization, Self::PATH, "id", &request.id)?;
        Ok(WireRequest::new(Self::METHOD, Self::template().expand(&[("id", id)])?)
            .with_body(encode(serialization, &request.body)?))
    }

    fn decode_response(
        response: WireResponse,
        serialization: &dyn Serialization,
    ) -> Result<Self::Response, ApiError> {
        let body = response.body.as_deref();
        match response.status {
            200 => Ok(PutTodoResponse::Ok {
                body: decode(serialization, body)?,
            }),
            404 => Ok(PutTodoResponse::NotFound),
            500 => Ok(PutTodoResponse::ServerError {
                body: decode(serialization, body)?,
            }),
            status => Err(ApiError::UnexpectedStatus {
                operation: Self::NAME,
                status,
            }),
        }
    }

    fn decode_request(
        request: WireRequest,
        serialization: &dyn Serialization,
    ) -> Result<Self::Request, ApiError> {
        let id = Self::template().extract(&request.path, "id")?;
        Ok(PutTodoRequest {
            id: decode(serialization, Some(id))?,
            body: decode(serialization, request.body.as_deref())?,
        })
    }

    fn encode_response(
        response: &Self::Response,
        serialization: &dyn Serialization,
    ) -> Result<WireResponse, ApiError> {
        let body = match response {
            PutTodoResponse::Ok { body } => encode(serialization, body)?,
            PutTodoResponse::NotFound => None,
            PutTodoResponse::ServerError { body } => encode(serialization, body)?,
        };
        Ok(WireResponse::new(response.status()).with_body(body))
    }
}

// ---------------------------------------------------------------------------
// deleteTodo
// ---------------------------------------------------------------------------

pub struct DeleteTodo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTodoRequest {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTodoResponse {
    Ok { body: Todo },
    ServerError { body: TodoError },
}

impl DeleteTodoResponse {
    pub fn status(&self) -> u16 {
        match self {
            DeleteTodoResponse::Ok { .. } => 200,
            DeleteTodoResponse::ServerError { .. } => 500,
        }
    }
}

impl Endpoint for DeleteTodo {
    const NAME: &'static str = "deleteTodo";
    const METHOD: HttpMethod = HttpMethod::Delete;
    const PATH: &'static str = "todos/:id";

    type Request = DeleteTodoRequest;
    type Response = DeleteTodoResponse;

    fn encode_request(
        request: &Self::Request,
        serialization: &dyn Serialization,
    ) -> Result<WireRequest, ApiError> {
        let id = encode_path_param(serialization, Self::PATH, "id", &request.id)?;
        Ok(WireRequest::new(
            Self::METHOD,
            Self::template().expand(&[("id", id)])?,
        ))
    }

    fn decode_response(
        response: WireResponse,
        serialization: &dyn Serialization,
    ) -> Result<Self::Response, ApiError> {
        let body = response.body.as_deref();
        match response.status {
            200 => Ok(DeleteTodoResponse::Ok {
                body: decode(serialization, body)?,
            }),
            500 => Ok(DeleteTodoResponse::ServerError {
                body: decode(serialization, body)?,
            }),
            status => Err(ApiError::UnexpectedStatus {
                operation: Self::NAME,
                status,
            }),
        }
    }

    fn decode_request(
        request: WireRequest,
        serialization: &dyn Serialization,
    ) -> Result<Self::Request, ApiError> {
        let id = Self::template().extract(&request.path, "id")?;
        Ok(DeleteTodoRequest {
            id: decode(serialization, Some(id))?,
        })
    }

    fn encode_response(
        response: &Self::Response,
        serialization: &dyn Serialization,
    ) -> Result<WireResponse, ApiError> {
        let body = match response {
            DeleteTodoResponse::Ok { body } => encode(serialization, body)?,
            DeleteTodoResponse::ServerError { body } => encode(serialization, body)?,
        };
        Ok(WireResponse::new(response.status()).with_body(body))
    }
}
