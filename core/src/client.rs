//! Multi-operation client dispatcher.
//!
//! # Design
//! A `Dispatcher` maps operation names to [`Operation`]s, built once from a
//! list of [`Endpoint`] types. Each `Operation` is a descriptor plus a
//! type-erased closure that captures the shared transport and
//! serialization strategy. Registering two operations with the same name
//! fails at `build()`; calling a name that was never registered fails at
//! call time with [`ApiError::UnknownOperation`].
//!
//! A call is a single round trip: encode with the client codec, send,
//! drop undeclared response headers, decode. Nothing is cached or shared
//! between calls, so concurrent calls cannot observe each other.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, trace};

use crate::endpoint::{Descriptor, Endpoint};
use crate::error::ApiError;
use crate::serialization::{JsonSerialization, Serialization};
use crate::transport::Transport;

pub type AnyValue = Box<dyn Any + Send>;

type Invoke = dyn Fn(AnyValue) -> BoxFuture<'static, Result<AnyValue, ApiError>> + Send + Sync;
type Bind = fn(Arc<dyn Transport>, Arc<dyn Serialization>) -> Operation;

/// One callable operation bound to a transport and strategy.
#[derive(Clone)]
pub struct Operation {
    descriptor: Descriptor,
    invoke: Arc<Invoke>,
}

impl Operation {
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Invoke with a boxed `E::Request`; resolves to a boxed `E::Response`.
    pub async fn invoke(&self, request: AnyValue) -> Result<AnyValue, ApiError> {
        (self.invoke)(request).await
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

pub struct DispatcherBuilder {
    transport: Arc<dyn Transport>,
    serialization: Arc<dyn Serialization>,
    operations: Vec<Bind>,
}

impl DispatcherBuilder {
    pub fn serialization(mut self, serialization: Arc<dyn Serialization>) -> Self {
        self.serialization = serialization;
        self
    }

    pub fn register<E: Endpoint>(mut self) -> Self {
        self.operations.push(bind::<E>);
        self
    }

    pub fn build(self) -> Result<Dispatcher, ApiError> {
        let mut operations = HashMap::with_capacity(self.operations.len());
        for bind in self.operations {
            let operation = bind(self.transport.clone(), self.serialization.clone());
            let name = operation.descriptor.name;
            if operations.insert(name, operation).is_some() {
                return Err(ApiError::DuplicateOperation(name.to_string()));
            }
        }
        Ok(Dispatcher { operations })
    }
}

/// Name-keyed table of callable operations.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    operations: HashMap<&'static str, Operation>,
}

impl Dispatcher {
    pub fn builder(transport: Arc<dyn Transport>) -> DispatcherBuilder {
        DispatcherBuilder {
            transport,
            serialization: Arc::new(JsonSerialization),
            operations: Vec::new(),
        }
    }

    pub fn operation(&self, name: &str) -> Result<&Operation, ApiError> {
        self.operations
            .get(name)
            .ok_or_else(|| ApiError::UnknownOperation(name.to_string()))
    }

    /// Registered operations, sorted by name.
    pub fn descriptors(&self) -> Vec<Descriptor> {
        let mut descriptors: Vec<Descriptor> =
            self.operations.values().map(|op| op.descriptor).collect();
        descriptors.sort_by_key(|d| d.name);
        descriptors
    }

    /// Typed call of the operation registered under `E::NAME`.
    pub async fn call<E: Endpoint>(&self, request: E::Request) -> Result<E::Response, ApiError> {
        let response = self.operation(E::NAME)?.invoke(Box::new(request)).await?;
        response
            .downcast::<E::Response>()
            .map(|response| *response)
            .map_err(|_| ApiError::OperationTypeMismatch(E::NAME.to_string()))
    }
}

fn bind<E: Endpoint>(
    transport: Arc<dyn Transport>,
    serialization: Arc<dyn Serialization>,
) -> Operation {
    let invoke = move |request: AnyValue| -> BoxFuture<'static, Result<AnyValue, ApiError>> {
        let transport = transport.clone();
        let serialization = serialization.clone();
        Box::pin(async move {
            let request = request
                .downcast::<E::Request>()
                .map_err(|_| ApiError::OperationTypeMismatch(E::NAME.to_string()))?;
            let response =
                round_trip::<E>(transport.as_ref(), serialization.as_ref(), *request).await?;
            Ok(Box::new(response) as AnyValue)
        })
    };
    Operation {
        descriptor: E::descriptor(),
        invoke: Arc::new(invoke),
    }
}

async fn round_trip<E: Endpoint>(
    transport: &dyn Transport,
    serialization: &dyn Serialization,
    request: E::Request,
) -> Result<E::Response, ApiError> {
    let wire = E::client(serialization).to(&request)?;
    debug!(operation = E::NAME, method = %wire.method, target = %wire.target(), "sending request");

    let mut response = transport.send(wire).await?;
    let dropped = response.retain_headers(E::RESPONSE_HEADERS);
    if !dropped.is_empty() {
        trace!(operation = E::NAME, ?dropped, "dropping undeclared response headers");
    }
    debug!(operation = E::NAME, status = response.status, "received response");

    E::client(serialization).from(response)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::http::{WireRequest, WireResponse};
    use crate::todo::{
        DeleteTodo, DeleteTodoRequest, DeleteTodoResponse, GetTodos, GetTodosRequest,
        GetTodosResponse, PutTodo, PutTodoRequest, PutTodoResponse,
    };
    use crate::types::{Date, Todo, TodoInput};

    /// Answers every request with a todo whose description is the request
    /// target, so each response reveals exactly which request produced it.
    struct EchoTransport;

    #[async_trait]
    impl Transport for EchoTransport {
        async fn send(&self, request: WireRequest) -> Result<WireResponse, ApiError> {
            // Stagger so concurrent calls interleave.
            let delay = if request.path.last().map(String::as_str) == Some("1") { 20 } else { 1 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            let todo = Todo {
                id: 0,
                description: request.target(),
                done: request.body.is_some(),
                date: Date::new("01-01-2022"),
            };
            Ok(WireResponse::new(200)
                .with_header("content-type", Some("application/json".into()))
                .with_header("x-rate-limit", Some("99".into()))
                .with_header("total", Some("1".into()))
                .with_body(Some(serde_json::to_string(&todo).unwrap())))
        }
    }

    struct StaticTransport(WireResponse);

    #[async_trait]
    impl Transport for StaticTransport {
        async fn send(&self, _request: WireRequest) -> Result<WireResponse, ApiError> {
            Ok(self.0.clone())
        }
    }

    /// Claims the `getTodos` name with unrelated types.
    struct Impostor;

    impl Endpoint for Impostor {
        const NAME: &'static str = "getTodos";
        const METHOD: crate::http::HttpMethod = crate::http::HttpMethod::Get;
        const PATH: &'static str = "impostor";

        type Request = u8;
        type Response = u8;

        fn encode_request(_: &u8, _: &dyn Serialization) -> Result<WireRequest, ApiError> {
            unreachable!()
        }
        fn decode_response(_: WireResponse, _: &dyn Serialization) -> Result<u8, ApiError> {
            unreachable!()
        }
        fn decode_request(_: WireRequest, _: &dyn Serialization) -> Result<u8, ApiError> {
            unreachable!()
        }
        fn encode_response(_: &u8, _: &dyn Serialization) -> Result<WireResponse, ApiError> {
            unreachable!()
        }
    }

    fn input() -> TodoInput {
        TodoInput {
            description: "x".to_string(),
            done: true,
            date: Date::new("01-01-2022"),
        }
    }

    #[test]
    fn duplicate_names_are_rejected_at_build() {
        let err = Dispatcher::builder(Arc::new(EchoTransport))
            .register::<PutTodo>()
            .register::<PutTodo>()
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateOperation(name) if name == "putTodo"));
    }

    #[test]
    fn descriptors_are_sorted_by_name() {
        let dispatcher = crate::todo::client(Arc::new(EchoTransport)).unwrap();
        let names: Vec<&str> = dispatcher.descriptors().iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["deleteTodo", "getTodos", "postTodo", "putTodo"]);
    }

    #[tokio::test]
    async fn unknown_operation_fails_at_call() {
        let dispatcher = Dispatcher::builder(Arc::new(EchoTransport))
            .register::<PutTodo>()
            .build()
            .unwrap();
        let err = dispatcher
            .call::<DeleteTodo>(DeleteTodoRequest { id: 1 })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::UnknownOperation(name) if name == "deleteTodo"));
        assert!(matches!(
            dispatcher.operation("nope"),
            Err(ApiError::UnknownOperation(_))
        ));
    }

    #[tokio::test]
    async fn foreign_types_are_rejected() {
        let dispatcher = Dispatcher::builder(Arc::new(EchoTransport))
            .register::<GetTodos>()
            .build()
            .unwrap();
        let err = dispatcher.call::<Impostor>(7).await.unwrap_err();
        assert!(matches!(err, ApiError::OperationTypeMismatch(name) if name == "getTodos"));
    }

    #[tokio::test]
    async fn invoke_by_name() {
        let dispatcher = crate::todo::client(Arc::new(EchoTransport)).unwrap();
        let operation = dispatcher.operation("deleteTodo").unwrap();
        assert_eq!(operation.descriptor().path, "todos/:id");
        let response = operation
            .invoke(Box::new(DeleteTodoRequest { id: 5 }))
            .await
            .unwrap();
        let response = response.downcast::<DeleteTodoResponse>().unwrap();
        match *response {
            DeleteTodoResponse::Ok { body } => {
                assert_eq!(body.description, "/todos/5");
                assert!(!body.done, "delete must not send a body");
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn declared_headers_survive_filtering() {
        let transport = StaticTransport(
            WireResponse::new(200)
                .with_header("Total", Some("4".into()))
                .with_header("x-rate-limit", Some("99".into()))
                .with_header("content-type", Some("application/json".into()))
                .with_body(Some("[]".into())),
        );
        let dispatcher = crate::todo::client(Arc::new(transport)).unwrap();
        let response = dispatcher
            .call::<GetTodos>(GetTodosRequest::default())
            .await
            .unwrap();
        assert_eq!(
            response,
            GetTodosResponse::Ok {
                total: 4,
                body: Vec::new()
            }
        );
    }

    #[tokio::test]
    async fn undeclared_status_surfaces_as_error() {
        let transport = StaticTransport(WireResponse::new(404));
        let dispatcher = crate::todo::client(Arc::new(transport)).unwrap();
        let err = dispatcher
            .call::<GetTodos>(GetTodosRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn concurrent_calls_do_not_share_state() {
        let dispatcher = crate::todo::client(Arc::new(EchoTransport)).unwrap();
        let (put, delete) = tokio::join!(
            dispatcher.call::<PutTodo>(PutTodoRequest { id: 1, body: input() }),
            dispatcher.call::<DeleteTodo>(DeleteTodoRequest { id: 2 }),
        );
        match put.unwrap() {
            PutTodoResponse::Ok { body } => {
                assert_eq!(body.description, "/todos/1");
                assert!(body.done);
            }
            other => panic!("unexpected put response: {other:?}"),
        }
        match delete.unwrap() {
            DeleteTodoResponse::Ok { body } => {
                assert_eq!(body.description, "/todos/2");
                assert!(!body.done);
            }
            other => panic!("unexpected delete response: {other:?}"),
        }
    }
}
