//! Verify codecs against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes typed inputs, the expected wire request, a
//! simulated wire response, and the expected typed result (or error).
//! Bodies are compared as parsed JSON so field ordering never matters.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;
use wirebind_core::todo::{
    DeleteTodo, DeleteTodoResponse, GetTodos, GetTodosResponse, PostTodo, PostTodoResponse,
    PutTodo, PutTodoResponse,
};
use wirebind_core::{
    ApiError, Endpoint, HttpMethod, JsonSerialization, Todo, TodoError, WireResponse,
};

/// Run every case of `raw` through `E`'s client codec, handing decoded
/// responses to `check` together with the expected result.
fn run_vectors<E>(raw: &str, check: impl Fn(&str, E::Response, &Value))
where
    E: Endpoint,
    E::Request: DeserializeOwned,
    E::Response: std::fmt::Debug,
{
    let vectors: Value = serde_json::from_str(raw).unwrap();
    assert_eq!(vectors["operation"], E::NAME);
    let codec = E::client(&JsonSerialization);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input: E::Request = serde_json::from_value(case["input"].clone()).unwrap();
        let expected_req = &case["expected_request"];

        // Verify encode
        let req = codec.to(&input).unwrap();
        let method: HttpMethod = expected_req["method"].as_str().unwrap().parse().unwrap();
        assert_eq!(req.method, method, "{name}: method");

        let path: Vec<String> = serde_json::from_value(expected_req["path"].clone()).unwrap();
        assert_eq!(req.path, path, "{name}: path");

        let query: BTreeMap<String, String> =
            serde_json::from_value(expected_req["query"].clone()).unwrap();
        assert_eq!(req.query, query, "{name}: query");

        match &expected_req["body"] {
            Value::Null => assert!(req.body.is_none(), "{name}: body should be None"),
            expected => {
                let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(&body, expected, "{name}: body");
            }
        }

        // Verify decode
        let sim = &case["simulated_response"];
        let response = WireResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: serde_json::from_value(sim["headers"].clone()).unwrap(),
            body: sim["body"].as_str().map(str::to_string),
        };
        let result = codec.from(response);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "UnexpectedStatus" => assert!(
                    matches!(err, ApiError::UnexpectedStatus { operation, .. } if operation == E::NAME),
                    "{name}: expected UnexpectedStatus, got {err}"
                ),
                other => panic!("{name}: unknown expected_error: {other}"),
            }
        } else {
            check(name, result.unwrap(), &case["expected_result"]);
        }
    }
}

fn todo(value: &Value) -> Todo {
    serde_json::from_value(value.clone()).unwrap()
}

fn reason(value: &Value) -> TodoError {
    serde_json::from_value(value.clone()).unwrap()
}

// ---------------------------------------------------------------------------
// getTodos
// ---------------------------------------------------------------------------

#[test]
fn get_todos_test_vectors() {
    run_vectors::<GetTodos>(
        include_str!("../../test-vectors/get_todos.json"),
        |name, response, expected| {
            assert_eq!(response.status() as u64, expected["status"], "{name}: status");
            match response {
                GetTodosResponse::Ok { total, body } => {
                    assert_eq!(total, expected["total"].as_u64().unwrap(), "{name}: total");
                    let todos: Vec<Todo> = serde_json::from_value(expected["body"].clone()).unwrap();
                    assert_eq!(body, todos, "{name}: body");
                }
                GetTodosResponse::ServerError { body } => {
                    assert_eq!(body, reason(&expected["body"]), "{name}: body");
                }
            }
        },
    );
}

// ---------------------------------------------------------------------------
// postTodo
// ---------------------------------------------------------------------------

#[test]
fn post_todo_test_vectors() {
    run_vectors::<PostTodo>(
        include_str!("../../test-vectors/post_todo.json"),
        |name, response, expected| {
            assert_eq!(response.status() as u64, expected["status"], "{name}: status");
            match response {
                PostTodoResponse::Ok { body } => assert_eq!(body, todo(&expected["body"]), "{name}"),
                PostTodoResponse::ServerError { body } => {
                    assert_eq!(body, reason(&expected["body"]), "{name}")
                }
            }
        },
    );
}

// ---------------------------------------------------------------------------
// putTodo
// ---------------------------------------------------------------------------

#[test]
fn put_todo_test_vectors() {
    run_vectors::<PutTodo>(
        include_str!("../../test-vectors/put_todo.json"),
        |name, response, expected| {
            assert_eq!(response.status() as u64, expected["status"], "{name}: status");
            match response {
                PutTodoResponse::Ok { body } => assert_eq!(body, todo(&expected["body"]), "{name}"),
                PutTodoResponse::NotFound => assert!(expected["body"].is_null(), "{name}"),
                PutTodoResponse::ServerError { body } => {
                    assert_eq!(body, reason(&expected["body"]), "{name}")
                }
            }
        },
    );
}

// ---------------------------------------------------------------------------
// deleteTodo
// ---------------------------------------------------------------------------

#[test]
fn delete_todo_test_vectors() {
    run_vectors::<DeleteTodo>(
        include_str!("../../test-vectors/delete_todo.json"),
        |name, response, expected| {
            assert_eq!(response.status() as u64, expected["status"], "{name}: status");
            match response {
                DeleteTodoResponse::Ok { body } => {
                    assert_eq!(body, todo(&expected["body"]), "{name}")
                }
                DeleteTodoResponse::ServerError { body } => {
                    assert_eq!(body, reason(&expected["body"]), "{name}")
                }
            }
        },
    );
}
