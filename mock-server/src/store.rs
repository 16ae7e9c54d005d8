//! In-memory todo backend served through the todo operations' server codecs.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Router;
use tokio::sync::RwLock;
use tracing::info;
use wirebind_core::todo::{
    DeleteTodo, DeleteTodoRequest, DeleteTodoResponse, GetTodos, GetTodosRequest,
    GetTodosResponse, PostTodo, PostTodoRequest, PostTodoResponse, PutTodo, PutTodoRequest,
    PutTodoResponse,
};
use wirebind_core::{Todo, TodoError, TodoInput};

use crate::error::{HandlerError, MockError};
use crate::server::MockServer;

#[derive(Debug, Default)]
struct Todos {
    entries: BTreeMap<i64, Todo>,
    next_id: i64,
}

/// Shared todo list. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct TodoStore {
    todos: Arc<RwLock<Todos>>,
}

impl TodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock server with every todo operation answered from this store.
    pub fn server(&self) -> Result<MockServer, MockError> {
        let (list, create, update, delete) =
            (self.clone(), self.clone(), self.clone(), self.clone());
        MockServer::new()
            .mock::<GetTodos, _, _>(move |req| list.clone().get_todos(req))?
            .mock::<PostTodo, _, _>(move |req| create.clone().post_todo(req))?
            .mock::<PutTodo, _, _>(move |req| update.clone().put_todo(req))?
            .mock::<DeleteTodo, _, _>(move |req| delete.clone().delete_todo(req))
    }

    pub fn app(&self) -> Result<Router, MockError> {
        Ok(self.server()?.into_router())
    }

    pub async fn get_todos(self, req: GetTodosRequest) -> Result<GetTodosResponse, HandlerError> {
        let todos = self.todos.read().await;
        let offset = req.offset.unwrap_or(0) as usize;
        let limit = req.limit.map_or(usize::MAX, |limit| limit as usize);
        let body = todos
            .entries
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok(GetTodosResponse::Ok {
            total: todos.entries.len() as u64,
            body,
        })
    }

    pub async fn post_todo(self, req: PostTodoRequest) -> Result<PostTodoResponse, HandlerError> {
        if let Err(body) = validate(&req.body) {
            return Ok(PostTodoResponse::ServerError { body });
        }
        let mut todos = self.todos.write().await;
        todos.next_id += 1;
        let todo = todo(todos.next_id, req.body);
        todos.entries.insert(todo.id, todo.clone());
        info!(id = todo.id, "todo created");
        Ok(PostTodoResponse::Ok { body: todo })
    }

    pub async fn put_todo(self, req: PutTodoRequest) -> Result<PutTodoResponse, HandlerError> {
        if let Err(body) = validate(&req.body) {
            return Ok(PutTodoResponse::ServerError { body });
        }
        let mut todos = self.todos.write().await;
        let Some(entry) = todos.entries.get_mut(&req.id) else {
            return Ok(PutTodoResponse::NotFound);
        };
        *entry = todo(req.id, req.body);
        Ok(PutTodoResponse::Ok {
            body: entry.clone(),
        })
    }

    /// `deleteTodo` declares no 404, so a missing id is a server error.
    pub async fn delete_todo(
        self,
        req: DeleteTodoRequest,
    ) -> Result<DeleteTodoResponse, HandlerError> {
        let mut todos = self.todos.write().await;
        Ok(match todos.entries.remove(&req.id) {
            Some(body) => {
                info!(id = req.id, "todo deleted");
                DeleteTodoResponse::Ok { body }
            }
            None => DeleteTodoResponse::ServerError {
                body: TodoError::new(format!("todo {} not found", req.id)),
            },
        })
    }
}

fn validate(input: &TodoInput) -> Result<(), TodoError> {
    if input.date.is_valid() {
        Ok(())
    } else {
        Err(TodoError::new(format!(
            "invalid date {}, expected dd-mm-yyyy",
            input.date
        )))
    }
}

fn todo(id: i64, input: TodoInput) -> Todo {
    Todo {
        id,
        description: input.description,
        done: input.done,
        date: input.date,
    }
}

#[cfg(test)]
mod tests {
    use wirebind_core::Date;

    use super::*;

    fn input(description: &str) -> TodoInput {
        TodoInput {
            description: description.into(),
            done: false,
            date: Date::new("01-03-2022"),
        }
    }

    async fn seed(store: &TodoStore, n: usize) {
        for i in 0..n {
            store
                .clone()
                .post_todo(PostTodoRequest {
                    body: input(&format!("todo {i}")),
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn ids_increase_from_one() {
        let store = TodoStore::new();
        seed(&store, 2).await;
        let GetTodosResponse::Ok { total, body } =
            store.get_todos(GetTodosRequest::default()).await.unwrap()
        else {
            panic!("expected Ok");
        };
        assert_eq!(total, 2);
        assert_eq!(body.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn paging_keeps_the_full_total() {
        let store = TodoStore::new();
        seed(&store, 5).await;
        let GetTodosResponse::Ok { total, body } = store
            .get_todos(GetTodosRequest {
                limit: Some(2),
                offset: Some(1),
            })
            .await
            .unwrap()
        else {
            panic!("expected Ok");
        };
        assert_eq!(total, 5);
        assert_eq!(body.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[tokio::test]
    async fn invalid_date_is_a_server_error() {
        let mut body = input("bad");
        body.date = Date::new("2022-03-01");
        let response = TodoStore::new()
            .post_todo(PostTodoRequest { body })
            .await
            .unwrap();
        assert_eq!(response.status(), 500);
    }

    #[tokio::test]
    async fn update_of_missing_todo_is_not_found() {
        let response = TodoStore::new()
            .put_todo(PutTodoRequest {
                id: 9,
                body: input("x"),
            })
            .await
            .unwrap();
        assert_eq!(response, PutTodoResponse::NotFound);
    }

    #[tokio::test]
    async fn delete_of_missing_todo_reports_reason() {
        let response = TodoStore::new()
            .delete_todo(DeleteTodoRequest { id: 4 })
            .await
            .unwrap();
        assert_eq!(
            response,
            DeleteTodoResponse::ServerError {
                body: TodoError::new("todo 4 not found")
            }
        );
    }
}
