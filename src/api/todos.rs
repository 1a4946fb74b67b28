//! Todos API.
//!
//! All endpoints require JWT authentication and only ever touch the
//! authenticated user's todos.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ApiError, ResultExt};
use crate::auth::CurrentUser;
use crate::db::{Database, Todo, TodoSort};
use crate::impl_has_auth_backend;
use crate::jwt::TokenCodec;

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;
const MAX_TITLE_LENGTH: usize = 200;

/// State for todo endpoints.
#[derive(Clone)]
pub struct TodosState {
    pub db: Database,
    pub jwt: Arc<TokenCodec>,
}

impl_has_auth_backend!(TodosState);

pub fn router(state: TodosState) -> Router {
    Router::new()
        .route("/", get(list_todos).post(create_todo))
        .route("/{id}", get(get_todo).put(update_todo).delete(delete_todo))
        .route("/{id}/complete", post(complete_todo))
        .with_state(state)
}

// --- Request/Response types ---

#[derive(Deserialize)]
struct TodoRequest {
    title: String,
}

#[derive(Serialize)]
struct TodoTitleResponse {
    id: i64,
    title: String,
}

#[derive(Serialize)]
struct TodoResponse {
    id: i64,
    title: String,
    completed: bool,
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            completed: todo.completed,
        }
    }
}

#[derive(Deserialize)]
struct PageQuery {
    #[serde(default)]
    page_no: u32,
    #[serde(default = "default_page_size")]
    page_size: u32,
    #[serde(default)]
    sort_by: TodoSort,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[derive(Serialize)]
struct PageResponse {
    content: Vec<TodoResponse>,
    page_no: u32,
    page_size: u32,
    total_elements: i64,
    total_pages: i64,
    last: bool,
}

fn validate_title(title: &str) -> Result<&str, ApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("Title cannot be empty"));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Title cannot be longer than {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(title)
}

fn todo_not_found() -> ApiError {
    ApiError::not_found("Todo not found")
}

// --- Handlers ---

async fn create_todo(
    State(state): State<TodosState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<TodoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let title = validate_title(&payload.title)?;

    let id = state
        .db
        .todos()
        .create(user.id, title)
        .await
        .db_err("Failed to create todo")?;

    Ok((
        StatusCode::CREATED,
        Json(TodoTitleResponse {
            id,
            title: title.to_string(),
        }),
    ))
}

async fn list_todos(
    State(state): State<TodosState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse>, ApiError> {
    if query.page_size == 0 || query.page_size > MAX_PAGE_SIZE {
        return Err(ApiError::bad_request(format!(
            "page_size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }

    let total_elements = state
        .db
        .todos()
        .count_by_user(user.id)
        .await
        .db_err("Failed to count todos")?;

    if total_elements == 0 {
        return Err(todo_not_found());
    }

    let todos = state
        .db
        .todos()
        .list_page(user.id, query.page_no, query.page_size, query.sort_by)
        .await
        .db_err("Failed to list todos")?;

    let page_size = i64::from(query.page_size);
    let total_pages = (total_elements + page_size - 1) / page_size;

    Ok(Json(PageResponse {
        content: todos.into_iter().map(TodoResponse::from).collect(),
        page_no: query.page_no,
        page_size: query.page_size,
        total_elements,
        total_pages,
        last: i64::from(query.page_no) + 1 >= total_pages,
    }))
}

async fn get_todo(
    State(state): State<TodosState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<TodoResponse>, ApiError> {
    let todo = state
        .db
        .todos()
        .get(id, user.id)
        .await
        .db_err("Failed to get todo")?
        .ok_or_else(todo_not_found)?;

    Ok(Json(todo.into()))
}

async fn update_todo(
    State(state): State<TodosState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<TodoRequest>,
) -> Result<Json<TodoTitleResponse>, ApiError> {
    let title = validate_title(&payload.title)?;

    let updated = state
        .db
        .todos()
        .update_title(id, user.id, title)
        .await
        .db_err("Failed to update todo")?;

    if !updated {
        return Err(todo_not_found());
    }

    Ok(Json(TodoTitleResponse {
        id,
        title: title.to_string(),
    }))
}

async fn delete_todo(
    State(state): State<TodosState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .db
        .todos()
        .delete(id, user.id)
        .await
        .db_err("Failed to delete todo")?;

    if !deleted {
        return Err(todo_not_found());
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn complete_todo(
    State(state): State<TodosState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<TodoResponse>, ApiError> {
    let completed = state
        .db
        .todos()
        .complete(id, user.id)
        .await
        .db_err("Failed to complete todo")?;

    if !completed {
        return Err(todo_not_found());
    }

    let todo = state
        .db
        .todos()
        .get(id, user.id)
        .await
        .db_err("Failed to get todo")?
        .ok_or_else(todo_not_found)?;

    Ok(Json(todo.into()))
}
