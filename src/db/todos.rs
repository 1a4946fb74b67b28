//! Todo storage. Every query is scoped to the owning user.

use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct TodoStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone)]
pub struct Todo {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub completed: bool,
    pub created_at: String,
}

#[derive(sqlx::FromRow)]
struct TodoRow {
    id: i64,
    user_id: i64,
    title: String,
    completed: i32,
    created_at: String,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            completed: row.completed != 0,
            created_at: row.created_at,
        }
    }
}

/// Column a todo page is ordered by (always descending).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoSort {
    #[default]
    Id,
    Title,
    Completed,
    CreatedAt,
}

impl TodoSort {
    fn page_query(&self) -> &'static str {
        match self {
            TodoSort::Id => {
                "SELECT id, user_id, title, completed, created_at FROM todos WHERE user_id = ? ORDER BY id DESC LIMIT ? OFFSET ?"
            }
            TodoSort::Title => {
                "SELECT id, user_id, title, completed, created_at FROM todos WHERE user_id = ? ORDER BY title DESC, id DESC LIMIT ? OFFSET ?"
            }
            TodoSort::Completed => {
                "SELECT id, user_id, title, completed, created_at FROM todos WHERE user_id = ? ORDER BY completed DESC, id DESC LIMIT ? OFFSET ?"
            }
            TodoSort::CreatedAt => {
                "SELECT id, user_id, title, completed, created_at FROM todos WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
            }
        }
    }
}

impl TodoStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new todo. Returns the todo ID.
    pub async fn create(&self, user_id: i64, title: &str) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO todos (user_id, title) VALUES (?, ?)")
            .bind(user_id)
            .bind(title)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get a todo by ID, only if it belongs to the user.
    pub async fn get(&self, id: i64, user_id: i64) -> Result<Option<Todo>, sqlx::Error> {
        let row: Option<TodoRow> = sqlx::query_as(
            "SELECT id, user_id, title, completed, created_at FROM todos WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Todo::from))
    }

    /// Fetch one zero-based page of a user's todos.
    pub async fn list_page(
        &self,
        user_id: i64,
        page_no: u32,
        page_size: u32,
        sort: TodoSort,
    ) -> Result<Vec<Todo>, sqlx::Error> {
        let rows: Vec<TodoRow> = sqlx::query_as(sort.page_query())
            .bind(user_id)
            .bind(page_size as i64)
            .bind(page_no as i64 * page_size as i64)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Todo::from).collect())
    }

    /// Count a user's todos.
    pub async fn count_by_user(&self, user_id: i64) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todos WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    /// Replace a todo's title. Returns false if no owned todo matched.
    pub async fn update_title(
        &self,
        id: i64,
        user_id: i64,
        title: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE todos SET title = ? WHERE id = ? AND user_id = ?")
            .bind(title)
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a todo as completed. Returns false if no owned todo matched.
    pub async fn complete(&self, id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE todos SET completed = 1 WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a todo. Returns false if no owned todo matched.
    pub async fn delete(&self, id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
