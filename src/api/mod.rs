mod error;
mod todos;
mod users;

use axum::Router;
use std::sync::Arc;

use crate::accounts::Accounts;
use crate::db::Database;
use crate::jwt::TokenCodec;

pub use error::{ApiError, ResultExt};
pub use todos::TodosState;
pub use users::UsersState;

/// Create the API router. Authentication is layered on by the caller.
pub fn create_api_router(db: Database, jwt: Arc<TokenCodec>) -> Router {
    let users_state = UsersState {
        accounts: Accounts::new(db.clone(), jwt.clone()),
    };

    let todos_state = TodosState { db, jwt };

    Router::new()
        .nest("/users", users::router(users_state))
        .nest("/todos", todos::router(todos_state))
}
