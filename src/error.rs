use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failures surfaced by the data-access layer. All of these are
/// expected, local conditions the request layer branches on; none of
/// them should take the process down.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("database connection is closed")]
    NotConnected,

    #[error("failed to open database at '{path}'")]
    Connect {
        path: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to apply schema for table '{table}'")]
    Schema {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("ingredient '{0}' not found in the catalog")]
    IngredientNotFound(String),

    #[error("ingredient '{0}' already exists in the catalog")]
    AlreadyInCatalog(String),

    #[error("user {user_id} already has ingredient {ingredient_id} in their inventory")]
    AlreadyInInventory { user_id: i64, ingredient_id: i64 },

    #[error("failed to insert ingredient: {0}")]
    Insertion(String),

    #[error("cannot delete '{ingredient}' for user {user_id}: not in inventory")]
    Deletion { user_id: i64, ingredient: String },

    #[error("failed to update inventory: {0}")]
    Update(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Request-layer error: payload validation plus everything bubbling up
/// from [`DbError`], mapped onto protocol status codes.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    UnprocessableEntity(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Db(db) => match db {
                DbError::IngredientNotFound(_)
                | DbError::Deletion { .. }
                | DbError::Update(_) => StatusCode::NOT_FOUND,
                DbError::AlreadyInCatalog(_) | DbError::AlreadyInInventory { .. } => {
                    StatusCode::CONFLICT
                }
                DbError::NotConnected
                | DbError::Connect { .. }
                | DbError::Schema { .. }
                | DbError::Insertion(_)
                | DbError::Sqlx(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, self.to_string()).into_response()
    }
}
