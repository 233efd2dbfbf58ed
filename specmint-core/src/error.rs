use crate::http::{IntoResponse, Json, Method, Response, StatusCode};

/// Helper to create a JSON error response with a standard `{ "error": message }` body.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, Json(body)).into_response()
}

/// Errors a handler can return; rendered as `{ "error": ... }` JSON.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Internal Error: {0}")]
    Internal(String),
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            HttpError::NotFound(msg) | HttpError::BadRequest(msg) | HttpError::Internal(msg) => {
                msg
            }
        };
        error_response(status, message)
    }
}

/// Boxed error returned by plugins and meta consumers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure while assembling or serving an application.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Two controllers registered the same method on the same path.
    #[error("duplicate route: {method} {path}")]
    DuplicateRoute { method: Method, path: String },
    /// Two routes differ only in path parameter names (`/users/{id}` and `/users/{user_id}`).
    #[error("route {path} conflicts with {existing}: templates differ only in parameter names")]
    ConflictingRoute { path: String, existing: String },
    /// A plugin's meta consumer rejected the collected metadata.
    #[error("plugin failed: {0}")]
    Plugin(#[source] BoxError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
