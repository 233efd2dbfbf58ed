use specmint_core::http::Method;

/// Schema registry failures. Both are recoverable; the caller decides a fallback.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("schema `{0}` is not registered")]
    NotFound(String),
    #[error("schema `{name}` is not a valid schema object: {source}")]
    Invalid {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Fatal failures of document assembly. No document is produced when any occurs.
#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("duplicate route {method} {path}: `{first}` and `{second}`")]
    DuplicateRoute {
        method: Method,
        path: String,
        first: String,
        second: String,
    },
    #[error("route {path} (`{second}`) conflicts with {existing} (`{first}`): templates differ only in parameter names")]
    ConflictingPath {
        path: String,
        existing: String,
        first: String,
        second: String,
    },
    #[error("operationId `{operation_id}` is used by both `{first}` and `{second}`")]
    DuplicateOperationId {
        operation_id: String,
        first: String,
        second: String,
    },
    #[error("route {method} {path} (`{operation}`) shadows the document path")]
    DocumentPathConflict {
        method: Method,
        path: String,
        operation: String,
    },
    #[error("unresolved schema reference `{reference}` at {location}")]
    UnresolvedReference { reference: String, location: String },
    #[error("malformed schema `{name}`: {reason}")]
    MalformedSchema { name: String, reason: String },
    #[error("invalid response status `{status}` on {method} {path}")]
    InvalidStatusCode {
        method: Method,
        path: String,
        status: String,
    },
    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
