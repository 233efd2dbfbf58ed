//! axum re-exports so downstream crates depend on one HTTP surface.

pub use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri};
pub use axum::response::{IntoResponse, Response};
pub use axum::{serve, Json, Router};

pub mod body {
    pub use axum::body::Body;
}

pub mod extract {
    pub use axum::extract::{Path, Query, State};
}

pub mod routing {
    pub use axum::routing::{delete, get, on, patch, post, put, MethodFilter, MethodRouter};
}
