//! Specmint: explicit controller metadata over Axum, assembled into an
//! OpenAPI document.
//!
//! This facade crate re-exports the Specmint sub-crates through a single
//! dependency. Import the common types with:
//!
//! ```ignore
//! use specmint::prelude::*;
//! ```
//!
//! # Feature flags
//!
//! | Feature   | Default | Crate              |
//! |-----------|---------|--------------------|
//! | `openapi` | **yes** | `specmint-openapi` |

pub extern crate specmint_core;

// Re-export everything from specmint-core at the top level for convenience.
pub use specmint_core::*;

#[cfg(feature = "openapi")]
pub use specmint_openapi as openapi;

/// Unified prelude: import everything with `use specmint::prelude::*`.
pub mod prelude {
    pub use specmint_core::http::extract::{Path, Query, State};
    pub use specmint_core::http::{IntoResponse, Json, Method, Response, Router, StatusCode};
    pub use specmint_core::{AppBuilder, AppConfig, Controller, HttpError, Plugin, Routes};

    #[cfg(feature = "openapi")]
    pub use specmint_openapi::{
        ApiRegistry, ControllerDoc, Documented, MediaTypeSpec, OpenApiConfig, OpenApiPlugin, OperationFragment,
        ParameterSpec, RequestBodySpec, ResponseSpec, SchemaDefinition, SchemaProvider, SchemaRef,
    };
}
