//! OpenAPI 3.0 document assembly.
//!
//! Schemas and operation metadata are registered explicitly into an
//! [`ApiRegistry`], merged field by field, joined with the route topology of
//! the attached controllers and assembled into one immutable [`Document`].
//! [`OpenApiPlugin`] does this during `AppBuilder::build()` and serves the
//! result.

mod assembler;
mod collector;
mod config;
mod document;
mod error;
mod ext;
mod handlers;
pub mod metadata;
mod registry;
pub mod schema;

pub use assembler::assemble;
pub use collector::{collect_routes, RouteDescriptor};
pub use config::{OpenApiConfig, DEFAULT_DOCUMENT_PATH};
pub use document::{Components, Document, Info, Operation, PathItem, RequestBody, Response, Tag, OPENAPI_VERSION};
pub use error::{AssemblyError, SchemaError};
pub use ext::OpenApiPlugin;
pub use handlers::openapi_routes;
pub use metadata::{
    Annotate, ControllerMetadata, MediaTypeSpec, MetadataStore, OperationFragment, OperationMetadata,
    ParamLocation, ParameterSpec, RequestBodySpec, ResponseSpec,
};
pub use registry::{ApiRegistry, ControllerDoc, Documented, SharedApiRegistry};
pub use schema::{
    InstanceType, Reference, SchemaDefinition, SchemaKind, SchemaProvider, SchemaRef, SchemaRegistry,
};
