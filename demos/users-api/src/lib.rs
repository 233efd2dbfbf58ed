//! Users API: a small user service whose OpenAPI document is assembled
//! from explicitly attached metadata and served at `openapi.path`.

pub mod controllers;
pub mod models;
pub mod services;
pub mod state;

use controllers::user_controller::UsersController;
use models::User;
use serde_json::json;
use specmint::openapi::{ApiRegistry, OpenApiConfig, OpenApiPlugin, SchemaError};
use specmint::{AppBuilder, AppConfig, ConfigError};
use state::Services;

/// Schemas and controller metadata for the users API.
pub fn api_registry() -> Result<ApiRegistry, SchemaError> {
    let mut registry = ApiRegistry::new();
    registry
        .register_provider::<User>()
        .document::<UsersController>()
        .register_schema(
            "Post",
            json!({
                "type": "object",
                "properties": {
                    "id": {"type": "integer", "minimum": 1, "readOnly": true},
                    "content": {"type": "string"}
                },
                "required": ["id"],
                "example": {"id": 1, "content": "lorem ipsum dolor"}
            }),
        )?
        // Non-object schemas register the same way.
        .register_schema("uuid", json!({"type": "string", "format": "uuid"}))?
        .register_schema(
            "successfulHttpStatus",
            json!({"type": "integer", "minimum": 200, "maximum": 299}),
        )?;
    Ok(registry)
}

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// The application, ready to build or serve.
pub fn app(config: AppConfig) -> Result<AppBuilder<Services>, SetupError> {
    let openapi = OpenApiConfig::from_config(&config)?;
    let registry = api_registry()?;

    Ok(AppBuilder::new()
        .with_config(config)
        .with_state(Services::default())
        .register_controller::<UsersController>()
        .with(OpenApiPlugin::new(openapi, registry))
        .with_tracing())
}
