use crate::registry::SharedApiRegistry;
use crate::{openapi_routes, OpenApiConfig};
use specmint_core::{AppBuilder, ControllerInfo, Plugin};

/// Plugin that assembles the OpenAPI document at build time and serves it.
///
/// The route topology of every controller registered on the builder is
/// attached to the registry, then the document is assembled once. An
/// assembly error aborts `AppBuilder::build()` before any route is mounted.
///
/// # Example
///
/// ```ignore
/// use specmint_openapi::{ApiRegistry, OpenApiConfig, OpenApiPlugin};
///
/// let mut registry = ApiRegistry::new();
/// registry.document::<UsersController>();
///
/// AppBuilder::new()
///     .with_state(())
///     .register_controller::<UsersController>()
///     .with(OpenApiPlugin::new(OpenApiConfig::new("My API", "1.0.0"), registry))
///     .build()?;
/// ```
pub struct OpenApiPlugin {
    config: OpenApiConfig,
    registry: SharedApiRegistry,
}

impl OpenApiPlugin {
    pub fn new(config: OpenApiConfig, registry: impl Into<SharedApiRegistry>) -> Self {
        Self {
            config,
            registry: registry.into(),
        }
    }
}

impl Plugin for OpenApiPlugin {
    fn install<T: Clone + Send + Sync + 'static>(self, app: AppBuilder<T>) -> AppBuilder<T> {
        let OpenApiPlugin { config, registry } = self;
        app.with_meta_consumer::<ControllerInfo, _>(move |controllers| {
            let document = registry.load(|registry| {
                for info in controllers {
                    registry.attach_controller_info(info);
                }
                registry.assemble(&config)
            })?;
            Ok(openapi_routes::<T>(&config.path, &document)?)
        })
    }
}
