use crate::assembler::assemble;
use crate::collector::{collect_routes, RouteDescriptor};
use crate::config::OpenApiConfig;
use crate::document::Document;
use crate::error::{AssemblyError, SchemaError};
use crate::metadata::{Annotate, MetadataStore, OperationFragment};
use crate::schema::{SchemaDefinition, SchemaProvider, SchemaRegistry};
use serde_json::Value;
use specmint_core::http::Method;
use specmint_core::{short_type_name, ControllerInfo};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

/// Schemas, operation metadata and attached controllers for one document.
///
/// Everything is registered through `&mut self` during a load phase and
/// read once by [`assemble`](Self::assemble).
#[derive(Debug, Clone, Default)]
pub struct ApiRegistry {
    schemas: SchemaRegistry,
    metadata: MetadataStore,
    attached: Vec<String>,
}

impl ApiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema from its JSON form. The last registration of a name wins.
    pub fn register_schema(&mut self, name: &str, definition: Value) -> Result<&mut Self, SchemaError> {
        self.schemas.register_value(name, definition)?;
        Ok(self)
    }

    pub fn register_schema_definition(&mut self, name: &str, definition: SchemaDefinition) -> &mut Self {
        self.schemas.register(name, definition);
        self
    }

    pub fn register_provider<P: SchemaProvider>(&mut self) -> &mut Self {
        self.schemas.register_provider::<P>();
        self
    }

    pub fn register_type<T: schemars::JsonSchema>(&mut self) -> Result<&mut Self, SchemaError> {
        self.schemas.register_type::<T>()?;
        Ok(self)
    }

    /// Record the metadata a [`Documented`] controller declares about itself.
    pub fn document<C: Documented>(&mut self) -> &mut Self {
        C::document(ControllerDoc::new(self, C::name()));
        self
    }

    /// Declare metadata and routes for a controller by name.
    pub fn controller(&mut self, name: &str) -> ControllerDoc<'_> {
        ControllerDoc::new(self, name)
    }

    /// Attach a controller's route topology as collected by the app builder.
    pub fn attach_controller_info(&mut self, info: &ControllerInfo) {
        self.attach_controller(info.name, &info.base_path);
        for operation in &info.operations {
            self.metadata.record_route(
                info.name,
                &operation.operation_id,
                operation.method.clone(),
                &operation.path,
            );
        }
    }

    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    /// Attached controller ids, in attachment order.
    pub fn attached(&self) -> &[String] {
        &self.attached
    }

    pub fn collect_routes(&self) -> Result<Vec<RouteDescriptor<'_>>, AssemblyError> {
        collect_routes(&self.metadata, &self.attached)
    }

    pub fn assemble(&self, config: &OpenApiConfig) -> Result<Document, AssemblyError> {
        assemble(config, &self.schemas, &self.metadata, &self.attached)
    }

    fn mark_attached(&mut self, controller: &str) {
        if !self.attached.iter().any(|id| id == controller) {
            self.attached.push(controller.to_string());
        }
    }
}

impl Annotate for ApiRegistry {
    fn attach_metadata(&mut self, owner: &str, member: &str, fragment: OperationFragment) {
        self.metadata.record_operation(owner, member, fragment);
    }

    fn attach_controller(&mut self, owner: &str, base_path: &str) {
        self.metadata.record_controller(owner, base_path);
        self.mark_attached(owner);
    }
}

/// A controller that describes its own operations.
///
/// Pair it with [`Controller`](specmint_core::Controller): the operation ids
/// passed to [`Routes`](specmint_core::Routes) are the keys the fragments
/// recorded here merge into.
pub trait Documented {
    fn document(doc: ControllerDoc<'_>) -> ControllerDoc<'_>;

    /// Must match the controller's `Controller::name`.
    fn name() -> &'static str
    where
        Self: Sized,
    {
        short_type_name::<Self>()
    }
}

/// Metadata declarations scoped to one controller.
pub struct ControllerDoc<'a> {
    registry: &'a mut ApiRegistry,
    controller: String,
}

impl<'a> ControllerDoc<'a> {
    fn new(registry: &'a mut ApiRegistry, controller: &str) -> Self {
        Self {
            registry,
            controller: controller.to_string(),
        }
    }

    /// Declare the base path and attach the controller. The first declaration wins.
    pub fn base_path(mut self, base_path: &str) -> Self {
        self.registry.attach_controller(&self.controller, base_path);
        self
    }

    /// Override the tag derived from the base path.
    pub fn tag(mut self, tag: &str) -> Self {
        self.registry.metadata.set_default_tag(&self.controller, tag);
        self
    }

    /// Merge a metadata fragment into an operation.
    pub fn operation(mut self, operation_id: &str, fragment: OperationFragment) -> Self {
        self.registry
            .attach_metadata(&self.controller, operation_id, fragment);
        self
    }

    /// Declare an operation's route and merge its metadata.
    pub fn route(mut self, method: Method, path: &str, operation_id: &str, fragment: OperationFragment) -> Self {
        self.registry.mark_attached(&self.controller);
        self.registry
            .metadata
            .record_route(&self.controller, operation_id, method, path);
        self.operation(operation_id, fragment)
    }

    pub fn get(self, path: &str, operation_id: &str, fragment: OperationFragment) -> Self {
        self.route(Method::GET, path, operation_id, fragment)
    }

    pub fn post(self, path: &str, operation_id: &str, fragment: OperationFragment) -> Self {
        self.route(Method::POST, path, operation_id, fragment)
    }

    pub fn put(self, path: &str, operation_id: &str, fragment: OperationFragment) -> Self {
        self.route(Method::PUT, path, operation_id, fragment)
    }

    pub fn patch(self, path: &str, operation_id: &str, fragment: OperationFragment) -> Self {
        self.route(Method::PATCH, path, operation_id, fragment)
    }

    pub fn delete(self, path: &str, operation_id: &str, fragment: OperationFragment) -> Self {
        self.route(Method::DELETE, path, operation_id, fragment)
    }
}

/// An [`ApiRegistry`] shared between threads.
///
/// [`load`](Self::load) holds the write lock for the whole closure so a load
/// pass is never observed half-applied; readers take the read lock.
#[derive(Debug, Clone, Default)]
pub struct SharedApiRegistry {
    inner: Arc<RwLock<ApiRegistry>>,
}

impl SharedApiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a load pass under the write lock.
    pub fn load<R>(&self, f: impl FnOnce(&mut ApiRegistry) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ApiRegistry> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn assemble(&self, config: &OpenApiConfig) -> Result<Document, AssemblyError> {
        self.read().assemble(config)
    }
}

impl From<ApiRegistry> for SharedApiRegistry {
    fn from(registry: ApiRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }
}
