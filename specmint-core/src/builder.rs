use crate::config::AppConfig;
use crate::controller::{Controller, PendingRoute, Routes};
use crate::error::{BoxError, BuildError};
use crate::http::routing::MethodRouter;
use crate::http::Router;
use crate::layers::default_trace;
use crate::meta::{ControllerInfo, MetaRegistry};
use crate::path::route_shape;
use crate::plugin::Plugin;
use std::any::Any;
use std::collections::HashSet;
use tracing::{debug, info};

/// A meta consumer that reads typed metadata from the registry and returns
/// a router fragment to be merged into the application.
type MetaConsumer<T> = Box<dyn FnOnce(&MetaRegistry) -> Result<crate::http::Router<T>, BoxError> + Send>;

/// Marker type: application state has not been set yet.
///
/// `AppBuilder<NoState>` is the initial phase returned by [`AppBuilder::new()`].
/// Call [`.with_state()`](AppBuilder::with_state) to transition to `AppBuilder<T>`.
#[derive(Clone)]
pub struct NoState;

/// Builder for assembling a Specmint application.
///
/// Collects state, controller routes, and plugins, then produces an
/// `axum::Router` (or starts serving directly) with everything wired together.
///
/// Meta consumers run before any controller route is mounted, so a plugin
/// that rejects the collected metadata aborts [`build`](Self::build) without
/// leaving a partially-wired router behind.
pub struct AppBuilder<T: Clone + Send + Sync + 'static = NoState> {
    state: T,
    config: Option<AppConfig>,
    tracing: bool,
    routes: Vec<PendingRoute<T>>,
    meta_registry: MetaRegistry,
    meta_consumers: Vec<MetaConsumer<T>>,
}

impl AppBuilder<NoState> {
    /// Create a new, empty builder in the pre-state phase.
    pub fn new() -> Self {
        Self {
            state: NoState,
            config: None,
            tracing: false,
            routes: Vec::new(),
            meta_registry: MetaRegistry::new(),
            meta_consumers: Vec::new(),
        }
    }

    /// Provide the application state handlers extract with `State<T>`.
    ///
    /// Configuration and the tracing flag carry over; register controllers
    /// and plugins after this call.
    pub fn with_state<S: Clone + Send + Sync + 'static>(self, state: S) -> AppBuilder<S> {
        AppBuilder {
            state,
            config: self.config,
            tracing: self.tracing,
            routes: Vec::new(),
            meta_registry: MetaRegistry::new(),
            meta_consumers: Vec::new(),
        }
    }
}

impl Default for AppBuilder<NoState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> AppBuilder<T> {
    /// Attach an application configuration, readable by plugins via [`config`](Self::config).
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn config(&self) -> Option<&AppConfig> {
        self.config.as_ref()
    }

    /// Wrap the final router in [`default_trace`].
    pub fn with_tracing(mut self) -> Self {
        self.tracing = true;
        self
    }

    /// Attach a controller: its routes are mounted at build time and its
    /// topology is published as a [`ControllerInfo`] in the meta registry.
    pub fn register_controller<C: Controller<T>>(mut self) -> Self {
        let routes = C::routes(Routes::new(C::name(), C::base_path()));
        let (info, pending) = routes.into_parts();
        debug!(
            controller = info.name,
            base_path = %info.base_path,
            operations = info.operations.len(),
            "Controller registered"
        );
        self.meta_registry.push::<ControllerInfo>(info);
        self.routes.extend(pending);
        self
    }

    /// Register a consumer for all metadata items of type `M`.
    ///
    /// The consumer runs once during [`build`](Self::build) and returns a
    /// router fragment that is merged into the application. An error aborts
    /// the build.
    pub fn with_meta_consumer<M, F>(mut self, consumer: F) -> Self
    where
        M: Any + Send + Sync,
        F: FnOnce(&[M]) -> Result<Router<T>, BoxError> + Send + 'static,
    {
        self.meta_consumers
            .push(Box::new(move |registry| consumer(registry.get_or_empty::<M>())));
        self
    }

    /// Install a plugin.
    pub fn with<P: Plugin>(self, plugin: P) -> Self {
        debug!(plugin = P::name(), "Installing plugin");
        plugin.install(self)
    }

    /// Build the final `axum::Router`.
    pub fn build(self) -> Result<Router, BuildError> {
        let AppBuilder {
            state,
            tracing,
            routes,
            meta_registry,
            meta_consumers,
            ..
        } = self;

        let mut router = Router::<T>::new();
        for consumer in meta_consumers {
            let fragment = consumer(&meta_registry).map_err(BuildError::Plugin)?;
            router = router.merge(fragment);
        }

        for (path, method_router) in group_by_path(routes)? {
            router = router.route(&path, method_router);
        }

        let mut app = router.with_state(state);
        if tracing {
            app = app.layer(default_trace());
        }
        Ok(app)
    }

    /// Build the router and serve it on `addr` until the server stops.
    pub async fn serve(self, addr: &str) -> Result<(), BuildError> {
        let app = self.build()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(addr = %addr, "Specmint server listening");
        crate::http::serve(listener, app).await?;
        Ok(())
    }
}

/// Merge method routers that share a path.
///
/// Paths are compared by [`route_shape`]: a duplicate `(method, shape)` and
/// two templates that differ only in parameter names are both rejected,
/// since axum refuses to insert either.
fn group_by_path<T: Clone + Send + Sync + 'static>(
    routes: Vec<PendingRoute<T>>,
) -> Result<Vec<(String, MethodRouter<T>)>, BuildError> {
    let mut seen = HashSet::new();
    let mut grouped: Vec<(String, String, MethodRouter<T>)> = Vec::new();

    for route in routes {
        let shape = route_shape(&route.path);
        let idx = grouped.iter().position(|(existing, _, _)| *existing == shape);
        if let Some(idx) = idx {
            let existing = &grouped[idx].1;
            if *existing != route.path {
                return Err(BuildError::ConflictingRoute {
                    path: route.path,
                    existing: existing.clone(),
                });
            }
        }
        if !seen.insert((route.method.clone(), shape.clone())) {
            return Err(BuildError::DuplicateRoute {
                method: route.method,
                path: route.path,
            });
        }
        match idx {
            Some(idx) => {
                let (shape, path, existing) = grouped.remove(idx);
                grouped.insert(idx, (shape, path, existing.merge(route.router)));
            }
            None => grouped.push((shape, route.path, route.router)),
        }
    }

    Ok(grouped
        .into_iter()
        .map(|(_, path, router)| (path, router))
        .collect())
}
