use crate::error::AssemblyError;
use crate::metadata::{MetadataStore, OperationMetadata};
use specmint_core::http::Method;
use specmint_core::path::{join_paths, route_shape};
use std::collections::HashMap;
use tracing::debug;

/// One operation resolved to its full path.
#[derive(Debug, Clone)]
pub struct RouteDescriptor<'a> {
    /// Base path joined with the operation's fragment, normalized.
    pub full_path: String,
    pub method: Method,
    pub controller: &'a str,
    pub operation_id: &'a str,
    pub operation: &'a OperationMetadata,
    pub default_tag: Option<String>,
}

impl RouteDescriptor<'_> {
    pub(crate) fn label(&self) -> String {
        format!("{}.{}", self.controller, self.operation_id)
    }
}

/// Walk the attached controllers in attachment order and resolve every
/// routed operation.
///
/// Operations that carry metadata but were never given a method and path
/// are skipped. Routes are compared by [`route_shape`], so `/users/{id}` and
/// `/users/{user_id}` are the same path:
///
/// - same shape and method: [`AssemblyError::DuplicateRoute`]
/// - same shape, different parameter names: [`AssemblyError::ConflictingPath`]
/// - an operation id routed twice: [`AssemblyError::DuplicateOperationId`]
pub fn collect_routes<'a>(
    store: &'a MetadataStore,
    attached: &'a [String],
) -> Result<Vec<RouteDescriptor<'a>>, AssemblyError> {
    let mut routes: Vec<RouteDescriptor<'a>> = Vec::new();
    // shape -> index of the first route with that shape
    let mut shapes: HashMap<String, usize> = HashMap::new();
    let mut seen: HashMap<(String, Method), usize> = HashMap::new();
    let mut operation_ids: HashMap<&'a str, usize> = HashMap::new();

    for controller_id in attached {
        let Some(controller) = store.controller(controller_id) else {
            debug!(controller = %controller_id, "Attached controller has no metadata");
            continue;
        };
        let base_path = controller.base_path.as_deref().unwrap_or("/");
        let default_tag = controller.default_tag();

        for (operation_id, operation) in &controller.operations {
            let (Some(method), Some(path)) = (&operation.method, &operation.path) else {
                debug!(
                    controller = %controller_id,
                    operation = %operation_id,
                    "Operation has no route, skipping"
                );
                continue;
            };

            let descriptor = RouteDescriptor {
                full_path: join_paths(base_path, path),
                method: method.clone(),
                controller: controller_id,
                operation_id,
                operation,
                default_tag: default_tag.clone(),
            };

            let shape = route_shape(&descriptor.full_path);
            if let Some(&index) = shapes.get(&shape) {
                let existing = &routes[index];
                if existing.full_path != descriptor.full_path {
                    return Err(AssemblyError::ConflictingPath {
                        path: descriptor.full_path.clone(),
                        existing: existing.full_path.clone(),
                        first: existing.label(),
                        second: descriptor.label(),
                    });
                }
            }

            let key = (shape.clone(), descriptor.method.clone());
            if let Some(&index) = seen.get(&key) {
                return Err(AssemblyError::DuplicateRoute {
                    method: descriptor.method.clone(),
                    path: descriptor.full_path.clone(),
                    first: routes[index].label(),
                    second: descriptor.label(),
                });
            }

            if let Some(&index) = operation_ids.get(descriptor.operation_id) {
                return Err(AssemblyError::DuplicateOperationId {
                    operation_id: descriptor.operation_id.to_string(),
                    first: routes[index].label(),
                    second: descriptor.label(),
                });
            }

            shapes.entry(shape).or_insert(routes.len());
            seen.insert(key, routes.len());
            operation_ids.insert(descriptor.operation_id, routes.len());
            routes.push(descriptor);
        }
    }

    Ok(routes)
}
