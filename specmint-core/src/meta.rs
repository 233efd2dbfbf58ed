use crate::http::Method;
use std::any::{Any, TypeId};
use std::collections::HashMap;

/// A generic, type-erased metadata registry.
///
/// [`AppBuilder::register_controller`](crate::builder::AppBuilder::register_controller)
/// pushes a [`ControllerInfo`] per attached controller, and plugins read it
/// back through [`AppBuilder::with_meta_consumer`](crate::builder::AppBuilder::with_meta_consumer).
///
/// Internally stores `Vec<M>` per type, keyed by `TypeId`, so items of one
/// type come back in the order they were pushed.
#[derive(Default)]
pub struct MetaRegistry {
    inner: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl MetaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a single metadata item into the registry.
    pub fn push<M: Any + Send + Sync>(&mut self, item: M) {
        self.entry::<M>().push(item);
    }

    /// All metadata of a given type, or an empty slice.
    pub fn get_or_empty<M: Any + Send + Sync>(&self) -> &[M] {
        self.inner
            .get(&TypeId::of::<M>())
            .and_then(|boxed| boxed.downcast_ref::<Vec<M>>())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    fn entry<M: Any + Send + Sync>(&mut self) -> &mut Vec<M> {
        let slot = self
            .inner
            .entry(TypeId::of::<M>())
            .or_insert_with(|| Box::new(Vec::<M>::new()));
        // The slot for `TypeId::of::<M>()` only ever holds a `Vec<M>`.
        match slot.downcast_mut::<Vec<M>>() {
            Some(items) => items,
            None => unreachable!("MetaRegistry slot holds a foreign type"),
        }
    }
}

// ── Route topology ──────────────────────────────────────────────────────────

/// Route topology of one attached controller.
#[derive(Debug, Clone)]
pub struct ControllerInfo {
    /// Controller identity, see [`Controller::name`](crate::controller::Controller::name).
    pub name: &'static str,
    pub base_path: String,
    pub operations: Vec<OperationInfo>,
}

/// One operation registered through [`Routes`](crate::controller::Routes).
#[derive(Debug, Clone)]
pub struct OperationInfo {
    pub operation_id: String,
    pub method: Method,
    /// Path fragment as declared, relative to the controller base path.
    pub path: String,
}
