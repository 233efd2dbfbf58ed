use crate::http::routing::{self, MethodRouter};
use crate::http::Method;
use crate::meta::{ControllerInfo, OperationInfo};
use crate::path::join_paths;
use axum::handler::Handler;

/// A group of handlers sharing one base path.
///
/// Controllers register each operation explicitly through [`Routes`]; the
/// builder keeps both the axum method routers and the route topology that
/// documentation plugins read from the [`MetaRegistry`](crate::meta::MetaRegistry).
///
/// ```ignore
/// struct UsersController;
///
/// impl Controller<()> for UsersController {
///     fn base_path() -> &'static str {
///         "/users"
///     }
///
///     fn routes(routes: Routes<()>) -> Routes<()> {
///         routes
///             .get("/", "getUsers", list_users)
///             .get("/:id", "getUserById", get_user)
///     }
/// }
/// ```
pub trait Controller<T: Clone + Send + Sync + 'static> {
    /// Base path every operation of this controller is mounted under.
    fn base_path() -> &'static str;

    /// Register the controller's operations.
    fn routes(routes: Routes<T>) -> Routes<T>;

    /// Controller identity used to key attached metadata.
    ///
    /// Defaults to the unqualified type name.
    fn name() -> &'static str
    where
        Self: Sized,
    {
        short_type_name::<Self>()
    }
}

/// Unqualified name of `C` (`my_app::UsersController` → `UsersController`).
pub fn short_type_name<C: ?Sized>() -> &'static str {
    let full = std::any::type_name::<C>();
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}

/// A mounted route waiting for [`AppBuilder::build`](crate::builder::AppBuilder::build).
pub(crate) struct PendingRoute<T> {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) router: MethodRouter<T>,
}

/// Route registration builder handed to [`Controller::routes`].
pub struct Routes<T> {
    name: &'static str,
    base_path: String,
    operations: Vec<OperationInfo>,
    pending: Vec<PendingRoute<T>>,
}

impl<T: Clone + Send + Sync + 'static> Routes<T> {
    pub fn new(name: &'static str, base_path: &str) -> Self {
        Self {
            name,
            base_path: base_path.to_string(),
            operations: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Register an operation with an explicit method and method router.
    ///
    /// `router` must answer `method`; the helpers below build it for you.
    pub fn route(
        mut self,
        method: Method,
        path: &str,
        operation_id: &str,
        router: MethodRouter<T>,
    ) -> Self {
        self.pending.push(PendingRoute {
            method: method.clone(),
            path: join_paths(&self.base_path, path),
            router,
        });
        self.operations.push(OperationInfo {
            operation_id: operation_id.to_string(),
            method,
            path: path.to_string(),
        });
        self
    }

    pub fn get<H, X>(self, path: &str, operation_id: &str, handler: H) -> Self
    where
        H: Handler<X, T>,
        X: 'static,
    {
        self.route(Method::GET, path, operation_id, routing::get(handler))
    }

    pub fn post<H, X>(self, path: &str, operation_id: &str, handler: H) -> Self
    where
        H: Handler<X, T>,
        X: 'static,
    {
        self.route(Method::POST, path, operation_id, routing::post(handler))
    }

    pub fn put<H, X>(self, path: &str, operation_id: &str, handler: H) -> Self
    where
        H: Handler<X, T>,
        X: 'static,
    {
        self.route(Method::PUT, path, operation_id, routing::put(handler))
    }

    pub fn patch<H, X>(self, path: &str, operation_id: &str, handler: H) -> Self
    where
        H: Handler<X, T>,
        X: 'static,
    {
        self.route(Method::PATCH, path, operation_id, routing::patch(handler))
    }

    pub fn delete<H, X>(self, path: &str, operation_id: &str, handler: H) -> Self
    where
        H: Handler<X, T>,
        X: 'static,
    {
        self.route(Method::DELETE, path, operation_id, routing::delete(handler))
    }

    pub(crate) fn into_parts(self) -> (ControllerInfo, Vec<PendingRoute<T>>) {
        let info = ControllerInfo {
            name: self.name,
            base_path: self.base_path,
            operations: self.operations,
        };
        (info, self.pending)
    }
}
