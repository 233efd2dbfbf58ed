use axum::body::Body;
use axum::extract::Path;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use specmint_core::http::routing::get;
use specmint_core::http::Router;
use specmint_core::{AppBuilder, BuildError, Controller, ControllerInfo, Plugin, Routes};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

async fn send(router: Router, method: Method, path: &str) -> (StatusCode, String) {
    let req = Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&body).to_string())
}

struct UsersController;

impl Controller<()> for UsersController {
    fn base_path() -> &'static str {
        "/users"
    }

    fn routes(routes: Routes<()>) -> Routes<()> {
        routes
            .get("/", "getUsers", || async { "list" })
            .get("/:id", "getUserById", |Path(id): Path<String>| async move {
                format!("user {id}")
            })
            .put("/:id", "upsertUser", |Path(id): Path<String>| async move {
                format!("upsert {id}")
            })
    }
}

struct ClashingController;

impl Controller<()> for ClashingController {
    fn base_path() -> &'static str {
        "/users/"
    }

    fn routes(routes: Routes<()>) -> Routes<()> {
        routes.get("//:id", "shadow", || async { "shadow" })
    }
}

struct ItemsController;

impl Controller<()> for ItemsController {
    fn base_path() -> &'static str {
        "/items"
    }

    fn routes(routes: Routes<()>) -> Routes<()> {
        routes
            .get("/:id", "getItem", || async { "item" })
            .put("/:item_id", "putItem", || async { "stored" })
    }
}

struct RenamedParamController;

impl Controller<()> for RenamedParamController {
    fn base_path() -> &'static str {
        "/users"
    }

    fn routes(routes: Routes<()>) -> Routes<()> {
        routes.get("/:user_id", "getUserAgain", || async { "again" })
    }
}

fn build_app() -> AppBuilder<()> {
    AppBuilder::new().with_state(())
}

// ── Controllers ──────────────────────────────────────────────────────────

#[tokio::test]
async fn controller_routes_are_mounted_under_base_path() {
    let router = build_app()
        .register_controller::<UsersController>()
        .build()
        .unwrap();

    let (status, body) = send(router.clone(), Method::GET, "/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "list");

    let (status, body) = send(router.clone(), Method::GET, "/users/42").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "user 42");

    let (status, body) = send(router, Method::PUT, "/users/42").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "upsert 42");
}

#[tokio::test]
async fn unregistered_method_is_rejected() {
    let router = build_app()
        .register_controller::<UsersController>()
        .build()
        .unwrap();

    let (status, _) = send(router, Method::DELETE, "/users/42").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[test]
fn duplicate_route_fails_build() {
    let err = build_app()
        .register_controller::<UsersController>()
        .register_controller::<ClashingController>()
        .build()
        .unwrap_err();

    match err {
        BuildError::DuplicateRoute { method, path } => {
            assert_eq!(method, Method::GET);
            assert_eq!(path, "/users/{id}");
        }
        other => panic!("expected DuplicateRoute, got {other:?}"),
    }
}

#[test]
fn param_names_conflict_across_methods() {
    let err = build_app()
        .register_controller::<ItemsController>()
        .build()
        .unwrap_err();

    match err {
        BuildError::ConflictingRoute { path, existing } => {
            assert_eq!(path, "/items/{item_id}");
            assert_eq!(existing, "/items/{id}");
        }
        other => panic!("expected ConflictingRoute, got {other:?}"),
    }
}

#[test]
fn param_names_conflict_across_controllers() {
    let err = build_app()
        .register_controller::<UsersController>()
        .register_controller::<RenamedParamController>()
        .build()
        .unwrap_err();

    assert!(matches!(err, BuildError::ConflictingRoute { .. }));
    assert!(err.to_string().contains("/users/{user_id}"));
}

#[test]
fn controller_name_defaults_to_type_name() {
    assert_eq!(<UsersController as Controller<()>>::name(), "UsersController");
}

// ── Meta consumers ───────────────────────────────────────────────────────

#[test]
fn meta_consumer_sees_controller_topology() {
    let seen: Arc<Mutex<Vec<(String, usize)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    build_app()
        .register_controller::<UsersController>()
        .with_meta_consumer::<ControllerInfo, _>(move |controllers| {
            let mut sink = sink.lock().unwrap();
            for c in controllers {
                sink.push((c.base_path.clone(), c.operations.len()));
            }
            Ok(Router::new())
        })
        .build()
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![("/users".to_string(), 3)]);
}

#[test]
fn meta_consumer_error_aborts_build() {
    let err = build_app()
        .register_controller::<UsersController>()
        .with_meta_consumer::<ControllerInfo, _>(|_| Err("document rejected".into()))
        .build()
        .unwrap_err();

    assert!(matches!(err, BuildError::Plugin(_)));
    assert!(err.to_string().contains("document rejected"));
}

// ── Plugins ──────────────────────────────────────────────────────────────

struct Ping;

impl Plugin for Ping {
    fn install<T: Clone + Send + Sync + 'static>(self, app: AppBuilder<T>) -> AppBuilder<T> {
        app.with_meta_consumer::<ControllerInfo, _>(|_| {
            Ok(Router::new().route("/ping", get(|| async { "pong" })))
        })
    }
}

#[tokio::test]
async fn plugin_router_is_merged() {
    let router = build_app()
        .with(Ping)
        .register_controller::<UsersController>()
        .with_tracing()
        .build()
        .unwrap();

    let (status, body) = send(router.clone(), Method::GET, "/ping").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "pong");

    let (status, _) = send(router, Method::GET, "/users").await;
    assert_eq!(status, StatusCode::OK);
}
