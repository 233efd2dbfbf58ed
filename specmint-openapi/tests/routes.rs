use http::Request;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use specmint_core::http::extract::Path;
use specmint_core::http::body::Body;
use specmint_core::http::{Router, StatusCode};
use specmint_core::{AppBuilder, BuildError, Controller, Routes};
use specmint_openapi::{
    openapi_routes, ApiRegistry, ControllerDoc, Documented, OpenApiConfig, OpenApiPlugin, OperationFragment,
    ParameterSpec, ResponseSpec, SchemaRef, SharedApiRegistry,
};
use tower::ServiceExt;

// ── Helpers ─────────────────────────────────────────────────────────────────

async fn get_response(router: Router, path: &str) -> (StatusCode, String, http::HeaderMap) {
    let req = Request::builder()
        .uri(path)
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap(), headers)
}

struct UsersController;

impl Controller<()> for UsersController {
    fn base_path() -> &'static str {
        "/users"
    }

    fn routes(routes: Routes<()>) -> Routes<()> {
        routes
            .get("/", "getUsers", || async { "[]" })
            .get("/:id", "getUserById", |Path(id): Path<String>| async move { id })
    }
}

impl Documented for UsersController {
    fn document(doc: ControllerDoc<'_>) -> ControllerDoc<'_> {
        doc.operation(
            "getUsers",
            OperationFragment::new()
                .summary("List users")
                .response(200, ResponseSpec::json(SchemaRef::named("User"))),
        )
        .operation(
            "getUserById",
            OperationFragment::new()
                .parameter(ParameterSpec::path("id"))
                .response(404, ResponseSpec::described("No such user")),
        )
    }
}

fn documented_registry() -> ApiRegistry {
    let mut registry = ApiRegistry::new();
    registry
        .register_schema(
            "User",
            json!({"type": "object", "properties": {"name": {"type": "string"}}}),
        )
        .unwrap()
        .document::<UsersController>();
    registry
}

fn app(registry: impl Into<SharedApiRegistry>, config: OpenApiConfig) -> Result<Router, BuildError> {
    AppBuilder::new()
        .with_state(())
        .register_controller::<UsersController>()
        .with(OpenApiPlugin::new(config, registry))
        .build()
}

// ── Publication ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn openapi_routes_serve_document() {
    let mut registry = documented_registry();
    registry
        .controller("UsersController")
        .base_path("/users")
        .get("/", "getUsers", OperationFragment::new())
        .get("/:id", "getUserById", OperationFragment::new());
    let document = registry.assemble(&OpenApiConfig::new("Test API", "1.0.0")).unwrap();
    let router: Router = openapi_routes::<()>("/openapi.json", &document).unwrap();

    let (status, body, headers) = get_response(router, "/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("content-type").unwrap(), "application/json");
    assert_eq!(body, document.to_json().unwrap());
}

// ── Plugin ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn plugin_serves_assembled_document() {
    let router = app(documented_registry(), OpenApiConfig::new("Test API", "1.0.0")).unwrap();

    let (status, body, _) = get_response(router.clone(), "/openapi.json").await;
    assert_eq!(status, StatusCode::OK);

    let doc: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(doc["info"]["title"], "Test API");
    assert_eq!(doc["paths"]["/users"]["get"]["summary"], "List users");
    assert_eq!(
        doc["paths"]["/users"]["get"]["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/User"
    );
    assert_eq!(
        doc["paths"]["/users/{id}"]["get"]["responses"]["404"]["description"],
        "No such user"
    );
    assert_eq!(doc["tags"], json!([{"name": "users"}]));

    let (status, body, _) = get_response(router, "/users/7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "7");
}

#[tokio::test]
async fn plugin_uses_configured_path() {
    let config = OpenApiConfig::new("Test API", "1.0.0").with_path("docs/api.json");
    let router = app(documented_registry(), config).unwrap();

    let (status, _, _) = get_response(router.clone(), "/docs/api.json").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = get_response(router, "/openapi.json").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[test]
fn assembly_error_aborts_build() {
    // No `User` schema: the documented 200 response cannot resolve.
    let mut registry = ApiRegistry::new();
    registry.document::<UsersController>();

    let err = app(registry, OpenApiConfig::default()).unwrap_err();
    assert!(matches!(err, BuildError::Plugin(_)));
    assert!(err.to_string().contains("unresolved schema reference `User`"));
}

struct DocsController;

impl Controller<()> for DocsController {
    fn base_path() -> &'static str {
        "/"
    }

    fn routes(routes: Routes<()>) -> Routes<()> {
        routes.get("/openapi.json", "rawDocument", || async { "{}" })
    }
}

#[test]
fn controller_on_document_path_aborts_build() {
    let err = AppBuilder::new()
        .with_state(())
        .register_controller::<DocsController>()
        .with(OpenApiPlugin::new(OpenApiConfig::default(), ApiRegistry::new()))
        .build()
        .unwrap_err();

    assert!(matches!(err, BuildError::Plugin(_)));
    assert!(err.to_string().contains("shadows the document path"));
}

#[test]
fn shared_registry_sees_attached_topology() {
    let shared = SharedApiRegistry::from(documented_registry());
    app(shared.clone(), OpenApiConfig::default()).unwrap();

    let registry = shared.read();
    assert_eq!(registry.attached(), ["UsersController".to_string()]);
    let op = registry.metadata().operation("UsersController", "getUserById").unwrap();
    assert_eq!(op.path.as_deref(), Some("/:id"));
    drop(registry);

    let document = shared.assemble(&OpenApiConfig::default()).unwrap();
    assert_eq!(document.operation_count(), 2);
}

#[test]
fn load_pass_runs_under_one_lock() {
    let shared = SharedApiRegistry::new();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let shared = shared.clone();
            std::thread::spawn(move || {
                shared.load(|registry| {
                    let name = format!("Schema{i}");
                    registry
                        .register_schema(&name, json!({"type": "string"}))
                        .unwrap();
                    registry
                        .controller("PingController")
                        .base_path("/ping")
                        .operation("ping", OperationFragment::new().tag(name));
                })
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let registry = shared.read();
    assert_eq!(registry.schemas().len(), 4);
    let tags = &registry.metadata().operation("PingController", "ping").unwrap().tags;
    assert_eq!(tags.len(), 4);
}
