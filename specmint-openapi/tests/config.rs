use specmint_core::{AppConfig, ConfigError};
use specmint_openapi::{OpenApiConfig, DEFAULT_DOCUMENT_PATH};

#[test]
fn config_new() {
    let config = OpenApiConfig::new("My API", "2.0.0");
    assert_eq!(config.title, "My API");
    assert_eq!(config.version, "2.0.0");
    assert!(config.description.is_none());
    assert_eq!(config.path, DEFAULT_DOCUMENT_PATH);
}

#[test]
fn config_with_description_and_path() {
    let config = OpenApiConfig::new("API", "1.0")
        .with_description("A test API")
        .with_path("/docs//openapi.json/");
    assert_eq!(config.description.as_deref(), Some("A test API"));
    assert_eq!(config.path, "/docs/openapi.json");
}

#[test]
fn from_config_reads_openapi_section() {
    let app = AppConfig::from_yaml_str(
        r#"
openapi:
  title: Users API
  version: "1.2.0"
  description: Manage users
  path: /api-docs.json
"#,
        "test",
    )
    .unwrap();

    let config = OpenApiConfig::from_config(&app).unwrap();
    assert_eq!(config.title, "Users API");
    assert_eq!(config.version, "1.2.0");
    assert_eq!(config.description.as_deref(), Some("Manage users"));
    assert_eq!(config.path, "/api-docs.json");
}

#[test]
fn from_config_defaults() {
    let config = OpenApiConfig::from_config(&AppConfig::empty()).unwrap();
    assert_eq!(config, OpenApiConfig::default());
}

#[test]
fn from_config_rejects_wrong_type() {
    let app = AppConfig::from_yaml_str("openapi:\n  title: [a, b]\n", "test").unwrap();
    let err = OpenApiConfig::from_config(&app).unwrap_err();
    assert!(matches!(err, ConfigError::TypeMismatch { ref key, .. } if key == "openapi.title"));
}
