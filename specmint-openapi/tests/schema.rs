use schemars::JsonSchema;
use serde_json::{json, Value};
use specmint_openapi::schema::{SchemaDefinition, SchemaKind, SchemaProvider, SchemaRef, SchemaRegistry};
use specmint_openapi::SchemaError;

fn to_json(definition: &SchemaDefinition) -> Value {
    serde_json::to_value(definition).unwrap()
}

// ── Registration ────────────────────────────────────────────────────────────

#[test]
fn registry_new_empty() {
    let registry = SchemaRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.all().count(), 0);
}

#[test]
fn register_and_get() {
    let mut registry = SchemaRegistry::new();
    registry.register("uuid", SchemaDefinition::string().format("uuid"));

    assert!(registry.contains("uuid"));
    let uuid = registry.get("uuid").unwrap();
    assert_eq!(to_json(uuid), json!({"type": "string", "format": "uuid"}));
}

#[test]
fn get_missing_is_not_found() {
    let registry = SchemaRegistry::new();
    match registry.get("Ghost") {
        Err(SchemaError::NotFound(name)) => assert_eq!(name, "Ghost"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn register_duplicate_overwrites_in_place() {
    let mut registry = SchemaRegistry::new();
    registry
        .register_value("User", json!({"type": "object", "additionalProperties": true, "description": "v1"}))
        .unwrap();
    registry.register("Post", SchemaDefinition::object().additional_properties(true));
    registry
        .register_value("User", json!({"type": "object", "additionalProperties": true, "description": "v2"}))
        .unwrap();

    assert_eq!(registry.len(), 2);
    let names: Vec<&str> = registry.all().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["User", "Post"]);
    assert_eq!(registry.get("User").unwrap().description.as_deref(), Some("v2"));
}

#[test]
fn all_preserves_registration_order() {
    let mut registry = SchemaRegistry::new();
    for name in ["Zebra", "Apple", "Mango"] {
        registry.register(name, SchemaDefinition::string());
    }
    let names: Vec<&str> = registry.all().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["Zebra", "Apple", "Mango"]);
}

#[test]
fn register_value_rejects_non_schema() {
    let mut registry = SchemaRegistry::new();
    let err = registry
        .register_value("Broken", json!({"type": "strnig"}))
        .unwrap_err();
    assert!(matches!(err, SchemaError::Invalid { ref name, .. } if name == "Broken"));
    assert!(!registry.contains("Broken"));
}

#[test]
fn unknown_keywords_round_trip() {
    let mut registry = SchemaRegistry::new();
    let value = json!({
        "title": "Status",
        "oneOf": [{"$ref": "#/components/schemas/Ok"}, {"type": "integer"}],
        "x-internal": true
    });
    registry.register_value("Status", value.clone()).unwrap();
    assert_eq!(to_json(registry.get("Status").unwrap()), value);
}

#[test]
fn numeric_keywords_keep_their_form() {
    let mut registry = SchemaRegistry::new();
    registry
        .register_value("Age", json!({"type": "integer", "minimum": 0, "maximum": 150}))
        .unwrap();
    registry
        .register_value("Ratio", json!({"type": "number", "minimum": 0.5}))
        .unwrap();

    assert_eq!(to_json(registry.get("Age").unwrap())["maximum"], json!(150));
    assert_eq!(to_json(registry.get("Ratio").unwrap())["minimum"], json!(0.5));
}

// ── Builders ────────────────────────────────────────────────────────────────

#[test]
fn object_builder_shape() {
    let user = SchemaDefinition::object()
        .required_property("id", SchemaRef::named("uuid"))
        .required_property("name", SchemaDefinition::string())
        .property("email", SchemaDefinition::string().format("email").nullable())
        .property("posts", SchemaDefinition::array(SchemaRef::named("Post")))
        .example(json!({"id": "9b2f", "name": "Ada"}));

    assert_eq!(
        to_json(&user),
        json!({
            "type": "object",
            "properties": {
                "id": {"$ref": "uuid"},
                "name": {"type": "string"},
                "email": {"type": "string", "format": "email", "nullable": true},
                "posts": {"type": "array", "items": {"$ref": "Post"}}
            },
            "required": ["id", "name"],
            "example": {"id": "9b2f", "name": "Ada"}
        })
    );
}

#[test]
fn require_does_not_duplicate() {
    let schema = SchemaDefinition::object()
        .required_property("id", SchemaDefinition::integer())
        .require("id");
    assert_eq!(schema.required, vec!["id".to_string()]);
}

#[test]
fn reference_target_names() {
    for raw in ["Post", "#/components/schemas/Post", "#/definitions/Post", "#/$defs/Post"] {
        assert_eq!(specmint_openapi::Reference::named(raw).target_name(), Some("Post"));
    }
    assert_eq!(specmint_openapi::Reference::named("#/paths/Post").target_name(), None);
    assert_eq!(specmint_openapi::Reference::named("").target_name(), None);
}

#[test]
fn ref_with_siblings_stays_inline() {
    let bare: SchemaRef = serde_json::from_value(json!({"$ref": "Post"})).unwrap();
    assert_eq!(bare, SchemaRef::named("Post"));

    let annotated: SchemaRef = serde_json::from_value(json!({
        "$ref": "Post",
        "readOnly": true,
        "description": "Latest post"
    }))
    .unwrap();
    match &annotated {
        SchemaRef::Inline(definition) => {
            assert!(definition.read_only);
            assert_eq!(definition.description.as_deref(), Some("Latest post"));
            assert_eq!(definition.extensions["$ref"], json!("Post"));
        }
        other => panic!("expected an inline schema, got {other:?}"),
    }
    assert_eq!(
        serde_json::to_value(&annotated).unwrap(),
        json!({"description": "Latest post", "readOnly": true, "$ref": "Post"})
    );
}

// ── Shape checks ────────────────────────────────────────────────────────────

#[test]
fn kinds() {
    assert_eq!(SchemaDefinition::object().kind(), SchemaKind::Object);
    assert_eq!(SchemaDefinition::array(SchemaDefinition::string()).kind(), SchemaKind::Array);
    assert!(matches!(SchemaDefinition::boolean().kind(), SchemaKind::Primitive(_)));
    assert_eq!(SchemaDefinition::default().kind(), SchemaKind::Unspecified);

    let nullable: SchemaDefinition = serde_json::from_value(json!({"type": ["object", "null"], "additionalProperties": true})).unwrap();
    assert_eq!(nullable.kind(), SchemaKind::Object);
}

#[test]
fn empty_object_is_malformed() {
    let reason = SchemaDefinition::object().check_shape().unwrap_err();
    assert!(reason.contains("neither properties nor additionalProperties"));
    assert!(SchemaDefinition::object().additional_properties(false).check_shape().is_ok());
}

#[test]
fn composed_object_is_accepted() {
    let composed: SchemaDefinition =
        serde_json::from_value(json!({"type": "object", "allOf": [{"$ref": "Base"}]})).unwrap();
    assert!(composed.check_shape().is_ok());
}

#[test]
fn array_without_items_is_malformed() {
    let array: SchemaDefinition = serde_json::from_value(json!({"type": "array"})).unwrap();
    assert!(array.check_shape().unwrap_err().contains("no items"));
}

#[test]
fn primitive_with_properties_is_malformed() {
    let weird = SchemaDefinition::string().property("length", SchemaDefinition::integer());
    assert!(weird.check_shape().unwrap_err().contains("string schema declares properties"));
}

#[test]
fn required_must_be_declared() {
    let schema = SchemaDefinition::object()
        .property("id", SchemaDefinition::integer())
        .require("name");
    assert!(schema.check_shape().unwrap_err().contains("`name`"));
}

#[test]
fn inverted_bounds_are_malformed() {
    let schema = SchemaDefinition::integer().minimum(10).maximum(1);
    assert!(schema.check_shape().unwrap_err().contains("exceeds maximum"));
}

#[test]
fn nested_errors_name_the_property() {
    let schema = SchemaDefinition::object()
        .property("tags", SchemaDefinition::array(SchemaDefinition::object()));
    let reason = schema.check_shape().unwrap_err();
    assert!(reason.starts_with("tags.items:"), "{reason}");
}

// ── Implicit registration ───────────────────────────────────────────────────

struct Post;

impl SchemaProvider for Post {
    fn schema_name() -> &'static str {
        "Post"
    }

    fn schema() -> SchemaDefinition {
        SchemaDefinition::object()
            .required_property("id", SchemaDefinition::integer())
            .property("title", SchemaDefinition::string())
    }
}

#[test]
fn provider_matches_explicit_registration() {
    let mut implicit = SchemaRegistry::new();
    implicit.register_provider::<Post>();

    let mut explicit = SchemaRegistry::new();
    explicit
        .register_value(
            "Post",
            json!({
                "type": "object",
                "properties": {"id": {"type": "integer"}, "title": {"type": "string"}},
                "required": ["id"]
            }),
        )
        .unwrap();

    assert_eq!(implicit.get("Post").unwrap(), explicit.get("Post").unwrap());
}

#[allow(dead_code)]
#[derive(JsonSchema)]
struct Author {
    name: String,
}

#[allow(dead_code)]
#[derive(JsonSchema)]
struct Comment {
    body: String,
    author: Author,
}

#[test]
fn register_type_promotes_definitions() {
    let mut registry = SchemaRegistry::new();
    registry.register_type::<Comment>().unwrap();

    assert!(registry.contains("Comment"));
    assert!(registry.contains("Author"));

    let comment = registry.get("Comment").unwrap();
    assert!(!comment.extensions.contains_key("$schema"));
    assert!(!comment.extensions.contains_key("$defs"));
    let author = comment.properties["author"].as_reference().unwrap();
    assert_eq!(author.reference, "#/components/schemas/Author");
}

#[test]
fn register_type_keeps_explicit_definitions() {
    let mut registry = SchemaRegistry::new();
    registry.register(
        "Author",
        SchemaDefinition::object().property("handle", SchemaDefinition::string()),
    );
    registry.register_type::<Comment>().unwrap();

    let author = registry.get("Author").unwrap();
    assert!(author.properties.contains_key("handle"));
}
