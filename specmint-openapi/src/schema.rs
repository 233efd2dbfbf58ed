use crate::error::SchemaError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Canonical pointer prefix for schema references in the document.
pub const COMPONENTS_PREFIX: &str = "#/components/schemas/";

/// Pointer prefixes accepted on input and rewritten to [`COMPONENTS_PREFIX`].
const FOREIGN_PREFIXES: [&str; 3] = [COMPONENTS_PREFIX, "#/definitions/", "#/$defs/"];

/// A JSON Schema instance type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceType {
    Object,
    Array,
    String,
    Integer,
    Number,
    Boolean,
    Null,
}

/// The `type` keyword: a single type or a union (`["string", "null"]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(InstanceType),
    Union(Vec<InstanceType>),
}

/// Structural kind of a schema, derived from its `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Object,
    Array,
    Primitive(InstanceType),
    /// No `type` keyword (composition schemas, free-form values).
    Unspecified,
}

/// A `$ref` to a registered schema.
///
/// Accepts a bare schema name (`"User"`) or a pointer
/// (`"#/components/schemas/User"`, `"#/definitions/User"`, `"#/$defs/User"`);
/// assembly rewrites every form to the canonical components pointer.
///
/// Only a bare `{"$ref": ...}` reads as a reference; with sibling keywords
/// the object is an inline schema holding `$ref` among its extensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reference {
    #[serde(rename = "$ref")]
    pub reference: String,
}

impl Reference {
    /// Named reference to schema `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            reference: name.into(),
        }
    }

    /// Name of the referenced schema, or `None` for pointers outside the schema section.
    pub fn target_name(&self) -> Option<&str> {
        let reference = self.reference.as_str();
        let name = FOREIGN_PREFIXES
            .iter()
            .find_map(|prefix| reference.strip_prefix(prefix))
            .unwrap_or(reference);
        let valid = !name.is_empty() && !name.contains('/') && !name.contains('#');
        valid.then_some(name)
    }

    /// Canonical pointer for schema `name`.
    pub fn canonical(name: &str) -> String {
        format!("{COMPONENTS_PREFIX}{name}")
    }
}

/// A property, item, parameter, or media-type schema: either a reference or
/// an inline definition, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaRef {
    Ref(Reference),
    Inline(Box<SchemaDefinition>),
}

impl SchemaRef {
    pub fn named(name: impl Into<String>) -> Self {
        SchemaRef::Ref(Reference::named(name))
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            SchemaRef::Ref(reference) => Some(reference),
            SchemaRef::Inline(_) => None,
        }
    }
}

impl From<SchemaDefinition> for SchemaRef {
    fn from(definition: SchemaDefinition) -> Self {
        SchemaRef::Inline(Box::new(definition))
    }
}

impl From<Reference> for SchemaRef {
    fn from(reference: Reference) -> Self {
        SchemaRef::Ref(reference)
    }
}

/// `additionalProperties`: a marker or a schema for the extra values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<SchemaRef>),
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A schema definition in the OpenAPI 3.0 dialect.
///
/// Keywords without a dedicated field (`title`, `oneOf`, `x-*`, ...) are kept
/// in `extensions` and serialized back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDefinition {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub write_only: bool,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl SchemaDefinition {
    pub fn of_type(instance_type: InstanceType) -> Self {
        Self {
            schema_type: Some(SchemaType::Single(instance_type)),
            ..Self::default()
        }
    }

    pub fn object() -> Self {
        Self::of_type(InstanceType::Object)
    }

    pub fn array(items: impl Into<SchemaRef>) -> Self {
        Self {
            items: Some(Box::new(items.into())),
            ..Self::of_type(InstanceType::Array)
        }
    }

    pub fn string() -> Self {
        Self::of_type(InstanceType::String)
    }

    pub fn integer() -> Self {
        Self::of_type(InstanceType::Integer)
    }

    pub fn number() -> Self {
        Self::of_type(InstanceType::Number)
    }

    pub fn boolean() -> Self {
        Self::of_type(InstanceType::Boolean)
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add (or replace) an optional property.
    pub fn property(mut self, name: impl Into<String>, schema: impl Into<SchemaRef>) -> Self {
        self.properties.insert(name.into(), schema.into());
        self
    }

    /// Add (or replace) a property and mark it required.
    pub fn required_property(self, name: impl Into<String>, schema: impl Into<SchemaRef>) -> Self {
        let name = name.into();
        self.property(name.clone(), schema).require(name)
    }

    /// Mark an existing or forthcoming property as required.
    pub fn require(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name);
        }
        self
    }

    pub fn additional_properties(mut self, allowed: bool) -> Self {
        self.additional_properties = Some(AdditionalProperties::Allowed(allowed));
        self
    }

    pub fn minimum(mut self, minimum: impl Into<Number>) -> Self {
        self.minimum = Some(minimum.into());
        self
    }

    pub fn maximum(mut self, maximum: impl Into<Number>) -> Self {
        self.maximum = Some(maximum.into());
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn enum_values(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.enum_values = Some(values.into_iter().collect());
        self
    }

    pub fn example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn write_only(mut self) -> Self {
        self.write_only = true;
        self
    }

    pub fn kind(&self) -> SchemaKind {
        let instance_type = match &self.schema_type {
            None => return SchemaKind::Unspecified,
            Some(SchemaType::Single(t)) => *t,
            Some(SchemaType::Union(types)) => match types.iter().find(|t| **t != InstanceType::Null) {
                Some(t) => *t,
                None if types.is_empty() => return SchemaKind::Unspecified,
                None => InstanceType::Null,
            },
        };
        match instance_type {
            InstanceType::Object => SchemaKind::Object,
            InstanceType::Array => SchemaKind::Array,
            other => SchemaKind::Primitive(other),
        }
    }

    /// Check that the declared kind agrees with the keywords present.
    ///
    /// Inline property and item schemas are checked too; the error names the
    /// offending property path.
    pub fn check_shape(&self) -> Result<(), String> {
        self.check_shape_at("")
    }

    fn check_shape_at(&self, at: &str) -> Result<(), String> {
        let fail = |reason: &str| {
            if at.is_empty() {
                Err(reason.to_string())
            } else {
                Err(format!("{at}: {reason}"))
            }
        };
        let composed = ["allOf", "anyOf", "oneOf", "not", "$ref"]
            .iter()
            .any(|key| self.extensions.contains_key(*key));

        match self.kind() {
            SchemaKind::Object => {
                if self.properties.is_empty() && self.additional_properties.is_none() && !composed {
                    return fail("object schema declares neither properties nor additionalProperties");
                }
                if let Some(missing) = self.required.iter().find(|r| !self.properties.contains_key(*r)) {
                    if self.additional_properties.is_none() && !composed {
                        return fail(&format!("required property `{missing}` is not declared"));
                    }
                }
            }
            SchemaKind::Array => {
                if self.items.is_none() {
                    return fail("array schema declares no items");
                }
            }
            SchemaKind::Primitive(t) => {
                if !self.properties.is_empty() {
                    return fail(&format!("{} schema declares properties", type_label(t)));
                }
                if self.items.is_some() {
                    return fail(&format!("{} schema declares items", type_label(t)));
                }
            }
            SchemaKind::Unspecified => {}
        }

        if let (Some(min), Some(max)) = (&self.minimum, &self.maximum) {
            if let (Some(min), Some(max)) = (min.as_f64(), max.as_f64()) {
                if min > max {
                    return fail(&format!("minimum {min} exceeds maximum {max}"));
                }
            }
        }

        for (name, property) in &self.properties {
            if let SchemaRef::Inline(inner) = property {
                inner.check_shape_at(&join_at(at, name))?;
            }
        }
        if let Some(SchemaRef::Inline(inner)) = self.items.as_deref() {
            inner.check_shape_at(&join_at(at, "items"))?;
        }
        Ok(())
    }
}

fn type_label(instance_type: InstanceType) -> &'static str {
    match instance_type {
        InstanceType::Object => "object",
        InstanceType::Array => "array",
        InstanceType::String => "string",
        InstanceType::Integer => "integer",
        InstanceType::Number => "number",
        InstanceType::Boolean => "boolean",
        InstanceType::Null => "null",
    }
}

fn join_at(at: &str, segment: &str) -> String {
    if at.is_empty() {
        segment.to_string()
    } else {
        format!("{at}.{segment}")
    }
}

/// Registry of named schema definitions, emitted as `components/schemas`.
///
/// Registration order is preserved. Registering a name twice replaces the
/// definition (last registration wins) and keeps the position of the first
/// registration, so independent call sites converge on one entry.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, SchemaDefinition>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema definition under the given name.
    pub fn register(&mut self, name: impl Into<String>, definition: SchemaDefinition) {
        let name = name.into();
        if self.schemas.insert(name.clone(), definition).is_some() {
            tracing::debug!(schema = %name, "Schema definition replaced");
        }
    }

    /// Register a schema from its JSON form, e.g. `{"type": "string", "format": "uuid"}`.
    pub fn register_value(&mut self, name: impl Into<String>, value: Value) -> Result<(), SchemaError> {
        let name = name.into();
        let definition = serde_json::from_value(value).map_err(|source| SchemaError::Invalid {
            name: name.clone(),
            source,
        })?;
        self.register(name, definition);
        Ok(())
    }

    /// Register a [`SchemaProvider`]'s schema under its name.
    pub fn register_provider<P: SchemaProvider>(&mut self) {
        P::register_schema(self);
    }

    /// Derive and register the schema of a `schemars::JsonSchema` type.
    ///
    /// Nested definitions are promoted to top-level schemas (without
    /// replacing schemas registered explicitly) and their pointers rewritten
    /// to the components section.
    pub fn register_type<T: schemars::JsonSchema>(&mut self) -> Result<(), SchemaError> {
        let name = T::schema_name().into_owned();
        let root = serde_json::to_value(schemars::schema_for!(T)).map_err(|source| SchemaError::Invalid {
            name: name.clone(),
            source,
        })?;
        let (root, definitions) = split_definitions(root);

        self.register_value(name, root)?;
        for (def_name, def_value) in definitions {
            if !self.schemas.contains_key(&def_name) {
                self.register_value(def_name, def_value)?;
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&SchemaDefinition, SchemaError> {
        self.schemas
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// All definitions in registration order.
    pub fn all(&self) -> impl Iterator<Item = (&str, &SchemaDefinition)> + '_ {
        self.schemas.iter().map(|(name, def)| (name.as_str(), def))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// Strip `$schema`, pull out `$defs`, and rewrite `#/$defs/X` pointers.
fn split_definitions(mut root: Value) -> (Value, Vec<(String, Value)>) {
    let mut definitions = Vec::new();
    if let Some(obj) = root.as_object_mut() {
        obj.remove("$schema");
        if let Some(Value::Object(defs)) = obj.remove("$defs") {
            definitions.extend(defs);
        }
    }
    sanitize_refs(&mut root);
    for (_, def) in definitions.iter_mut() {
        sanitize_refs(def);
    }
    (root, definitions)
}

fn sanitize_refs(value: &mut Value) {
    match value {
        Value::Object(obj) => sanitize_object(obj),
        Value::Array(arr) => arr.iter_mut().for_each(sanitize_refs),
        _ => {}
    }
}

fn sanitize_object(obj: &mut Map<String, Value>) {
    if let Some(Value::String(pointer)) = obj.get_mut("$ref") {
        if let Some(name) = pointer.strip_prefix("#/$defs/") {
            *pointer = Reference::canonical(name);
        }
    }
    for (_, v) in obj.iter_mut() {
        sanitize_refs(v);
    }
}

/// Trait for types that describe their own schema.
///
/// The typed counterpart of a schema derived from an annotated data class;
/// it writes to the same registry as explicit registration.
pub trait SchemaProvider {
    /// The schema name (typically the type name, e.g. `"User"`).
    fn schema_name() -> &'static str;

    fn schema() -> SchemaDefinition;

    /// Register this type's schema in the given registry.
    fn register_schema(registry: &mut SchemaRegistry) {
        registry.register(Self::schema_name(), Self::schema());
    }
}
