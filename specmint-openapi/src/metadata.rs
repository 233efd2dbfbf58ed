use crate::schema::{SchemaDefinition, SchemaRef};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use specmint_core::http::Method;
use std::fmt::Display;
use tracing::debug;

/// Media type used by the JSON convenience helpers.
pub const APPLICATION_JSON: &str = "application/json";

// ── Parameters ──────────────────────────────────────────────────────────────

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Cookie,
}

/// A parameter declaration, identified by `(name, location)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParamLocation,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    pub schema: SchemaRef,
}

impl ParameterSpec {
    /// A parameter typed as a plain string until [`schema`](Self::schema) says otherwise.
    pub fn new(name: impl Into<String>, location: ParamLocation) -> Self {
        Self {
            name: name.into(),
            location,
            required: location == ParamLocation::Path,
            description: None,
            deprecated: false,
            schema: SchemaDefinition::string().into(),
        }
    }

    /// A path parameter. Path parameters are always required.
    pub fn path(name: impl Into<String>) -> Self {
        Self::new(name, ParamLocation::Path)
    }

    pub fn query(name: impl Into<String>) -> Self {
        Self::new(name, ParamLocation::Query)
    }

    pub fn header(name: impl Into<String>) -> Self {
        Self::new(name, ParamLocation::Header)
    }

    pub fn cookie(name: impl Into<String>) -> Self {
        Self::new(name, ParamLocation::Cookie)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn schema(mut self, schema: impl Into<SchemaRef>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn is_required(&self) -> bool {
        self.required || self.location == ParamLocation::Path
    }

    fn same_key(&self, other: &ParameterSpec) -> bool {
        self.name == other.name && self.location == other.location
    }
}

// ── Bodies and responses ────────────────────────────────────────────────────

/// Schema and example for one media type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaTypeSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl MediaTypeSpec {
    pub fn schema(schema: impl Into<SchemaRef>) -> Self {
        Self {
            schema: Some(schema.into()),
            example: None,
        }
    }

    pub fn with_example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBodySpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaTypeSpec>,
}

impl RequestBodySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// A required `application/json` body with the given schema.
    pub fn json(schema: impl Into<SchemaRef>) -> Self {
        Self::new()
            .content(APPLICATION_JSON, MediaTypeSpec::schema(schema))
            .required(true)
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn content(mut self, media_type: impl Into<String>, spec: MediaTypeSpec) -> Self {
        self.content.insert(media_type.into(), spec);
        self
    }

    /// Fold a later declaration into this one: given fields overwrite and
    /// content merges per media type.
    pub fn merge(&mut self, later: RequestBodySpec) {
        if later.description.is_some() {
            self.description = later.description;
        }
        if later.required.is_some() {
            self.required = later.required;
        }
        self.content.extend(later.content);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaTypeSpec>,
}

impl ResponseSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn described(description: impl Into<String>) -> Self {
        Self::new().description(description)
    }

    /// An `application/json` response with the given schema.
    pub fn json(schema: impl Into<SchemaRef>) -> Self {
        Self::new().content(APPLICATION_JSON, MediaTypeSpec::schema(schema))
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn content(mut self, media_type: impl Into<String>, spec: MediaTypeSpec) -> Self {
        self.content.insert(media_type.into(), spec);
        self
    }

    /// Fold a later declaration for the same status into this one.
    pub fn merge(&mut self, later: ResponseSpec) {
        if later.description.is_some() {
            self.description = later.description;
        }
        self.content.extend(later.content);
    }
}

/// How a fragment's response entry combines with what is already recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEdit {
    /// Merge into the existing entry for the status (single-response declarations).
    Merge(ResponseSpec),
    /// Replace the existing entry for the status (bulk response maps).
    Replace(ResponseSpec),
}

// ── Fragments ───────────────────────────────────────────────────────────────

/// One independently-declared piece of operation metadata.
///
/// Fragments are built with chained setters and folded into the stored
/// [`OperationMetadata`] by [`MetadataStore::record_operation`]:
///
/// ```
/// use specmint_openapi::{OperationFragment, ParameterSpec, ResponseSpec};
///
/// let fragment = OperationFragment::new()
///     .summary("Get a user by id")
///     .parameter(ParameterSpec::path("id"))
///     .response(200, ResponseSpec::json(specmint_openapi::SchemaRef::named("User")))
///     .response(404, ResponseSpec::described("User not found"));
/// # let _ = fragment;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationFragment {
    summary: Option<String>,
    description: Option<String>,
    parameters: Vec<ParameterSpec>,
    request_body: Option<RequestBodySpec>,
    responses: Vec<(String, ResponseEdit)>,
    tags: Vec<String>,
    deprecated: bool,
}

impl OperationFragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn parameters(mut self, parameters: impl IntoIterator<Item = ParameterSpec>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    pub fn request_body(mut self, body: RequestBodySpec) -> Self {
        match &mut self.request_body {
            Some(existing) => existing.merge(body),
            None => self.request_body = Some(body),
        }
        self
    }

    /// Declare a single response; merges with an earlier entry for `status`.
    pub fn response(mut self, status: impl Display, spec: ResponseSpec) -> Self {
        self.responses
            .push((status.to_string(), ResponseEdit::Merge(spec)));
        self
    }

    /// Declare a response map; each given status replaces its earlier entry,
    /// other statuses are left untouched.
    pub fn responses<S, I>(mut self, responses: I) -> Self
    where
        S: Display,
        I: IntoIterator<Item = (S, ResponseSpec)>,
    {
        self.responses.extend(
            responses
                .into_iter()
                .map(|(status, spec)| (status.to_string(), ResponseEdit::Replace(spec))),
        );
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }
}

// ── Stored metadata ─────────────────────────────────────────────────────────

/// Everything recorded for one operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationMetadata {
    pub method: Option<Method>,
    /// Path fragment relative to the controller base path.
    pub path: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub parameters: Vec<ParameterSpec>,
    pub request_body: Option<RequestBodySpec>,
    pub responses: IndexMap<String, ResponseSpec>,
    /// Explicit tags only; see [`effective_tags`](Self::effective_tags).
    pub tags: Vec<String>,
    pub deprecated: bool,
}

impl OperationMetadata {
    /// Fold a fragment in, field by field.
    pub fn merge(&mut self, fragment: OperationFragment) {
        let OperationFragment {
            summary,
            description,
            parameters,
            request_body,
            responses,
            tags,
            deprecated,
        } = fragment;

        if summary.is_some() {
            self.summary = summary;
        }
        if description.is_some() {
            self.description = description;
        }

        for parameter in parameters {
            match self.parameters.iter_mut().find(|p| p.same_key(&parameter)) {
                Some(existing) => {
                    debug!(parameter = %parameter.name, "Parameter declaration replaced");
                    *existing = parameter;
                }
                None => self.parameters.push(parameter),
            }
        }

        if let Some(body) = request_body {
            match &mut self.request_body {
                Some(existing) => existing.merge(body),
                None => self.request_body = Some(body),
            }
        }

        for (status, edit) in responses {
            match edit {
                ResponseEdit::Merge(spec) => match self.responses.get_mut(&status) {
                    Some(existing) => existing.merge(spec),
                    None => {
                        self.responses.insert(status, spec);
                    }
                },
                ResponseEdit::Replace(spec) => {
                    self.responses.insert(status, spec);
                }
            }
        }

        for tag in tags {
            if !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }

        self.deprecated |= deprecated;
    }

    /// Tags emitted for this operation: the explicit tags, or the default tag
    /// when none were declared.
    pub fn effective_tags(&self, default_tag: Option<&str>) -> Vec<String> {
        if self.tags.is_empty() {
            default_tag.map(str::to_string).into_iter().collect()
        } else {
            self.tags.clone()
        }
    }
}

/// Everything recorded for one controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerMetadata {
    pub base_path: Option<String>,
    /// Explicit default-tag override.
    pub tag: Option<String>,
    pub operations: IndexMap<String, OperationMetadata>,
}

impl ControllerMetadata {
    /// The override if set, otherwise the base path without surrounding
    /// separators (`/users` → `users`). A root base path has no default tag.
    pub fn default_tag(&self) -> Option<String> {
        if let Some(tag) = &self.tag {
            return Some(tag.clone());
        }
        let derived = self.base_path.as_deref()?.trim_matches('/');
        (!derived.is_empty()).then(|| derived.to_string())
    }
}

/// Metadata fragments keyed by `(controller, operation)`.
///
/// Controllers and operations keep the order in which they were first seen.
#[derive(Debug, Clone, Default)]
pub struct MetadataStore {
    controllers: IndexMap<String, ControllerMetadata>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a controller's base path. The first declaration wins.
    pub fn record_controller(&mut self, controller: &str, base_path: &str) {
        let entry = self.controller_entry(controller);
        match &entry.base_path {
            None => entry.base_path = Some(base_path.to_string()),
            Some(existing) if existing != base_path => {
                debug!(
                    controller,
                    kept = %existing,
                    ignored = %base_path,
                    "Base path already declared"
                );
            }
            Some(_) => {}
        }
    }

    /// Override the tag derived from the controller's base path.
    pub fn set_default_tag(&mut self, controller: &str, tag: impl Into<String>) {
        self.controller_entry(controller).tag = Some(tag.into());
    }

    /// Record the HTTP method and path fragment an operation is mounted on.
    pub fn record_route(&mut self, controller: &str, operation: &str, method: Method, path: &str) {
        let entry = self.operation_entry(controller, operation);
        if entry.method.is_some() {
            debug!(controller, operation, "Operation route replaced");
        }
        entry.method = Some(method);
        entry.path = Some(path.to_string());
    }

    /// Merge a fragment into the operation's metadata.
    pub fn record_operation(&mut self, controller: &str, operation: &str, fragment: OperationFragment) {
        self.operation_entry(controller, operation).merge(fragment);
    }

    pub fn controller(&self, controller: &str) -> Option<&ControllerMetadata> {
        self.controllers.get(controller)
    }

    pub fn operation(&self, controller: &str, operation: &str) -> Option<&OperationMetadata> {
        self.controllers.get(controller)?.operations.get(operation)
    }

    pub fn controllers(&self) -> impl Iterator<Item = (&str, &ControllerMetadata)> + '_ {
        self.controllers.iter().map(|(id, meta)| (id.as_str(), meta))
    }

    fn controller_entry(&mut self, controller: &str) -> &mut ControllerMetadata {
        self.controllers.entry(controller.to_string()).or_default()
    }

    fn operation_entry(&mut self, controller: &str, operation: &str) -> &mut OperationMetadata {
        self.controller_entry(controller)
            .operations
            .entry(operation.to_string())
            .or_default()
    }
}

/// Capability to attach metadata to an owner (controller) and its members
/// (operations), in any order and from any number of call sites.
pub trait Annotate {
    fn attach_metadata(&mut self, owner: &str, member: &str, fragment: OperationFragment);

    fn attach_controller(&mut self, owner: &str, base_path: &str);
}

impl Annotate for MetadataStore {
    fn attach_metadata(&mut self, owner: &str, member: &str, fragment: OperationFragment) {
        self.record_operation(owner, member, fragment);
    }

    fn attach_controller(&mut self, owner: &str, base_path: &str) {
        self.record_controller(owner, base_path);
    }
}
