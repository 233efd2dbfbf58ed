use crate::collector::{collect_routes, RouteDescriptor};
use crate::config::OpenApiConfig;
use crate::document::{Components, Document, Info, Operation, RequestBody, Response, Tag, OPENAPI_VERSION};
use crate::error::AssemblyError;
use crate::metadata::{MediaTypeSpec, MetadataStore, ParamLocation};
use crate::schema::{AdditionalProperties, Reference, SchemaDefinition, SchemaRef, SchemaRegistry};
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use specmint_core::http::StatusCode;
use specmint_core::path::{normalize, route_shape};
use tracing::info;

/// Build the document from the registries.
///
/// `attached` lists controller ids in attachment order. Schemas keep their
/// registration order, paths follow the attachment order, and every
/// schema reference is rewritten to `#/components/schemas/<name>`. Any
/// error aborts assembly; there is no partial document.
pub fn assemble(
    config: &OpenApiConfig,
    schemas: &SchemaRegistry,
    store: &MetadataStore,
    attached: &[String],
) -> Result<Document, AssemblyError> {
    let mut components = Components::default();
    for (name, definition) in schemas.all() {
        definition
            .check_shape()
            .map_err(|reason| AssemblyError::MalformedSchema {
                name: name.to_string(),
                reason,
            })?;
        let mut definition = definition.clone();
        rewrite_schema(&mut definition, schemas, &format!("components.schemas.{name}"))?;
        components.schemas.insert(name.to_string(), definition);
    }

    let routes = collect_routes(store, attached)?;
    let document_shape = route_shape(&normalize(&config.path));
    if let Some(route) = routes.iter().find(|r| route_shape(&r.full_path) == document_shape) {
        return Err(AssemblyError::DocumentPathConflict {
            method: route.method.clone(),
            path: route.full_path.clone(),
            operation: route.label(),
        });
    }

    let mut paths: IndexMap<String, IndexMap<String, Operation>> = IndexMap::new();
    let mut tags: IndexSet<String> = IndexSet::new();

    for route in &routes {
        let operation = build_operation(route, schemas)?;
        tags.extend(operation.tags.iter().cloned());
        paths
            .entry(route.full_path.clone())
            .or_default()
            .insert(route.method.as_str().to_ascii_lowercase(), operation);
    }

    info!(
        paths = paths.len(),
        operations = routes.len(),
        schemas = components.schemas.len(),
        tags = tags.len(),
        "OpenAPI document assembled"
    );

    Ok(Document {
        openapi: OPENAPI_VERSION.to_string(),
        info: Info {
            title: config.title.clone(),
            version: config.version.clone(),
            description: config.description.clone(),
        },
        paths,
        components,
        tags: tags.into_iter().map(|name| Tag { name }).collect(),
    })
}

fn build_operation(route: &RouteDescriptor<'_>, schemas: &SchemaRegistry) -> Result<Operation, AssemblyError> {
    let meta = route.operation;
    let at = format!("{} {}", route.method, route.full_path);

    let mut parameters = Vec::with_capacity(meta.parameters.len());
    for parameter in &meta.parameters {
        let mut parameter = parameter.clone();
        if parameter.location == ParamLocation::Path {
            parameter.required = true;
        }
        rewrite_ref(
            &mut parameter.schema,
            schemas,
            &format!("{at} parameter `{}`", parameter.name),
        )?;
        parameters.push(parameter);
    }

    let request_body = match &meta.request_body {
        Some(body) => Some(RequestBody {
            description: body.description.clone(),
            required: body.required.unwrap_or(false),
            content: rewrite_content(&body.content, schemas, &format!("{at} requestBody"))?,
        }),
        None => None,
    };

    let mut responses = IndexMap::with_capacity(meta.responses.len().max(1));
    for (status, spec) in &meta.responses {
        if !is_valid_status(status) {
            return Err(AssemblyError::InvalidStatusCode {
                method: route.method.clone(),
                path: route.full_path.clone(),
                status: status.clone(),
            });
        }
        let description = spec
            .description
            .clone()
            .unwrap_or_else(|| default_description(status));
        let content = rewrite_content(&spec.content, schemas, &format!("{at} response {status}"))?;
        responses.insert(status.clone(), Response { description, content });
    }
    if responses.is_empty() {
        responses.insert(
            "200".to_string(),
            Response {
                description: "Successful response".to_string(),
                content: IndexMap::new(),
            },
        );
    }

    Ok(Operation {
        operation_id: route.operation_id.to_string(),
        summary: meta.summary.clone(),
        description: meta.description.clone(),
        tags: meta.effective_tags(route.default_tag.as_deref()),
        parameters,
        request_body,
        responses,
        deprecated: meta.deprecated,
    })
}

fn rewrite_content(
    content: &IndexMap<String, MediaTypeSpec>,
    schemas: &SchemaRegistry,
    at: &str,
) -> Result<IndexMap<String, MediaTypeSpec>, AssemblyError> {
    let mut rewritten = content.clone();
    for (media_type, spec) in rewritten.iter_mut() {
        if let Some(schema) = &mut spec.schema {
            rewrite_ref(schema, schemas, &format!("{at} {media_type}"))?;
        }
    }
    Ok(rewritten)
}

/// Resolve a reference (or the references inside an inline schema) against
/// the registry and rewrite it to the canonical pointer.
fn rewrite_ref(schema: &mut SchemaRef, schemas: &SchemaRegistry, at: &str) -> Result<(), AssemblyError> {
    match schema {
        SchemaRef::Ref(reference) => {
            reference.reference = resolve(&reference.reference, schemas, at)?;
            Ok(())
        }
        SchemaRef::Inline(definition) => rewrite_schema(definition, schemas, at),
    }
}

fn rewrite_schema(definition: &mut SchemaDefinition, schemas: &SchemaRegistry, at: &str) -> Result<(), AssemblyError> {
    for (name, property) in definition.properties.iter_mut() {
        rewrite_ref(property, schemas, &format!("{at}.properties.{name}"))?;
    }
    if let Some(items) = definition.items.as_deref_mut() {
        rewrite_ref(items, schemas, &format!("{at}.items"))?;
    }
    if let Some(AdditionalProperties::Schema(extra)) = definition.additional_properties.as_mut() {
        rewrite_ref(extra, schemas, &format!("{at}.additionalProperties"))?;
    }
    for (keyword, value) in definition.extensions.iter_mut() {
        if keyword == "$ref" {
            if let Value::String(pointer) = value {
                *pointer = resolve(pointer, schemas, at)?;
            }
        } else if !keyword.starts_with("x-") {
            rewrite_value(value, schemas, &format!("{at}.{keyword}"))?;
        }
    }
    Ok(())
}

/// Rewrite `$ref` pointers inside keywords kept as raw JSON (`allOf`, `oneOf`, ...).
fn rewrite_value(value: &mut Value, schemas: &SchemaRegistry, at: &str) -> Result<(), AssemblyError> {
    match value {
        Value::Object(object) => {
            for (key, inner) in object.iter_mut() {
                if key == "$ref" {
                    if let Value::String(pointer) = inner {
                        *pointer = resolve(pointer, schemas, at)?;
                        continue;
                    }
                }
                rewrite_value(inner, schemas, &format!("{at}.{key}"))?;
            }
            Ok(())
        }
        Value::Array(items) => {
            for (index, inner) in items.iter_mut().enumerate() {
                rewrite_value(inner, schemas, &format!("{at}[{index}]"))?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn resolve(raw: &str, schemas: &SchemaRegistry, at: &str) -> Result<String, AssemblyError> {
    let reference = Reference::named(raw);
    match reference.target_name() {
        Some(name) if schemas.contains(name) => Ok(Reference::canonical(name)),
        _ => Err(AssemblyError::UnresolvedReference {
            reference: raw.to_string(),
            location: at.to_string(),
        }),
    }
}

/// `100`–`599`, a range (`1XX`–`5XX`), or `default`.
fn is_valid_status(status: &str) -> bool {
    if status == "default" {
        return true;
    }
    let bytes = status.as_bytes();
    if bytes.len() != 3 || !(b'1'..=b'5').contains(&bytes[0]) {
        return false;
    }
    &status[1..] == "XX" || bytes[1..].iter().all(u8::is_ascii_digit)
}

fn default_description(status: &str) -> String {
    if status == "default" {
        return "Default response".to_string();
    }
    if let Some(reason) = status
        .parse::<u16>()
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .and_then(|code| code.canonical_reason())
    {
        return reason.to_string();
    }
    let class = match status.as_bytes().first() {
        Some(b'1') => "Informational response",
        Some(b'2') => "Successful response",
        Some(b'3') => "Redirection",
        Some(b'4') => "Client error",
        _ => "Server error",
    };
    class.to_string()
}
