//! Route path normalization shared by axum mounting and document assembly.

/// Join a controller base path and an operation path fragment.
///
/// - duplicate separators are collapsed (`/users/` + `/` → `/users`)
/// - the result always starts with `/`
/// - a trailing `/` is dropped unless the result is the root
/// - express-style `:param` segments become `{param}` templates
///
/// ```
/// use specmint_core::path::join_paths;
///
/// assert_eq!(join_paths("/users", "/:id"), "/users/{id}");
/// assert_eq!(join_paths("/users/", "/"), "/users");
/// assert_eq!(join_paths("", ""), "/");
/// ```
pub fn join_paths(base: &str, fragment: &str) -> String {
    let segments: Vec<String> = base
        .split('/')
        .chain(fragment.split('/'))
        .filter(|segment| !segment.is_empty())
        .map(template_segment)
        .collect();

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Normalize a single path (no base) with the same rules as [`join_paths`].
pub fn normalize(path: &str) -> String {
    join_paths("", path)
}

/// Matching key of a normalized path: every `{param}` segment becomes `{}`.
///
/// Two paths with the same shape match the same requests, so the router
/// (and an OpenAPI document) can hold only one of them.
///
/// ```
/// use specmint_core::path::route_shape;
///
/// assert_eq!(route_shape("/users/{id}"), route_shape("/users/{user_id}"));
/// assert_ne!(route_shape("/users/{id}"), route_shape("/users/me"));
/// ```
pub fn route_shape(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.len() >= 2 && segment.starts_with('{') && segment.ends_with('}') {
                "{}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn template_segment(segment: &str) -> String {
    match segment.strip_prefix(':') {
        Some(name) if !name.is_empty() => format!("{{{name}}}"),
        _ => segment.to_string(),
    }
}
