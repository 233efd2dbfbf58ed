use crate::document::Document;
use crate::error::AssemblyError;
use specmint_core::http::routing::get;
use specmint_core::http::{header, IntoResponse, Router};
use std::sync::Arc;

/// Build a router serving the document as JSON at `path`.
///
/// The document is serialized once here; every request shares the same
/// bytes. A serialization failure is returned before any route exists.
pub fn openapi_routes<T: Clone + Send + Sync + 'static>(
    path: &str,
    document: &Document,
) -> Result<Router<T>, AssemblyError> {
    let spec_json: Arc<str> = Arc::from(document.to_json()?);

    Ok(Router::<T>::new().route(
        path,
        get(move || {
            let json = spec_json.clone();
            async move { ([(header::CONTENT_TYPE, "application/json")], json.to_string()).into_response() }
        }),
    ))
}
