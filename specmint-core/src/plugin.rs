//! Plugin system for Specmint.
//!
//! Plugins are composable units of functionality that can be installed into an
//! [`AppBuilder`] using the `.with(plugin)` method.

use crate::builder::AppBuilder;

/// A composable unit of functionality that can be installed into an [`AppBuilder`].
///
/// Plugins can add layers, register meta consumers, or mount extra routes.
///
/// # Example
///
/// ```ignore
/// use specmint_core::Plugin;
///
/// pub struct Health;
///
/// impl Plugin for Health {
///     fn install<T: Clone + Send + Sync + 'static>(self, app: AppBuilder<T>) -> AppBuilder<T> {
///         app.with_meta_consumer(|_| Ok(Router::new().route("/health", get(|| async { "OK" }))))
///     }
/// }
/// ```
pub trait Plugin: Send + 'static {
    /// Install this plugin into the given `AppBuilder`, returning the modified builder.
    fn install<T: Clone + Send + Sync + 'static>(self, app: AppBuilder<T>) -> AppBuilder<T>;

    /// The name of this plugin (for diagnostics).
    fn name() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }
}
