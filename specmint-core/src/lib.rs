pub mod builder;
pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod layers;
pub mod meta;
pub mod path;
pub mod plugin;

pub use builder::{AppBuilder, NoState};
pub use config::{AppConfig, ConfigError, ConfigValue, FromConfigValue};
pub use controller::{short_type_name, Controller, Routes};
pub use error::{BoxError, BuildError, HttpError};
pub use layers::{default_trace, init_tracing};
pub use meta::{ControllerInfo, MetaRegistry, OperationInfo};
pub use plugin::Plugin;
