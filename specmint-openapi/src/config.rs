use specmint_core::{AppConfig, ConfigError};

/// Path the document is served from unless configured otherwise.
pub const DEFAULT_DOCUMENT_PATH: &str = "/openapi.json";

/// Configuration for the generated OpenAPI document.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenApiConfig {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    /// Route the JSON document is published on.
    pub path: String,
}

impl OpenApiConfig {
    pub fn new(title: &str, version: &str) -> Self {
        Self {
            title: title.to_string(),
            version: version.to_string(),
            description: None,
            path: DEFAULT_DOCUMENT_PATH.to_string(),
        }
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.path = specmint_core::path::normalize(path);
        self
    }

    /// Read `openapi.title`, `openapi.version`, `openapi.description` and
    /// `openapi.path`, falling back to defaults for missing keys.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let title: String = config.get_or("openapi.title", "API".to_string())?;
        let version: String = config.get_or("openapi.version", "0.1.0".to_string())?;
        let description: Option<String> = config.get_or("openapi.description", None)?;
        let path: String = config.get_or("openapi.path", DEFAULT_DOCUMENT_PATH.to_string())?;

        let mut openapi = Self::new(&title, &version).with_path(&path);
        openapi.description = description;
        Ok(openapi)
    }
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self::new("API", "0.1.0")
    }
}
