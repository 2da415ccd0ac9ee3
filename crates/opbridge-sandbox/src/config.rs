//! Bridge configuration.
//!
//! [`BridgeConfig`] controls how the bootstrap script names things inside
//! the sandbox: the global that carries the capability namespace, the
//! engine binding that exposes the raw host primitives, and the script name
//! the bootstrap is evaluated under.

use serde::Deserialize;

/// Errors raised by [`BridgeConfig::validate`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A name that is spliced into generated script is not a valid
    /// identifier (or dotted identifier path).
    #[error("invalid {field} `{value}`: expected a script identifier")]
    InvalidIdentifier { field: &'static str, value: String },

    /// The namespace would shadow the logging global.
    #[error("namespace `{0}` collides with a reserved global")]
    ReservedNamespace(String),
}

/// Naming used by the generated bootstrap.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Global under which the capability namespace is installed.
    ///
    /// Default: **`runjs`**.
    pub namespace: String,

    /// Expression (dotted identifier path) that evaluates to the engine's
    /// host binding, an object with `print(text, isError)` and `ops`.
    ///
    /// Default: **`Deno.core`**.
    pub core_binding: String,

    /// Name the bootstrap script is evaluated under, shown in engine stack
    /// traces.
    pub script_name: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            namespace: "runjs".into(),
            core_binding: "Deno.core".into(),
            script_name: "[opbridge:bootstrap.js]".into(),
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_core_binding(mut self, binding: impl Into<String>) -> Self {
        self.core_binding = binding.into();
        self
    }

    pub fn with_script_name(mut self, name: impl Into<String>) -> Self {
        self.script_name = name.into();
        self
    }

    /// Check every name that ends up inside generated script.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_identifier(&self.namespace) {
            return Err(ConfigError::InvalidIdentifier {
                field: "namespace",
                value: self.namespace.clone(),
            });
        }
        if matches!(self.namespace.as_str(), "console" | "globalThis") {
            return Err(ConfigError::ReservedNamespace(self.namespace.clone()));
        }
        if !self.core_binding.split('.').all(is_identifier) {
            return Err(ConfigError::InvalidIdentifier {
                field: "core_binding",
                value: self.core_binding.clone(),
            });
        }
        Ok(())
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
