//! Checker configuration.
//!
//! Options can be built in code or loaded from RON, e.g.
//!
//! ```ron
//! (filename: "geometry.lun", allow_scalar_module_fields: false)
//! ```

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid checker configuration: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CheckOptions {
    /// Name reported in diagnostics
    pub filename: String,
    /// Allow `boolean`, `integer`, `float` and `string` module fields in
    /// addition to functions
    pub allow_scalar_module_fields: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            filename: "<input>".to_string(),
            allow_scalar_module_fields: true,
        }
    }
}

impl CheckOptions {
    pub fn from_ron(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_scalar_module_fields(mut self, allow: bool) -> Self {
        self.allow_scalar_module_fields = allow;
        self
    }
}
