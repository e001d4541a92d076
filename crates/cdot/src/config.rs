//! Configuration types for DOT rendering.
//!
//! All types implement [`serde::Deserialize`] for loading from external
//! sources. Every field is optional; missing fields take their defaults.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration.
//! - [`OutputConfig`] - Controls how node identifiers and the graph text are written.
//!
//! # Example
//!
//! ```
//! # use cdot::config::AppConfig;
//! // Use default configuration
//! let config = AppConfig::default();
//! assert_eq!(config.output().id_prefix(), "n");
//! assert!(config.validate().is_ok());
//! ```

use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Output configuration section.
    #[serde(default)]
    output: OutputConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified output configuration.
    pub fn new(output: OutputConfig) -> Self {
        Self { output }
    }

    /// Returns the output configuration.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    /// Check every section for values the renderer cannot use.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        self.output.validate()
    }
}

/// Output configuration.
///
/// Node identifiers are written as `{id_prefix}{number}`, numbered from
/// `first_id` in traversal order.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    id_prefix: String,
    first_id: u64,
    trailing_newline: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            id_prefix: "n".to_string(),
            first_id: 0,
            trailing_newline: true,
        }
    }
}

impl OutputConfig {
    /// Set the identifier prefix.
    pub fn with_id_prefix(mut self, id_prefix: impl Into<String>) -> Self {
        self.id_prefix = id_prefix.into();
        self
    }

    /// Set the number of the first identifier.
    pub fn with_first_id(mut self, first_id: u64) -> Self {
        self.first_id = first_id;
        self
    }

    /// Set whether the closing `}` is followed by a newline.
    pub fn with_trailing_newline(mut self, trailing_newline: bool) -> Self {
        self.trailing_newline = trailing_newline;
        self
    }

    pub fn id_prefix(&self) -> &str {
        &self.id_prefix
    }

    pub fn first_id(&self) -> u64 {
        self.first_id
    }

    pub fn trailing_newline(&self) -> bool {
        self.trailing_newline
    }

    /// Check that `id_prefix` makes every identifier a valid DOT ID.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the prefix is empty, does not
    /// start with an ASCII letter or `_`, or contains other characters than
    /// ASCII alphanumerics and `_`.
    pub fn validate(&self) -> Result<(), String> {
        let mut chars = self.id_prefix.chars();
        match chars.next() {
            None => return Err("output.id_prefix must not be empty".to_string()),
            Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
                return Err(format!(
                    "output.id_prefix must start with an ASCII letter or '_', found {c:?}"
                ));
            }
            Some(_) => {}
        }
        if let Some(c) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
            return Err(format!(
                "output.id_prefix may only contain ASCII letters, digits and '_', found {c:?}"
            ));
        }
        Ok(())
    }
}
