//! Code configuration loading from config.toml
//!
//! Holds the per-kind code templates and the retry budget for code assignment.
//! Every field has a default, so a missing file or section means "use the
//! stock templates". Environment variables override the file.

use crate::core::DocumentKind;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Code templates per document kind
    pub codes: CodeTemplates,
    /// Code assignment behaviour
    pub sequence: SequenceSettings,
}

/// Raw code templates, validated when a `SequenceStore` is built
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CodeTemplates {
    /// Template for request stock codes
    pub request_stock: String,
    /// Template for outgoing albaran codes
    pub outgoing_albaran: String,
    /// Template for ingoing albaran codes
    pub ingoing_albaran: String,
}

impl Default for CodeTemplates {
    fn default() -> Self {
        Self {
            request_stock: DocumentKind::RequestStock.default_code_format().to_string(),
            outgoing_albaran: DocumentKind::OutgoingAlbaran.default_code_format().to_string(),
            ingoing_albaran: DocumentKind::IngoingAlbaran.default_code_format().to_string(),
        }
    }
}

impl CodeTemplates {
    /// Template configured for `kind`.
    #[must_use]
    pub fn get(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::RequestStock => &self.request_stock,
            DocumentKind::OutgoingAlbaran => &self.outgoing_albaran,
            DocumentKind::IngoingAlbaran => &self.ingoing_albaran,
        }
    }

    fn set(&mut self, kind: DocumentKind, template: String) {
        match kind {
            DocumentKind::RequestStock => self.request_stock = template,
            DocumentKind::OutgoingAlbaran => self.outgoing_albaran = template,
            DocumentKind::IngoingAlbaran => self.ingoing_albaran = template,
        }
    }

    /// Replaces templates for which `lookup` returns a value.
    ///
    /// `lookup` is called with each kind's [`DocumentKind::env_key`].
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for kind in DocumentKind::ALL {
            if let Some(template) = lookup(kind.env_key()) {
                info!("Code format for {} overridden by {}", kind, kind.env_key());
                self.set(kind, template);
            }
        }
    }

    /// Applies `STORAGE_CODE_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }
}

/// Settings for code assignment under contention
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SequenceSettings {
    /// How many times a conflicting creation is attempted before giving up
    pub max_attempts: u32,
}

impl Default for SequenceSettings {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

/// Parses configuration from TOML text
///
/// # Errors
/// Returns an error if the TOML syntax is invalid or a field has the wrong type.
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads code configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref())?;

    parse_config(&contents)
}

/// Loads configuration from ./config.toml, or defaults if the file does not
/// exist, then applies environment overrides.
pub fn load_default_config() -> Result<Config> {
    let path = Path::new("config.toml");
    let mut config = if path.exists() {
        load_config(path)?
    } else {
        debug!("No config.toml found, using default code formats");
        Config::default()
    };
    config.codes.apply_env_overrides();
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_code_config() {
        let toml_str = r#"
            [codes]
            request_stock = "REQ{year}-{number:05}"
            ingoing_albaran = "IN{year}{quarter}-{number}"

            [sequence]
            max_attempts = 5
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.codes.request_stock, "REQ{year}-{number:05}");
        assert_eq!(
            config.codes.outgoing_albaran,
            "OA{year}{day}{month}-{hour}{minute}--{number}"
        );
        assert_eq!(config.codes.ingoing_albaran, "IN{year}{quarter}-{number}");
        assert_eq!(config.sequence.max_attempts, 5);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        for kind in DocumentKind::ALL {
            assert_eq!(config.codes.get(kind), kind.default_code_format());
        }
        assert_eq!(config.sequence.max_attempts, 3);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(
            parse_config("[sequence]\nmax_attempts = \"many\""),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            load_config("does/not/exist.toml"),
            Err(Error::Io(ref e)) if e.kind() == std::io::ErrorKind::NotFound
        ));
    }

    #[test]
    fn test_overrides_replace_only_matching_kinds() {
        let mut codes = CodeTemplates::default();
        codes.apply_overrides(|key| {
            (key == "STORAGE_CODE_OUTGOING_ALBARAN").then(|| "OUT-{number}".to_string())
        });

        assert_eq!(codes.get(DocumentKind::OutgoingAlbaran), "OUT-{number}");
        assert_eq!(
            codes.get(DocumentKind::RequestStock),
            DocumentKind::RequestStock.default_code_format()
        );
    }
}
