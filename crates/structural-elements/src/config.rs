//! Element and assembly configuration.

use crate::error::{ElementError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-element formulation options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementConfig {
    /// Load direction tracks the deformed surface (not implemented, must stay false)
    pub follower_forces: bool,
    /// Gauss points per parametric direction for the reference basis
    pub quadrature_order: usize,
}

impl Default for ElementConfig {
    fn default() -> Self {
        Self {
            follower_forces: false,
            quadrature_order: 2,
        }
    }
}

impl ElementConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=4).contains(&self.quadrature_order) {
            return Err(ElementError::InvalidConfig(format!(
                "quadrature_order must be in 1..=4, got {}",
                self.quadrature_order
            )));
        }
        Ok(())
    }
}

/// Options for the element assembly driver
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Element formulation options shared by all elements
    pub element: ElementConfig,
    /// Evaluate elements on the rayon thread pool
    pub parallel: bool,
    /// Whether to write progress to stderr
    pub verbose: bool,
}

impl AssemblyConfig {
    /// Parse a configuration from JSON; missing keys take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.element.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_linear_two_point() {
        let config = AssemblyConfig::default();
        assert!(!config.element.follower_forces);
        assert_eq!(config.element.quadrature_order, 2);
        assert!(!config.parallel);
        assert!(!config.verbose);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = AssemblyConfig::from_json_str(r#"{"parallel": true}"#).unwrap();
        assert!(config.parallel);
        assert_eq!(config.element, ElementConfig::default());
    }

    #[test]
    fn rejects_out_of_range_order() {
        let result = AssemblyConfig::from_json_str(r#"{"element": {"quadrature_order": 7}}"#);
        assert!(matches!(result, Err(ElementError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_malformed_json() {
        let result = AssemblyConfig::from_json_str("{parallel: }");
        assert!(matches!(result, Err(ElementError::Json(_))));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"verbose": true, "element": {{"quadrature_order": 3}}}}"#
        )
        .unwrap();

        let config = AssemblyConfig::from_json_file(file.path()).unwrap();
        assert!(config.verbose);
        assert_eq!(config.element.quadrature_order, 3);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = AssemblyConfig::from_json_file("/nonexistent/assembly.json");
        assert!(matches!(result, Err(ElementError::Io(_))));
    }
}
