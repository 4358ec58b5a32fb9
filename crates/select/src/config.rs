//! Host-settable control configuration.

use std::path::{Path, PathBuf};

use roster_model::Category;
use serde::Deserialize;
use thiserror::Error;

/// Errors loading a [`ControlConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		path: PathBuf,
		error: std::io::Error,
	},

	/// Error parsing TOML.
	#[error("invalid control config: {0}")]
	Parse(#[from] toml::de::Error),
}

/// Initial inputs of a [`crate::SearchSelect`].
///
/// ```toml
/// label = "Advisor"
/// category = "ADVISOR"
/// required = true
/// initial_identifier = "999999"
/// allow_list = ["12345", "999999"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlConfig {
	/// Display-only label.
	pub label: String,
	pub category: Category,
	pub required: bool,
	/// Identifier to preselect once candidates are loaded.
	pub initial_identifier: Option<String>,
	pub allow_list: Option<Vec<String>>,
}

impl Default for ControlConfig {
	fn default() -> Self {
		Self {
			label: String::new(),
			category: Category::default(),
			required: true,
			initial_identifier: None,
			allow_list: None,
		}
	}
}

impl ControlConfig {
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(input)?)
	}

	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&input)
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use super::*;

	#[test]
	fn empty_input_uses_defaults() {
		let config = ControlConfig::from_toml_str("").expect("empty config must parse");
		assert_eq!(config, ControlConfig::default());
		assert!(config.required);
	}

	#[test]
	fn parses_all_fields() {
		let config = ControlConfig::from_toml_str(
			r#"
label = "Berater"
category = "ASSISTANT"
required = false
initial_identifier = "999999"
allow_list = ["12345", "999999"]
"#,
		)
		.expect("config must parse");

		assert_eq!(config.label, "Berater");
		assert_eq!(config.category, Category::Assistant);
		assert!(!config.required);
		assert_eq!(config.initial_identifier.as_deref(), Some("999999"));
		assert_eq!(config.allow_list, Some(vec!["12345".to_owned(), "999999".to_owned()]));
	}

	#[test]
	fn rejects_unknown_keys() {
		let err = ControlConfig::from_toml_str("lable = \"typo\"").unwrap_err();
		assert!(matches!(err, ConfigError::Parse(_)));
	}

	#[test]
	fn load_reads_file_and_reports_missing_path() {
		let dir = tempfile::tempdir().expect("must create tempdir");
		let path = dir.path().join("control.toml");
		let mut file = std::fs::File::create(&path).expect("must create config file");
		writeln!(file, "initial_identifier = \"11111\"").expect("must write config");

		let config = ControlConfig::load(&path).expect("config must load");
		assert_eq!(config.initial_identifier.as_deref(), Some("11111"));

		let missing = dir.path().join("missing.toml");
		let err = ControlConfig::load(&missing).unwrap_err();
		assert!(matches!(err, ConfigError::Io { .. }));
		assert!(err.to_string().contains("missing.toml"));
	}
}
