//! Runtime configuration.
//!
//! Loaded from TOML; every field has a default so an empty document is valid.
//!
//! ```toml
//! [dummies]
//! max_depth = 8
//!
//! [fakes]
//! calls_base_by_default = false
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigLoadError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
	pub dummies: DummyConfig,
	pub fakes: FakeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DummyConfig {
	/// Maximum nesting of dummy construction before a branch resolves to null.
	pub max_depth: usize,
}

impl Default for DummyConfig {
	fn default() -> Self {
		Self { max_depth: 8 }
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FakeConfig {
	/// Class fakes forward unconfigured calls to base implementations.
	pub calls_base_by_default: bool,
}

impl RuntimeConfig {
	pub fn from_toml_str(src: &str) -> Result<Self, ConfigLoadError> {
		Ok(toml::from_str(src)?)
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
		let path = path.as_ref();
		let src = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&src)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_empty_document_uses_defaults() {
		let cfg = RuntimeConfig::from_toml_str("").unwrap();
		assert_eq!(cfg, RuntimeConfig::default());
		assert_eq!(cfg.dummies.max_depth, 8);
		assert!(!cfg.fakes.calls_base_by_default);
	}

	#[test]
	fn test_partial_document_overrides() {
		let cfg = RuntimeConfig::from_toml_str("[fakes]\ncalls_base_by_default = true\n").unwrap();
		assert!(cfg.fakes.calls_base_by_default);
		assert_eq!(cfg.dummies.max_depth, 8);
	}

	#[test]
	fn test_unknown_field_is_rejected() {
		let err = RuntimeConfig::from_toml_str("[dummies]\nmax_dpeth = 3\n").unwrap_err();
		assert!(matches!(err, ConfigLoadError::Parse(_)));
	}

	#[test]
	fn test_load_from_file() {
		let dir = tempfile::tempdir().expect("create tempdir");
		let path = dir.path().join("decoy.toml");
		std::fs::write(&path, "[dummies]\nmax_depth = 3\n").expect("write config");

		let cfg = RuntimeConfig::load(&path).unwrap();
		assert_eq!(cfg.dummies.max_depth, 3);

		let missing = RuntimeConfig::load(dir.path().join("absent.toml")).unwrap_err();
		assert!(matches!(missing, ConfigLoadError::Io { .. }));
	}
}
