//! Error families surfaced by the engine.
//!
//! Every failure is local and synchronous. Unmatched calls are never errors:
//! they fall back to a synthesized default.

use std::path::PathBuf;
use std::sync::Arc;

use decoy_meta::{BaseError, MemberKey};

use crate::assertions::Repeated;

/// A type could not be faked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CreationError {
	#[error("type {name} is not registered in the catalog")]
	UnknownType { name: String },

	#[error("{ty} cannot be faked: only interfaces and classes are fakeable")]
	NotFakeable { ty: String },

	#[error("{ty} is sealed and cannot be faked")]
	Sealed { ty: Arc<str> },

	#[error("{ty} is internal and has not been made visible to fakes")]
	Inaccessible { ty: Arc<str> },

	#[error("{ty} has no accessible constructor")]
	NoAccessibleConstructor { ty: Arc<str> },

	#[error("{ty} has no accessible constructor taking {arity} argument(s)")]
	NoMatchingConstructor { ty: Arc<str>, arity: usize },

	#[error("no constructor of {ty} could be satisfied with dummy arguments")]
	UnresolvableConstructor { ty: Arc<str> },

	#[error("{ty}.{member}: parameter {param} is passed with `in` and cannot be intercepted")]
	UnsupportedParameter {
		ty: Arc<str>,
		member: MemberKey,
		param: Arc<str>,
	},

	#[error("initializer failed while configuring {ty}: {source}")]
	Initializer {
		ty: Arc<str>,
		#[source]
		source: ConfigError,
	},
}

/// A rule could not be registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
	#[error("{ty} has no member {member}")]
	UnknownMember { ty: Arc<str>, member: MemberKey },

	#[error("{ty}.{member} is not overridable and cannot be configured")]
	NotInterceptable { ty: Arc<str>, member: MemberKey },

	#[error("{ty}.{member} has no overridable base implementation to call")]
	NoBaseImplementation { ty: Arc<str>, member: MemberKey },

	#[error("{ty}.{member} takes {expected} type argument(s), got {actual}")]
	GenericArity {
		ty: Arc<str>,
		member: MemberKey,
		expected: usize,
		actual: usize,
	},

	#[error("{ty}.{member} takes {expected} argument(s), got {actual} constraint(s)")]
	ArgumentCount {
		ty: Arc<str>,
		member: MemberKey,
		expected: usize,
		actual: usize,
	},
}

/// Outcome of a call that did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
	/// Raised by a `throws` behavior.
	#[error("{message}")]
	Thrown { message: Arc<str> },

	#[error("base implementation of {member} failed: {source}")]
	Base {
		member: MemberKey,
		#[source]
		source: BaseError,
	},

	#[error("{member} has no base implementation to forward to")]
	NoBaseImplementation { member: MemberKey },

	#[error("{ty} has no member {member}")]
	UnknownMember { ty: Arc<str>, member: MemberKey },

	#[error("{member} is sealed and has no body")]
	NotImplemented { member: MemberKey },
}

impl CallError {
	pub fn thrown(message: impl Into<Arc<str>>) -> Self {
		Self::Thrown {
			message: message.into(),
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
	#[error("fake of {ty} carries {rules} configured rule(s), which cannot be persisted")]
	ConfiguredBehavior { ty: Arc<str>, rules: usize },

	#[error("constructor argument {index} of {ty} is not a primitive or string and cannot be persisted")]
	UnencodableConstructorArg { ty: Arc<str>, index: usize },

	#[error("encoding failed: {0}")]
	Codec(#[from] postcard::Error),

	#[error("failed to recreate fake: {0}")]
	Creation(#[from] CreationError),
}

/// A call-history assertion did not hold.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
	"expected a call matching {matcher} to have happened {expected}, but it happened {actual} time(s)\nrecorded calls:\n{calls}"
)]
pub struct ExpectationError {
	pub matcher: String,
	pub expected: Repeated,
	pub actual: usize,
	pub calls: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
	#[error("failed to read {}: {source}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid runtime configuration: {0}")]
	Parse(#[from] toml::de::Error),
}
