//! Persistence boundary for fakes.
//!
//! Only creation parameters cross the boundary. Configured rules hold closures
//! and cannot be encoded, so persisting a configured fake fails instead of
//! silently dropping its behavior. Call history is never persisted.
//!
//! # Constructor Arguments
//!
//! - Arguments passed through [`FakeOptions::with_constructor_args`] are
//!   persisted when every one is a primitive, a string, or null. Any other
//!   explicit argument fails the encode.
//! - Arguments the runtime resolved itself are not persisted; restoring
//!   resolves them again.

use decoy_meta::Value;
use serde::{Deserialize, Serialize};

use crate::error::SerializationError;
use crate::proxy::{Fake, FakeOptions};
use crate::runtime::Runtime;

/// Encoded shape of a fake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedFake {
	pub type_name: String,
	pub name: Option<String>,
	pub calls_base: bool,
	/// Explicit constructor arguments; `None` when they were resolved.
	pub constructor_args: Option<Vec<PersistedValue>>,
}

/// A constructor argument that survives encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PersistedValue {
	Unit,
	Null,
	Bool(bool),
	Int(i64),
	UInt(u64),
	Float(f64),
	Char(char),
	Str(String),
}

impl PersistedValue {
	fn encode(value: &Value) -> Option<Self> {
		Some(match value {
			Value::Unit => Self::Unit,
			Value::Null => Self::Null,
			Value::Bool(b) => Self::Bool(*b),
			Value::Int(n) => Self::Int(*n),
			Value::UInt(n) => Self::UInt(*n),
			Value::Float(x) => Self::Float(*x),
			Value::Char(c) => Self::Char(*c),
			Value::Str(s) => Self::Str(s.to_string()),
			Value::Completed { .. } | Value::Object(_) => return None,
		})
	}
}

impl From<&PersistedValue> for Value {
	fn from(value: &PersistedValue) -> Self {
		match value {
			PersistedValue::Unit => Value::Unit,
			PersistedValue::Null => Value::Null,
			PersistedValue::Bool(b) => Value::Bool(*b),
			PersistedValue::Int(n) => Value::Int(*n),
			PersistedValue::UInt(n) => Value::UInt(*n),
			PersistedValue::Float(x) => Value::Float(*x),
			PersistedValue::Char(c) => Value::Char(*c),
			PersistedValue::Str(s) => Value::str(s.as_str()),
		}
	}
}

impl Fake {
	/// Captures the creation parameters of an unconfigured fake.
	pub fn to_persisted(&self) -> Result<PersistedFake, SerializationError> {
		let manager = self.manager();
		let rules = manager.rules().len();
		if rules > 0 {
			return Err(SerializationError::ConfiguredBehavior {
				ty: manager.fake_type().name.clone(),
				rules,
			});
		}

		let constructor_args = if manager.has_explicit_constructor_args() {
			let args = manager
				.constructor_args()
				.iter()
				.enumerate()
				.map(|(index, arg)| {
					PersistedValue::encode(arg).ok_or_else(|| {
						SerializationError::UnencodableConstructorArg {
							ty: manager.fake_type().name.clone(),
							index,
						}
					})
				})
				.collect::<Result<Vec<_>, _>>()?;
			Some(args)
		} else {
			None
		};

		Ok(PersistedFake {
			type_name: self.type_name().to_owned(),
			name: manager.name().map(str::to_owned),
			calls_base: manager.calls_base_methods(),
			constructor_args,
		})
	}

	pub fn persist(&self) -> Result<Vec<u8>, SerializationError> {
		let shape = self.to_persisted()?;
		let bytes = postcard::to_allocvec(&shape)?;
		tracing::debug!(ty = %shape.type_name, len = bytes.len(), "fake persisted");
		Ok(bytes)
	}
}

impl Runtime {
	/// Recreates a persisted fake with an empty history.
	pub fn restore_fake(&self, bytes: &[u8]) -> Result<Fake, SerializationError> {
		let shape: PersistedFake = postcard::from_bytes(bytes)?;
		self.restore(&shape)
	}

	pub fn restore(&self, shape: &PersistedFake) -> Result<Fake, SerializationError> {
		let mut options = FakeOptions::new();
		if let Some(name) = &shape.name {
			options = options.named(name.as_str());
		}
		if let Some(args) = &shape.constructor_args {
			options = options.with_constructor_args(args.iter().map(Value::from));
		}
		options.calls_base = Some(shape.calls_base);
		Ok(self.fake_with(&shape.type_name, options)?)
	}
}
