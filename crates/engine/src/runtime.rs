//! Runtime entry point.
//!
//! A [`Runtime`] bundles the type catalog, the dummy factory registry and the
//! runtime configuration. All three are fixed at construction and shared
//! read-only by every fake the runtime creates.

use std::sync::Arc;

use decoy_meta::{TypeCatalog, TypeExpr, Value};

use crate::config::RuntimeConfig;
use crate::dummy::{DummyRegistry, DummyResolver};
use crate::error::CreationError;
use crate::proxy::{self, Fake, FakeOptions};

pub(crate) struct RuntimeShared {
	pub(crate) catalog: TypeCatalog,
	pub(crate) dummies: DummyRegistry,
	pub(crate) config: RuntimeConfig,
}

#[derive(Clone)]
pub struct Runtime {
	shared: Arc<RuntimeShared>,
}

impl Runtime {
	/// Runtime with no dummy factories and default configuration.
	pub fn new(catalog: TypeCatalog) -> Self {
		Self::builder(catalog).build()
	}

	pub fn builder(catalog: TypeCatalog) -> RuntimeBuilder {
		RuntimeBuilder {
			catalog,
			dummies: DummyRegistry::empty(),
			config: RuntimeConfig::default(),
		}
	}

	pub fn catalog(&self) -> &TypeCatalog {
		&self.shared.catalog
	}

	pub fn dummies(&self) -> &DummyRegistry {
		&self.shared.dummies
	}

	pub fn config(&self) -> &RuntimeConfig {
		&self.shared.config
	}

	/// Creates an unconfigured fake of the named type.
	pub fn fake(&self, type_name: &str) -> Result<Fake, CreationError> {
		self.fake_with(type_name, FakeOptions::default())
	}

	pub fn fake_with(&self, type_name: &str, options: FakeOptions) -> Result<Fake, CreationError> {
		let Some(desc) = self.shared.catalog.get(type_name) else {
			return Err(CreationError::UnknownType {
				name: type_name.to_owned(),
			});
		};
		let mut resolver = DummyResolver::new(&self.shared);
		proxy::create_fake(&mut resolver, desc, options)
	}

	/// Creates a fake for a type expression, which must name a class or interface.
	pub fn fake_of(&self, ty: &TypeExpr) -> Result<Fake, CreationError> {
		match ty {
			TypeExpr::Named(name) => self.fake(name),
			other => Err(CreationError::NotFakeable {
				ty: other.to_string(),
			}),
		}
	}

	/// Creates a dummy of `ty`, or null when nothing can produce one.
	pub fn dummy(&self, ty: &TypeExpr) -> Value {
		DummyResolver::new(&self.shared).resolve_or_null(ty)
	}

	/// Creates `count` independent dummies of `ty`.
	pub fn dummies_of(&self, ty: &TypeExpr, count: usize) -> Vec<Value> {
		(0..count).map(|_| self.dummy(ty)).collect()
	}

	/// Like [`Self::dummy`], but reports unresolvable types as `None`.
	pub fn try_dummy(&self, ty: &TypeExpr) -> Option<Value> {
		DummyResolver::new(&self.shared).resolve(ty)
	}
}

pub struct RuntimeBuilder {
	catalog: TypeCatalog,
	dummies: DummyRegistry,
	config: RuntimeConfig,
}

impl RuntimeBuilder {
	pub fn dummies(mut self, dummies: DummyRegistry) -> Self {
		self.dummies = dummies;
		self
	}

	pub fn config(mut self, config: RuntimeConfig) -> Self {
		self.config = config;
		self
	}

	pub fn build(self) -> Runtime {
		tracing::debug!(
			types = self.catalog.len(),
			factories = self.dummies.len(),
			"runtime initialized"
		);
		Runtime {
			shared: Arc::new(RuntimeShared {
				catalog: self.catalog,
				dummies: self.dummies,
				config: self.config,
			}),
		}
	}
}
