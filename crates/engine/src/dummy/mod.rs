//! Dummy value synthesis.
//!
//! # Purpose
//!
//! A dummy is a placeholder value created only to satisfy a type requirement:
//! an unconfigured return value, a constructor argument, or an explicit
//! request from test code.
//!
//! # Mental Model
//!
//! 1. **Factories:** A [`DummyRegistry`] holds user-supplied [`DummyFactory`]
//!    entries. The highest-priority applicable factory wins outright.
//! 2. **Defaults:** Value types resolve to their zero, strings to `""`,
//!    wrappers to a completed wrapper around a recursively resolved result.
//! 3. **Construction:** Classes with a parameterless constructor are instantiated.
//! 4. **Fakes:** Interfaces and open classes resolve to a fresh, unconfigured fake.
//! 5. **Fallback:** Remaining classes are instantiated through the constructor
//!    with the fewest parameters whose arguments can themselves be resolved.
//!
//! Anything still unresolved becomes [`Value::Null`](decoy_meta::Value::Null).
//!
//! # Precedence Contract
//!
//! 1. **Priority:** Higher [`DummyFactory::priority`] wins.
//! 2. **Registration ordinal:** At equal priority, the earlier registration wins.
//!    Inventory entries are ingested in name order so the ordinal is deterministic.
//!
//! - Enforced in: [`cmp_factory`].
//!
//! # Invariants
//!
//! - Must not recurse unboundedly on self-referential types.
//!   - Enforced in: [`resolver::DummyResolver`] (in-progress set plus depth cap).
//!   - Failure symptom: stack overflow while creating a dummy.

mod resolver;


use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use decoy_meta::{TypeExpr, Value};

pub(crate) use resolver::DummyResolver;

/// Source of dummy values for the types it accepts.
pub trait DummyFactory: Send + Sync {
	fn name(&self) -> &str;

	/// Higher priority wins when several factories accept a type.
	fn priority(&self) -> i16 {
		0
	}

	fn can_create(&self, ty: &TypeExpr) -> bool;

	fn create(&self, ty: &TypeExpr) -> Value;
}

type ApplyFn = Arc<dyn Fn(&TypeExpr) -> bool + Send + Sync>;
type CreateFn = Arc<dyn Fn(&TypeExpr) -> Value + Send + Sync>;

/// Closure-backed factory.
pub struct FnDummyFactory {
	name: String,
	priority: i16,
	applies: ApplyFn,
	create: CreateFn,
}

impl FnDummyFactory {
	pub fn new(
		name: impl Into<String>,
		priority: i16,
		applies: impl Fn(&TypeExpr) -> bool + Send + Sync + 'static,
		create: impl Fn(&TypeExpr) -> Value + Send + Sync + 'static,
	) -> Self {
		Self {
			name: name.into(),
			priority,
			applies: Arc::new(applies),
			create: Arc::new(create),
		}
	}

	/// Factory for exactly one type.
	pub fn for_type(
		ty: TypeExpr,
		priority: i16,
		create: impl Fn() -> Value + Send + Sync + 'static,
	) -> Self {
		let name = format!("{ty}@{priority}");
		Self::new(name, priority, move |t: &TypeExpr| *t == ty, move |_: &TypeExpr| create())
	}
}

impl DummyFactory for FnDummyFactory {
	fn name(&self) -> &str {
		&self.name
	}

	fn priority(&self) -> i16 {
		self.priority
	}

	fn can_create(&self, ty: &TypeExpr) -> bool {
		(self.applies)(ty)
	}

	fn create(&self, ty: &TypeExpr) -> Value {
		(self.create)(ty)
	}
}

/// Statically declared factory, collected through `inventory`.
pub struct StaticDummyFactory {
	pub name: &'static str,
	pub priority: i16,
	pub applies: fn(&TypeExpr) -> bool,
	pub create: fn(&TypeExpr) -> Value,
}

impl DummyFactory for StaticDummyFactory {
	fn name(&self) -> &str {
		self.name
	}

	fn priority(&self) -> i16 {
		self.priority
	}

	fn can_create(&self, ty: &TypeExpr) -> bool {
		(self.applies)(ty)
	}

	fn create(&self, ty: &TypeExpr) -> Value {
		(self.create)(ty)
	}
}

/// Inventory wrapper for [`StaticDummyFactory`].
pub struct DummyFactoryReg(pub &'static StaticDummyFactory);

inventory::collect!(DummyFactoryReg);

/// Declares a process-wide dummy factory.
///
/// Picked up by [`DummyRegistryBuilder::extend_inventory`].
#[macro_export]
macro_rules! dummy_factory {
	($ident:ident, priority: $priority:expr, applies: $applies:expr, create: $create:expr $(,)?) => {
		static $ident: $crate::dummy::StaticDummyFactory = $crate::dummy::StaticDummyFactory {
			name: stringify!($ident),
			priority: $priority,
			applies: $applies,
			create: $create,
		};
		$crate::inventory::submit! { $crate::dummy::DummyFactoryReg(&$ident) }
	};
}

/// Where a factory entered the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorySource {
	Explicit,
	Inventory,
}

impl fmt::Display for FactorySource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Explicit => f.write_str("explicit"),
			Self::Inventory => f.write_str("inventory"),
		}
	}
}

#[derive(Clone)]
struct FactoryEntry {
	factory: Arc<dyn DummyFactory>,
	source: FactorySource,
	ordinal: u32,
}

/// Orders entries so the preferred factory sorts first.
fn cmp_factory(a: &FactoryEntry, b: &FactoryEntry) -> Ordering {
	b.factory
		.priority()
		.cmp(&a.factory.priority())
		.then_with(|| a.ordinal.cmp(&b.ordinal))
}

/// Immutable, precedence-ordered set of dummy factories.
#[derive(Clone, Default)]
pub struct DummyRegistry {
	entries: Arc<[FactoryEntry]>,
}

impl DummyRegistry {
	pub fn builder() -> DummyRegistryBuilder {
		DummyRegistryBuilder::default()
	}

	pub fn empty() -> Self {
		Self::default()
	}

	/// The winning factory for `ty`, if any accepts it.
	pub fn find(&self, ty: &TypeExpr) -> Option<&dyn DummyFactory> {
		self.entries
			.iter()
			.find(|e| e.factory.can_create(ty))
			.map(|e| e.factory.as_ref())
	}

	/// Factory names in precedence order, with their source.
	pub fn describe(&self) -> Vec<(String, i16, FactorySource)> {
		self.entries
			.iter()
			.map(|e| (e.factory.name().to_owned(), e.factory.priority(), e.source))
			.collect()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[derive(Default)]
pub struct DummyRegistryBuilder {
	entries: Vec<FactoryEntry>,
}

impl DummyRegistryBuilder {
	fn push(&mut self, factory: Arc<dyn DummyFactory>, source: FactorySource) {
		let ordinal = u32::try_from(self.entries.len()).unwrap_or(u32::MAX);
		self.entries.push(FactoryEntry {
			factory,
			source,
			ordinal,
		});
	}

	pub fn register(mut self, factory: impl DummyFactory + 'static) -> Self {
		self.push(Arc::new(factory), FactorySource::Explicit);
		self
	}

	pub fn register_arc(mut self, factory: Arc<dyn DummyFactory>) -> Self {
		self.push(factory, FactorySource::Explicit);
		self
	}

	/// Ingests every factory declared with [`dummy_factory!`](crate::dummy_factory).
	pub fn extend_inventory(mut self) -> Self {
		let mut regs: Vec<&'static StaticDummyFactory> =
			inventory::iter::<DummyFactoryReg>().map(|r| r.0).collect();
		regs.sort_by_key(|f| f.name);
		for reg in regs {
			self.push(Arc::new(StaticFactoryRef(reg)), FactorySource::Inventory);
		}
		self
	}

	pub fn build(mut self) -> DummyRegistry {
		self.entries.sort_by(cmp_factory);
		tracing::debug!(
			count = self.entries.len(),
			"dummy registry built"
		);
		DummyRegistry {
			entries: self.entries.into(),
		}
	}
}

struct StaticFactoryRef(&'static StaticDummyFactory);

impl DummyFactory for StaticFactoryRef {
	fn name(&self) -> &str {
		self.0.name
	}

	fn priority(&self) -> i16 {
		self.0.priority
	}

	fn can_create(&self, ty: &TypeExpr) -> bool {
		self.0.can_create(ty)
	}

	fn create(&self, ty: &TypeExpr) -> Value {
		self.0.create(ty)
	}
}
