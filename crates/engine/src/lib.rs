//! Call interception and resolution core for test fakes.
//!
//! # Purpose
//!
//! Creates stand-in instances ("fakes") for the types of a
//! [`TypeCatalog`](decoy_meta::TypeCatalog), records every call made to them,
//! and decides what each call produces: a configured behavior when a rule
//! matches, otherwise a synthesized default.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`Runtime`] | Entry point: catalog, dummy factories, configuration. |
//! | [`Fake`] | Handle to one faked instance. |
//! | [`FakeManager`] | Per-instance rules, history and property store. |
//! | [`CallRule`] | Matcher bound to a behavior and optional repeat budget. |
//! | [`CallMatcher`] | Member identity, argument and whole-call constraints. |
//! | [`DummyRegistry`] | Precedence-ordered dummy factories. |
//!
//! # Example
//!
//! ```
//! use decoy_engine::{Runtime, Value};
//! use decoy_meta::{TypeCatalog, TypeDesc, TypeExpr};
//!
//! let catalog = TypeCatalog::builder()
//! 	.add(TypeDesc::interface("IFoo").method("Bar", TypeExpr::INT))
//! 	.build()
//! 	.unwrap();
//! let runtime = Runtime::new(catalog);
//! let foo = runtime.fake("IFoo").unwrap();
//!
//! assert_eq!(foo.call("Bar", []).unwrap(), Value::Int(0));
//! foo.call_to("Bar").returns(42).unwrap();
//! assert_eq!(foo.call("Bar", []).unwrap(), Value::Int(42));
//! ```

mod assertions;
mod config;
mod configure;
pub mod dummy;
mod error;
mod history;
mod manager;
mod matcher;
mod persist;
mod proxy;
mod rule;
mod runtime;

pub use assertions::Repeated;
pub use config::{DummyConfig, FakeConfig, RuntimeConfig};
pub use configure::RuleBuilder;
pub use decoy_meta::Value;
pub use dummy::{DummyFactory, DummyRegistry, DummyRegistryBuilder, FnDummyFactory};
pub use error::{
	CallError, ConfigError, ConfigLoadError, CreationError, ExpectationError, SerializationError,
};
pub use history::{CallHistory, RecordedCall};
pub use manager::FakeManager;
pub use matcher::{ArgConstraint, CallMatcher, CallPredicate, CallTarget};
pub use persist::{PersistedFake, PersistedValue};
pub use proxy::{Fake, FakeOptions, Invocation};
pub use rule::{CallRule, Outcome, ReturnValueStrategy, RuleId, RuleRegistry, RuleSnapshot};
pub use runtime::{Runtime, RuntimeBuilder};

#[doc(hidden)]
pub use inventory;
