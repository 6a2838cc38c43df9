//! Fake instances and their intercept tables.
//!
//! # Role
//!
//! Stands in for runtime proxy generation. Creating a fake validates the
//! target type, picks constructor arguments, and builds an intercept table:
//! one handler per member. Interceptable members route into the
//! [`FakeManager`] record-then-resolve pipeline; sealed members run their body
//! directly and are never recorded.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use decoy_meta::{
	Args, BaseCall, Instance, MemberDesc, MemberKey, ObjectRef, ParamMode, TypeArgs, TypeDesc,
	TypeExpr, Value, object_members,
};
use rustc_hash::FxHashMap;

use crate::dummy::DummyResolver;
use crate::error::{CallError, ConfigError, CreationError};
use crate::manager::FakeManager;

type Handler = Arc<dyn Fn(&Fake, Invocation) -> Result<Value, CallError> + Send + Sync>;
type Initializer = Arc<dyn Fn(&Fake) -> Result<(), ConfigError> + Send + Sync>;

/// A member invocation as seen by the intercept table.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
	pub type_args: TypeArgs,
	pub args: Args,
}

impl Invocation {
	pub fn new(args: impl IntoIterator<Item = Value>) -> Self {
		Self {
			type_args: TypeArgs::new(),
			args: args.into_iter().collect(),
		}
	}

	pub fn with_type_args(mut self, type_args: impl IntoIterator<Item = TypeExpr>) -> Self {
		self.type_args = type_args.into_iter().collect();
		self
	}
}

/// Creation-time options for a fake.
#[derive(Clone, Default)]
pub struct FakeOptions {
	pub(crate) name: Option<Arc<str>>,
	pub(crate) calls_base: Option<bool>,
	pub(crate) constructor_args: Option<Vec<Value>>,
	pub(crate) initializers: Vec<Initializer>,
}

impl FakeOptions {
	pub fn new() -> Self {
		Self::default()
	}

	/// Names the fake; the name becomes its default string representation.
	pub fn named(mut self, name: impl Into<Arc<str>>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Forwards unconfigured calls to base implementations where they exist.
	pub fn calls_base_methods(mut self) -> Self {
		self.calls_base = Some(true);
		self
	}

	/// Uses the accessible constructor whose arity matches `args`.
	pub fn with_constructor_args(mut self, args: impl IntoIterator<Item = Value>) -> Self {
		self.constructor_args = Some(args.into_iter().collect());
		self
	}

	/// Runs `init` against the fake before it is handed out.
	pub fn configure(
		mut self,
		init: impl Fn(&Fake) -> Result<(), ConfigError> + Send + Sync + 'static,
	) -> Self {
		self.initializers.push(Arc::new(init));
		self
	}
}

impl fmt::Debug for FakeOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FakeOptions")
			.field("name", &self.name)
			.field("calls_base", &self.calls_base)
			.field("constructor_args", &self.constructor_args)
			.field("initializers", &self.initializers.len())
			.finish()
	}
}

struct InterceptTable {
	handlers: FxHashMap<MemberKey, Handler>,
}

impl InterceptTable {
	fn build(desc: &TypeDesc) -> Self {
		let mut handlers: FxHashMap<MemberKey, Handler> = FxHashMap::default();
		for member in &desc.members {
			let key = member.key.clone();
			let member = Arc::new(member.clone());
			let handler: Handler = if member.is_interceptable() {
				Arc::new(move |fake: &Fake, inv: Invocation| fake.0.manager.intercept(fake, &member, inv))
			} else {
				Arc::new(move |fake: &Fake, inv: Invocation| direct(fake, &member, inv))
			};
			handlers.insert(key, handler);
		}
		Self { handlers }
	}
}

/// Runs a sealed member's own body without recording.
fn direct(fake: &Fake, member: &MemberDesc, inv: Invocation) -> Result<Value, CallError> {
	let Some(base) = &member.base else {
		return Err(CallError::NotImplemented {
			member: member.key.clone(),
		});
	};
	let this = fake.object_ref();
	base(&BaseCall {
		this: &this,
		member: &member.key,
		args: &inv.args,
		type_args: &inv.type_args,
	})
	.map_err(|source| CallError::Base {
		member: member.key.clone(),
		source,
	})
}

pub(crate) struct FakeObject {
	pub(crate) manager: FakeManager,
	table: InterceptTable,
}

impl Instance for FakeObject {
	fn type_name(&self) -> &str {
		&self.manager.fake_type().name
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
		self
	}
}

/// Handle to a faked instance.
///
/// Cloning yields another handle to the same instance. `==` and [`Hash`] use
/// reference identity; the configurable `equals`/`hash_code`/`to_string`
/// members are reached through [`Fake::invoke`] or [`Fake::equals`].
#[derive(Clone)]
pub struct Fake(pub(crate) Arc<FakeObject>);

impl Fake {
	/// The manager owning this instance's rules and history.
	pub fn manager(&self) -> &FakeManager {
		&self.0.manager
	}

	/// Recovers the fake behind a value, if it holds one.
	pub fn from_value(value: &Value) -> Option<Fake> {
		value.as_object()?.downcast::<FakeObject>().map(Fake)
	}

	pub fn object_ref(&self) -> ObjectRef {
		ObjectRef::new(self.0.clone())
	}

	pub fn into_value(self) -> Value {
		Value::Object(ObjectRef::new(self.0))
	}

	pub fn type_name(&self) -> &str {
		&self.manager().fake_type().name
	}

	/// Calls a member through the intercept table.
	pub fn invoke(
		&self,
		member: impl Into<MemberKey>,
		invocation: Invocation,
	) -> Result<Value, CallError> {
		let key = member.into();
		let Some(handler) = self.0.table.handlers.get(&key) else {
			return Err(CallError::UnknownMember {
				ty: self.manager().fake_type().name.clone(),
				member: key,
			});
		};
		handler(self, invocation)
	}

	/// Calls a non-generic method.
	pub fn call(
		&self,
		method: &str,
		args: impl IntoIterator<Item = Value>,
	) -> Result<Value, CallError> {
		self.invoke(MemberKey::method(method), Invocation::new(args))
	}

	/// Calls a generic method at one instantiation.
	pub fn call_generic(
		&self,
		method: &str,
		type_args: impl IntoIterator<Item = TypeExpr>,
		args: impl IntoIterator<Item = Value>,
	) -> Result<Value, CallError> {
		self.invoke(
			MemberKey::method(method),
			Invocation::new(args).with_type_args(type_args),
		)
	}

	pub fn get(&self, property: &str) -> Result<Value, CallError> {
		self.invoke(MemberKey::getter(property), Invocation::default())
	}

	pub fn set(&self, property: &str, value: impl Into<Value>) -> Result<(), CallError> {
		self.invoke(MemberKey::setter(property), Invocation::new([value.into()]))
			.map(drop)
	}

	/// Invokes the `equals` member.
	pub fn equals(&self, other: &Value) -> Result<bool, CallError> {
		let out = self.call(object_members::EQUALS, [other.clone()])?;
		Ok(out.as_bool().unwrap_or(false))
	}

	/// Invokes the `hash_code` member.
	pub fn hash_code(&self) -> Result<i64, CallError> {
		let out = self.call(object_members::HASH_CODE, [])?;
		Ok(out.as_int().unwrap_or_default())
	}

	pub(crate) fn identity(&self) -> usize {
		Arc::as_ptr(&self.0) as usize
	}
}

impl PartialEq for Fake {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl Eq for Fake {}

impl Hash for Fake {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.identity().hash(state);
	}
}

impl fmt::Display for Fake {
	/// Renders through the `to_string` member, so configuring it changes the output.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.call(object_members::TO_STRING, []) {
			Ok(Value::Str(s)) => f.write_str(&s),
			_ => f.write_str(&self.manager().default_display()),
		}
	}
}

impl fmt::Debug for Fake {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Fake")
			.field("type", &self.type_name())
			.field("rules", &self.manager().rules().len())
			.field("calls", &self.manager().call_count())
			.finish()
	}
}

/// Checks that `desc` can back a proxy.
pub(crate) fn validate(desc: &TypeDesc) -> Result<(), CreationError> {
	if !desc.is_accessible() {
		return Err(CreationError::Inaccessible {
			ty: desc.name.clone(),
		});
	}
	if desc.is_sealed() {
		return Err(CreationError::Sealed {
			ty: desc.name.clone(),
		});
	}
	if !desc.is_interface() && desc.accessible_constructors().next().is_none() {
		return Err(CreationError::NoAccessibleConstructor {
			ty: desc.name.clone(),
		});
	}
	for member in desc.interceptable_members() {
		if let Some(param) = member.params.iter().find(|p| p.mode == ParamMode::In) {
			return Err(CreationError::UnsupportedParameter {
				ty: desc.name.clone(),
				member: member.key.clone(),
				param: param.name.clone(),
			});
		}
	}
	Ok(())
}

/// Creates a fake of `desc` within an ongoing resolution session.
pub(crate) fn create_fake(
	resolver: &mut DummyResolver<'_>,
	desc: &Arc<TypeDesc>,
	options: FakeOptions,
) -> Result<Fake, CreationError> {
	validate(desc)?;

	let constructor_args = if desc.is_interface() {
		Vec::new()
	} else if let Some(args) = options.constructor_args.clone() {
		let arity = args.len();
		if !desc.accessible_constructors().any(|c| c.arity() == arity) {
			return Err(CreationError::NoMatchingConstructor {
				ty: desc.name.clone(),
				arity,
			});
		}
		args
	} else {
		resolver
			.guarded(&desc.name, |r| r.constructor_args(desc))
			.ok_or_else(|| CreationError::UnresolvableConstructor {
				ty: desc.name.clone(),
			})?
	};

	let shared = resolver.shared().clone();
	let calls_base = options
		.calls_base
		.unwrap_or(shared.config.fakes.calls_base_by_default);
	let manager = FakeManager::new(
		desc.clone(),
		shared,
		options.name.clone(),
		calls_base,
		constructor_args,
		options.constructor_args.is_some() && !desc.is_interface(),
	);
	let fake = Fake(Arc::new(FakeObject {
		manager,
		table: InterceptTable::build(desc),
	}));

	for init in &options.initializers {
		init(&fake).map_err(|source| CreationError::Initializer {
			ty: desc.name.clone(),
			source,
		})?;
	}

	tracing::debug!(
		ty = %desc.name,
		name = ?options.name,
		calls_base,
		"fake created"
	);
	Ok(fake)
}
