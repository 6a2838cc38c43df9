//! Rule configuration surface.
//!
//! # Role
//!
//! [`RuleBuilder`] collects a matcher, side effects and a repeat budget, then
//! registers a single [`CallRule`] when a terminal behavior is chosen. Nothing
//! is published until the terminal call succeeds, so a failed configuration
//! leaves the fake untouched.
//!
//! # Invariants
//!
//! - Member targets are validated against the fake's type before the rule is
//!   published.
//!   - Enforced in: [`RuleBuilder::validate`].
//!   - Failure symptom: a rule that can never match, or a call-base that fails
//!     on every call instead of at configuration time.

use std::sync::Arc;

use decoy_meta::{Accessor, MemberDesc, MemberKey, TypeExpr, Value, object_members};

use crate::error::{CallError, ConfigError};
use crate::history::RecordedCall;
use crate::matcher::{ArgConstraint, CallMatcher, CallTarget};
use crate::proxy::Fake;
use crate::rule::{CallRule, ReturnValueStrategy, SideEffect};

impl Fake {
	/// Starts configuring calls to one member.
	pub fn call_to(&self, member: impl Into<MemberKey>) -> RuleBuilder<'_> {
		self.configure_matcher(CallMatcher::member(member))
	}

	pub fn call_to_getter(&self, property: &str) -> RuleBuilder<'_> {
		self.configure_matcher(CallMatcher::getter(property))
	}

	pub fn call_to_setter(&self, property: &str) -> RuleBuilder<'_> {
		self.configure_matcher(CallMatcher::setter(property))
	}

	/// Starts configuring every intercepted call.
	pub fn any_call(&self) -> RuleBuilder<'_> {
		self.configure_matcher(CallMatcher::any_call())
	}

	/// Starts configuring calls whose specialized return type is `ty`.
	///
	/// Spans all instantiations of generic members.
	pub fn calls_with_return_type(&self, ty: TypeExpr) -> RuleBuilder<'_> {
		self.configure_matcher(CallMatcher::with_return_type(ty))
	}

	pub fn calls_with_non_void_return(&self) -> RuleBuilder<'_> {
		self.configure_matcher(CallMatcher::with_non_void_return())
	}

	pub fn calls_with_void_return(&self) -> RuleBuilder<'_> {
		self.configure_matcher(CallMatcher::with_void_return())
	}

	pub fn configure_matcher(&self, matcher: CallMatcher) -> RuleBuilder<'_> {
		RuleBuilder {
			fake: self,
			matcher,
			side_effects: Vec::new(),
			repeat: None,
		}
	}
}

/// Pending rule for one fake.
#[must_use = "a rule is only registered by a terminal behavior such as `returns`"]
pub struct RuleBuilder<'a> {
	fake: &'a Fake,
	matcher: CallMatcher,
	side_effects: Vec<SideEffect>,
	repeat: Option<usize>,
}

impl RuleBuilder<'_> {
	/// Restricts a member rule to one generic instantiation.
	pub fn with_type_args(mut self, type_args: impl IntoIterator<Item = TypeExpr>) -> Self {
		self.matcher = self.matcher.type_args(type_args);
		self
	}

	/// Constrains every argument position.
	pub fn with_args(mut self, constraints: impl IntoIterator<Item = ArgConstraint>) -> Self {
		self.matcher = self.matcher.args(constraints);
		self
	}

	pub fn when_args(
		mut self,
		description: impl Into<Arc<str>>,
		predicate: impl Fn(&[Value]) -> bool + Send + Sync + 'static,
	) -> Self {
		self.matcher = self.matcher.when_args(description, predicate);
		self
	}

	pub fn where_call(
		mut self,
		description: impl Into<Arc<str>>,
		predicate: impl Fn(&RecordedCall) -> bool + Send + Sync + 'static,
	) -> Self {
		self.matcher = self.matcher.where_call(description, predicate);
		self
	}

	/// Runs `effect` on every call the rule answers, before its behavior.
	pub fn invokes(mut self, effect: impl Fn(&RecordedCall) + Send + Sync + 'static) -> Self {
		self.side_effects.push(Arc::new(effect));
		self
	}

	/// Lets the rule answer at most `n` calls.
	pub fn times(mut self, n: usize) -> Self {
		self.repeat = Some(n);
		self
	}

	pub fn once(self) -> Self {
		self.times(1)
	}

	pub fn twice(self) -> Self {
		self.times(2)
	}

	pub fn returns(self, value: impl Into<Value>) -> Result<Arc<CallRule>, ConfigError> {
		self.finish(ReturnValueStrategy::Fixed(value.into()))
	}

	/// Evaluates `producer` once per answered call.
	pub fn returns_lazily(
		self,
		producer: impl Fn() -> Value + Send + Sync + 'static,
	) -> Result<Arc<CallRule>, ConfigError> {
		self.returns_lazily_with(move |_: &RecordedCall| producer())
	}

	pub fn returns_lazily_with(
		self,
		producer: impl Fn(&RecordedCall) -> Value + Send + Sync + 'static,
	) -> Result<Arc<CallRule>, ConfigError> {
		self.finish(ReturnValueStrategy::Lazy(Arc::new(producer)))
	}

	/// Returns `values` one per call, then stops answering.
	pub fn returns_sequence(
		self,
		values: impl IntoIterator<Item = Value>,
	) -> Result<Arc<CallRule>, ConfigError> {
		self.finish(ReturnValueStrategy::sequence(values))
	}

	/// Answers with the synthesized default for the return type.
	pub fn returns_default(self) -> Result<Arc<CallRule>, ConfigError> {
		self.finish(ReturnValueStrategy::DoNothing)
	}

	/// Answers without effect; for setters this bypasses the backing store.
	pub fn does_nothing(self) -> Result<Arc<CallRule>, ConfigError> {
		self.finish(ReturnValueStrategy::DoNothing)
	}

	/// Registers only the side effects collected through [`Self::invokes`].
	pub fn register(self) -> Result<Arc<CallRule>, ConfigError> {
		self.finish(ReturnValueStrategy::DoNothing)
	}

	pub fn calls_base(self) -> Result<Arc<CallRule>, ConfigError> {
		self.finish(ReturnValueStrategy::CallBase)
	}

	pub fn throws(self, error: CallError) -> Result<Arc<CallRule>, ConfigError> {
		self.throws_with(move |_: &RecordedCall| error.clone())
	}

	pub fn throws_with(
		self,
		make: impl Fn(&RecordedCall) -> CallError + Send + Sync + 'static,
	) -> Result<Arc<CallRule>, ConfigError> {
		self.finish(ReturnValueStrategy::Throws(Arc::new(make)))
	}

	fn finish(self, strategy: ReturnValueStrategy) -> Result<Arc<CallRule>, ConfigError> {
		self.validate(&strategy)?;
		let mut rule = CallRule::new(self.matcher, strategy).with_side_effects(self.side_effects);
		if let Some(n) = self.repeat {
			rule = rule.with_repeat(n);
		}
		Ok(self.fake.manager().add_rule(rule))
	}

	fn validate(&self, strategy: &ReturnValueStrategy) -> Result<(), ConfigError> {
		let Some(key) = self.matcher.member_key() else {
			return Ok(());
		};
		let ty = self.fake.manager().fake_type();
		let member = ty.get_member(key).ok_or_else(|| ConfigError::UnknownMember {
			ty: ty.name.clone(),
			member: key.clone(),
		})?;
		let err_ctx = || (ty.name.clone(), key.clone());

		if !member.is_interceptable() {
			let (ty, member) = err_ctx();
			return Err(ConfigError::NotInterceptable { ty, member });
		}

		if let CallTarget::Member { type_args, .. } = &self.matcher.target
			&& type_args.len() != member.generic_arity
		{
			let (ty, member_key) = err_ctx();
			return Err(ConfigError::GenericArity {
				ty,
				member: member_key,
				expected: member.generic_arity,
				actual: type_args.len(),
			});
		}

		if let Some(args) = &self.matcher.args
			&& args.len() != member.params.len()
		{
			let (ty, member_key) = err_ctx();
			return Err(ConfigError::ArgumentCount {
				ty,
				member: member_key,
				expected: member.params.len(),
				actual: args.len(),
			});
		}

		if matches!(strategy, ReturnValueStrategy::CallBase) && !can_call_base(member) {
			let (ty, member) = err_ctx();
			return Err(ConfigError::NoBaseImplementation { ty, member });
		}
		Ok(())
	}
}

/// Whether forwarding `member` to a base implementation can ever succeed.
fn can_call_base(member: &MemberDesc) -> bool {
	if member.has_overridable_base() {
		return true;
	}
	member.key.accessor == Accessor::Method
		&& matches!(
			&*member.key.name,
			object_members::EQUALS | object_members::HASH_CODE | object_members::TO_STRING
		)
}
