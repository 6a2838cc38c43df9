//! Per-instance fake controller.
//!
//! # Purpose
//!
//! A [`FakeManager`] owns everything one faked instance knows: its rules, its
//! call history, and the backing store that makes unconfigured properties
//! behave like auto-implemented fields.
//!
//! # Mental Model
//!
//! Every intercepted call goes through the same pipeline:
//!
//! 1. **Record:** The call is appended to history before anything else, so a
//!    call is recorded even when its resolution fails.
//! 2. **Rules:** Rules are scanned newest-first. The first rule that matches
//!    and is still eligible answers the call.
//! 3. **Fallback:** Without an answering rule the call resolves to the base body
//!    (when the fake calls base methods), the property backing store, the object
//!    identity members, or a synthesized default. Fallback never fails.
//!
//! # Property Contract
//!
//! - An unconfigured get returns the stored value, storing a default first if
//!   nothing was stored yet.
//! - An unconfigured set stores its argument.
//! - A configured get ignores the store, so a later plain set has no visible effect.
//! - A configured set bypasses the store, so the getter keeps its last value.
//!
//! # Concurrency
//!
//! - Rule and history reads operate on snapshots and never block writers.
//! - The property store is guarded by a mutex held only for map access.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use decoy_meta::{
	Accessor, BaseCall, MemberDesc, MemberKey, ObjectRef, TypeDesc, TypeExpr, Value,
	object_members,
};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::dummy::DummyResolver;
use crate::error::CallError;
use crate::history::{CallHistory, RecordedCall};
use crate::proxy::{Fake, Invocation};
use crate::rule::{CallRule, Outcome, RuleRegistry, RuleSnapshot};
use crate::runtime::RuntimeShared;

pub struct FakeManager {
	ty: Arc<TypeDesc>,
	name: Option<Arc<str>>,
	calls_base: bool,
	constructor_args: Vec<Value>,
	/// Whether `constructor_args` were chosen by the caller rather than resolved.
	explicit_args: bool,
	rules: RuleRegistry,
	history: CallHistory,
	properties: Mutex<FxHashMap<Arc<str>, Value>>,
	shared: Arc<RuntimeShared>,
}

impl FakeManager {
	pub(crate) fn new(
		ty: Arc<TypeDesc>,
		shared: Arc<RuntimeShared>,
		name: Option<Arc<str>>,
		calls_base: bool,
		constructor_args: Vec<Value>,
		explicit_args: bool,
	) -> Self {
		Self {
			ty,
			name,
			calls_base,
			constructor_args,
			explicit_args,
			rules: RuleRegistry::new(),
			history: CallHistory::default(),
			properties: Mutex::new(FxHashMap::default()),
			shared,
		}
	}

	pub fn fake_type(&self) -> &Arc<TypeDesc> {
		&self.ty
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn calls_base_methods(&self) -> bool {
		self.calls_base
	}

	/// Arguments the proxy's base constructor ran with.
	pub fn constructor_args(&self) -> &[Value] {
		&self.constructor_args
	}

	/// Whether the constructor arguments came from
	/// [`FakeOptions::with_constructor_args`](crate::FakeOptions::with_constructor_args).
	pub fn has_explicit_constructor_args(&self) -> bool {
		self.explicit_args
	}

	/// Rules in registration order.
	pub fn rules(&self) -> RuleSnapshot {
		self.rules.snapshot()
	}

	/// Recorded calls in recording order.
	pub fn calls(&self) -> Vec<Arc<RecordedCall>> {
		self.history.snapshot()
	}

	pub fn call_count(&self) -> usize {
		self.history.len()
	}

	/// Publishes a fully built rule ahead of all existing ones.
	pub fn add_rule(&self, rule: CallRule) -> Arc<CallRule> {
		let rule = self.rules.add(rule);
		tracing::debug!(ty = %self.ty.name, rule = %rule, "rule added");
		rule
	}

	/// Drops all rules and stored property values. History is kept.
	pub fn reset(&self) {
		self.rules.clear();
		self.properties.lock().clear();
		tracing::debug!(ty = %self.ty.name, "fake reset");
	}

	/// Default string representation.
	pub fn default_display(&self) -> String {
		match &self.name {
			Some(name) => name.to_string(),
			None => format!("Faked {}", self.ty.name),
		}
	}

	/// Appends a call to history.
	pub fn record_call(&self, member: &MemberDesc, invocation: Invocation) -> Arc<RecordedCall> {
		let return_type = member.return_type_for(&invocation.type_args);
		let call = self.history.append(RecordedCall::new(
			member.key.clone(),
			invocation.type_args,
			invocation.args,
			return_type,
		));
		tracing::trace!(ty = %self.ty.name, seq = call.sequence, call = %call, "call recorded");
		call
	}

	/// Produces the outcome of a recorded call.
	pub fn resolve(
		&self,
		this: &ObjectRef,
		member: &MemberDesc,
		call: &RecordedCall,
	) -> Result<Value, CallError> {
		let rules = self.rules.snapshot();
		for rule in rules.by_precedence() {
			let Some(outcome) = rule.apply(call) else {
				continue;
			};
			tracing::trace!(seq = call.sequence, rule = ?rule.id(), "rule matched");
			return self.finish(this, member, call, outcome);
		}
		self.resolve_unconfigured(this, member, call)
	}

	pub(crate) fn intercept(
		&self,
		fake: &Fake,
		member: &MemberDesc,
		invocation: Invocation,
	) -> Result<Value, CallError> {
		let call = self.record_call(member, invocation);
		self.resolve(&fake.object_ref(), member, &call)
	}

	fn finish(
		&self,
		this: &ObjectRef,
		member: &MemberDesc,
		call: &RecordedCall,
		outcome: Outcome,
	) -> Result<Value, CallError> {
		match outcome {
			Outcome::Value(value) => Ok(present(&call.return_type, value)),
			Outcome::Default => Ok(self.default_value(&call.return_type)),
			Outcome::Throw(err) => Err(err),
			Outcome::CallBase => self.call_base(this, member, call),
		}
	}

	fn resolve_unconfigured(
		&self,
		this: &ObjectRef,
		member: &MemberDesc,
		call: &RecordedCall,
	) -> Result<Value, CallError> {
		if self.calls_base && member.base.is_some() {
			return self.call_base(this, member, call);
		}
		let value = match member.key.accessor {
			Accessor::Get => self.stored_property(&member.key.name, &call.return_type),
			Accessor::Set => {
				let value = call.args.first().cloned().unwrap_or(Value::Null);
				self.properties.lock().insert(member.key.name.clone(), value);
				Value::Unit
			}
			Accessor::EventAdd | Accessor::EventRemove => Value::Unit,
			Accessor::Method => match identity_member(this, &member.key, call, self) {
				Some(value) => value,
				None => self.default_value(&call.return_type),
			},
		};
		Ok(value)
	}

	fn stored_property(&self, name: &Arc<str>, ty: &TypeExpr) -> Value {
		if let Some(value) = self.properties.lock().get(name) {
			return value.clone();
		}
		// Resolve outside the lock; the default may itself create fakes.
		let value = self.default_value(ty);
		self.properties
			.lock()
			.entry(name.clone())
			.or_insert(value)
			.clone()
	}

	fn call_base(
		&self,
		this: &ObjectRef,
		member: &MemberDesc,
		call: &RecordedCall,
	) -> Result<Value, CallError> {
		if let Some(base) = &member.base {
			let value = base(&BaseCall {
				this,
				member: &member.key,
				args: &call.args,
				type_args: &call.type_args,
			})
			.map_err(|source| CallError::Base {
				member: member.key.clone(),
				source,
			})?;
			return Ok(present(&call.return_type, value));
		}
		identity_member(this, &member.key, call, self).ok_or_else(|| {
			CallError::NoBaseImplementation {
				member: member.key.clone(),
			}
		})
	}

	/// Synthesized default for an unanswered call.
	pub(crate) fn default_value(&self, ty: &TypeExpr) -> Value {
		DummyResolver::new(&self.shared).resolve_or_null(ty)
	}
}

/// Identity semantics for the object members.
fn identity_member(
	this: &ObjectRef,
	key: &MemberKey,
	call: &RecordedCall,
	manager: &FakeManager,
) -> Option<Value> {
	if key.accessor != Accessor::Method {
		return None;
	}
	match &*key.name {
		object_members::EQUALS => {
			let same = matches!(call.args.first(), Some(Value::Object(other)) if other == this);
			Some(Value::Bool(same))
		}
		object_members::HASH_CODE => Some(Value::Int(this.addr() as i64)),
		object_members::TO_STRING => Some(Value::str(manager.default_display())),
		_ => None,
	}
}

/// Presents a produced value in the shape of the declared return type.
///
/// Wrapper returns receive the value pre-completed unless it is already a
/// completed wrapper.
fn present(return_type: &TypeExpr, value: Value) -> Value {
	match (return_type.as_wrapper(), value) {
		(Some(_), value @ Value::Completed { .. }) => value,
		(Some((wrapper, None)), _) => Value::completed(wrapper, Value::Unit),
		(Some((wrapper, Some(_))), value) => Value::completed(wrapper, value),
		(None, value) => value,
	}
}
