//! Per-request dummy resolution session.
//!
//! # Role
//!
//! One [`DummyResolver`] lives for one top-level resolution. It tracks the
//! named types currently under construction so that a type whose constructor
//! needs an instance of itself (directly or through a chain) fails that branch
//! instead of recursing.

use std::sync::Arc;

use decoy_meta::{ConstructedObject, ConstructorDesc, TypeDesc, TypeExpr, Value};
use rustc_hash::FxHashSet;

use crate::proxy::{self, FakeOptions};
use crate::runtime::RuntimeShared;

pub(crate) struct DummyResolver<'a> {
	shared: &'a Arc<RuntimeShared>,
	in_progress: FxHashSet<Arc<str>>,
	depth: usize,
}

impl<'a> DummyResolver<'a> {
	pub(crate) fn new(shared: &'a Arc<RuntimeShared>) -> Self {
		Self {
			shared,
			in_progress: FxHashSet::default(),
			depth: 0,
		}
	}

	/// Resolves `ty`, or `None` when no strategy can produce it.
	pub(crate) fn resolve(&mut self, ty: &TypeExpr) -> Option<Value> {
		if self.depth > self.shared.config.dummies.max_depth {
			tracing::debug!(%ty, depth = self.depth, "dummy depth limit reached");
			return None;
		}
		self.depth += 1;
		let resolved = self.resolve_inner(ty);
		self.depth -= 1;
		resolved
	}

	/// Resolves `ty`, falling back to null.
	pub(crate) fn resolve_or_null(&mut self, ty: &TypeExpr) -> Value {
		self.resolve(ty).unwrap_or(Value::Null)
	}

	fn resolve_inner(&mut self, ty: &TypeExpr) -> Option<Value> {
		if let Some(factory) = self.shared.dummies.find(ty) {
			tracing::trace!(%ty, factory = factory.name(), "dummy from factory");
			return Some(factory.create(ty));
		}

		if let Some((wrapper, inner)) = ty.as_wrapper() {
			let value = match inner {
				Some(inner) => self.resolve_or_null(inner),
				None => Value::Unit,
			};
			return Some(Value::completed(wrapper, value));
		}

		match ty {
			TypeExpr::Void => Some(Value::Unit),
			TypeExpr::Primitive(p) => Some(p.zero()),
			TypeExpr::String => Some(Value::str("")),
			TypeExpr::Named(name) => {
				let desc = self.shared.catalog.get(name)?.clone();
				self.resolve_named(&desc)
			}
			_ => None,
		}
	}

	fn resolve_named(&mut self, desc: &Arc<TypeDesc>) -> Option<Value> {
		if !self.in_progress.insert(desc.name.clone()) {
			tracing::debug!(ty = %desc.name, "dummy cycle detected");
			return None;
		}
		let resolved = self.construct_or_fake(desc);
		self.in_progress.remove(&desc.name);
		resolved
	}

	fn construct_or_fake(&mut self, desc: &Arc<TypeDesc>) -> Option<Value> {
		let concrete = !desc.is_interface() && !desc.is_abstract();

		if concrete && desc.default_constructor().is_some() {
			return Some(construct(desc, Vec::new()));
		}

		match proxy::create_fake(self, desc, FakeOptions::default()) {
			Ok(fake) => return Some(fake.into_value()),
			Err(err) => tracing::trace!(ty = %desc.name, %err, "dummy fake not creatable"),
		}

		if !concrete {
			return None;
		}
		let args = self.constructor_args(desc)?;
		Some(construct(desc, args))
	}

	/// Resolves arguments for the cheapest constructor that avoids a cycle.
	///
	/// Candidates are tried by ascending arity; a candidate whose parameters name
	/// a type already under construction is skipped up front.
	pub(crate) fn constructor_args(&mut self, desc: &TypeDesc) -> Option<Vec<Value>> {
		let mut candidates: Vec<&ConstructorDesc> = desc
			.accessible_constructors()
			.filter(|c| !self.reenters(c))
			.collect();
		candidates.sort_by_key(|c| c.arity());

		'ctor: for ctor in candidates {
			let mut args = Vec::with_capacity(ctor.arity());
			for param in &ctor.params {
				match self.resolve(&param.ty) {
					Some(value) => args.push(value),
					None => continue 'ctor,
				}
			}
			return Some(args);
		}
		None
	}

	fn reenters(&self, ctor: &ConstructorDesc) -> bool {
		let mut hit = false;
		for param in &ctor.params {
			param.ty.for_each_named(&mut |name| {
				hit |= self.in_progress.contains(name);
			});
		}
		hit
	}

	/// Marks a type as under construction for the duration of `f`.
	pub(crate) fn guarded<T>(&mut self, name: &Arc<str>, f: impl FnOnce(&mut Self) -> T) -> T {
		let inserted = self.in_progress.insert(name.clone());
		let out = f(self);
		if inserted {
			self.in_progress.remove(name);
		}
		out
	}

	pub(crate) fn shared(&self) -> &'a Arc<RuntimeShared> {
		self.shared
	}
}

fn construct(desc: &TypeDesc, args: Vec<Value>) -> Value {
	Value::object(Arc::new(ConstructedObject {
		ty: desc.name.clone(),
		args,
	}))
}
