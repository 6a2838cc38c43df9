//! Call matching.
//!
//! # Role
//!
//! Decides whether a [`RecordedCall`] satisfies a configured constraint. A
//! [`CallMatcher`] combines one [`CallTarget`] (which calls are candidates at
//! all), optional per-position [`ArgConstraint`]s, and any number of
//! whole-call predicates. All parts must accept for the matcher to accept.
//!
//! # Invariants
//!
//! - A member target matches a generic method only for the exact type arguments it
//!   was configured with. Matching by return-type category is the only way to
//!   span instantiations.

use std::fmt;
use std::sync::Arc;

use decoy_meta::{MemberKey, TypeArgs, TypeExpr, Value};

use crate::history::RecordedCall;


type ArgPredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
type CallPredicateFn = Arc<dyn Fn(&RecordedCall) -> bool + Send + Sync>;

/// Constraint over a single argument position.
#[derive(Clone)]
pub enum ArgConstraint {
	Any,
	Eq(Value),
	Ne(Value),
	Null,
	NotNull,
	That {
		description: Arc<str>,
		predicate: ArgPredicate,
	},
}

impl ArgConstraint {
	pub fn that(
		description: impl Into<Arc<str>>,
		predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
	) -> Self {
		Self::That {
			description: description.into(),
			predicate: Arc::new(predicate),
		}
	}

	pub fn eq(value: impl Into<Value>) -> Self {
		Self::Eq(value.into())
	}

	pub fn ne(value: impl Into<Value>) -> Self {
		Self::Ne(value.into())
	}

	pub fn matches(&self, value: &Value) -> bool {
		match self {
			Self::Any => true,
			Self::Eq(expected) => value == expected,
			Self::Ne(expected) => value != expected,
			Self::Null => value.is_null(),
			Self::NotNull => !value.is_null(),
			Self::That { predicate, .. } => predicate(value),
		}
	}
}

impl From<Value> for ArgConstraint {
	fn from(value: Value) -> Self {
		Self::Eq(value)
	}
}

impl fmt::Display for ArgConstraint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Any => f.write_str("<Ignored>"),
			Self::Eq(v) => write!(f, "{v}"),
			Self::Ne(v) => write!(f, "<not {v}>"),
			Self::Null => f.write_str("<NULL>"),
			Self::NotNull => f.write_str("<not NULL>"),
			Self::That { description, .. } => write!(f, "<{description}>"),
		}
	}
}

impl fmt::Debug for ArgConstraint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ArgConstraint({self})")
	}
}

/// Which calls are candidates for a matcher.
#[derive(Debug, Clone, PartialEq)]
pub enum CallTarget {
	/// One member, at one generic instantiation (empty for non-generic members).
	Member { key: MemberKey, type_args: TypeArgs },
	AnyCall,
	/// Calls whose specialized return type equals the given type.
	ReturnType(TypeExpr),
	NonVoidReturn,
	VoidReturn,
}

impl CallTarget {
	fn accepts(&self, call: &RecordedCall) -> bool {
		match self {
			Self::Member { key, type_args } => call.member == *key && call.type_args == *type_args,
			Self::AnyCall => true,
			Self::ReturnType(ty) => call.return_type == *ty,
			Self::NonVoidReturn => !call.return_type.is_void(),
			Self::VoidReturn => call.return_type.is_void(),
		}
	}
}

#[derive(Clone)]
pub struct CallPredicate {
	pub description: Arc<str>,
	predicate: CallPredicateFn,
}

impl CallPredicate {
	pub fn new(
		description: impl Into<Arc<str>>,
		predicate: impl Fn(&RecordedCall) -> bool + Send + Sync + 'static,
	) -> Self {
		Self {
			description: description.into(),
			predicate: Arc::new(predicate),
		}
	}

	pub fn matches(&self, call: &RecordedCall) -> bool {
		(self.predicate)(call)
	}
}

impl fmt::Debug for CallPredicate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("CallPredicate").field(&self.description).finish()
	}
}

/// Complete call constraint.
#[derive(Debug, Clone)]
pub struct CallMatcher {
	pub target: CallTarget,
	pub args: Option<Vec<ArgConstraint>>,
	pub predicates: Vec<CallPredicate>,
}

impl CallMatcher {
	pub fn new(target: CallTarget) -> Self {
		Self {
			target,
			args: None,
			predicates: Vec::new(),
		}
	}

	pub fn member(key: impl Into<MemberKey>) -> Self {
		Self::new(CallTarget::Member {
			key: key.into(),
			type_args: TypeArgs::new(),
		})
	}

	pub fn getter(name: &str) -> Self {
		Self::member(MemberKey::getter(name))
	}

	pub fn setter(name: &str) -> Self {
		Self::member(MemberKey::setter(name))
	}

	pub fn any_call() -> Self {
		Self::new(CallTarget::AnyCall)
	}

	pub fn with_return_type(ty: TypeExpr) -> Self {
		Self::new(CallTarget::ReturnType(ty))
	}

	pub fn with_non_void_return() -> Self {
		Self::new(CallTarget::NonVoidReturn)
	}

	pub fn with_void_return() -> Self {
		Self::new(CallTarget::VoidReturn)
	}

	/// Narrows a member target to one generic instantiation.
	///
	/// Has no effect on other targets.
	pub fn type_args(mut self, args: impl IntoIterator<Item = TypeExpr>) -> Self {
		if let CallTarget::Member { type_args, .. } = &mut self.target {
			*type_args = args.into_iter().collect();
		}
		self
	}

	/// Constrains every argument position.
	pub fn args(mut self, constraints: impl IntoIterator<Item = ArgConstraint>) -> Self {
		self.args = Some(constraints.into_iter().collect());
		self
	}

	/// Adds a predicate over the whole argument list.
	pub fn when_args(
		self,
		description: impl Into<Arc<str>>,
		predicate: impl Fn(&[Value]) -> bool + Send + Sync + 'static,
	) -> Self {
		self.where_call(description, move |call| predicate(&call.args))
	}

	/// Adds a predicate over the whole call.
	pub fn where_call(
		mut self,
		description: impl Into<Arc<str>>,
		predicate: impl Fn(&RecordedCall) -> bool + Send + Sync + 'static,
	) -> Self {
		self.predicates.push(CallPredicate::new(description, predicate));
		self
	}

	pub fn member_key(&self) -> Option<&MemberKey> {
		match &self.target {
			CallTarget::Member { key, .. } => Some(key),
			_ => None,
		}
	}

	pub fn matches(&self, call: &RecordedCall) -> bool {
		if !self.target.accepts(call) {
			return false;
		}
		if let Some(constraints) = &self.args {
			if constraints.len() != call.args.len() {
				return false;
			}
			if !constraints.iter().zip(&call.args).all(|(c, v)| c.matches(v)) {
				return false;
			}
		}
		self.predicates.iter().all(|p| p.matches(call))
	}
}

impl fmt::Display for CallMatcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.target {
			CallTarget::Member { key, type_args } => {
				write!(f, "{key}")?;
				if !type_args.is_empty() {
					let names: Vec<String> = type_args.iter().map(ToString::to_string).collect();
					write!(f, "<{}>", names.join(", "))?;
				}
			}
			CallTarget::AnyCall => f.write_str("any call")?,
			CallTarget::ReturnType(ty) => write!(f, "any call returning {ty}")?,
			CallTarget::NonVoidReturn => f.write_str("any non-void call")?,
			CallTarget::VoidReturn => f.write_str("any void call")?,
		}
		if let Some(args) = &self.args {
			let parts: Vec<String> = args.iter().map(ToString::to_string).collect();
			write!(f, "({})", parts.join(", "))?;
		}
		for p in &self.predicates {
			write!(f, " where {}", p.description)?;
		}
		Ok(())
	}
}
