//! Member descriptors.

use std::fmt;
use std::sync::Arc;

use crate::types::TypeExpr;
use crate::value::{ObjectRef, Value};

/// Names of the members every fakeable type exposes.
///
/// These forward to reference identity unless explicitly configured.
pub mod object_members {
	pub const EQUALS: &str = "equals";
	pub const HASH_CODE: &str = "hash_code";
	pub const TO_STRING: &str = "to_string";
}

/// Which part of a member is being invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Accessor {
	Method,
	Get,
	Set,
	EventAdd,
	EventRemove,
}

/// Identity of a member within its declaring type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberKey {
	pub name: Arc<str>,
	pub accessor: Accessor,
}

impl MemberKey {
	pub fn method(name: impl Into<Arc<str>>) -> Self {
		Self {
			name: name.into(),
			accessor: Accessor::Method,
		}
	}

	pub fn getter(name: impl Into<Arc<str>>) -> Self {
		Self {
			name: name.into(),
			accessor: Accessor::Get,
		}
	}

	pub fn setter(name: impl Into<Arc<str>>) -> Self {
		Self {
			name: name.into(),
			accessor: Accessor::Set,
		}
	}

	pub fn event_add(name: impl Into<Arc<str>>) -> Self {
		Self {
			name: name.into(),
			accessor: Accessor::EventAdd,
		}
	}

	pub fn event_remove(name: impl Into<Arc<str>>) -> Self {
		Self {
			name: name.into(),
			accessor: Accessor::EventRemove,
		}
	}

	#[inline]
	pub fn is_property(&self) -> bool {
		matches!(self.accessor, Accessor::Get | Accessor::Set)
	}

	#[inline]
	pub fn is_event(&self) -> bool {
		matches!(self.accessor, Accessor::EventAdd | Accessor::EventRemove)
	}

	/// The key of the opposite property accessor, if this is one.
	pub fn sibling_accessor(&self) -> Option<MemberKey> {
		let accessor = match self.accessor {
			Accessor::Get => Accessor::Set,
			Accessor::Set => Accessor::Get,
			_ => return None,
		};
		Some(Self {
			name: self.name.clone(),
			accessor,
		})
	}
}

impl From<&str> for MemberKey {
	fn from(name: &str) -> Self {
		Self::method(name)
	}
}

impl fmt::Display for MemberKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.accessor {
			Accessor::Method => f.write_str(&self.name),
			Accessor::Get => write!(f, "get {}", self.name),
			Accessor::Set => write!(f, "set {}", self.name),
			Accessor::EventAdd => write!(f, "add {}", self.name),
			Accessor::EventRemove => write!(f, "remove {}", self.name),
		}
	}
}

/// How an argument crosses the call boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParamMode {
	#[default]
	Value,
	Ref,
	Out,
	/// Read-only by-reference parameter; not supported at the fake boundary.
	In,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDesc {
	pub name: Arc<str>,
	pub ty: TypeExpr,
	pub mode: ParamMode,
}

impl ParamDesc {
	pub fn new(name: impl Into<Arc<str>>, ty: TypeExpr) -> Self {
		Self {
			name: name.into(),
			ty,
			mode: ParamMode::Value,
		}
	}

	pub fn with_mode(mut self, mode: ParamMode) -> Self {
		self.mode = mode;
		self
	}
}

/// Overridability of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dispatch {
	/// Declared without a body.
	Abstract,
	/// Overridable with a base body.
	Virtual,
	/// Not overridable; calls bypass the fake entirely.
	Sealed,
	/// Interface member with a default body.
	DefaultInterface { sealed: bool },
}

impl Dispatch {
	#[inline]
	pub fn is_interceptable(self) -> bool {
		!matches!(self, Self::Sealed | Self::DefaultInterface { sealed: true })
	}
}

/// Failure raised by a base implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct BaseError(pub String);

/// Arguments handed to a base implementation.
pub struct BaseCall<'a> {
	pub this: &'a ObjectRef,
	pub member: &'a MemberKey,
	pub args: &'a [Value],
	pub type_args: &'a [TypeExpr],
}

/// Original (non-intercepted) body of a member.
pub type BaseFn = Arc<dyn Fn(&BaseCall<'_>) -> Result<Value, BaseError> + Send + Sync>;

/// One member of a fakeable type.
#[derive(Clone)]
pub struct MemberDesc {
	pub key: MemberKey,
	pub params: Vec<ParamDesc>,
	pub returns: TypeExpr,
	pub generic_arity: usize,
	pub dispatch: Dispatch,
	pub base: Option<BaseFn>,
}

impl fmt::Debug for MemberDesc {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemberDesc")
			.field("key", &self.key)
			.field("params", &self.params)
			.field("returns", &self.returns)
			.field("generic_arity", &self.generic_arity)
			.field("dispatch", &self.dispatch)
			.field("has_base", &self.base.is_some())
			.finish()
	}
}

impl MemberDesc {
	/// Creates an abstract member with no parameters.
	pub fn new(key: MemberKey, returns: TypeExpr) -> Self {
		Self {
			key,
			params: Vec::new(),
			returns,
			generic_arity: 0,
			dispatch: Dispatch::Abstract,
			base: None,
		}
	}

	pub fn method(name: impl Into<Arc<str>>, returns: TypeExpr) -> Self {
		Self::new(MemberKey::method(name), returns)
	}

	pub fn param(mut self, name: impl Into<Arc<str>>, ty: TypeExpr) -> Self {
		self.params.push(ParamDesc::new(name, ty));
		self
	}

	pub fn param_desc(mut self, param: ParamDesc) -> Self {
		self.params.push(param);
		self
	}

	pub fn generic(mut self, arity: usize) -> Self {
		self.generic_arity = arity;
		self
	}

	/// Marks the member overridable and attaches its base body.
	pub fn virtual_with(
		mut self,
		base: impl Fn(&BaseCall<'_>) -> Result<Value, BaseError> + Send + Sync + 'static,
	) -> Self {
		self.dispatch = Dispatch::Virtual;
		self.base = Some(Arc::new(base));
		self
	}

	/// Marks the member as a default interface method with the given body.
	pub fn default_body(
		mut self,
		sealed: bool,
		base: impl Fn(&BaseCall<'_>) -> Result<Value, BaseError> + Send + Sync + 'static,
	) -> Self {
		self.dispatch = Dispatch::DefaultInterface { sealed };
		self.base = Some(Arc::new(base));
		self
	}

	/// Marks the member non-overridable, keeping its body.
	pub fn sealed_with(
		mut self,
		base: impl Fn(&BaseCall<'_>) -> Result<Value, BaseError> + Send + Sync + 'static,
	) -> Self {
		self.dispatch = Dispatch::Sealed;
		self.base = Some(Arc::new(base));
		self
	}

	#[inline]
	pub fn is_interceptable(&self) -> bool {
		self.dispatch.is_interceptable()
	}

	/// Whether call-base can forward to a real body.
	#[inline]
	pub fn has_overridable_base(&self) -> bool {
		self.base.is_some() && self.is_interceptable()
	}

	/// Declared return type specialized for a call's type arguments.
	pub fn return_type_for(&self, type_args: &[TypeExpr]) -> TypeExpr {
		self.returns.substitute(type_args)
	}
}
