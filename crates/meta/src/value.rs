//! Dynamic values passed through intercepted calls.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use smallvec::SmallVec;

use crate::types::WrapperKind;

/// Arguments of a single call.
pub type Args = SmallVec<[Value; 4]>;

/// An object that can travel inside a [`Value`].
///
/// Implemented by fakes and by objects the dummy resolver constructs.
pub trait Instance: Any + Send + Sync {
	/// Name of the runtime type of this instance.
	fn type_name(&self) -> &str;

	fn as_any(&self) -> &dyn Any;

	fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Shared handle with reference-identity equality.
#[derive(Clone)]
pub struct ObjectRef(Arc<dyn Instance>);

impl ObjectRef {
	pub fn new<T: Instance>(instance: Arc<T>) -> Self {
		Self(instance)
	}

	pub fn type_name(&self) -> &str {
		self.0.type_name()
	}

	pub fn downcast_ref<T: Instance>(&self) -> Option<&T> {
		self.0.as_any().downcast_ref::<T>()
	}

	pub fn downcast<T: Instance>(&self) -> Option<Arc<T>> {
		self.0.clone().into_any().downcast::<T>().ok()
	}

	/// Address used for identity comparisons and hashing.
	pub fn addr(&self) -> usize {
		Arc::as_ptr(&self.0) as *const () as usize
	}

	pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
		std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
	}
}

impl PartialEq for ObjectRef {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}

impl Eq for ObjectRef {}

impl Hash for ObjectRef {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.addr().hash(state);
	}
}

impl fmt::Debug for ObjectRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ObjectRef({}@{:#x})", self.type_name(), self.addr())
	}
}

/// Plain object produced by running a constructor with dummy arguments.
#[derive(Debug)]
pub struct ConstructedObject {
	pub ty: Arc<str>,
	pub args: Vec<Value>,
}

impl Instance for ConstructedObject {
	fn type_name(&self) -> &str {
		&self.ty
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
		self
	}
}

#[derive(Debug, Clone, Default)]
pub enum Value {
	#[default]
	Unit,
	Null,
	Bool(bool),
	Int(i64),
	UInt(u64),
	Float(f64),
	Char(char),
	Str(Arc<str>),
	/// A wrapper whose result is already available.
	Completed {
		wrapper: WrapperKind,
		value: Box<Value>,
	},
	Object(ObjectRef),
}

impl Value {
	pub fn str(s: impl Into<Arc<str>>) -> Self {
		Self::Str(s.into())
	}

	pub fn completed(wrapper: WrapperKind, value: Value) -> Self {
		Self::Completed {
			wrapper,
			value: Box::new(value),
		}
	}

	pub fn object<T: Instance>(instance: Arc<T>) -> Self {
		Self::Object(ObjectRef::new(instance))
	}

	#[inline]
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_object(&self) -> Option<&ObjectRef> {
		match self {
			Self::Object(obj) => Some(obj),
			_ => None,
		}
	}

	/// Result carried by a completed wrapper.
	pub fn completed_value(&self) -> Option<&Value> {
		match self {
			Self::Completed { value, .. } => Some(value),
			_ => None,
		}
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Unit, Self::Unit) | (Self::Null, Self::Null) => true,
			(Self::Bool(a), Self::Bool(b)) => a == b,
			(Self::Int(a), Self::Int(b)) => a == b,
			(Self::UInt(a), Self::UInt(b)) => a == b,
			(Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
			(Self::Char(a), Self::Char(b)) => a == b,
			(Self::Str(a), Self::Str(b)) => a == b,
			(
				Self::Completed {
					wrapper: wa,
					value: va,
				},
				Self::Completed {
					wrapper: wb,
					value: vb,
				},
			) => wa == wb && va == vb,
			(Self::Object(a), Self::Object(b)) => a == b,
			_ => false,
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Unit => f.write_str("()"),
			Self::Null => f.write_str("<NULL>"),
			Self::Bool(v) => write!(f, "{v}"),
			Self::Int(v) => write!(f, "{v}"),
			Self::UInt(v) => write!(f, "{v}"),
			Self::Float(v) => write!(f, "{v}"),
			Self::Char(v) => write!(f, "'{v}'"),
			Self::Str(s) => write!(f, "{s:?}"),
			Self::Completed { wrapper, value } => write!(f, "{}({value})", wrapper.name()),
			Self::Object(obj) => write!(f, "{}@{:#x}", obj.type_name(), obj.addr()),
		}
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Self::Int(v)
	}
}

impl From<i32> for Value {
	fn from(v: i32) -> Self {
		Self::Int(i64::from(v))
	}
}

impl From<u64> for Value {
	fn from(v: u64) -> Self {
		Self::UInt(v)
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Self::Bool(v)
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Self::Float(v)
	}
}

impl From<char> for Value {
	fn from(v: char) -> Self {
		Self::Char(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Self::Str(v.into())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Self::Str(v.into())
	}
}

impl From<ObjectRef> for Value {
	fn from(v: ObjectRef) -> Self {
		Self::Object(v)
	}
}
