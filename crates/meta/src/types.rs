//! Type expressions.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::value::Value;

/// Generic type arguments supplied with a call.
pub type TypeArgs = SmallVec<[TypeExpr; 2]>;

/// Value types with a zero-equivalent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
	Bool,
	Int,
	UInt,
	Float,
	Char,
}

impl Primitive {
	/// Returns the zero-equivalent value of this primitive.
	pub fn zero(self) -> Value {
		match self {
			Self::Bool => Value::Bool(false),
			Self::Int => Value::Int(0),
			Self::UInt => Value::UInt(0),
			Self::Float => Value::Float(0.0),
			Self::Char => Value::Char('\0'),
		}
	}

	pub const fn name(self) -> &'static str {
		match self {
			Self::Bool => "bool",
			Self::Int => "int",
			Self::UInt => "uint",
			Self::Float => "float",
			Self::Char => "char",
		}
	}
}

/// Asynchronous or deferred wrappers presented pre-completed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapperKind {
	Task,
	ValueTask,
	Lazy,
}

impl WrapperKind {
	pub const fn name(self) -> &'static str {
		match self {
			Self::Task => "Task",
			Self::ValueTask => "ValueTask",
			Self::Lazy => "Lazy",
		}
	}
}

/// A declared or requested type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
	Void,
	Primitive(Primitive),
	String,
	/// Task-like wrapper; `None` is the non-generic form that carries no result.
	Task(Option<Box<TypeExpr>>),
	ValueTask(Option<Box<TypeExpr>>),
	Lazy(Box<TypeExpr>),
	/// A class or interface registered in the catalog.
	Named(Arc<str>),
	/// Generic method type parameter, substituted from the call's type arguments.
	Param(usize),
}

impl TypeExpr {
	pub fn named(name: impl Into<Arc<str>>) -> Self {
		Self::Named(name.into())
	}

	pub fn task_of(inner: TypeExpr) -> Self {
		Self::Task(Some(Box::new(inner)))
	}

	pub fn value_task_of(inner: TypeExpr) -> Self {
		Self::ValueTask(Some(Box::new(inner)))
	}

	pub fn lazy_of(inner: TypeExpr) -> Self {
		Self::Lazy(Box::new(inner))
	}

	pub const INT: TypeExpr = TypeExpr::Primitive(Primitive::Int);
	pub const BOOL: TypeExpr = TypeExpr::Primitive(Primitive::Bool);

	#[inline]
	pub fn is_void(&self) -> bool {
		matches!(self, Self::Void)
	}

	/// Splits a wrapper type into its kind and wrapped type.
	///
	/// The wrapped type is `None` for non-generic tasks.
	pub fn as_wrapper(&self) -> Option<(WrapperKind, Option<&TypeExpr>)> {
		match self {
			Self::Task(inner) => Some((WrapperKind::Task, inner.as_deref())),
			Self::ValueTask(inner) => Some((WrapperKind::ValueTask, inner.as_deref())),
			Self::Lazy(inner) => Some((WrapperKind::Lazy, Some(inner))),
			_ => None,
		}
	}

	/// Replaces generic parameters with the supplied type arguments.
	///
	/// Parameters without a matching argument are left in place.
	pub fn substitute(&self, type_args: &[TypeExpr]) -> TypeExpr {
		match self {
			Self::Param(idx) => type_args.get(*idx).cloned().unwrap_or_else(|| self.clone()),
			Self::Task(Some(inner)) => Self::Task(Some(Box::new(inner.substitute(type_args)))),
			Self::ValueTask(Some(inner)) => {
				Self::ValueTask(Some(Box::new(inner.substitute(type_args))))
			}
			Self::Lazy(inner) => Self::Lazy(Box::new(inner.substitute(type_args))),
			other => other.clone(),
		}
	}

	/// Visits every named type referenced by this expression.
	pub fn for_each_named(&self, f: &mut impl FnMut(&Arc<str>)) {
		match self {
			Self::Named(name) => f(name),
			Self::Task(Some(inner)) | Self::ValueTask(Some(inner)) | Self::Lazy(inner) => {
				inner.for_each_named(f)
			}
			_ => {}
		}
	}

	/// Highest generic parameter index referenced, if any.
	pub fn max_param(&self) -> Option<usize> {
		match self {
			Self::Param(idx) => Some(*idx),
			Self::Task(Some(inner)) | Self::ValueTask(Some(inner)) | Self::Lazy(inner) => {
				inner.max_param()
			}
			_ => None,
		}
	}
}

impl From<Primitive> for TypeExpr {
	fn from(p: Primitive) -> Self {
		Self::Primitive(p)
	}
}

impl fmt::Display for TypeExpr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Void => f.write_str("void"),
			Self::Primitive(p) => f.write_str(p.name()),
			Self::String => f.write_str("string"),
			Self::Task(None) => f.write_str("Task"),
			Self::ValueTask(None) => f.write_str("ValueTask"),
			Self::Task(Some(inner)) => write!(f, "Task<{inner}>"),
			Self::ValueTask(Some(inner)) => write!(f, "ValueTask<{inner}>"),
			Self::Lazy(inner) => write!(f, "Lazy<{inner}>"),
			Self::Named(name) => f.write_str(name),
			Self::Param(idx) => write!(f, "T{idx}"),
		}
	}
}
