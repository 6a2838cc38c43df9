//! Validated type catalog.
//!
//! # Role
//!
//! Stands in for host reflection metadata. A [`TypeCatalog`] is built once,
//! validated, and then shared read-only by every fake and dummy resolution.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::desc::{ConstructorDesc, TypeDesc};
use crate::member::MemberKey;
use crate::types::TypeExpr;

/// Name of the root class every catalog contains.
pub const OBJECT_TYPE: &str = "object";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
	#[error("duplicate type: {name}")]
	DuplicateType { name: Arc<str> },

	#[error("duplicate member {member} on {ty}")]
	DuplicateMember { ty: Arc<str>, member: MemberKey },

	#[error("{ty} references unknown type {missing} via {context}")]
	UnknownType {
		ty: Arc<str>,
		missing: Arc<str>,
		context: String,
	},

	#[error("{ty}.{member} uses type parameter T{index} but declares {arity} type parameter(s)")]
	GenericParamOutOfRange {
		ty: Arc<str>,
		member: MemberKey,
		index: usize,
		arity: usize,
	},
}

#[derive(Default)]
pub struct TypeCatalogBuilder {
	types: Vec<TypeDesc>,
}

impl TypeCatalogBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(mut self, desc: TypeDesc) -> Self {
		self.types.push(desc);
		self
	}

	pub fn push(&mut self, desc: TypeDesc) {
		self.types.push(desc);
	}

	/// Validates all descriptors and freezes them into a catalog.
	pub fn build(self) -> Result<TypeCatalog, CatalogError> {
		let mut by_name: FxHashMap<Arc<str>, Arc<TypeDesc>> = FxHashMap::default();

		let has_object = self.types.iter().any(|t| &*t.name == OBJECT_TYPE);
		let root = (!has_object).then(|| {
			TypeDesc::class(OBJECT_TYPE).constructor(ConstructorDesc::parameterless())
		});

		for mut desc in root.into_iter().chain(self.types) {
			desc.ensure_object_members();
			desc.reindex()
				.map_err(|member| CatalogError::DuplicateMember {
					ty: desc.name.clone(),
					member,
				})?;
			check_generic_params(&desc)?;

			let name = desc.name.clone();
			if by_name.insert(name.clone(), Arc::new(desc)).is_some() {
				return Err(CatalogError::DuplicateType { name });
			}
		}

		for desc in by_name.values() {
			check_references(desc, &by_name)?;
		}

		Ok(TypeCatalog { by_name })
	}
}

fn check_generic_params(desc: &TypeDesc) -> Result<(), CatalogError> {
	for member in &desc.members {
		let used = member
			.params
			.iter()
			.map(|p| &p.ty)
			.chain(std::iter::once(&member.returns))
			.filter_map(TypeExpr::max_param)
			.max();
		if let Some(index) = used
			&& index >= member.generic_arity
		{
			return Err(CatalogError::GenericParamOutOfRange {
				ty: desc.name.clone(),
				member: member.key.clone(),
				index,
				arity: member.generic_arity,
			});
		}
	}
	Ok(())
}

fn check_references(
	desc: &TypeDesc,
	by_name: &FxHashMap<Arc<str>, Arc<TypeDesc>>,
) -> Result<(), CatalogError> {
	let check = |ty: &TypeExpr, context: &dyn Fn() -> String| {
		let mut missing = None;
		ty.for_each_named(&mut |name| {
			if missing.is_none() && !by_name.contains_key(name) {
				missing = Some(name.clone());
			}
		});
		match missing {
			Some(missing) => Err(CatalogError::UnknownType {
				ty: desc.name.clone(),
				missing,
				context: context(),
			}),
			None => Ok(()),
		}
	};

	for member in &desc.members {
		check(&member.returns, &|| format!("return of {}", member.key))?;
		for param in &member.params {
			check(&param.ty, &|| format!("parameter {} of {}", param.name, member.key))?;
		}
	}
	for (idx, ctor) in desc.constructors.iter().enumerate() {
		for param in &ctor.params {
			check(&param.ty, &|| format!("parameter {} of constructor #{idx}", param.name))?;
		}
	}
	Ok(())
}

/// Immutable set of type descriptors keyed by name.
#[derive(Debug, Clone)]
pub struct TypeCatalog {
	by_name: FxHashMap<Arc<str>, Arc<TypeDesc>>,
}

impl TypeCatalog {
	pub fn builder() -> TypeCatalogBuilder {
		TypeCatalogBuilder::new()
	}

	pub fn get(&self, name: &str) -> Option<&Arc<TypeDesc>> {
		self.by_name.get(name)
	}

	/// Resolves a named type expression to its descriptor.
	pub fn resolve(&self, ty: &TypeExpr) -> Option<&Arc<TypeDesc>> {
		match ty {
			TypeExpr::Named(name) => self.get(name),
			_ => None,
		}
	}

	pub fn len(&self) -> usize {
		self.by_name.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_name.is_empty()
	}

	/// Type names in sorted order.
	pub fn names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.by_name.keys().map(|n| &**n).collect();
		names.sort_unstable();
		names
	}
}
