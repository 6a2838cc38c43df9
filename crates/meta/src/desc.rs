//! Type descriptors.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::member::{Dispatch, MemberDesc, MemberKey, ParamDesc};
use crate::types::TypeExpr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
	Interface,
	Class { sealed: bool, is_abstract: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
	#[default]
	Public,
	/// Internal types are fakeable only when visibility has been granted.
	Internal { visible_to_fakes: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConstructorDesc {
	pub params: Vec<ParamDesc>,
	pub accessible: bool,
}

impl ConstructorDesc {
	pub fn new(params: impl IntoIterator<Item = ParamDesc>) -> Self {
		Self {
			params: params.into_iter().collect(),
			accessible: true,
		}
	}

	pub fn parameterless() -> Self {
		Self::new([])
	}

	pub fn private(mut self) -> Self {
		self.accessible = false;
		self
	}

	pub fn arity(&self) -> usize {
		self.params.len()
	}
}

/// A class or interface.
#[derive(Debug, Clone)]
pub struct TypeDesc {
	pub name: Arc<str>,
	pub kind: TypeKind,
	pub visibility: Visibility,
	pub constructors: Vec<ConstructorDesc>,
	pub members: Vec<MemberDesc>,
	pub(crate) member_index: FxHashMap<MemberKey, usize>,
}

impl TypeDesc {
	fn new(name: impl Into<Arc<str>>, kind: TypeKind) -> Self {
		Self {
			name: name.into(),
			kind,
			visibility: Visibility::Public,
			constructors: Vec::new(),
			members: Vec::new(),
			member_index: FxHashMap::default(),
		}
	}

	pub fn interface(name: impl Into<Arc<str>>) -> Self {
		Self::new(name, TypeKind::Interface)
	}

	/// Open, concrete class. Add constructors with [`Self::constructor`].
	pub fn class(name: impl Into<Arc<str>>) -> Self {
		Self::new(
			name,
			TypeKind::Class {
				sealed: false,
				is_abstract: false,
			},
		)
	}

	pub fn sealed(mut self) -> Self {
		if let TypeKind::Class { sealed, .. } = &mut self.kind {
			*sealed = true;
		}
		self
	}

	pub fn abstract_class(mut self) -> Self {
		if let TypeKind::Class { is_abstract, .. } = &mut self.kind {
			*is_abstract = true;
		}
		self
	}

	pub fn internal(mut self, visible_to_fakes: bool) -> Self {
		self.visibility = Visibility::Internal { visible_to_fakes };
		self
	}

	pub fn constructor(mut self, ctor: ConstructorDesc) -> Self {
		self.constructors.push(ctor);
		self
	}

	pub fn member(mut self, member: MemberDesc) -> Self {
		self.members.push(member);
		self
	}

	/// Adds an abstract method without parameters.
	pub fn method(self, name: impl Into<Arc<str>>, returns: TypeExpr) -> Self {
		self.member(MemberDesc::method(name, returns))
	}

	/// Adds an abstract read/write property as a getter and setter pair.
	pub fn property(self, name: impl Into<Arc<str>>, ty: TypeExpr) -> Self {
		let name = name.into();
		self.member(MemberDesc::new(MemberKey::getter(name.clone()), ty.clone()))
			.member(MemberDesc::new(MemberKey::setter(name), TypeExpr::Void).param("value", ty))
	}

	/// Adds an abstract event as add/remove accessors.
	pub fn event(self, name: impl Into<Arc<str>>, handler: TypeExpr) -> Self {
		let name = name.into();
		self.member(
			MemberDesc::new(MemberKey::event_add(name.clone()), TypeExpr::Void)
				.param("handler", handler.clone()),
		)
		.member(
			MemberDesc::new(MemberKey::event_remove(name), TypeExpr::Void).param("handler", handler),
		)
	}

	#[inline]
	pub fn is_interface(&self) -> bool {
		matches!(self.kind, TypeKind::Interface)
	}

	#[inline]
	pub fn is_sealed(&self) -> bool {
		matches!(self.kind, TypeKind::Class { sealed: true, .. })
	}

	#[inline]
	pub fn is_abstract(&self) -> bool {
		matches!(self.kind, TypeKind::Class { is_abstract: true, .. })
	}

	/// Whether a proxy type may be derived from this type.
	pub fn is_accessible(&self) -> bool {
		!matches!(
			self.visibility,
			Visibility::Internal {
				visible_to_fakes: false
			}
		)
	}

	pub fn accessible_constructors(&self) -> impl Iterator<Item = &ConstructorDesc> {
		self.constructors.iter().filter(|c| c.accessible)
	}

	/// Returns the parameterless accessible constructor, if one exists.
	pub fn default_constructor(&self) -> Option<&ConstructorDesc> {
		self.accessible_constructors().find(|c| c.params.is_empty())
	}

	/// Looks up a member by key.
	pub fn get_member(&self, key: &MemberKey) -> Option<&MemberDesc> {
		self.member_index.get(key).map(|&idx| &self.members[idx])
	}

	pub fn interceptable_members(&self) -> impl Iterator<Item = &MemberDesc> {
		self.members.iter().filter(|m| m.is_interceptable())
	}

	pub(crate) fn reindex(&mut self) -> Result<(), MemberKey> {
		let mut index = FxHashMap::default();
		for (idx, member) in self.members.iter().enumerate() {
			if index.insert(member.key.clone(), idx).is_some() {
				return Err(member.key.clone());
			}
		}
		self.member_index = index;
		Ok(())
	}

	pub(crate) fn ensure_object_members(&mut self) {
		use crate::member::object_members::{EQUALS, HASH_CODE, TO_STRING};

		let defaults = [
			MemberDesc::method(EQUALS, TypeExpr::BOOL).param("other", TypeExpr::named("object")),
			MemberDesc::method(HASH_CODE, TypeExpr::INT),
			MemberDesc::method(TO_STRING, TypeExpr::String),
		];
		for mut member in defaults {
			if self.members.iter().any(|m| m.key == member.key) {
				continue;
			}
			member.dispatch = Dispatch::Virtual;
			self.members.push(member);
		}
	}
}
