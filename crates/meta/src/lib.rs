//! Descriptor layer for the decoy engine.
//!
//! # Purpose
//!
//! The engine never inspects host types directly. Everything it knows about a
//! fakeable type comes from the descriptors in this crate: what members exist,
//! which of them can be intercepted, what they return, and how instances of the
//! type can be constructed.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`TypeExpr`] | Closed description of a requested or declared type. |
//! | [`TypeDesc`] | A class or interface: constructors plus members. |
//! | [`MemberDesc`] | One interceptable (or sealed) member with its signature. |
//! | [`TypeCatalog`] | Validated, immutable set of [`TypeDesc`] keyed by name. |
//! | [`Value`] | Dynamic argument/return value flowing through calls. |
//! | [`ObjectRef`] | Reference-identity handle over any [`Instance`]. |
//!
//! # Invariants
//!
//! - Every [`TypeExpr::Named`] reachable from a catalog entry resolves inside that catalog.
//!   - Enforced in: [`catalog::TypeCatalogBuilder::build`].
//! - Member keys are unique per type; overloads are modelled as distinct names.
//!   - Enforced in: [`catalog::TypeCatalogBuilder::build`].
//! - Every type exposes the object members ([`object_members`]) even when not declared.
//!   - Enforced in: [`catalog::TypeCatalogBuilder::build`].

pub mod catalog;
pub mod desc;
pub mod member;
pub mod types;
pub mod value;

pub use catalog::{CatalogError, OBJECT_TYPE, TypeCatalog, TypeCatalogBuilder};
pub use desc::{ConstructorDesc, TypeDesc, TypeKind, Visibility};
pub use member::{
	Accessor, BaseCall, BaseError, BaseFn, Dispatch, MemberDesc, MemberKey, ParamDesc, ParamMode,
	object_members,
};
pub use types::{Primitive, TypeArgs, TypeExpr, WrapperKind};
pub use value::{Args, ConstructedObject, Instance, ObjectRef, Value};
