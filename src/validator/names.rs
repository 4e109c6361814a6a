//! Name resolution (spec §4.5 "Name resolution").
//!
//! Replaces every object reference with a resolved handle; rejects references to non-existent or
//! access-denied objects with kind-specific errors. The catalog lookup itself is a collaborator
//! out of this crate's scope (spec §1: "the workspace/object-cache … only used via lookup/lock
//! primitives"), represented here as a `resolve` callback.

use crate::err::Error;
use crate::iam::privilege::{ObjectKind, ObjectRef};

/// What a catalog lookup of an identifier can report back, short of the resolved handle itself.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LookupResult {
	Found(ObjectRef),
	NotFound,
	/// Found, but not of the requested kind (e.g. looked up a class, found a procedure).
	WrongKind,
}

/// spec §4.5: resolve `identifier` as `expected_kind`, surfacing a kind-specific error when the
/// name can't be used as requested.
pub fn resolve(
	identifier: &str,
	expected_kind: ObjectKind,
	lookup: impl FnOnce(&str, ObjectKind) -> LookupResult,
) -> Result<ObjectRef, Error> {
	match lookup(identifier, expected_kind) {
		LookupResult::Found(object) => Ok(object),
		LookupResult::NotFound => match expected_kind {
			ObjectKind::Class => Err(Error::ClassDoesNotExist(identifier.to_string())),
			ObjectKind::Procedure => Err(Error::MissingClass(identifier.to_string())),
		},
		LookupResult::WrongKind => Err(Error::IsNotAClass(identifier.to_string())),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_class_surfaces_class_does_not_exist() {
		let err = resolve("t", ObjectKind::Class, |_, _| LookupResult::NotFound).unwrap_err();
		assert_eq!(err, Error::ClassDoesNotExist("t".into()));
	}

	#[test]
	fn wrong_kind_surfaces_is_not_a_class() {
		let err = resolve("p", ObjectKind::Class, |_, _| LookupResult::WrongKind).unwrap_err();
		assert_eq!(err, Error::IsNotAClass("p".into()));
	}

	#[test]
	fn found_object_resolves() {
		let found = ObjectRef::class("t");
		let resolved = resolve("t", ObjectKind::Class, |_, _| LookupResult::Found(found.clone())).unwrap();
		assert_eq!(resolved, found);
	}
}
