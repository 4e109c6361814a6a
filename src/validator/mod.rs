//! The DDL/DML semantic validator's authorization-adjacent portion (spec §4.5).
//!
//! Acts on an already-parsed statement tree (parsing itself is out of scope, spec §1). Each
//! sub-responsibility the spec names gets its own module; [`Validator`] is the thin façade that
//! wires them to a [`Directory`] and [`PrivilegeCache`] for the checks that need live catalog
//! state (name resolution, ownership, GRANT/REVOKE grantee existence).

pub mod aggregate;
pub mod assignment;
pub mod compat;
pub mod grant_stmt;
pub mod index;
pub mod names;
pub mod orderby;
pub mod ownership;
pub mod partition;
pub mod types;
pub mod view;

use std::sync::Arc;

use crate::err::Error;
use crate::iam::directory::Directory;
use crate::iam::principal::Principal;
use crate::iam::privilege::{ObjectKind, ObjectRef};

/// Bundles the Principal Directory access the authorization-adjacent validator needs. The
/// purely-functional checks (partition/index/assignment/order-by/aggregate/union-compatibility)
/// live as free functions in their own modules and don't need this façade at all.
#[non_exhaustive]
pub struct Validator {
	directory: Arc<Directory>,
}

impl Validator {
	pub fn new(directory: Arc<Directory>) -> Self {
		Self {
			directory,
		}
	}

	/// spec §4.5 "Name resolution".
	pub fn resolve_object(
		&self,
		identifier: &str,
		expected_kind: ObjectKind,
		lookup: impl FnOnce(&str, ObjectKind) -> names::LookupResult,
	) -> Result<ObjectRef, Error> {
		names::resolve(identifier, expected_kind, lookup)
	}

	/// spec §4.5 "Ownership check on DDL".
	pub fn check_ownership(&self, caller: &Principal, object: &ObjectRef) -> Result<(), Error> {
		let owner = self.directory.object_owner(object)?;
		ownership::require_owner_or_administrative(caller, &owner, &object.id)
	}

	/// spec §4.5 "GRANT/REVOKE validation".
	pub fn validate_grant_statement(
		&self,
		grantees: &[String],
		object: &ObjectRef,
		privilege_mask: u32,
	) -> Result<(), Error> {
		grant_stmt::validate_grantees(&self.directory, grantees)?;
		grant_stmt::validate_privilege_kinds(object.kind, privilege_mask, &object.id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn check_ownership_rejects_non_owner_non_admin() {
		let directory = Arc::new(Directory::new());
		let object = ObjectRef::class("t");
		directory.register_object(object.clone(), "ALICE");
		directory.add_principal(&directory.find_principal("DBA").unwrap(), "ALICE").unwrap();
		directory.add_principal(&directory.find_principal("DBA").unwrap(), "BOB").unwrap();
		let validator = Validator::new(directory.clone());
		let bob = directory.find_principal("BOB").unwrap();
		assert!(validator.check_ownership(&bob, &object).is_err());
		let alice = directory.find_principal("ALICE").unwrap();
		assert!(validator.check_ownership(&alice, &object).is_ok());
	}
}
