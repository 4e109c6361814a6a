//! `GRANT`/`REVOKE` statement validation (spec §4.5 "GRANT/REVOKE validation").
//!
//! Each grantee named in the statement must exist, and the requested privilege kinds must be
//! admissible on the target object's kind (spec §3: "tables/views admit all except `EXECUTE`;
//! stored procedures admit only `EXECUTE`").

use crate::err::Error;
use crate::iam::directory::Directory;
use crate::iam::privilege::{ObjectKind, ALL_KINDS};

pub fn validate_grantees(directory: &Directory, grantees: &[String]) -> Result<(), Error> {
	for grantee in grantees {
		directory.find_principal(grantee)?;
	}
	Ok(())
}

/// Every requested privilege bit must be admissible on `kind`; returns the first inadmissible
/// kind's own failure error (mirroring the error-selection style of spec §4.4 step 4).
pub fn validate_privilege_kinds(kind: ObjectKind, privilege_mask: u32, object_name: &str) -> Result<(), Error> {
	let admissible = kind.admissible_mask();
	for k in ALL_KINDS {
		if privilege_mask & k.bit() != 0 && admissible & k.bit() == 0 {
			return Err(Error::AuthorizationFailure(format!(
				"{} privilege is not admissible on '{object_name}'",
				k.label()
			)));
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::iam::privilege::PrivilegeKind;

	#[test]
	fn unknown_grantee_is_rejected() {
		let dir = Directory::new();
		let err = validate_grantees(&dir, &["NOBODY".to_string()]).unwrap_err();
		assert_eq!(err, Error::InvalidUser("NOBODY".into()));
	}

	#[test]
	fn execute_is_not_admissible_on_a_class() {
		let err =
			validate_privilege_kinds(ObjectKind::Class, PrivilegeKind::Execute.bit(), "t").unwrap_err();
		assert!(matches!(err, Error::AuthorizationFailure(_)));
	}

	#[test]
	fn select_is_not_admissible_on_a_procedure() {
		let err =
			validate_privilege_kinds(ObjectKind::Procedure, PrivilegeKind::Select.bit(), "p").unwrap_err();
		assert!(matches!(err, Error::AuthorizationFailure(_)));
	}

	#[test]
	fn admissible_kinds_pass() {
		assert!(validate_privilege_kinds(ObjectKind::Class, PrivilegeKind::Select.bit(), "t").is_ok());
		assert!(validate_privilege_kinds(ObjectKind::Procedure, PrivilegeKind::Execute.bit(), "p").is_ok());
	}
}
