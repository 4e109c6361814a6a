//! Ownership checks on DDL (spec §4.5 "Ownership check on DDL").

use crate::err::Error;
use crate::iam::principal::Principal;

/// spec §4.5: for `ALTER`/`DROP`/`GRANT`/`REVOKE`, the current principal must own the target or be
/// an administrative member.
pub fn require_owner_or_administrative(caller: &Principal, owner: &str, object_name: &str) -> Result<(), Error> {
	if caller.name == owner || caller.is_administrative() {
		Ok(())
	} else {
		Err(Error::NotOwner(caller.name.clone(), object_name.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn principal(name: &str) -> Principal {
		Principal::new(name, 0)
	}

	#[test]
	fn owner_may_alter_their_own_object() {
		let caller = principal("ALICE");
		assert!(require_owner_or_administrative(&caller, "ALICE", "t").is_ok());
	}

	#[test]
	fn non_owner_non_admin_is_rejected() {
		let caller = principal("BOB");
		assert!(require_owner_or_administrative(&caller, "ALICE", "t").is_err());
	}

	#[test]
	fn administrative_member_may_alter_anyones_object() {
		let mut caller = principal("ADMIN");
		caller.groups.insert("DBA".to_string());
		assert!(require_owner_or_administrative(&caller, "ALICE", "t").is_ok());
	}
}
