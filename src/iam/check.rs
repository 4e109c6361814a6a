//! Error-selection helper for grant/revoke authorization checks (spec §4.4 step 4).

use crate::err::Error;
use crate::iam::privilege::{CacheBits, PrivilegeKind, ALL_KINDS};

fn failure_for(kind: PrivilegeKind, object_name: &str) -> Error {
	match kind {
		PrivilegeKind::Select => Error::SelectFailure(object_name.into()),
		PrivilegeKind::Insert => Error::InsertFailure(object_name.into()),
		PrivilegeKind::Update => Error::UpdateFailure(object_name.into()),
		PrivilegeKind::Delete => Error::DeleteFailure(object_name.into()),
		PrivilegeKind::Alter => Error::AlterFailure(object_name.into()),
		PrivilegeKind::Index => Error::IndexFailure(object_name.into()),
		PrivilegeKind::Execute => Error::ExecuteFailure(object_name.into()),
	}
}

/// Verify that `held` carries every bit of `requested`, and — when `require_grant_option` is
/// set — the corresponding grant-option bit for each. On failure, picks the most informative
/// error by scanning missing bits in [`ALL_KINDS`] order: basic (granted) bits are checked
/// before grant-option bits, and within each pass `SELECT` is checked first (spec §4.4 step 4).
pub fn require_privileges(
	held: CacheBits,
	requested: u32,
	require_grant_option: bool,
	object_name: &str,
) -> Result<(), Error> {
	for kind in ALL_KINDS {
		if requested & kind.bit() != 0 && !held.has(kind) {
			return Err(failure_for(kind, object_name));
		}
	}
	if require_grant_option {
		for kind in ALL_KINDS {
			if requested & kind.bit() != 0 && !held.has_grant_option(kind) {
				return Err(Error::NoGrantOption(object_name.into()));
			}
		}
	}
	Ok(())
}

/// Fallback used when the scan in [`require_privileges`] cannot be reached (e.g. `requested`
/// is empty): a generic authorization failure.
pub fn authorization_failure(object_name: &str) -> Error {
	Error::AuthorizationFailure(object_name.into())
}
