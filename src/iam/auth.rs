//! The authenticated identity attached to the current session (spec §3, §5).
//!
//! Grounded on the teacher's `iam::Auth`, which wraps an `Actor` snapshot rather than re-resolving
//! roles on every check. Here the snapshot is just enough to gate administrative operations
//! without re-walking the membership graph on every call.

use serde::{Deserialize, Serialize};

use crate::cnf::DBA_NAME;

/// Specifies the current authentication for a session.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Auth {
	name: String,
	/// Whether this principal is `DBA` or transitively a member of `DBA`, snapshotted at login.
	administrative: bool,
}

impl Auth {
	pub fn new(name: impl Into<String>, administrative: bool) -> Self {
		Self {
			name: name.into(),
			administrative,
		}
	}

	/// An anonymous auth used only for internal, authorization-disabled catalog transactions
	/// (spec §4.6). Never stored, never authenticated against.
	pub fn system() -> Self {
		Self::new("$system", true)
	}

	pub fn id(&self) -> &str {
		&self.name
	}

	pub fn is_dba(&self) -> bool {
		self.name == DBA_NAME
	}

	pub fn is_administrative(&self) -> bool {
		self.administrative
	}
}
