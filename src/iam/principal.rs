//! Principals (spec §3 "Principal", §4.2 "Principal Directory").

use crate::cnf::{DBA_NAME, PUBLIC_NAME};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A stable, process-wide small integer handed out to a principal at login, used to index the
/// privilege cache without re-hashing the principal's name on every access (spec §4.3
/// `cache_index_of`).
pub type CacheIndex = u32;

/// A named identity (user or group) that may hold privileges (spec §3).
///
/// Names are case-insensitive: stored uppercased at creation time; all lookups uppercase their
/// input first (spec §9 "Case-insensitive names").
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Principal {
	/// Uppercased at insert; length is bounded by [`crate::cnf::MAX_USER_NAME_LENGTH`].
	pub name: String,
	pub comment: Option<String>,
	/// Direct group memberships.
	pub direct_groups: BTreeSet<String>,
	/// Transitive closure of `direct_groups` over the principal-membership graph (spec invariant
	/// D). Recomputed whenever membership changes.
	pub groups: BTreeSet<String>,
	/// Opaque reference to a stored password credential, if any.
	pub password_ref: Option<String>,
	pub cache_index: CacheIndex,
}

impl Principal {
	pub fn new(name: &str, cache_index: CacheIndex) -> Self {
		Self {
			name: uppercase(name),
			comment: None,
			direct_groups: BTreeSet::new(),
			groups: BTreeSet::new(),
			password_ref: None,
			cache_index,
		}
	}

	pub fn is_dba(&self) -> bool {
		self.name == DBA_NAME
	}

	pub fn is_public(&self) -> bool {
		self.name == PUBLIC_NAME
	}

	/// Whether this principal is `DBA` or transitively a member of `DBA` (administrative
	/// membership, spec §4.2 used throughout as the "administrative member" gate).
	pub fn is_administrative(&self) -> bool {
		self.is_dba() || self.groups.contains(DBA_NAME)
	}

	pub fn is_member_of(&self, group: &str) -> bool {
		let group = uppercase(group);
		self.groups.contains(&group) || self.direct_groups.contains(&group)
	}
}

/// Uppercase a principal name for case-insensitive comparison (spec §9).
pub fn uppercase(name: &str) -> String {
	name.to_ascii_uppercase()
}
