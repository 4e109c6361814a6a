//! Authorization objects and grant entries (spec §3 "Authorization object").

use crate::iam::privilege::{CacheBits, ObjectRef};
use serde::{Deserialize, Serialize};

/// One `(object-ref, grantor-ref, cache-bits)` triple inside a grantee's authorization object
/// (spec §3, §9 "Graph with back-edges": `GRANT_ENTRY_LENGTH = 3` in the original, kept here as
/// three named fields rather than an offset-addressed tuple).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct GrantEntry {
	pub object: ObjectRef,
	/// Never `NULL` once normalized: a stale grantor is rewritten to the object's current owner
	/// (spec §3 invariant).
	pub grantor: String,
	pub bits: CacheBits,
}

impl GrantEntry {
	pub fn new(object: ObjectRef, grantor: impl Into<String>) -> Self {
		Self {
			object,
			grantor: grantor.into(),
			bits: CacheBits::empty(),
		}
	}
}

/// One per principal. Holds the `owner` back-pointer and the ordered sequence of grant entries
/// (spec §3). Invariant: at most one entry per `(object-ref, grantor-ref)` pair.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct AuthorizationObject {
	pub owner: String,
	pub grants: Vec<GrantEntry>,
}

impl AuthorizationObject {
	pub fn new(owner: impl Into<String>) -> Self {
		Self {
			owner: owner.into(),
			grants: Vec::new(),
		}
	}

	/// Locate the grant entry for `(object, grantor)`, if any.
	pub fn find(&self, object: &ObjectRef, grantor: &str) -> Option<&GrantEntry> {
		self.grants.iter().find(|g| &g.object == object && g.grantor == grantor)
	}

	pub fn find_mut(&mut self, object: &ObjectRef, grantor: &str) -> Option<&mut GrantEntry> {
		self.grants.iter_mut().find(|g| &g.object == object && g.grantor == grantor)
	}

	/// Locate or create the `(object, grantor)` grant entry (spec §4.4 grant step 6).
	pub fn find_or_create(&mut self, object: &ObjectRef, grantor: &str) -> &mut GrantEntry {
		if self.find(object, grantor).is_none() {
			self.grants.push(GrantEntry::new(object.clone(), grantor));
		}
		self.find_mut(object, grantor).expect("entry was just inserted")
	}

	/// Remove the entry at `(object, grantor)` if its bits have gone to zero.
	pub fn prune_empty(&mut self, object: &ObjectRef, grantor: &str) {
		self.grants.retain(|g| !(&g.object == object && g.grantor == grantor && g.bits.is_empty_mask()));
	}

	/// Assert invariant (B): no two entries in this object share an `(object, grantor)` key.
	#[cfg(test)]
	pub(crate) fn has_no_duplicate_keys(&self) -> bool {
		let mut seen = std::collections::HashSet::new();
		self.grants.iter().all(|g| seen.insert((g.object.clone(), g.grantor.clone())))
	}
}
