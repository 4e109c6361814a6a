//! The transient revoke-propagation node (spec §3 "Transient revoke-propagation node", `GRANT-NODE`).
//!
//! Grounded on `AU_GRANT` in the original's `authenticate_grant.hpp`: `grant_index` is the index
//! into the *source* grant entry's sequence, preserved here as a plain `usize` so the mark phase
//! and the sweep phase of [`crate::grant::graph::GrantGraph::revoke`] can still find the entry
//! each node was built from, without needing owning pointers into the directory.

/// One entry in the flat, arena-style list of candidates considered for revocation. Never
/// persisted: it only exists for the duration of a single `revoke` call.
#[derive(Clone, Debug)]
pub(crate) struct GrantNode {
	/// The principal whose authorization object this node points into.
	pub auth_object: String,
	/// The grantor recorded on the pointed-to grant entry.
	pub grantor: String,
	/// Index into `auth_object`'s `grants` sequence at the time this node was built.
	pub grant_index: usize,
	/// Whether the pointed-to entry itself carries the grant option for the bits being revoked.
	pub grant_option: bool,
	/// Set during the mark phase: whether this node remains reachable, via grant-option edges,
	/// from the object's owner after the revoke. Unmarked nodes are swept.
	pub legal: bool,
}

impl GrantNode {
	pub fn new(auth_object: impl Into<String>, grantor: impl Into<String>, grant_index: usize, grant_option: bool) -> Self {
		Self {
			auth_object: auth_object.into(),
			grantor: grantor.into(),
			grant_index,
			grant_option,
			legal: false,
		}
	}
}
