//! The Privilege Cache (spec §4.3).

use dashmap::DashMap;

use crate::iam::directory::Directory;
use crate::iam::object::AuthorizationObject;
use crate::iam::principal::{uppercase, CacheIndex};
use crate::iam::privilege::{CacheBits, ObjectRef};

/// Per-`(principal, class)` cache of the effective privilege bitmask.
///
/// Partitioned by [`CacheIndex`] so that, per spec §5, "writes to one partition do not block
/// reads of another" — `dashmap`'s shard-level locking gives us that for free.
#[non_exhaustive]
pub struct PrivilegeCache {
	entries: DashMap<(CacheIndex, ObjectRef), CacheBits>,
}

impl Default for PrivilegeCache {
	fn default() -> Self {
		Self::new()
	}
}

impl PrivilegeCache {
	pub fn new() -> Self {
		Self {
			entries: DashMap::new(),
		}
	}

	/// spec §4.3 `get_cache_bits`: returns the word for `index`/`class`; [`CacheBits::INVALID`]
	/// if stale or never populated.
	pub fn get_cache_bits(&self, index: CacheIndex, class: &ObjectRef) -> CacheBits {
		self.entries.get(&(index, class.clone())).map(|e| *e).unwrap_or(CacheBits::INVALID)
	}

	/// spec §4.3 `update_cache`: recomputes the word by ORing contributions from every grant
	/// entry across the grantee's own authorization object and those of every group it
	/// transitively belongs to, then stores it.
	pub fn update_cache(&self, directory: &Directory, principal_name: &str, class: &ObjectRef) -> CacheBits {
		let principal_name = uppercase(principal_name);
		let mut bits = CacheBits::empty();
		let mut members = vec![principal_name.clone()];
		if let Ok(p) = directory.find_principal(&principal_name) {
			members.extend(p.groups.iter().cloned());
		}
		for member in &members {
			if let Some(obj) = directory.authorization_object(member) {
				bits = bits.union(Self::contribution(&obj, class));
			}
		}
		let index = directory.cache_index_of(&principal_name).unwrap_or(0);
		self.entries.insert((index, class.clone()), bits);
		bits
	}

	fn contribution(obj: &AuthorizationObject, class: &ObjectRef) -> CacheBits {
		obj.grants.iter().filter(|g| &g.object == class).fold(CacheBits::empty(), |acc, g| acc.union(g.bits))
	}

	/// Resolve the effective bits for `principal`/`class`, recomputing on a cache miss (spec
	/// §4.3 "readers may race with invalidation by re-reading the word after invalidation and
	/// recomputing if needed").
	pub fn resolve(&self, directory: &Directory, principal_name: &str, class: &ObjectRef) -> CacheBits {
		let index = directory.cache_index_of(principal_name).unwrap_or(0);
		let bits = self.get_cache_bits(index, class);
		if bits.is_invalid() {
			self.update_cache(directory, principal_name, class)
		} else {
			bits
		}
	}

	/// spec §4.3 `reset_cache_for_class`: marks all entries for `class` stale.
	pub fn reset_cache_for_class(&self, class: &ObjectRef) {
		self.entries.retain(|(_, c), _| c != class);
	}

	/// spec §4.3 `remove_user_cache_references`: drops all entries associated with a dropped
	/// principal, keyed by its cache index.
	pub fn remove_user_cache_references(&self, index: CacheIndex) {
		self.entries.retain(|(i, _), _| *i != index);
	}

	/// Invalidate every entry (a schema-version bump, spec §3 "Privilege cache entry" lifecycle).
	pub fn invalidate_all(&self) {
		self.entries.clear();
	}
}
