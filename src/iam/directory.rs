//! The Principal Directory (spec §4.2).

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::{DashMap, DashSet};
use tracing::debug;

use crate::cnf::{DBA_NAME, MAX_COMMENT_LENGTH, MAX_USER_NAME_LENGTH, PUBLIC_NAME};
use crate::err::Error;
use crate::iam::object::AuthorizationObject;
use crate::iam::principal::{uppercase, CacheIndex, Principal};
use crate::iam::privilege::ObjectRef;

/// Lookup/create/drop of principals, membership closure, and cycle prevention.
///
/// Principals and their authorization objects are kept in-memory (spec §3 "Lifecycle summary":
/// "created together at user creation; dropped together at user drop"); the catalog-row
/// persistence of individual grant edges is the separate concern of [`crate::catalog::gateway`].
#[non_exhaustive]
pub struct Directory {
	principals: DashMap<String, Principal>,
	objects: DashMap<String, AuthorizationObject>,
	/// Owning principal of each known class/procedure. The schema-object catalog itself (tables,
	/// views, triggers, sequences, synonyms) is out of scope (spec §1); this is the minimal
	/// stand-in the Grant Graph Engine needs to know who an object's owner is.
	owners: DashMap<ObjectRef, String>,
	/// Names of principals some session is currently logged in as (spec §4.2 `find_for_drop`).
	active_sessions: DashSet<String>,
	next_cache_index: AtomicU32,
}

impl Default for Directory {
	fn default() -> Self {
		Self::new()
	}
}

impl Directory {
	/// A directory pre-seeded with the two distinguished principals, `DBA` and `PUBLIC` (spec
	/// §3: "Two distinguished principals exist").
	pub fn new() -> Self {
		let dir = Self {
			principals: DashMap::new(),
			objects: DashMap::new(),
			owners: DashMap::new(),
			active_sessions: DashSet::new(),
			next_cache_index: AtomicU32::new(0),
		};
		let dba = dir.insert_principal_unchecked(DBA_NAME);
		dir.objects.insert(DBA_NAME.to_string(), AuthorizationObject::new(DBA_NAME));
		let public = dir.insert_principal_unchecked(PUBLIC_NAME);
		dir.objects.insert(PUBLIC_NAME.to_string(), AuthorizationObject::new(PUBLIC_NAME));
		drop(dba);
		drop(public);
		dir
	}

	fn insert_principal_unchecked(&self, name: &str) -> Principal {
		let idx = self.next_cache_index.fetch_add(1, Ordering::SeqCst);
		let p = Principal::new(name, idx);
		self.principals.insert(p.name.clone(), p.clone());
		p
	}

	/// spec §4.2 `find_principal`: name is case-insensitively uppercased before lookup.
	pub fn find_principal(&self, name: &str) -> Result<Principal, Error> {
		let name = uppercase(name);
		self.principals
			.get(&name)
			.map(|p| p.clone())
			.ok_or_else(|| Error::InvalidUser(name.clone()))
	}

	/// spec §4.2 `find_for_drop`: requires administrative membership of `caller`, and refuses if
	/// a session is currently logged in as the named principal.
	pub fn find_for_drop(&self, caller: &Principal, name: &str) -> Result<Principal, Error> {
		if !caller.is_administrative() {
			return Err(Error::DbaOnly);
		}
		let name = uppercase(name);
		let principal = self.principals.get(&name).map(|p| p.clone()).ok_or(Error::InvalidUser(name.clone()))?;
		if self.active_sessions.contains(&name) {
			return Err(Error::NotAllowToDropActiveUser(name));
		}
		Ok(principal)
	}

	/// spec §4.2 `add_principal`: `DBA_ONLY` unless `caller` is administrative;
	/// `USER_NAME_TOO_LONG` past the configured maximum.
	pub fn add_principal(&self, caller: &Principal, name: &str) -> Result<Principal, Error> {
		if !caller.is_administrative() {
			return Err(Error::DbaOnly);
		}
		let upper = uppercase(name);
		if upper.len() > *MAX_USER_NAME_LENGTH {
			return Err(Error::UserNameTooLong(upper));
		}
		if self.principals.contains_key(&upper) {
			return Err(Error::CantAddMember(upper.clone(), "principal already exists".into()));
		}
		let mut p = self.insert_principal_unchecked(&upper);
		self.objects.insert(upper.clone(), AuthorizationObject::new(&upper));
		// Every newly created principal is a transitive member of PUBLIC (spec §3).
		p.direct_groups.insert(PUBLIC_NAME.to_string());
		p.groups.insert(PUBLIC_NAME.to_string());
		self.principals.insert(upper.clone(), p.clone());
		debug!(principal = %upper, "created principal");
		Ok(p)
	}

	/// spec §4.2 `add_member`: mutate `direct-groups`, reject if it would create a cycle
	/// (including self-membership), then recompute flattened groups transitively.
	pub fn add_member(&self, group: &str, member: &str) -> Result<(), Error> {
		let group = uppercase(group);
		let member = uppercase(member);
		if group == member {
			return Err(Error::MemberCausesCycles(member, group));
		}
		if !self.principals.contains_key(&group) {
			return Err(Error::InvalidUser(group));
		}
		if !self.principals.contains_key(&member) {
			return Err(Error::InvalidUser(member));
		}
		// `direct_groups` belongs to the member: it is the set of groups that principal
		// transitively belongs to. Adding the edge member -> group closes a cycle iff `group`
		// is already (transitively) a member of `member` itself.
		if self.transitively_includes(&group, &member) {
			return Err(Error::MemberCausesCycles(member, group));
		}
		{
			let mut m = self.principals.get_mut(&member).ok_or(Error::InvalidUser(member.clone()))?;
			m.direct_groups.insert(group.clone());
		}
		self.recompute_closure_everywhere();
		Ok(())
	}

	/// spec §4.2 `drop_member`.
	pub fn drop_member(&self, group: &str, member: &str) -> Result<(), Error> {
		let group = uppercase(group);
		let member = uppercase(member);
		let mut m = self.principals.get_mut(&member).ok_or_else(|| Error::InvalidUser(member.clone()))?;
		if !m.direct_groups.remove(&group) {
			return Err(Error::MemberNotFound(member.clone(), group));
		}
		drop(m);
		self.recompute_closure_everywhere();
		Ok(())
	}

	/// Whether `haystack` transitively includes `needle` as a member (`needle ∈ groups` of some
	/// principal reachable by walking `direct_groups` from `haystack`).
	fn transitively_includes(&self, haystack: &str, needle: &str) -> bool {
		let mut seen = BTreeSet::new();
		let mut stack = vec![haystack.to_string()];
		while let Some(cur) = stack.pop() {
			if !seen.insert(cur.clone()) {
				continue;
			}
			if cur == needle {
				return true;
			}
			if let Some(p) = self.principals.get(&cur) {
				for g in &p.direct_groups {
					stack.push(g.clone());
				}
			}
		}
		false
	}

	/// Recompute `groups` (the transitive closure of `direct_groups`) for every principal, via a
	/// depth-first walk (spec §4.2 "Membership closure is computed by a depth-first walk").
	fn recompute_closure_everywhere(&self) {
		let names: Vec<String> = self.principals.iter().map(|e| e.key().clone()).collect();
		for name in names {
			let closure = self.flatten(&name);
			if let Some(mut p) = self.principals.get_mut(&name) {
				p.groups = closure;
			}
		}
	}

	fn flatten(&self, name: &str) -> BTreeSet<String> {
		let mut seen = BTreeSet::new();
		let mut stack: Vec<String> = self
			.principals
			.get(name)
			.map(|p| p.direct_groups.iter().cloned().collect())
			.unwrap_or_default();
		while let Some(cur) = stack.pop() {
			if !seen.insert(cur.clone()) {
				continue;
			}
			if let Some(p) = self.principals.get(&cur) {
				for g in &p.direct_groups {
					if !seen.contains(g) {
						stack.push(g.clone());
					}
				}
			}
		}
		seen
	}

	/// spec §4.2 `set_comment`: caller must be the principal itself or an administrative member.
	pub fn set_comment(&self, caller: &Principal, target: &str, text: &str) -> Result<(), Error> {
		let target_upper = uppercase(target);
		if caller.name != target_upper && !caller.is_administrative() {
			return Err(Error::DbaOnly);
		}
		if text.len() > *MAX_COMMENT_LENGTH {
			return Err(Error::CommentOverflow);
		}
		let mut p = self.principals.get_mut(&target_upper).ok_or_else(|| Error::InvalidUser(target_upper.clone()))?;
		p.comment = Some(text.to_string());
		Ok(())
	}

	/// spec §4.2 `drop_principal`. `owns_objects` stands in for the out-of-scope schema-object
	/// catalog (tables, views, triggers, sequences, synonyms) — see SPEC_FULL.md §4.2.
	pub fn drop_principal(
		&self,
		caller: &Principal,
		name: &str,
		owns_objects: impl FnOnce() -> bool,
	) -> Result<(), Error> {
		let name = uppercase(name);
		if !caller.is_administrative() {
			return Err(Error::DbaOnly);
		}
		if name == DBA_NAME || name == PUBLIC_NAME {
			return Err(Error::CantDropUser(name));
		}
		if caller.name == name {
			return Err(Error::CantDropUser(name));
		}
		if !self.principals.contains_key(&name) {
			return Err(Error::InvalidUser(name));
		}
		if self.active_sessions.contains(&name) {
			return Err(Error::NotAllowToDropActiveUser(name));
		}
		if owns_objects() {
			return Err(Error::UserHasDatabaseObjects(name));
		}
		// Remove the principal from every other principal's direct-groups.
		for mut entry in self.principals.iter_mut() {
			entry.direct_groups.remove(&name);
		}
		self.recompute_closure_everywhere();
		self.principals.remove(&name);
		self.objects.remove(&name);
		debug!(principal = %name, "dropped principal");
		Ok(())
	}

	pub fn authorization_object(&self, name: &str) -> Option<AuthorizationObject> {
		self.objects.get(&uppercase(name)).map(|o| o.clone())
	}

	/// Mutate a principal's authorization object under the equivalent of an instance write lock
	/// (spec §4.4, §5: "the authorization object is write-locked before any catalog row is
	/// mutated"). `dashmap`'s per-shard locking provides that mutual exclusion here.
	pub fn with_authorization_object_mut<R>(
		&self,
		name: &str,
		f: impl FnOnce(&mut AuthorizationObject) -> R,
	) -> Result<R, Error> {
		let name = uppercase(name);
		let mut obj = self.objects.get_mut(&name).ok_or_else(|| Error::InvalidUser(name.clone()))?;
		Ok(f(&mut obj))
	}

	pub fn cache_index_of(&self, name: &str) -> Result<CacheIndex, Error> {
		self.find_principal(name).map(|p| p.cache_index)
	}

	/// Every known principal name, for callers (the Grant Graph Engine's dependent-grant scan)
	/// that need to walk every authorization object on an object.
	pub fn principal_names(&self) -> Vec<String> {
		self.principals.iter().map(|e| e.key().clone()).collect()
	}

	/// Register (or overwrite) the owner of a class/procedure, as a stand-in for the out-of-scope
	/// schema-object catalog that would otherwise carry this field (spec §1 non-goal).
	pub fn register_object(&self, object: ObjectRef, owner: &str) {
		self.owners.insert(object, uppercase(owner));
	}

	/// The owner of record for `object`, or `ClassDoesNotExist` if it was never registered.
	pub fn object_owner(&self, object: &ObjectRef) -> Result<String, Error> {
		self.owners.get(object).map(|o| o.clone()).ok_or_else(|| Error::ClassDoesNotExist(object.id.clone()))
	}

	/// Transfer ownership of `object` to `new_owner` (used on `ALTER ... OWNER TO`, spec §4.1
	/// `revoke_all_privileges_of_object`'s caller).
	pub fn transfer_ownership(&self, object: &ObjectRef, new_owner: &str) -> Result<(), Error> {
		if !self.principals.contains_key(&uppercase(new_owner)) {
			return Err(Error::InvalidUser(uppercase(new_owner)));
		}
		self.owners.insert(object.clone(), uppercase(new_owner));
		Ok(())
	}

	/// Remove every registration and grant-entry trace of a dropped class/procedure (spec §4.1
	/// `delete_auth_of_dropping_object`'s in-memory counterpart).
	pub fn forget_object(&self, object: &ObjectRef) {
		self.owners.remove(object);
		for mut entry in self.objects.iter_mut() {
			entry.grants.retain(|g| &g.object != object);
		}
	}

	/// Record that a session has logged in as `name` (used by `find_for_drop`/`drop_principal`).
	pub fn login(&self, name: &str) {
		self.active_sessions.insert(uppercase(name));
	}

	pub fn logout(&self, name: &str) {
		self.active_sessions.remove(&uppercase(name));
	}

	pub fn is_logged_in(&self, name: &str) -> bool {
		self.active_sessions.contains(&uppercase(name))
	}
}
