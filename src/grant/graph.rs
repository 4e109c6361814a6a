//! The Grant Graph Engine (spec §4.4): `grant` and `revoke`.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::catalog::gateway::Gateway;
use crate::err::Error;
use crate::grant::node::GrantNode;
use crate::iam::check;
use crate::iam::directory::Directory;
use crate::iam::cache::PrivilegeCache;
use crate::iam::object::GrantEntry;
use crate::iam::principal::{uppercase, Principal};
use crate::iam::privilege::{all_mask, ObjectRef};
use crate::kvs::Transaction;

/// Owns no storage of its own: it mutates the [`Directory`]'s authorization objects in memory,
/// persists the edges through the [`Gateway`], and invalidates the [`PrivilegeCache`] as it goes.
#[non_exhaustive]
pub struct GrantGraph {
	directory: Arc<Directory>,
	cache: Arc<PrivilegeCache>,
	gateway: Arc<Gateway>,
	schema_version: AtomicU64,
}

impl GrantGraph {
	pub fn new(directory: Arc<Directory>, cache: Arc<PrivilegeCache>, gateway: Arc<Gateway>) -> Self {
		Self {
			directory,
			cache,
			gateway,
			schema_version: AtomicU64::new(0),
		}
	}

	pub fn schema_version(&self) -> u64 {
		self.schema_version.load(Ordering::Acquire)
	}

	fn bump_schema_version(&self) {
		self.schema_version.fetch_add(1, Ordering::AcqRel);
	}

	/// spec §4.4 `grant`. `partitions` lists the sub-partitions of `object` to recurse into
	/// first, if any (empty for a non-partitioned class or a procedure); the whole sequence is
	/// bracketed in one savepoint so a mid-sequence failure undoes every partition already
	/// granted.
	pub async fn grant(
		&self,
		caller: &Principal,
		grantee: &str,
		object: &ObjectRef,
		partitions: &[ObjectRef],
		privilege_mask: u32,
		grantable: bool,
	) -> Result<(), Error> {
		let (mut tx, _scope) = self.gateway.begin(true).await?;
		tx.new_save_point();
		let mut targets = Vec::with_capacity(1 + partitions.len());
		targets.push(object.clone());
		targets.extend_from_slice(partitions);
		for target in &targets {
			if let Err(e) = self.grant_one(&mut tx, caller, grantee, target, privilege_mask, grantable).await {
				if !e.is_transaction_aborted() {
					tx.rollback_to_save_point().await?;
				}
				return Err(e);
			}
		}
		tx.release_last_save_point()?;
		tx.commit().await?;
		Ok(())
	}

	async fn grant_one(
		&self,
		tx: &mut Transaction,
		caller: &Principal,
		grantee: &str,
		object: &ObjectRef,
		privilege_mask: u32,
		grantable: bool,
	) -> Result<(), Error> {
		let grantee_upper = uppercase(grantee);

		// step 2: granting to oneself is a vacuous no-op.
		if grantee_upper == caller.name {
			return Ok(());
		}

		// step 3: cannot grant on an object to its own owner.
		let owner = self.directory.object_owner(object)?;
		if grantee_upper == owner {
			return Err(Error::CantGrantOwner);
		}

		// step 4: caller must already hold every requested bit, with grant option.
		let caller_bits = self.cache.resolve(&self.directory, &caller.name, object);
		check::require_privileges(caller_bits, privilege_mask, true, &object.id)?;

		// steps 5-6: write-lock the grantee's authorization object, locate or create the entry.
		let (insert_bits, update_bits) = self.directory.with_authorization_object_mut(&grantee_upper, |auth_obj| {
			let entry = auth_obj.find_or_create(object, &caller.name);
			let current = entry.bits.granted();
			let insert_bits = !current & privilege_mask;
			let update_bits = privilege_mask & !insert_bits;
			(insert_bits, update_bits)
		})?;

		// step 7: persist, then (only on success) update the in-memory cache-bits.
		let insert_grantable = if grantable { insert_bits } else { 0 };
		let update_grantable = if grantable { update_bits } else { 0 };
		Gateway::insert_rows_in(tx, &caller.name, &grantee_upper, object, insert_bits, insert_grantable).await?;
		Gateway::update_rows_in(tx, &caller.name, &grantee_upper, object, update_bits, update_grantable).await?;
		self.directory.with_authorization_object_mut(&grantee_upper, |auth_obj| {
			let entry = auth_obj.find_or_create(object, &caller.name);
			entry.bits.grant(privilege_mask, grantable);
		})?;

		// step 8: invalidate and recompile.
		self.cache.reset_cache_for_class(object);
		self.bump_schema_version();
		debug!(grantor = %caller.name, grantee = %grantee_upper, object = ?object, "granted privileges");
		Ok(())
	}

	/// spec §4.4 `revoke`. Same partitioned-class handling as [`GrantGraph::grant`].
	pub async fn revoke(
		&self,
		caller: &Principal,
		grantee: &str,
		object: &ObjectRef,
		partitions: &[ObjectRef],
		privilege_mask: u32,
	) -> Result<(), Error> {
		let (mut tx, _scope) = self.gateway.begin(true).await?;
		tx.new_save_point();
		let mut targets = Vec::with_capacity(1 + partitions.len());
		targets.push(object.clone());
		targets.extend_from_slice(partitions);
		for target in &targets {
			if let Err(e) = self.revoke_one(&mut tx, caller, grantee, target, privilege_mask).await {
				if !e.is_transaction_aborted() {
					tx.rollback_to_save_point().await?;
				}
				return Err(e);
			}
		}
		tx.release_last_save_point()?;
		tx.commit().await?;
		Ok(())
	}

	async fn revoke_one(
		&self,
		tx: &mut Transaction,
		caller: &Principal,
		grantee: &str,
		object: &ObjectRef,
		privilege_mask: u32,
	) -> Result<(), Error> {
		let grantee_upper = uppercase(grantee);
		let owner = self.directory.object_owner(object)?;

		// step 2.
		if grantee_upper == caller.name {
			return Err(Error::CantRevokeSelf);
		}
		if grantee_upper == owner {
			return Err(Error::CantRevokeOwner);
		}

		// step 3.
		let caller_bits = self.cache.resolve(&self.directory, &caller.name, object);
		check::require_privileges(caller_bits, privilege_mask, true, &object.id)?;

		// step 4.
		let target_obj = self
			.directory
			.authorization_object(&grantee_upper)
			.ok_or_else(|| Error::InvalidUser(grantee_upper.clone()))?;
		let target_entry: GrantEntry = target_obj
			.find(object, &caller.name)
			.cloned()
			.ok_or_else(|| Error::GrantNotFound {
				grantee: grantee_upper.clone(),
				object: object.id.clone(),
			})?;

		// step 5.
		let mask = if privilege_mask == all_mask() {
			target_entry.bits.granted()
		} else {
			privilege_mask
		};

		// step 6: collect every dependent grant entry on `object`, across every principal,
		// excluding the grantee's own entry from `caller` (handled directly in step 10).
		let mut nodes: Vec<GrantNode> = Vec::new();
		for name in self.directory.principal_names() {
			let Some(obj) = self.directory.authorization_object(&name) else {
				continue;
			};
			for (idx, entry) in obj.grants.iter().enumerate() {
				if &entry.object != object {
					continue;
				}
				if entry.bits.granted() & mask == 0 {
					continue;
				}
				if name == grantee_upper && entry.grantor == caller.name {
					continue;
				}
				let grant_option = entry.bits.grantable() & mask != 0;
				nodes.push(GrantNode::new(name.clone(), entry.grantor.clone(), idx, grant_option));
			}
		}

		// step 7: mark-and-sweep reachability from the owner. The grantee's own survival, if
		// any, emerges from the fixed point below rather than being assumed up front.
		mark_legal(&mut nodes, &owner);

		// step 8: every referenced authorization object must still resolve; abort otherwise.
		for node in &nodes {
			if !node.legal {
				self.directory.find_principal(&node.auth_object)?;
			}
		}

		// step 9, pass 1: clear the revoked bits on every not-legal node.
		for node in &nodes {
			if node.legal {
				continue;
			}
			self.directory.with_authorization_object_mut(&node.auth_object, |auth_obj| {
				if let Some(entry) = auth_obj.grants.get_mut(node.grant_index) {
					entry.bits.revoke(mask);
				}
			})?;
		}
		// step 9, pass 2: sweep now-empty entries, once index stability no longer matters.
		let swept: HashSet<String> = nodes.iter().filter(|n| !n.legal).map(|n| n.auth_object.clone()).collect();
		for name in &swept {
			self.directory.with_authorization_object_mut(name, |auth_obj| {
				auth_obj.grants.retain(|g| !(&g.object == object && g.bits.is_empty_mask()));
			})?;
		}

		// step 10: persist the sweep, then clear/delete the caller's own entry on the grantee.
		for node in &nodes {
			if node.legal {
				continue;
			}
			Gateway::delete_rows_in(tx, &node.grantor, &node.auth_object, object, mask).await?;
		}
		self.directory.with_authorization_object_mut(&grantee_upper, |auth_obj| {
			if let Some(entry) = auth_obj.find_mut(object, &caller.name) {
				entry.bits.revoke(mask);
			}
			auth_obj.prune_empty(object, &caller.name);
		})?;
		Gateway::delete_rows_in(tx, &caller.name, &grantee_upper, object, mask).await?;

		// step 11.
		self.cache.reset_cache_for_class(object);
		self.bump_schema_version();
		debug!(grantor = %caller.name, grantee = %grantee_upper, object = ?object, swept = swept.len(), "revoked privileges");
		Ok(())
	}
}

/// Fixed-point mark phase: a node is legal once its grantor is a known-legal conduit, starting
/// from the owner alone and never seeding a root that hasn't itself been proven reachable.
fn mark_legal(nodes: &mut [GrantNode], owner: &str) {
	let mut legal_grantors: HashSet<String> = HashSet::new();
	legal_grantors.insert(owner.to_string());
	loop {
		let mut changed = false;
		for node in nodes.iter_mut() {
			if !node.legal && legal_grantors.contains(&node.grantor) {
				node.legal = true;
				changed = true;
			}
			if node.legal && node.grant_option && legal_grantors.insert(node.auth_object.clone()) {
				changed = true;
			}
		}
		if !changed {
			break;
		}
	}
}
