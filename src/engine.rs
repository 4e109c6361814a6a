//! Wires the Principal Directory, Privilege Cache, Auth Row Gateway and Grant Graph Engine
//! together into the single handle applications hold (grounded on the teacher's top-level
//! `kvs::Datastore`, which bundles storage plus the options/auth types the rest of the crate is
//! built against).

use std::sync::Arc;

use crate::catalog::gateway::Gateway;
use crate::catalog::scope::AuthSwitch;
use crate::dbs::{Options, Session};
use crate::err::Error;
use crate::grant::GrantGraph;
use crate::iam::check;
use crate::iam::directory::Directory;
use crate::iam::cache::PrivilegeCache;
use crate::iam::principal::Principal;
use crate::iam::privilege::ObjectRef;
use crate::kvs::Datastore;
use crate::validator::Validator;

/// The authorization core's single entry point. `DBA` and `PUBLIC` already exist once this
/// returns (spec §3).
#[non_exhaustive]
pub struct AuthorizationCore {
	pub directory: Arc<Directory>,
	pub cache: Arc<PrivilegeCache>,
	pub gateway: Arc<Gateway>,
	pub grants: Arc<GrantGraph>,
	pub validator: Validator,
	switch: AuthSwitch,
}

impl AuthorizationCore {
	pub async fn new() -> Result<Self, Error> {
		let store = Arc::new(Datastore::new().await?);
		let switch = AuthSwitch::new();
		let directory = Arc::new(Directory::new());
		let cache = Arc::new(PrivilegeCache::new());
		let gateway = Arc::new(Gateway::new(store, switch.clone()));
		let grants = Arc::new(GrantGraph::new(directory.clone(), cache.clone(), gateway.clone()));
		let validator = Validator::new(directory.clone());
		Ok(Self {
			directory,
			cache,
			gateway,
			grants,
			validator,
			switch,
		})
	}

	pub fn is_auth_disabled(&self) -> bool {
		self.switch.is_disabled()
	}

	/// Authenticate as `name`, returning a session and recording it as logged in (so
	/// `find_for_drop`/`drop_principal` refuse to drop it out from under an active connection).
	pub fn login(&self, name: &str) -> Result<Session, Error> {
		let principal = self.directory.find_principal(name)?;
		self.directory.login(&principal.name);
		Ok(Session::for_principal(&principal.name, principal.is_administrative()))
	}

	pub fn logout(&self, session: &Session) {
		self.directory.logout(session.au.id());
	}

	fn caller(&self, session: &Session) -> Result<Principal, Error> {
		self.directory.find_principal(session.au.id())
	}

	/// Authorization check for an ordinary (non-grant/revoke) statement, honoring
	/// [`Options::perms`] (spec §4.5 "Privilege resolution" and §4.6).
	pub fn check(&self, session: &Session, opts: &Options, object: &ObjectRef, requested: u32) -> Result<(), Error> {
		if !opts.perms || self.is_auth_disabled() {
			return Ok(());
		}
		let bits = self.cache.resolve(&self.directory, session.au.id(), object);
		check::require_privileges(bits, requested, false, &object.id)
	}

	pub async fn grant(
		&self,
		caller: &Session,
		grantee: &str,
		object: &ObjectRef,
		partitions: &[ObjectRef],
		privilege_mask: u32,
		grantable: bool,
	) -> Result<(), Error> {
		let caller = self.caller(caller)?;
		self.grants.grant(&caller, grantee, object, partitions, privilege_mask, grantable).await
	}

	pub async fn revoke(
		&self,
		caller: &Session,
		grantee: &str,
		object: &ObjectRef,
		partitions: &[ObjectRef],
		privilege_mask: u32,
	) -> Result<(), Error> {
		let caller = self.caller(caller)?;
		self.grants.revoke(&caller, grantee, object, partitions, privilege_mask).await
	}

	pub fn create_user(&self, caller: &Session, name: &str) -> Result<Principal, Error> {
		let caller = self.caller(caller)?;
		self.directory.add_principal(&caller, name)
	}

	/// spec §4.2 `drop_principal`, wired up with the privilege-cache purge the directory itself
	/// does not own.
	pub async fn drop_user(&self, caller: &Session, name: &str, owns_objects: impl FnOnce() -> bool) -> Result<(), Error> {
		let caller_principal = self.caller(caller)?;
		let target = self.directory.find_for_drop(&caller_principal, name)?;
		self.directory.drop_principal(&caller_principal, &target.name, owns_objects)?;
		self.gateway.delete_auth_of_dropping_user(&target.name).await?;
		self.cache.remove_user_cache_references(target.cache_index);
		Ok(())
	}

	pub fn add_member(&self, group: &str, member: &str) -> Result<(), Error> {
		self.directory.add_member(group, member)
	}

	pub fn drop_member(&self, group: &str, member: &str) -> Result<(), Error> {
		self.directory.drop_member(group, member)
	}

	/// spec §4.2 `set_comment`: `ALTER USER <name> COMMENT <text>`.
	pub fn set_comment(&self, caller: &Session, target: &str, text: &str) -> Result<(), Error> {
		let caller = self.caller(caller)?;
		self.directory.set_comment(&caller, target, text)
	}

	/// `ALTER <object> OWNER TO <new_owner>`: transfers ownership and invalidates the class's
	/// privilege-cache entries, since ownership affects which bits are implicitly held (spec §4.3
	/// "invalidated … on ownership transfer").
	pub fn transfer_ownership(&self, object: &ObjectRef, new_owner: &str) -> Result<(), Error> {
		self.directory.transfer_ownership(object, new_owner)?;
		self.cache.reset_cache_for_class(object);
		Ok(())
	}

	/// Register the owner of a newly created class/procedure and grant that owner every
	/// admissible privilege with grant option, mirroring the original's behavior of seeding the
	/// owner's own authorization object at object-creation time.
	pub async fn register_owned_object(&self, owner: &str, object: ObjectRef) -> Result<(), Error> {
		let owner_principal = self.directory.find_principal(owner)?;
		self.directory.register_object(object.clone(), &owner_principal.name);
		let mask = object.kind.admissible_mask();
		self.directory
			.with_authorization_object_mut(&owner_principal.name, |auth_obj| {
				let entry = auth_obj.find_or_create(&object, &owner_principal.name);
				entry.bits.grant(mask, true);
			})?;
		Ok(())
	}

	/// spec §4.1 `revoke_all_privileges_of_object`, driving the Grant Graph Engine's `revoke` for
	/// every row found. Used on ownership change and on object drop.
	pub async fn revoke_all_privileges_of_object(&self, object: &ObjectRef) -> Result<(), Error> {
		let owner = self.directory.object_owner(object)?;
		let owner_principal = self.directory.find_principal(&owner)?;
		let mut to_revoke = Vec::new();
		self.gateway
			.revoke_all_privileges_of_object(&owner, object, |grantee, kind| {
				to_revoke.push((grantee.to_string(), kind.bit()));
				Ok(())
			})
			.await?;
		for (grantee, bit) in to_revoke {
			self.grants.revoke(&owner_principal, &grantee, object, &[], bit).await?;
		}
		Ok(())
	}

	/// Remove every trace of a dropped class/procedure: its catalog rows, its owner registration
	/// and in-memory grant entries (spec §4.1 `delete_auth_of_dropping_object`).
	pub async fn drop_object(&self, object: &ObjectRef) -> Result<(), Error> {
		self.gateway.delete_auth_of_dropping_object(object).await?;
		self.directory.forget_object(object);
		self.cache.reset_cache_for_class(object);
		Ok(())
	}
}
