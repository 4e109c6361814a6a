//! The Auth Row Gateway (spec §4.1).
//!
//! Translates individual privilege edges to/from catalog rows through the database's own
//! transactional key-value engine, under a disabled-authorization scope. Grounded on the
//! teacher's lazily-held `Datastore`/cache handles and on `au_auth_accessor`'s one-row-per-
//! privilege-bit model in `authenticate_access_auth.cpp`.

use crate::catalog::row::AuthCatalogRow;
use crate::catalog::scope::{AuthSwitch, InternalQueryScope};
use crate::err::Error;
use crate::iam::privilege::{ObjectRef, PrivilegeKind, ALL_KINDS};
use crate::kvs::{Datastore, Transaction};
use std::sync::Arc;
use tracing::trace;

/// One process-wide handle to the catalog table plus the switch used to bypass authorization
/// checks while the gateway itself is mutating that table (spec §4.1, §4.6).
#[non_exhaustive]
pub struct Gateway {
	store: Arc<Datastore>,
	switch: AuthSwitch,
}

impl Gateway {
	pub fn new(store: Arc<Datastore>, switch: AuthSwitch) -> Self {
		Self {
			store,
			switch,
		}
	}

	/// Open a catalog transaction under a disabled-authorization scope, for callers (the Grant
	/// Graph Engine's partitioned grant/revoke) that need to bracket several row mutations inside
	/// a single savepoint instead of one gateway call per mutation.
	pub async fn begin(&self, write: bool) -> Result<(Transaction, InternalQueryScope), Error> {
		let scope = self.switch.disable();
		let tx = self.store.transaction(write).await?;
		Ok((tx, scope))
	}

	/// The non-transaction-owning half of [`Gateway::insert_auth`], for use by callers already
	/// holding a transaction opened via [`Gateway::begin`].
	pub async fn insert_rows_in(
		tx: &mut Transaction,
		grantor: &str,
		grantee: &str,
		object: &ObjectRef,
		privilege_mask: u32,
		grantable_mask: u32,
	) -> Result<(), Error> {
		for kind in ALL_KINDS {
			if privilege_mask & kind.bit() == 0 {
				continue;
			}
			let is_grantable = grantable_mask & kind.bit() != 0;
			let row = AuthCatalogRow::new(grantor, grantee, object, kind, is_grantable);
			tx.put_tracked(row.storage_key()?, row.to_bytes()).await?;
		}
		Ok(())
	}

	/// The non-transaction-owning half of [`Gateway::update_auth`].
	pub async fn update_rows_in(
		tx: &mut Transaction,
		grantor: &str,
		grantee: &str,
		object: &ObjectRef,
		privilege_mask: u32,
		grantable_mask: u32,
	) -> Result<(), Error> {
		for kind in ALL_KINDS {
			if privilege_mask & kind.bit() == 0 {
				continue;
			}
			let is_grantable = grantable_mask & kind.bit() != 0;
			let row = AuthCatalogRow::new(grantor, grantee, object, kind, is_grantable);
			tx.set_tracked(row.storage_key()?, row.to_bytes()).await?;
		}
		Ok(())
	}

	/// The non-transaction-owning half of [`Gateway::delete_auth`].
	pub async fn delete_rows_in(
		tx: &mut Transaction,
		grantor: &str,
		grantee: &str,
		object: &ObjectRef,
		privilege_mask: u32,
	) -> Result<(), Error> {
		for kind in ALL_KINDS {
			if privilege_mask & kind.bit() == 0 {
				continue;
			}
			let key = AuthCatalogRow::key(grantee, grantor, object, kind);
			tx.del_tracked(key).await?;
		}
		Ok(())
	}

	/// spec §4.1 `insert_auth`: for each bit set in `privilege_mask`, create one row with
	/// `is_grantable = (bit ∈ grantable_mask)`. Atomic per bit: on the first failure the
	/// enclosing transaction is cancelled, undoing every row created so far this call.
	pub async fn insert_auth(
		&self,
		grantor: &str,
		grantee: &str,
		object: &ObjectRef,
		privilege_mask: u32,
		grantable_mask: u32,
	) -> Result<(), Error> {
		let _scope = self.switch.disable();
		let mut tx = self.store.transaction(true).await?;
		if let Err(e) = Self::insert_rows_in(&mut tx, grantor, grantee, object, privilege_mask, grantable_mask).await {
			tx.cancel().await?;
			return Err(e);
		}
		tx.commit().await?;
		trace!(grantor, grantee, object = ?object, "inserted auth rows");
		Ok(())
	}

	/// spec §4.1 `update_auth`: for each bit set, locate the existing row and overwrite its
	/// `is_grantable` field; create it if absent.
	pub async fn update_auth(
		&self,
		grantor: &str,
		grantee: &str,
		object: &ObjectRef,
		privilege_mask: u32,
		grantable_mask: u32,
	) -> Result<(), Error> {
		let _scope = self.switch.disable();
		let mut tx = self.store.transaction(true).await?;
		if let Err(e) = Self::update_rows_in(&mut tx, grantor, grantee, object, privilege_mask, grantable_mask).await {
			tx.cancel().await?;
			return Err(e);
		}
		tx.commit().await?;
		Ok(())
	}

	/// spec §4.1 `delete_auth`: for each bit set, locate and delete the row. Missing rows are not
	/// in themselves an error at this layer.
	pub async fn delete_auth(
		&self,
		grantor: &str,
		grantee: &str,
		object: &ObjectRef,
		privilege_mask: u32,
	) -> Result<(), Error> {
		let _scope = self.switch.disable();
		let mut tx = self.store.transaction(true).await?;
		if let Err(e) = Self::delete_rows_in(&mut tx, grantor, grantee, object, privilege_mask).await {
			tx.cancel().await?;
			return Err(e);
		}
		tx.commit().await?;
		Ok(())
	}

	/// spec §4.1 `delete_auth_of_dropping_user`: remove every row whose grantee is `principal`.
	pub async fn delete_auth_of_dropping_user(&self, principal: &str) -> Result<(), Error> {
		let _scope = self.switch.disable();
		let mut tx = self.store.transaction(true).await?;
		let prefix = AuthCatalogRow::grantee_prefix(principal);
		let rows = tx.scan_prefix(&prefix).await?;
		for (key, _) in rows {
			if let Err(e) = tx.del(key).await {
				tx.cancel().await?;
				return Err(e);
			}
		}
		tx.commit().await?;
		Ok(())
	}

	/// spec §4.1 `delete_auth_of_dropping_object`: remove every row whose object resolves to
	/// `object`, regardless of grantee.
	pub async fn delete_auth_of_dropping_object(&self, object: &ObjectRef) -> Result<(), Error> {
		let _scope = self.switch.disable();
		let mut tx = self.store.transaction(true).await?;
		let rows = tx.scan_prefix(AuthCatalogRow::TABLE_PREFIX).await?;
		for (key, val) in rows {
			let row = match AuthCatalogRow::from_bytes(&val).and_then(|r| Ok((r.object_ref()?, r))) {
				Ok(pair) => pair,
				Err(e) => {
					tx.cancel().await?;
					return Err(e);
				}
			};
			if &row.0 == object {
				if let Err(e) = tx.del(key).await {
					tx.cancel().await?;
					return Err(e);
				}
			}
		}
		tx.commit().await?;
		Ok(())
	}

	/// spec §4.1 `revoke_all_privileges_of_object`: iterate every row granted by `owner` on
	/// `object`, invoking `revoke` for each `(grantee, privilege-kind)` pair found so the caller
	/// can drive the Grant Graph Engine's own `revoke` (kept as a callback here to avoid a
	/// dependency cycle between the gateway and the grant graph).
	pub async fn revoke_all_privileges_of_object(
		&self,
		owner: &str,
		object: &ObjectRef,
		mut revoke: impl FnMut(&str, PrivilegeKind) -> Result<(), Error>,
	) -> Result<(), Error> {
		let rows = {
			let _scope = self.switch.disable();
			let tx = self.store.transaction(false).await?;
			tx.scan_prefix(AuthCatalogRow::TABLE_PREFIX).await?
		};
		for (_, val) in rows {
			let row = AuthCatalogRow::from_bytes(&val)?;
			if row.grantor != owner {
				continue;
			}
			if &row.object_ref()? != object {
				continue;
			}
			revoke(&row.grantee, row.privilege_kind()?)?;
		}
		Ok(())
	}

	/// All rows whose grantee is `principal`, for diagnostics and tests that need to confirm the
	/// catalog carries no trace of a dropped user.
	pub async fn rows_for_grantee(&self, principal: &str) -> Result<Vec<AuthCatalogRow>, Error> {
		let _scope = self.switch.disable();
		let tx = self.store.transaction(false).await?;
		let prefix = AuthCatalogRow::grantee_prefix(principal);
		let rows = tx.scan_prefix(&prefix).await?;
		rows.into_iter().map(|(_, val)| AuthCatalogRow::from_bytes(&val)).collect()
	}

	/// Locate exactly one row by its candidate key; surfaces `Error::Generic` (ground value
	/// `ER_GENERIC_ERROR` in the original) if more than zero-or-one rows can ever be found at a
	/// single candidate key — a corruption signal, since the key is a uniqueness constraint.
	pub async fn find_one(
		&self,
		grantor: &str,
		grantee: &str,
		object: &ObjectRef,
		kind: PrivilegeKind,
	) -> Result<Option<AuthCatalogRow>, Error> {
		let _scope = self.switch.disable();
		let tx = self.store.transaction(false).await?;
		let key = AuthCatalogRow::key(grantee, grantor, object, kind);
		match tx.get(&key).await? {
			Some(bytes) => Ok(Some(AuthCatalogRow::from_bytes(&bytes)?)),
			None => Ok(None),
		}
	}
}
