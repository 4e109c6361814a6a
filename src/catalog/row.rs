//! The on-disk shape of a single granted privilege edge (spec §3 "Auth catalog row", §6).

use serde::{Deserialize, Serialize};

use crate::err::Error;
use crate::iam::privilege::{ObjectKind, ObjectRef, PrivilegeKind};

/// Persistent serialization of a single granted privilege.
///
/// Uniqueness: `(grantee, grantor, object-ref, privilege-kind)` is a candidate key (spec §3). The
/// row keeps the privilege kind's short textual label (`"SELECT"`, …) rather than its bit
/// position, to support human-readable admin queries (spec §3, §6).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct AuthCatalogRow {
	pub grantor: String,
	pub grantee: String,
	pub object_type: i32,
	pub object_of: String,
	pub auth_type: String,
	pub is_grantable: bool,
}

impl AuthCatalogRow {
	pub fn new(grantor: &str, grantee: &str, object: &ObjectRef, kind: PrivilegeKind, is_grantable: bool) -> Self {
		Self {
			grantor: grantor.to_string(),
			grantee: grantee.to_string(),
			object_type: object.kind.ground_value(),
			object_of: object.id.clone(),
			auth_type: kind.label().to_string(),
			is_grantable,
		}
	}

	pub fn privilege_kind(&self) -> Result<PrivilegeKind, crate::err::Error> {
		PrivilegeKind::from_label(&self.auth_type)
	}

	pub fn object_kind(&self) -> Result<ObjectKind, crate::err::Error> {
		match self.object_type {
			0 => Ok(ObjectKind::Class),
			5 => Ok(ObjectKind::Procedure),
			other => Err(crate::err::Error::Corrupted(format!("unrecognised object_type {other}"))),
		}
	}

	pub fn object_ref(&self) -> Result<ObjectRef, crate::err::Error> {
		Ok(ObjectRef::new(self.object_kind()?, self.object_of.clone()))
	}

	/// The candidate-key bytes this row is stored under: `auth/{grantee}/{grantor}/{object_type}/{object_of}/{auth_type}`.
	/// `grantee` leads so that `delete_auth_of_dropping_user` can delete-by-prefix.
	pub fn key(grantee: &str, grantor: &str, object: &ObjectRef, kind: PrivilegeKind) -> Vec<u8> {
		let mut k = Vec::from(b"auth/".as_slice());
		k.extend_from_slice(grantee.as_bytes());
		k.push(b'/');
		k.extend_from_slice(grantor.as_bytes());
		k.push(b'/');
		k.extend_from_slice(object.kind.ground_value().to_string().as_bytes());
		k.push(b'/');
		k.extend_from_slice(object.id.as_bytes());
		k.push(b'/');
		k.extend_from_slice(kind.label().as_bytes());
		k
	}

	pub fn storage_key(&self) -> Result<Vec<u8>, crate::err::Error> {
		Ok(Self::key(&self.grantee, &self.grantor, &self.object_ref()?, self.privilege_kind()?))
	}

	pub fn grantee_prefix(grantee: &str) -> Vec<u8> {
		let mut k = Vec::from(b"auth/".as_slice());
		k.extend_from_slice(grantee.as_bytes());
		k.push(b'/');
		k
	}

	pub const TABLE_PREFIX: &'static [u8] = b"auth/";

	pub fn to_bytes(&self) -> Vec<u8> {
		serde_json::to_vec(self).expect("AuthCatalogRow always serializes")
	}

	pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::err::Error> {
		serde_json::from_slice(bytes).map_err(|e| Error::Corrupted(e.to_string()))
	}
}
