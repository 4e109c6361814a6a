//! Privilege kinds, object kinds, and the packed cache-bits word (spec §3).

use crate::cnf::GRANT_OPTION_SHIFT;
use crate::err::Error;
use serde::{Deserialize, Serialize};

/// One of the closed set of privilege kinds, one bit each (spec §3 "Privilege kinds").
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PrivilegeKind {
	Select,
	Insert,
	Update,
	Delete,
	Alter,
	Index,
	Execute,
}

/// Every privilege kind, in the fixed scanning order used to pick the most informative error
/// when a grant/revoke caller is missing more than one bit (spec §4.4 step 4: "SELECT first").
pub const ALL_KINDS: [PrivilegeKind; 7] = [
	PrivilegeKind::Select,
	PrivilegeKind::Insert,
	PrivilegeKind::Update,
	PrivilegeKind::Delete,
	PrivilegeKind::Alter,
	PrivilegeKind::Index,
	PrivilegeKind::Execute,
];

impl PrivilegeKind {
	/// The bit this privilege kind occupies in the low half of a cache-bits word.
	pub const fn bit(self) -> u32 {
		match self {
			PrivilegeKind::Select => 1 << 0,
			PrivilegeKind::Insert => 1 << 1,
			PrivilegeKind::Update => 1 << 2,
			PrivilegeKind::Delete => 1 << 3,
			PrivilegeKind::Alter => 1 << 4,
			PrivilegeKind::Index => 1 << 5,
			PrivilegeKind::Execute => 1 << 6,
		}
	}

	/// The bit-exact textual label used on the catalog row (spec §6).
	pub const fn label(self) -> &'static str {
		match self {
			PrivilegeKind::Select => "SELECT",
			PrivilegeKind::Insert => "INSERT",
			PrivilegeKind::Update => "UPDATE",
			PrivilegeKind::Delete => "DELETE",
			PrivilegeKind::Alter => "ALTER",
			PrivilegeKind::Index => "INDEX",
			PrivilegeKind::Execute => "EXECUTE",
		}
	}

	/// Recover a privilege kind from its on-disk label using the original's
	/// first-letter-plus-third-letter discriminator (spec §4.1, §9): `'A'→ALTER`, `'D'→DELETE`,
	/// `'E'→EXECUTE`, `'I'→INDEX|INSERT` disambiguated by the third letter (`'D'` in "INDEX",
	/// `'S'` in "INSERT"), `'S'→SELECT`, `'U'→UPDATE`.
	pub fn from_label(label: &str) -> Result<Self, Error> {
		let bytes = label.as_bytes();
		let first = bytes.first().copied().unwrap_or(0).to_ascii_uppercase();
		let third = bytes.get(2).copied().unwrap_or(0).to_ascii_uppercase();
		let kind = match first {
			b'A' => PrivilegeKind::Alter,
			b'D' => PrivilegeKind::Delete,
			b'E' => PrivilegeKind::Execute,
			b'S' => PrivilegeKind::Select,
			b'U' => PrivilegeKind::Update,
			b'I' => match third {
				b'D' => PrivilegeKind::Index,
				b'S' => PrivilegeKind::Insert,
				_ => return Err(Error::Corrupted(format!("unrecognised privilege label '{label}'"))),
			},
			_ => return Err(Error::Corrupted(format!("unrecognised privilege label '{label}'"))),
		};
		Ok(kind)
	}
}

/// `(object-kind, identifier)` — spec §3 "Object reference". Ground values per spec §6 and §9:
/// `CLASS=0, PROCEDURE=5`. These are fixed, not a freely growable enum (see SPEC_FULL.md §9 Open
/// Question).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ObjectKind {
	Class = 0,
	Procedure = 5,
}

impl ObjectKind {
	pub const fn ground_value(self) -> i32 {
		self as i32
	}

	/// Tables/views (`Class`) admit every privilege except `EXECUTE`; stored procedures
	/// (`Procedure`) admit only `EXECUTE` (spec §3).
	pub fn admissible_mask(self) -> u32 {
		match self {
			ObjectKind::Class => ALL_KINDS
				.iter()
				.filter(|k| **k != PrivilegeKind::Execute)
				.fold(0u32, |acc, k| acc | k.bit()),
			ObjectKind::Procedure => PrivilegeKind::Execute.bit(),
		}
	}

	pub fn admits(self, kind: PrivilegeKind) -> bool {
		self.admissible_mask() & kind.bit() != 0
	}
}

/// The identifier of a catalog object: a class (table/view) or stored procedure, referenced by
/// its persistent handle (spec §3 "Object reference": "For procedures the identifier is looked
/// up by qualified name", but once resolved both kinds carry a stable handle).
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ObjectRef {
	pub kind: ObjectKind,
	pub id: String,
}

impl ObjectRef {
	pub fn new(kind: ObjectKind, id: impl Into<String>) -> Self {
		Self {
			kind,
			id: id.into(),
		}
	}

	pub fn class(id: impl Into<String>) -> Self {
		Self::new(ObjectKind::Class, id)
	}

	pub fn procedure(id: impl Into<String>) -> Self {
		Self::new(ObjectKind::Procedure, id)
	}
}

/// A packed 32-bit word: the low half is the granted-privilege mask, the high half (shifted by
/// [`GRANT_OPTION_SHIFT`]) is the grant-option mask (spec §3 "Authorization object").
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct CacheBits(pub u32);

impl CacheBits {
	pub const INVALID: CacheBits = CacheBits(u32::MAX);

	pub const fn empty() -> Self {
		CacheBits(0)
	}

	pub fn is_invalid(self) -> bool {
		self == Self::INVALID
	}

	/// The mask of privilege kinds actually granted.
	pub fn granted(self) -> u32 {
		self.0 & !(u32::MAX << GRANT_OPTION_SHIFT)
	}

	/// The mask of privilege kinds whose grant-option bit is set.
	pub fn grantable(self) -> u32 {
		(self.0 >> GRANT_OPTION_SHIFT) & !(u32::MAX << GRANT_OPTION_SHIFT)
	}

	pub fn has(self, kind: PrivilegeKind) -> bool {
		self.granted() & kind.bit() != 0
	}

	pub fn has_grant_option(self, kind: PrivilegeKind) -> bool {
		self.grantable() & kind.bit() != 0
	}

	pub fn is_empty_mask(self) -> bool {
		self.granted() == 0
	}

	/// Set the given privilege bits in the low half, and the same bits shifted into the high
	/// half iff `grantable` (spec §4.4 step 7).
	pub fn grant(&mut self, mask: u32, grantable: bool) {
		self.0 |= mask;
		if grantable {
			self.0 |= mask << GRANT_OPTION_SHIFT;
		} else {
			self.0 &= !(mask << GRANT_OPTION_SHIFT);
		}
	}

	/// Clear the given privilege bits (and their grant-option bits) from both halves.
	pub fn revoke(&mut self, mask: u32) {
		self.0 &= !mask;
		self.0 &= !(mask << GRANT_OPTION_SHIFT);
	}

	pub fn union(self, other: CacheBits) -> CacheBits {
		CacheBits(self.0 | other.0)
	}
}

/// The OR of all privilege bits ("grant-all").
pub fn all_mask() -> u32 {
	ALL_KINDS.iter().fold(0u32, |acc, k| acc | k.bit())
}
