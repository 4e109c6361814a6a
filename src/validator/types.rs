//! The small type system the authorization-adjacent semantic validator reasons over (spec §4.5).
//!
//! Trimmed down from the teacher's `sql::Kind`: the validator never computes a value, it only
//! needs to decide assignability, union-compatibility and collation coercibility between
//! declared/inferred types, so the variants the validator never branches on (functions, ranges,
//! geometry, …) are left out.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A column or expression's data type.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DataType {
	Any,
	Null,
	Bool,
	Int,
	Float,
	Decimal,
	Number,
	String,
	Datetime,
	Duration,
	Bytes,
	Object,
	Array(Box<DataType>),
	/// A record reference, parameterized by the class it points at.
	Record(String),
}

impl fmt::Display for DataType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DataType::Any => write!(f, "any"),
			DataType::Null => write!(f, "null"),
			DataType::Bool => write!(f, "bool"),
			DataType::Int => write!(f, "int"),
			DataType::Float => write!(f, "float"),
			DataType::Decimal => write!(f, "decimal"),
			DataType::Number => write!(f, "number"),
			DataType::String => write!(f, "string"),
			DataType::Datetime => write!(f, "datetime"),
			DataType::Duration => write!(f, "duration"),
			DataType::Bytes => write!(f, "bytes"),
			DataType::Object => write!(f, "object"),
			DataType::Array(inner) => write!(f, "array<{inner}>"),
			DataType::Record(class) => write!(f, "record<{class}>"),
		}
	}
}

impl DataType {
	pub fn is_numeric(&self) -> bool {
		matches!(self, DataType::Int | DataType::Float | DataType::Decimal | DataType::Number)
	}

	pub fn is_null(&self) -> bool {
		matches!(self, DataType::Null)
	}

	pub fn is_record(&self) -> bool {
		matches!(self, DataType::Record(_))
	}

	/// Whether values of `self` can be implicitly cast to `target` (spec §4.5 "Assignment/insert
	/// compatibility", "Union/intersection/difference compatibility"). `Any` is assignable to and
	/// from everything; numeric widening is allowed; every type is assignable to `Null` only if
	/// `self` already is `Null` (no silent data loss to `NULL`).
	pub fn assignable_to(&self, target: &DataType) -> bool {
		if self == target || matches!(target, DataType::Any) || matches!(self, DataType::Any) {
			return true;
		}
		if self.is_null() || target.is_null() {
			return true;
		}
		match (self, target) {
			(a, b) if a.is_numeric() && b.is_numeric() => true,
			(DataType::Array(a), DataType::Array(b)) => a.assignable_to(b),
			(DataType::Record(a), DataType::Record(b)) => a == b,
			_ => false,
		}
	}
}

/// Collation coercibility lattice (spec §4.5 "Union/intersection/difference compatibility"):
/// `explicit > implicit > coercible > not-coercible` in strength. The *least* coercible arm of a
/// comparison or set operation wins, and an implicit `CAST` is inserted on the other side.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Coercibility {
	/// Weakest: a literal or an expression with no fixed collation of its own.
	NotCoercible,
	/// A column or parameter that may be coerced to match a stronger-collated peer.
	Coercible,
	/// A value whose collation was set implicitly (e.g. inherited from a column default).
	Implicit,
	/// Strongest: an explicit `COLLATE` clause. Never yields to another arm.
	Explicit,
}

impl Coercibility {
	/// The stronger (more fixed) of two coercibility levels wins and forces a cast on the other
	/// side; see `least_coercible` for the selection the spec actually asks for.
	pub fn strongest(self, other: Self) -> Self {
		self.max(other)
	}
}
