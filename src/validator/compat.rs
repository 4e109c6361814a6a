//! Union/intersection/difference arm compatibility (spec §4.5).
//!
//! For each pair of arms of a `UNION`/`INTERSECT`/`EXCEPT`, either the types match exactly, one
//! side is `NULL`, or a single implicit cast makes them match; collation coercibility is resolved
//! via the four-level lattice in [`super::types::Coercibility`] — the least coercible arm wins and
//! an implicit `CAST` is inserted on the other side.

use crate::err::Error;
use crate::validator::types::{Coercibility, DataType};

/// One arm of a set operation: its declared type and collation coercibility.
#[derive(Clone, Debug)]
pub struct Arm {
	pub data_type: DataType,
	pub coercibility: Coercibility,
}

impl Arm {
	pub fn new(data_type: DataType, coercibility: Coercibility) -> Self {
		Self {
			data_type,
			coercibility,
		}
	}
}

/// The outcome of reconciling a pair of arms: which side (if any) needs an implicit `CAST`
/// inserted, and to which type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CastSide {
	None,
	Left(DataType),
	Right(DataType),
}

/// spec §4.5: "either types match exactly, one side is null, or a single implicit cast makes
/// them match." Returns the side (if any) that must be wrapped in an implicit `CAST`, selecting
/// the winning collation via the coercibility lattice.
pub fn reconcile(left: &Arm, right: &Arm, column_label: &str) -> Result<CastSide, Error> {
	if left.data_type == right.data_type {
		return Ok(CastSide::None);
	}
	if left.data_type.is_null() {
		return Ok(CastSide::Left(right.data_type.clone()));
	}
	if right.data_type.is_null() {
		return Ok(CastSide::Right(left.data_type.clone()));
	}
	if !left.data_type.assignable_to(&right.data_type) && !right.data_type.assignable_to(&left.data_type) {
		return Err(Error::UnionIncompatible(format!(
			"{column_label}: '{}' is not union-compatible with '{}'",
			left.data_type, right.data_type
		)));
	}
	// The least coercible (most fixed) arm's type wins; the other side is cast to match.
	if left.coercibility >= right.coercibility {
		Ok(CastSide::Right(left.data_type.clone()))
	} else {
		Ok(CastSide::Left(right.data_type.clone()))
	}
}

/// Reconcile every column position across all arms of a set operation (spec: "for each pair of
/// arms"). `arms` is indexed `[column][arm]`; returns, per column, the cast to insert for each arm
/// (or `CastSide::None`), reconciled pairwise left-to-right against a running "current winner".
pub fn reconcile_columns(columns: &[Vec<Arm>]) -> Result<Vec<Vec<CastSide>>, Error> {
	let mut out = Vec::with_capacity(columns.len());
	for (col_idx, arms) in columns.iter().enumerate() {
		let label = format!("column {}", col_idx + 1);
		let mut casts = vec![CastSide::None; arms.len()];
		if arms.is_empty() {
			out.push(casts);
			continue;
		}
		let mut winner = arms[0].clone();
		for (i, arm) in arms.iter().enumerate().skip(1) {
			match reconcile(&winner, arm, &label)? {
				CastSide::None => {}
				CastSide::Right(ty) => {
					casts[i] = CastSide::Right(ty.clone());
					winner.data_type = ty;
				}
				CastSide::Left(ty) => {
					// The running winner itself needs casting: retroactively mark every arm
					// already reconciled against it, then adopt the new type going forward.
					for c in casts.iter_mut().take(i) {
						if matches!(c, CastSide::None) {
							*c = CastSide::Right(ty.clone());
						}
					}
					winner.data_type = ty;
				}
			}
			winner.coercibility = winner.coercibility.strongest(arm.coercibility);
		}
		out.push(casts);
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn exact_match_needs_no_cast() {
		let a = Arm::new(DataType::Int, Coercibility::Coercible);
		let b = Arm::new(DataType::Int, Coercibility::Coercible);
		assert_eq!(reconcile(&a, &b, "c1").unwrap(), CastSide::None);
	}

	#[test]
	fn null_side_casts_to_the_other() {
		let a = Arm::new(DataType::Null, Coercibility::NotCoercible);
		let b = Arm::new(DataType::String, Coercibility::Coercible);
		assert_eq!(reconcile(&a, &b, "c1").unwrap(), CastSide::Left(DataType::String));
	}

	#[test]
	fn explicit_collation_wins_over_coercible() {
		let a = Arm::new(DataType::Int, Coercibility::Explicit);
		let b = Arm::new(DataType::Float, Coercibility::Coercible);
		assert_eq!(reconcile(&a, &b, "c1").unwrap(), CastSide::Right(DataType::Int));
	}

	#[test]
	fn incompatible_types_are_rejected() {
		let a = Arm::new(DataType::Object, Coercibility::Coercible);
		let b = Arm::new(DataType::Int, Coercibility::Coercible);
		assert!(reconcile(&a, &b, "c1").is_err());
	}
}
