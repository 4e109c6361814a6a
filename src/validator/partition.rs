//! Partition validation (spec §4.5 "Partition validation").
//!
//! Partition expressions must be deterministic, single-column, and of an admissible type before
//! any of the per-kind rules below are checked; that shared precondition is represented as
//! [`PartitionExpr`] and validated once by [`validate_expr`].

use crate::cnf::MAX_PARTITIONS;
use crate::err::Error;
use crate::validator::types::DataType;

/// The partition-by expression shared by all three partition kinds.
#[derive(Clone, Debug)]
pub struct PartitionExpr {
	pub is_deterministic: bool,
	pub column_count: usize,
	pub data_type: DataType,
}

/// Types admissible as a partition key. Record/array/object partitioning makes no sense for a
/// hash/range/list scheme, so they are excluded even though they are otherwise assignable types.
fn is_admissible_partition_type(ty: &DataType) -> bool {
	matches!(
		ty,
		DataType::Int | DataType::Float | DataType::Decimal | DataType::Number | DataType::String | DataType::Datetime
	)
}

/// spec §4.5: "partition expressions must be deterministic, single-column, and of an admissible
/// type." Shared precondition for `HASH`/`LIST`/`RANGE`.
pub fn validate_expr(expr: &PartitionExpr) -> Result<(), Error> {
	if !expr.is_deterministic {
		return Err(Error::InvalidPartitionExpr("partition expression must be deterministic".into()));
	}
	if expr.column_count != 1 {
		return Err(Error::InvalidPartitionExpr("partition expression must be single-column".into()));
	}
	if !is_admissible_partition_type(&expr.data_type) {
		return Err(Error::InvalidPartitionExpr(format!("'{}' is not an admissible partition type", expr.data_type)));
	}
	Ok(())
}

/// `HASH`: partition count in `[1, MAX_PARTITIONS]` (spec §8 boundary: `MAX_PARTITIONS` accepted,
/// one more is `INVALID_PARTITION_SIZE`).
pub fn validate_hash(count: u32) -> Result<(), Error> {
	if count < 1 || count > *MAX_PARTITIONS {
		return Err(Error::InvalidPartitionSize);
	}
	Ok(())
}

/// `LIST`: each partition carries a set of values (already coerced to the column's data type by
/// the caller); duplicates across partitions are rejected.
pub fn validate_list(partitions: &[Vec<String>]) -> Result<(), Error> {
	let mut seen = std::collections::HashSet::new();
	for values in partitions {
		for v in values {
			if !seen.insert(v.clone()) {
				return Err(Error::PartitionListDuplicate(v.clone()));
			}
		}
	}
	Ok(())
}

/// One `RANGE` partition's declared upper bound. `MAXVALUE` (`high = None`) is only legal on the
/// last partition.
#[derive(Clone, Debug)]
pub struct RangeBound {
	pub partition_name: String,
	/// `None` represents `MAXVALUE`.
	pub high: Option<i128>,
}

/// `RANGE`: per-partition high values must be strictly increasing; `MAXVALUE` only on the last
/// partition (spec §8 scenario 5: `p1 < 10, p2 < 5` → `PARTITION_RANGE_ERROR` on `p2`).
pub fn validate_range(partitions: &[RangeBound]) -> Result<(), Error> {
	for (i, p) in partitions.iter().enumerate() {
		if p.high.is_none() && i + 1 != partitions.len() {
			return Err(Error::PartitionRangeError {
				partition: p.partition_name.clone(),
			});
		}
	}
	for window in partitions.windows(2) {
		let (prev, cur) = (&window[0], &window[1]);
		match (prev.high, cur.high) {
			(Some(a), Some(b)) if a >= b => {
				return Err(Error::PartitionRangeError {
					partition: cur.partition_name.clone(),
				})
			}
			(None, _) => {
				// prev was MAXVALUE but wasn't last -- already rejected above.
			}
			_ => {}
		}
	}
	Ok(())
}

/// Partition kinds admitted by the `PARTITION BY` clause (spec §4.5).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum PartitionKind {
	Hash,
	List,
	Range,
}

/// The specific rules for `ALTER ... PARTITION` sub-commands the spec names: `add`, `drop`,
/// `reorg`, `coalesce`, `promote`. Each is only legal for a subset of partition kinds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum PartitionAlterOp {
	Add,
	Drop,
	Reorg,
	Coalesce,
	Promote,
}

impl PartitionAlterOp {
	/// Which kinds of partitioned class this alter operation is legal against. `ADD`/`DROP` make
	/// sense for `RANGE`/`LIST` (you name the new boundary or value set); `COALESCE` only makes
	/// sense for `HASH` (merging two hash buckets); `REORG` applies to any partitioned class;
	/// `PROMOTE` converts one partition back into a standalone class, legal for any kind.
	pub fn legal_for(self, kind: PartitionKind) -> bool {
		match self {
			PartitionAlterOp::Add | PartitionAlterOp::Drop => matches!(kind, PartitionKind::Range | PartitionKind::List),
			PartitionAlterOp::Coalesce => matches!(kind, PartitionKind::Hash),
			PartitionAlterOp::Reorg | PartitionAlterOp::Promote => true,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hash_partition_count_boundary() {
		assert!(validate_hash(*MAX_PARTITIONS).is_ok());
		assert!(matches!(validate_hash(*MAX_PARTITIONS + 1), Err(Error::InvalidPartitionSize)));
		assert!(matches!(validate_hash(0), Err(Error::InvalidPartitionSize)));
	}

	#[test]
	fn range_must_strictly_increase() {
		let partitions = vec![
			RangeBound {
				partition_name: "p1".into(),
				high: Some(10),
			},
			RangeBound {
				partition_name: "p2".into(),
				high: Some(5),
			},
		];
		let err = validate_range(&partitions).unwrap_err();
		assert_eq!(
			err,
			Error::PartitionRangeError {
				partition: "p2".into()
			}
		);
	}

	#[test]
	fn maxvalue_only_on_last_partition() {
		let partitions = vec![
			RangeBound {
				partition_name: "p1".into(),
				high: None,
			},
			RangeBound {
				partition_name: "p2".into(),
				high: Some(10),
			},
		];
		assert!(validate_range(&partitions).is_err());
	}

	#[test]
	fn list_duplicate_value_across_partitions_is_rejected() {
		let partitions = vec![vec!["a".to_string()], vec!["a".to_string()]];
		assert!(validate_list(&partitions).is_err());
	}

	#[test]
	fn coalesce_is_only_legal_for_hash() {
		assert!(PartitionAlterOp::Coalesce.legal_for(PartitionKind::Hash));
		assert!(!PartitionAlterOp::Coalesce.legal_for(PartitionKind::Range));
	}
}
