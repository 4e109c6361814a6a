//! Assignment/insert compatibility (spec §4.5 "Assignment/insert compatibility").

use crate::err::Error;
use crate::validator::types::DataType;

/// One left-hand-side target of an assignment (`a = ...` or `(a, b) = ...`).
#[derive(Clone, Debug)]
pub struct AssignmentTarget {
	pub name: String,
	pub data_type: DataType,
}

/// The outcome of checking a single `(lhs, rhs)` pair: whether an implicit cast must wrap the
/// right-hand side, and to which type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AssignmentCast {
	None,
	Implicit(DataType),
}

/// spec §4.5: each assignment's RHS is (a) checked for class-assignability when the LHS is an
/// object-typed (record) attribute, and (b) wrapped in an implicit `CAST` to the LHS's type
/// otherwise. Multi-column assignments require the RHS arity to match (spec §8 scenario 6).
pub fn validate_assignment(lhs: &[AssignmentTarget], rhs_types: &[DataType]) -> Result<Vec<AssignmentCast>, Error> {
	if lhs.len() != rhs_types.len() {
		return Err(Error::IllegalLhs);
	}
	let mut out = Vec::with_capacity(lhs.len());
	for (target, rhs) in lhs.iter().zip(rhs_types.iter()) {
		if target.data_type.is_record() {
			if !rhs.assignable_to(&target.data_type) {
				return Err(Error::NotAssignable(format!("'{}' is not assignable to '{}'", rhs, target.data_type)));
			}
			out.push(AssignmentCast::None);
			continue;
		}
		if rhs == &target.data_type {
			out.push(AssignmentCast::None);
		} else if rhs.assignable_to(&target.data_type) {
			out.push(AssignmentCast::Implicit(target.data_type.clone()));
		} else {
			return Err(Error::NotAssignable(format!("'{}' is not assignable to '{}'", rhs, target.data_type)));
		}
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn target(name: &str, ty: DataType) -> AssignmentTarget {
		AssignmentTarget {
			name: name.to_string(),
			data_type: ty,
		}
	}

	#[test]
	fn matching_arity_with_exact_types_needs_no_cast() {
		// (a, b) = (SELECT 1, 2 FROM dual) against a INT, b INT -- spec §8 scenario 6.
		let lhs = vec![target("a", DataType::Int), target("b", DataType::Int)];
		let rhs = vec![DataType::Int, DataType::Int];
		let casts = validate_assignment(&lhs, &rhs).unwrap();
		assert_eq!(casts, vec![AssignmentCast::None, AssignmentCast::None]);
	}

	#[test]
	fn arity_mismatch_is_illegal_lhs() {
		let lhs = vec![target("a", DataType::Int), target("b", DataType::Int)];
		let rhs = vec![DataType::Int, DataType::Int, DataType::Int];
		assert_eq!(validate_assignment(&lhs, &rhs).unwrap_err(), Error::IllegalLhs);
	}

	#[test]
	fn numeric_widening_inserts_an_implicit_cast() {
		let lhs = vec![target("a", DataType::Float)];
		let rhs = vec![DataType::Int];
		let casts = validate_assignment(&lhs, &rhs).unwrap();
		assert_eq!(casts, vec![AssignmentCast::Implicit(DataType::Float)]);
	}

	#[test]
	fn record_typed_lhs_requires_class_assignability() {
		let lhs = vec![target("a", DataType::Record("person".into()))];
		let rhs = vec![DataType::Record("animal".into())];
		assert!(validate_assignment(&lhs, &rhs).is_err());
	}
}
