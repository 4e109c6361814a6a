//! Function/filter index validation (spec §4.5 "Function/filter index validation").

use crate::err::Error;

/// The closed allow-list of operators and functions a function-index expression may be composed
/// from. Mirrors the teacher's `Function::is_deterministic` allow-list style (grounded on
/// `sql::function.rs`'s hardcoded per-name determinism table) rather than inferring it generically.
const ALLOWED_FUNCTIONS: &[&str] = &[
	"upper", "lower", "abs", "ceil", "floor", "round", "trim", "length", "concat", "substring", "+", "-", "*", "/",
];

/// A parsed function-index expression: the (at most one) column it projects, the functions/
/// operators it is composed from, and whether it is deterministic.
#[derive(Clone, Debug, Default)]
pub struct FunctionIndexExpr {
	pub expression_columns: usize,
	pub is_deterministic: bool,
	pub functions_used: Vec<String>,
}

/// spec §4.5: "a function index admits at most one expression column; the expression must be
/// deterministic and composed from a closed allow-list of operators and functions."
pub fn validate_function_index(expr: &FunctionIndexExpr) -> Result<(), Error> {
	if expr.expression_columns > 1 {
		return Err(Error::InvalidFunctionIndex("at most one expression column is permitted".into()));
	}
	if !expr.is_deterministic {
		return Err(Error::InvalidFunctionIndex("expression must be deterministic".into()));
	}
	for f in &expr.functions_used {
		if !ALLOWED_FUNCTIONS.contains(&f.to_ascii_lowercase().as_str()) {
			return Err(Error::InvalidFunctionIndex(format!("'{f}' is not on the allowed function list")));
		}
	}
	Ok(())
}

/// One column participating in a filter index's predicate: whether it carries a `NOT NULL`
/// constraint, and whether the predicate's only reference to it is through an `IS NULL` test
/// matching the predicate's own sense (i.e. the predicate can never select rows through this
/// column without also passing through a null check that defeats the index).
#[derive(Clone, Debug)]
pub struct FilterIndexColumn {
	pub name: String,
	pub not_null: bool,
	pub only_referenced_via_is_null: bool,
}

/// spec §4.5: "filter indexes require that the predicate reference at least one indexed column
/// that is not covered by an `IS NULL` (or its negation) against the predicate's sense, unless the
/// column has a `NOT NULL` constraint."
pub fn validate_filter_index(columns: &[FilterIndexColumn]) -> Result<(), Error> {
	let has_usable_column = columns.iter().any(|c| c.not_null || !c.only_referenced_via_is_null);
	if !has_usable_column {
		return Err(Error::InvalidFilterIndex(
			"predicate does not reference any indexed column outside of an IS NULL test".into(),
		));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn function_index_rejects_multiple_expression_columns() {
		let expr = FunctionIndexExpr {
			expression_columns: 2,
			is_deterministic: true,
			functions_used: vec!["upper".into()],
		};
		assert!(validate_function_index(&expr).is_err());
	}

	#[test]
	fn function_index_rejects_disallowed_function() {
		let expr = FunctionIndexExpr {
			expression_columns: 1,
			is_deterministic: true,
			functions_used: vec!["rand".into()],
		};
		assert!(validate_function_index(&expr).is_err());
	}

	#[test]
	fn function_index_accepts_allow_listed_expression() {
		let expr = FunctionIndexExpr {
			expression_columns: 1,
			is_deterministic: true,
			functions_used: vec!["UPPER".into()],
		};
		assert!(validate_function_index(&expr).is_ok());
	}

	#[test]
	fn filter_index_requires_a_usable_column() {
		let columns = vec![FilterIndexColumn {
			name: "a".into(),
			not_null: false,
			only_referenced_via_is_null: true,
		}];
		assert!(validate_filter_index(&columns).is_err());
	}

	#[test]
	fn filter_index_not_null_column_is_usable_even_under_is_null() {
		let columns = vec![FilterIndexColumn {
			name: "a".into(),
			not_null: true,
			only_referenced_via_is_null: true,
		}];
		assert!(validate_filter_index(&columns).is_ok());
	}
}
