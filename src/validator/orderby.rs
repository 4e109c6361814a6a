//! `ORDER BY` validation (spec §4.5 "Order-by validation").

use crate::err::Error;

/// One item of an `ORDER BY` clause, as submitted by the caller before resolution.
#[derive(Clone, Debug)]
pub enum OrderItem {
	/// An integer literal position (`ORDER BY 2`).
	Position(i64),
	/// A name or expression matched against the select list by label.
	Named(String),
}

/// Context the order-by validator needs about the statement it is attached to.
#[derive(Clone, Debug, Default)]
pub struct OrderByContext {
	pub select_list_labels: Vec<String>,
	/// Set operations (`UNION`/etc.) and `SELECT DISTINCT` require every order item to already
	/// exist in the select list; a plain `SELECT` may append a hidden column instead.
	pub requires_exact_match: bool,
	pub has_order_by: bool,
	/// Whether the select list itself calls `ORDERBY_NUM()`.
	pub select_list_has_orderby_num: bool,
}

/// The resolved outcome for a single order item: either a 1-based position already in the select
/// list, or a position appended as a hidden column.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResolvedOrder {
	ExistingPosition(usize),
	AppendedHiddenColumn,
}

/// spec §4.5: integer literals refer to positions (`1 ≤ n ≤ select_list_length`); name/expression
/// items are matched against the select list, and if not found either an error is raised (set
/// operations, `SELECT DISTINCT`) or a hidden column is appended. `ORDERBY_NUM()` is permitted in
/// the select list only when an `ORDER BY` clause exists.
pub fn validate_order_by(items: &[OrderItem], ctx: &OrderByContext) -> Result<Vec<ResolvedOrder>, Error> {
	if ctx.select_list_has_orderby_num && !ctx.has_order_by {
		return Err(Error::SortSpecRangeErr(0));
	}
	let mut out = Vec::with_capacity(items.len());
	for item in items {
		match item {
			OrderItem::Position(n) => {
				if *n < 1 || *n as usize > ctx.select_list_labels.len() {
					return Err(Error::SortSpecRangeErr(*n));
				}
				out.push(ResolvedOrder::ExistingPosition(*n as usize));
			}
			OrderItem::Named(name) => {
				if let Some(pos) = ctx.select_list_labels.iter().position(|l| l == name) {
					out.push(ResolvedOrder::ExistingPosition(pos + 1));
				} else if ctx.requires_exact_match {
					return Err(Error::SortSpecRangeErr(0));
				} else {
					out.push(ResolvedOrder::AppendedHiddenColumn);
				}
			}
		}
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ctx(labels: &[&str]) -> OrderByContext {
		OrderByContext {
			select_list_labels: labels.iter().map(|s| s.to_string()).collect(),
			requires_exact_match: false,
			has_order_by: true,
			select_list_has_orderby_num: false,
		}
	}

	#[test]
	fn position_zero_is_out_of_range() {
		let c = ctx(&["a", "b"]);
		let err = validate_order_by(&[OrderItem::Position(0)], &c).unwrap_err();
		assert_eq!(err, Error::SortSpecRangeErr(0));
	}

	#[test]
	fn position_past_select_list_length_is_out_of_range() {
		let c = ctx(&["a", "b"]);
		let err = validate_order_by(&[OrderItem::Position(3)], &c).unwrap_err();
		assert_eq!(err, Error::SortSpecRangeErr(3));
	}

	#[test]
	fn unresolved_name_appends_hidden_column_for_plain_select() {
		let c = ctx(&["a", "b"]);
		let resolved = validate_order_by(&[OrderItem::Named("c".into())], &c).unwrap();
		assert_eq!(resolved, vec![ResolvedOrder::AppendedHiddenColumn]);
	}

	#[test]
	fn unresolved_name_errors_under_set_operation() {
		let mut c = ctx(&["a", "b"]);
		c.requires_exact_match = true;
		assert!(validate_order_by(&[OrderItem::Named("c".into())], &c).is_err());
	}

	#[test]
	fn orderby_num_without_order_by_clause_is_rejected() {
		let mut c = ctx(&["a"]);
		c.has_order_by = false;
		c.select_list_has_orderby_num = true;
		assert!(validate_order_by(&[], &c).is_err());
	}
}
