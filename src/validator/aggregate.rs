//! Aggregate/analytic correctness (spec §4.5 "Aggregate/analytic correctness").

use std::collections::HashSet;

use crate::err::Error;

/// One attribute reference appearing outside an aggregate function call.
#[derive(Clone, Debug)]
pub struct NonAggregateRef {
	pub name: String,
}

/// spec §4.5: "outside aggregates, every referenced non-group attribute must appear in
/// `GROUP BY`."
pub fn validate_group_by(refs: &[NonAggregateRef], group_by: &[String]) -> Result<(), Error> {
	let group_set: HashSet<&String> = group_by.iter().collect();
	for r in refs {
		if !group_set.contains(&r.name) {
			return Err(Error::Generic(format!(
				"'{}' must appear in the GROUP BY clause or be used in an aggregate function",
				r.name
			)));
		}
	}
	Ok(())
}

/// The hierarchical/positional pseudo-columns the spec names by name, and the statement context
/// each one is legal in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum PseudoColumn {
	InstNum,
	RowNum,
	Level,
	ConnectByIsLeaf,
	ConnectByIsCycle,
}

/// Which statement features must be present for a given pseudo-column reference to be legal
/// (spec §4.5: "permitted only where their semantics are defined").
#[derive(Clone, Copy, Debug, Default)]
pub struct PseudoColumnContext {
	pub has_connect_by: bool,
	pub has_instantiable_scan: bool,
}

pub fn validate_pseudo_column(col: PseudoColumn, ctx: &PseudoColumnContext) -> Result<(), Error> {
	let ok = match col {
		PseudoColumn::InstNum => ctx.has_instantiable_scan,
		PseudoColumn::RowNum => true,
		PseudoColumn::Level | PseudoColumn::ConnectByIsLeaf | PseudoColumn::ConnectByIsCycle => ctx.has_connect_by,
	};
	if ok {
		Ok(())
	} else {
		Err(Error::Generic(format!("{col:?} is not valid in this statement context")))
	}
}

/// An analytic (window) function's `PARTITION BY`/`ORDER BY` item, before de-duplication and
/// integer-position resolution against the select list.
#[derive(Clone, Debug)]
pub enum WindowItem {
	Position(usize),
	Named(String),
}

/// spec §4.5: "analytic-function window `PARTITION BY`/`ORDER BY` lists are de-duplicated,
/// integer-position resolved against the select list, and collation-normalized." Returns the
/// resolved, de-duplicated list of select-list positions (1-based).
pub fn resolve_window_list(items: &[WindowItem], select_list_labels: &[String]) -> Result<Vec<usize>, Error> {
	let mut seen = HashSet::new();
	let mut out = Vec::new();
	for item in items {
		let pos = match item {
			WindowItem::Position(p) => {
				if *p < 1 || *p > select_list_labels.len() {
					return Err(Error::SortSpecRangeErr(*p as i64));
				}
				*p
			}
			WindowItem::Named(name) => select_list_labels
				.iter()
				.position(|l| l.eq_ignore_ascii_case(name))
				.map(|p| p + 1)
				.ok_or_else(|| Error::Generic(format!("'{name}' does not appear in the select list")))?,
		};
		if seen.insert(pos) {
			out.push(pos);
		}
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn non_group_attribute_outside_aggregate_is_rejected() {
		let refs = vec![NonAggregateRef {
			name: "b".into(),
		}];
		assert!(validate_group_by(&refs, &["a".to_string()]).is_err());
	}

	#[test]
	fn group_by_member_is_accepted() {
		let refs = vec![NonAggregateRef {
			name: "a".into(),
		}];
		assert!(validate_group_by(&refs, &["a".to_string()]).is_ok());
	}

	#[test]
	fn level_requires_connect_by() {
		let ctx = PseudoColumnContext::default();
		assert!(validate_pseudo_column(PseudoColumn::Level, &ctx).is_err());
	}

	#[test]
	fn window_list_deduplicates_and_resolves_positions() {
		let labels = vec!["a".to_string(), "b".to_string()];
		let items = vec![WindowItem::Named("a".into()), WindowItem::Position(1), WindowItem::Position(2)];
		let resolved = resolve_window_list(&items, &labels).unwrap();
		assert_eq!(resolved, vec![1, 2]);
	}
}
