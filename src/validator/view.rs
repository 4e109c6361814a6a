//! View/alter semantics (spec §4.5 "View/alter semantics"): column-count matching,
//! union-compatibility against the declared attribute types, disallowed constructs, and cyclic
//! view reference detection.

use std::collections::HashSet;

use crate::err::Error;
use crate::validator::compat::{reconcile, Arm};
use crate::validator::types::DataType;

/// A single column of a view's select list, as seen by the validator: its inferred type plus the
/// three disallowed-construct flags the spec calls out by name.
#[derive(Clone, Debug)]
pub struct SelectColumn {
	pub data_type: DataType,
	pub is_host_variable: bool,
	pub is_into_target: bool,
	pub is_non_deterministic: bool,
}

impl SelectColumn {
	pub fn new(data_type: DataType) -> Self {
		Self {
			data_type,
			is_host_variable: false,
			is_into_target: false,
			is_non_deterministic: false,
		}
	}
}

/// A parsed view query specification, as much of it as the validator needs.
#[derive(Clone, Debug, Default)]
pub struct ViewSpec {
	pub select_list: Vec<SelectColumn>,
	/// Names of every view directly referenced by this spec's `FROM` clause (recursed into by
	/// [`detect_cycle`]).
	pub referenced_views: Vec<String>,
}

/// spec §4.5 (a)-(c): column counts must match, each attribute must be union-compatible with its
/// select-list column (inserting an implicit cast where needed), and the spec may not contain a
/// host variable, `INTO`, or a non-deterministic construct.
pub fn validate_view_spec(view_name: &str, declared: &[DataType], spec: &ViewSpec) -> Result<Vec<Option<DataType>>, Error> {
	if declared.len() != spec.select_list.len() {
		return Err(Error::ViewColumnCountMismatch(view_name.to_string()));
	}
	for col in &spec.select_list {
		if col.is_host_variable || col.is_into_target || col.is_non_deterministic {
			return Err(Error::ViewSpecNotDeterministic(view_name.to_string()));
		}
	}
	let mut casts = Vec::with_capacity(declared.len());
	for (attr_type, col) in declared.iter().zip(spec.select_list.iter()) {
		let attr_arm = Arm::new(attr_type.clone(), crate::validator::types::Coercibility::Implicit);
		let col_arm = Arm::new(col.data_type.clone(), crate::validator::types::Coercibility::Coercible);
		match reconcile(&attr_arm, &col_arm, view_name)? {
			crate::validator::compat::CastSide::None => casts.push(None),
			crate::validator::compat::CastSide::Right(ty) | crate::validator::compat::CastSide::Left(ty) => {
				casts.push(Some(ty))
			}
		}
	}
	Ok(casts)
}

/// spec §4.5 (d): "detect cyclic view references by recursively parsing and walking each
/// referenced view's spec." `lookup` resolves a view name to its already-parsed [`ViewSpec`]
/// (stubbed here since parsing is out of scope, spec §1); the walk itself, and the cycle
/// detection, are this module's concern.
pub fn detect_cycle(
	view_name: &str,
	spec: &ViewSpec,
	lookup: &impl Fn(&str) -> Option<ViewSpec>,
) -> Result<(), Error> {
	let mut visiting = HashSet::new();
	walk(view_name, spec, lookup, &mut visiting)
}

fn walk(
	name: &str,
	spec: &ViewSpec,
	lookup: &impl Fn(&str) -> Option<ViewSpec>,
	visiting: &mut HashSet<String>,
) -> Result<(), Error> {
	if !visiting.insert(name.to_string()) {
		return Err(Error::CyclicReferenceViewSpec(name.to_string()));
	}
	for referenced in &spec.referenced_views {
		if let Some(referenced_spec) = lookup(referenced) {
			walk(referenced, &referenced_spec, lookup, visiting)?;
		}
	}
	visiting.remove(name);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn column_count_mismatch_is_rejected() {
		let spec = ViewSpec {
			select_list: vec![SelectColumn::new(DataType::Int)],
			referenced_views: Vec::new(),
		};
		let err = validate_view_spec("v", &[DataType::Int, DataType::String], &spec).unwrap_err();
		assert_eq!(err, Error::ViewColumnCountMismatch("v".into()));
	}

	#[test]
	fn host_variable_is_rejected() {
		let mut col = SelectColumn::new(DataType::Int);
		col.is_host_variable = true;
		let spec = ViewSpec {
			select_list: vec![col],
			referenced_views: Vec::new(),
		};
		assert!(validate_view_spec("v", &[DataType::Int], &spec).is_err());
	}

	#[test]
	fn direct_self_reference_is_cyclic() {
		let spec = ViewSpec {
			select_list: vec![],
			referenced_views: vec!["V".to_string()],
		};
		let lookup = |name: &str| if name == "V" { Some(spec.clone()) } else { None };
		let err = detect_cycle("V", &spec, &lookup).unwrap_err();
		assert_eq!(err, Error::CyclicReferenceViewSpec("V".into()));
	}

	#[test]
	fn indirect_cycle_through_another_view_is_detected() {
		// V -> T -> V (scenario 4 in spec §8).
		let v_spec = ViewSpec {
			select_list: vec![SelectColumn::new(DataType::Int), SelectColumn::new(DataType::Int)],
			referenced_views: vec!["T".to_string()],
		};
		let t_spec = ViewSpec {
			select_list: vec![],
			referenced_views: vec!["V".to_string()],
		};
		let lookup = move |name: &str| match name {
			"T" => Some(t_spec.clone()),
			"V" => Some(v_spec.clone()),
			_ => None,
		};
		let err = detect_cycle("V", &v_spec, &lookup).unwrap_err();
		assert!(matches!(err, Error::CyclicReferenceViewSpec(_)));
	}
}
