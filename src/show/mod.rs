//! The `SHOW` metadata registry (SPEC_FULL.md §6.1, supplemented from original_source's
//! `show_meta.c`).
//!
//! Each `SHOW` command is registered once with a fixed result-set schema, an optional default
//! `ORDER BY`, and a named-argument rule list. The registry is read-only static metadata — not
//! backed by the grant graph, since `SHOW` output is diagnostic rather than a privilege-checked
//! catalog read — so it is a `once_cell::sync::Lazy<HashMap<..>>`, matching the teacher's own
//! process-wide static tables (e.g. `cnf`'s `Lazy` tunables).

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::err::Error;

/// The closed set of `SHOW` commands this registry knows about (SPEC_FULL.md §6.1).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum ShowCommand {
	VolumeHeader,
	ActiveLogHeader,
	ArchiveLogHeader,
	SlottedPageHeader,
	AccessStatus,
	HeapHeader,
	HeapCapacity,
	IndexHeader,
	IndexCapacity,
}

/// A `SHOW` result column's declared name and type label (shape only — this crate does not
/// execute the command, only validates its argument list against the declared schema).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Column {
	pub name: &'static str,
	pub declared_type: &'static str,
}

const fn col(name: &'static str, declared_type: &'static str) -> Column {
	Column {
		name,
		declared_type,
	}
}

/// One named argument a `SHOW` command accepts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArgSpec {
	pub name: &'static str,
	pub value_type: &'static str,
	pub optional: bool,
}

const fn arg(name: &'static str, value_type: &'static str, optional: bool) -> ArgSpec {
	ArgSpec {
		name,
		value_type,
		optional,
	}
}

/// The fixed metadata registered for one `SHOW` command (SPEC_FULL.md §6.1).
#[derive(Clone, Debug)]
pub struct ShowMetadata {
	pub columns: &'static [Column],
	pub default_order_by: &'static [&'static str],
	pub args: &'static [ArgSpec],
	pub administrative_only: bool,
}

macro_rules! columns {
	($($name:expr => $ty:expr),* $(,)?) => {
		&[$(col($name, $ty)),*]
	};
}

macro_rules! args {
	($($name:expr => $ty:expr, $opt:expr);* $(;)?) => {
		&[$(arg($name, $ty, $opt)),*]
	};
}

static VOLUME_HEADER_COLUMNS: &[Column] = columns![
	"Volume_id" => "int",
	"Magic_symbol" => "varchar(100)",
	"Io_page_size" => "short",
	"Purpose" => "varchar(24)",
];

static ACTIVE_LOG_HEADER_COLUMNS: &[Column] = columns![
	"Volume_id" => "int",
	"Magic_symbol" => "varchar(32)",
	"Creation_time" => "datetime",
	"Db_page_size" => "int",
];

static ARCHIVE_LOG_HEADER_COLUMNS: &[Column] = columns![
	"Volume_id" => "int",
	"Magic_symbol" => "varchar(32)",
	"Next_trans_id" => "bigint",
	"Num_pages" => "int",
];

static SLOTTED_PAGE_HEADER_COLUMNS: &[Column] = columns![
	"Volume_id" => "int",
	"Page_id" => "int",
	"Num_slots" => "int",
	"Num_records" => "int",
];

static ACCESS_STATUS_COLUMNS: &[Column] = columns![
	"User_name" => "varchar(64)",
	"Host_name" => "varchar(64)",
	"Process_id" => "int",
	"Connect_time" => "datetime",
];

static HEAP_HEADER_COLUMNS: &[Column] = columns![
	"Class_name" => "varchar(64)",
	"Page_id" => "int",
	"Num_slots" => "int",
];

static HEAP_CAPACITY_COLUMNS: &[Column] = columns![
	"Class_name" => "varchar(64)",
	"Num_pages" => "int",
	"Num_recs" => "int",
];

static INDEX_HEADER_COLUMNS: &[Column] = columns![
	"Index_name" => "varchar(64)",
	"Key_type" => "varchar(32)",
	"Num_keys" => "int",
];

static INDEX_CAPACITY_COLUMNS: &[Column] = columns![
	"Index_name" => "varchar(64)",
	"Num_pages" => "int",
	"Height" => "int",
];

static VOLUME_ARGS: &[ArgSpec] = args!["volume_id" => "int", true];
static LOG_ARGS: &[ArgSpec] = args!["volume_id" => "int", true];
static PAGE_ARGS: &[ArgSpec] = args!["volume_id" => "int", false; "page_id" => "int", false];
static CLASS_ARGS: &[ArgSpec] = args!["class_name" => "string", false];
static INDEX_ARGS: &[ArgSpec] = args!["index_name" => "string", false];
static NO_ARGS: &[ArgSpec] = &[];

static REGISTRY: Lazy<HashMap<ShowCommand, ShowMetadata>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(
		ShowCommand::VolumeHeader,
		ShowMetadata {
			columns: VOLUME_HEADER_COLUMNS,
			default_order_by: &["Volume_id"],
			args: VOLUME_ARGS,
			administrative_only: true,
		},
	);
	m.insert(
		ShowCommand::ActiveLogHeader,
		ShowMetadata {
			columns: ACTIVE_LOG_HEADER_COLUMNS,
			default_order_by: &["Volume_id"],
			args: LOG_ARGS,
			administrative_only: true,
		},
	);
	m.insert(
		ShowCommand::ArchiveLogHeader,
		ShowMetadata {
			columns: ARCHIVE_LOG_HEADER_COLUMNS,
			default_order_by: &["Volume_id"],
			args: LOG_ARGS,
			administrative_only: true,
		},
	);
	m.insert(
		ShowCommand::SlottedPageHeader,
		ShowMetadata {
			columns: SLOTTED_PAGE_HEADER_COLUMNS,
			default_order_by: &[],
			args: PAGE_ARGS,
			administrative_only: true,
		},
	);
	m.insert(
		ShowCommand::AccessStatus,
		ShowMetadata {
			columns: ACCESS_STATUS_COLUMNS,
			default_order_by: &["Connect_time"],
			args: NO_ARGS,
			administrative_only: true,
		},
	);
	m.insert(
		ShowCommand::HeapHeader,
		ShowMetadata {
			columns: HEAP_HEADER_COLUMNS,
			default_order_by: &[],
			args: CLASS_ARGS,
			administrative_only: false,
		},
	);
	m.insert(
		ShowCommand::HeapCapacity,
		ShowMetadata {
			columns: HEAP_CAPACITY_COLUMNS,
			default_order_by: &[],
			args: CLASS_ARGS,
			administrative_only: false,
		},
	);
	m.insert(
		ShowCommand::IndexHeader,
		ShowMetadata {
			columns: INDEX_HEADER_COLUMNS,
			default_order_by: &[],
			args: INDEX_ARGS,
			administrative_only: false,
		},
	);
	m.insert(
		ShowCommand::IndexCapacity,
		ShowMetadata {
			columns: INDEX_CAPACITY_COLUMNS,
			default_order_by: &[],
			args: INDEX_ARGS,
			administrative_only: false,
		},
	);
	m
});

pub fn metadata_for(command: ShowCommand) -> &'static ShowMetadata {
	REGISTRY.get(&command).expect("every ShowCommand variant is registered")
}

/// Parse a `SHOW <name>` command keyword into its [`ShowCommand`], surfacing
/// `Error::UnknownShowCommand` for anything outside the closed set this registry knows.
pub fn command_from_name(name: &str) -> Result<ShowCommand, Error> {
	match name.to_ascii_uppercase().as_str() {
		"VOLUME HEADER" | "VOLUME_HEADER" => Ok(ShowCommand::VolumeHeader),
		"ACTIVE LOG HEADER" | "ACTIVE_LOG_HEADER" => Ok(ShowCommand::ActiveLogHeader),
		"ARCHIVE LOG HEADER" | "ARCHIVE_LOG_HEADER" => Ok(ShowCommand::ArchiveLogHeader),
		"SLOTTED PAGE HEADER" | "SLOTTED_PAGE_HEADER" => Ok(ShowCommand::SlottedPageHeader),
		"ACCESS STATUS" | "ACCESS_STATUS" => Ok(ShowCommand::AccessStatus),
		"HEAP HEADER" | "HEAP_HEADER" => Ok(ShowCommand::HeapHeader),
		"HEAP CAPACITY" | "HEAP_CAPACITY" => Ok(ShowCommand::HeapCapacity),
		"INDEX HEADER" | "INDEX_HEADER" => Ok(ShowCommand::IndexHeader),
		"INDEX CAPACITY" | "INDEX_CAPACITY" => Ok(ShowCommand::IndexCapacity),
		other => Err(Error::UnknownShowCommand(other.to_string())),
	}
}

/// One argument as actually supplied in the `SHOW` statement.
#[derive(Clone, Debug)]
pub struct SuppliedArg {
	pub name: String,
	pub value_type: String,
}

/// SPEC_FULL.md §6.1: argument arity/type checking happens before the command executes.
/// `administrative_only` commands reject non-administrative callers before resolving arguments.
pub fn validate_show_invocation(
	command: ShowCommand,
	is_administrative: bool,
	supplied: &[SuppliedArg],
) -> Result<&'static ShowMetadata, Error> {
	let meta = metadata_for(command);
	if meta.administrative_only && !is_administrative {
		return Err(Error::DbaOnly);
	}
	let required = meta.args.iter().filter(|a| !a.optional).count();
	if supplied.len() < required || supplied.len() > meta.args.len() {
		return Err(Error::ShowArgumentMismatch(format!("{command:?}")));
	}
	for (spec, got) in meta.args.iter().zip(supplied.iter()) {
		if spec.name != got.name || spec.value_type != got.value_type {
			return Err(Error::ShowArgumentMismatch(format!("{command:?}")));
		}
	}
	Ok(meta)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_command_is_registered() {
		for cmd in [
			ShowCommand::VolumeHeader,
			ShowCommand::ActiveLogHeader,
			ShowCommand::ArchiveLogHeader,
			ShowCommand::SlottedPageHeader,
			ShowCommand::AccessStatus,
			ShowCommand::HeapHeader,
			ShowCommand::HeapCapacity,
			ShowCommand::IndexHeader,
			ShowCommand::IndexCapacity,
		] {
			metadata_for(cmd);
		}
	}

	#[test]
	fn administrative_only_command_rejects_non_admin() {
		let err = validate_show_invocation(ShowCommand::AccessStatus, false, &[]).unwrap_err();
		assert_eq!(err, Error::DbaOnly);
	}

	#[test]
	fn wrong_arity_is_rejected() {
		let err = validate_show_invocation(ShowCommand::HeapHeader, false, &[]).unwrap_err();
		assert_eq!(err, Error::ShowArgumentMismatch("HeapHeader".into()));
	}

	#[test]
	fn correct_arguments_are_accepted() {
		let supplied = vec![SuppliedArg {
			name: "class_name".to_string(),
			value_type: "string".to_string(),
		}];
		assert!(validate_show_invocation(ShowCommand::HeapHeader, false, &supplied).is_ok());
	}

	#[test]
	fn unknown_command_name_is_rejected() {
		let err = command_from_name("FROBNICATE").unwrap_err();
		assert_eq!(err, Error::UnknownShowCommand("FROBNICATE".into()));
	}

	#[test]
	fn known_command_name_round_trips() {
		assert_eq!(command_from_name("heap_header").unwrap(), ShowCommand::HeapHeader);
	}
}
