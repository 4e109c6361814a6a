//! Process-wide tunables for the authorization core.
//!
//! Mirrors the teacher's `cnf` module: constants are `const` where the value can never
//! meaningfully change at runtime, and `Lazy<T>` where an operator may want to override the
//! default via an environment variable without recompiling.

use crate::mac::lazy_env_parse;
use once_cell::sync::Lazy;

/// Maximum length, in bytes, of a principal name. One more than this is `USER_NAME_TOO_LONG`.
pub static MAX_USER_NAME_LENGTH: Lazy<usize> =
	lazy_env_parse!("AUTHGRAPH_MAX_USER_NAME_LENGTH", usize, 64);

/// Maximum length, in bytes, of a principal comment.
pub static MAX_COMMENT_LENGTH: Lazy<usize> =
	lazy_env_parse!("AUTHGRAPH_MAX_COMMENT_LENGTH", usize, 1024);

/// Maximum number of partitions a `HASH` partitioned class may declare. One more than this is
/// `INVALID_PARTITION_SIZE`.
pub static MAX_PARTITIONS: Lazy<u32> = lazy_env_parse!("AUTHGRAPH_MAX_PARTITIONS", u32, 1024);

/// Bit position at which the grant-option sub-mask starts inside a packed cache-bits word.
/// The low `GRANT_OPTION_SHIFT` bits are the granted-privilege mask; the same bits shifted left
/// by this amount are the corresponding grant-option mask.
pub const GRANT_OPTION_SHIFT: u32 = 16;

/// The name reserved for the administrative principal.
pub const DBA_NAME: &str = "DBA";

/// The name reserved for the universal principal that every other principal transitively joins.
pub const PUBLIC_NAME: &str = "PUBLIC";
