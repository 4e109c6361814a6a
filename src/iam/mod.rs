//! Identity, membership, and the privilege cache (spec §3, §4.2, §4.3).

pub mod auth;
pub mod cache;
pub mod check;
pub mod directory;
pub mod object;
pub mod principal;
pub mod privilege;

pub use auth::Auth;
pub use cache::PrivilegeCache;
pub use directory::Directory;
pub use object::{AuthorizationObject, GrantEntry};
pub use principal::{CacheIndex, Principal};
pub use privilege::{all_mask, CacheBits, ObjectKind, ObjectRef, PrivilegeKind, ALL_KINDS};
