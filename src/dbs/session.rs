//! The current session's identity (spec §3 "Principal", grounded on the teacher's `dbs::Session`).

use crate::iam::Auth;
use std::sync::Arc;

/// Identifies the principal a connection is authenticated as. Trimmed down from the teacher's
/// `Session` (no namespace/database/scope/live-query fields: this crate has no notion of those)
/// to just the identity the authorization core needs.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct Session {
	pub au: Arc<Auth>,
}

impl Session {
	pub fn for_principal(name: &str, administrative: bool) -> Session {
		Session {
			au: Arc::new(Auth::new(name, administrative)),
		}
	}

	pub fn system() -> Session {
		Session {
			au: Arc::new(Auth::system()),
		}
	}
}
