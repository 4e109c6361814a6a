//! The Internal-Query Scope (spec §4.6).
//!
//! Grounded on the teacher's `Options::perms`/`new_with_perms` flag, generalized from a single
//! boolean into a nestable depth counter, since spec §4.6 requires the scope to "nest via
//! save-and-restore" rather than simply toggle a flag.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Process-wide (or per-session, depending on how the caller shares it) switch tracking how many
/// nested internal-query scopes are currently open. Authorization checks consult
/// [`AuthSwitch::is_disabled`] and skip themselves while it is non-zero.
#[derive(Clone, Default)]
#[non_exhaustive]
pub struct AuthSwitch(Arc<AtomicU32>);

impl AuthSwitch {
	pub fn new() -> Self {
		Self(Arc::new(AtomicU32::new(0)))
	}

	pub fn is_disabled(&self) -> bool {
		self.0.load(Ordering::Acquire) > 0
	}

	/// Open a new disabled-authorization scope. Authorization checks are skipped for as long as
	/// the returned guard (or any nested guard opened through the same switch) is alive; the
	/// switch's teardown — re-enabling authorization — is guaranteed on every exit path,
	/// including panics and `?`-propagated errors, because it happens in `Drop`.
	pub fn disable(&self) -> InternalQueryScope {
		self.0.fetch_add(1, Ordering::AcqRel);
		InternalQueryScope {
			switch: self.clone(),
		}
	}
}

/// RAII guard for a single nested disabled-authorization window (spec §4.6).
#[must_use = "the internal-query scope re-enables authorization as soon as this guard is dropped"]
#[non_exhaustive]
pub struct InternalQueryScope {
	switch: AuthSwitch,
}

impl Drop for InternalQueryScope {
	fn drop(&mut self) {
		self.switch.0.fetch_sub(1, Ordering::AcqRel);
	}
}
