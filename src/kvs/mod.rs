//! A minimal transactional key-value engine standing in for "the catalog's own SQL engine".
//!
//! The authorization core does not own storage or indexing (see spec §1, out of scope); what it
//! does own is the small set of catalog tables enumerated in spec §6 (`_db_auth`, `db_user`,
//! `db_authorization`, …). This module provides just enough of a transactional key space — get,
//! set, put, delete, prefix scan, and nested savepoints — for the Auth Row Gateway (§4.1) and
//! Grant Graph Engine (§4.4) to persist and roll back rows against, mirroring the shape of the
//! teacher's own `kvs::Transaction` without carrying along any of its real storage backends.

pub(crate) mod savepoint;

use crate::err::Error;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};
use tracing::trace;

pub type Key = Vec<u8>;
pub type Val = Vec<u8>;

/// A process-wide, lazily-initialised catalog store.
#[non_exhaustive]
pub struct Datastore {
	map: Arc<RwLock<BTreeMap<Key, Val>>>,
}

impl Datastore {
	/// Open a new, empty catalog store.
	pub async fn new() -> Result<Datastore, Error> {
		Ok(Datastore {
			map: Arc::new(RwLock::new(BTreeMap::new())),
		})
	}

	/// Start a new transaction.
	pub async fn transaction(&self, write: bool) -> Result<Transaction, Error> {
		let guard = if write {
			TxGuard::Write(self.map.clone().write_owned().await, Vec::new())
		} else {
			TxGuard::Read(self.map.clone().read_owned().await)
		};
		Ok(Transaction {
			done: false,
			write,
			guard,
			savepoints: savepoint::SavePoints::default(),
		})
	}
}

enum TxGuard {
	Read(OwnedRwLockReadGuard<BTreeMap<Key, Val>>),
	/// The write guard plus an undo log of `(key, prior value)` in application order, replayed
	/// in reverse on `cancel`.
	Write(OwnedRwLockWriteGuard<BTreeMap<Key, Val>>, Vec<(Key, Option<Val>)>),
}

/// A set of undoable updates and requests against the catalog key space.
#[non_exhaustive]
pub struct Transaction {
	done: bool,
	write: bool,
	guard: TxGuard,
	pub(crate) savepoints: savepoint::SavePoints,
}

impl Transaction {
	pub fn writeable(&self) -> bool {
		self.write
	}

	fn map(&self) -> &BTreeMap<Key, Val> {
		match &self.guard {
			TxGuard::Read(g) => g,
			TxGuard::Write(g, _) => g,
		}
	}

	fn map_mut(&mut self) -> Result<(&mut BTreeMap<Key, Val>, &mut Vec<(Key, Option<Val>)>), Error> {
		match &mut self.guard {
			TxGuard::Write(g, undo) => Ok((g, undo)),
			TxGuard::Read(_) => Err(Error::Generic("transaction is read-only".into())),
		}
	}

	/// Commit this transaction, making its effects visible to future transactions.
	pub async fn commit(&mut self) -> Result<(), Error> {
		if self.done {
			return Err(Error::Generic("transaction already closed".into()));
		}
		self.done = true;
		trace!("committing catalog transaction");
		Ok(())
	}

	/// Cancel this transaction, undoing every write it made.
	pub async fn cancel(&mut self) -> Result<(), Error> {
		if self.done {
			return Ok(());
		}
		self.done = true;
		if let TxGuard::Write(g, undo) = &mut self.guard {
			for (key, prior) in undo.drain(..).rev() {
				match prior {
					Some(v) => {
						g.insert(key, v);
					}
					None => {
						g.remove(&key);
					}
				}
			}
		}
		trace!("cancelled catalog transaction");
		Ok(())
	}

	pub async fn exists(&self, key: &Key) -> Result<bool, Error> {
		Ok(self.map().contains_key(key))
	}

	pub async fn get(&self, key: &Key) -> Result<Option<Val>, Error> {
		Ok(self.map().get(key).cloned())
	}

	/// Insert or update a key.
	pub async fn set(&mut self, key: Key, val: Val) -> Result<(), Error> {
		let prior = self.get(&key).await?;
		let (map, undo) = self.map_mut()?;
		undo.push((key.clone(), prior));
		map.insert(key, val);
		Ok(())
	}

	/// Insert a key only if it does not already exist.
	pub async fn put(&mut self, key: Key, val: Val) -> Result<(), Error> {
		if self.exists(&key).await? {
			return Err(Error::Generic(format!("key already exists")));
		}
		self.set(key, val).await
	}

	pub async fn del(&mut self, key: Key) -> Result<(), Error> {
		let prior = self.get(&key).await?;
		let (map, undo) = self.map_mut()?;
		undo.push((key.clone(), prior));
		map.remove(&key);
		Ok(())
	}

	/// Scan every key with the given prefix, in key order.
	pub async fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Key, Val)>, Error> {
		let start = Bound::Included(prefix.to_vec());
		let mut upper = prefix.to_vec();
		let end = loop {
			match upper.last_mut() {
				Some(b) if *b == u8::MAX => {
					upper.pop();
				}
				Some(b) => {
					*b += 1;
					break Bound::Excluded(upper);
				}
				None => break Bound::Unbounded,
			}
		};
		Ok(self.map().range((start, end)).map(|(k, v)| (k.clone(), v.clone())).collect())
	}
}

impl Drop for Transaction {
	fn drop(&mut self) {
		if !self.done && self.write && !std::thread::panicking() {
			tracing::warn!("a write transaction was dropped without being committed or cancelled");
		}
	}
}
