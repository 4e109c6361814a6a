//! The authorization core of a relational database: the grant graph engine, the auth record
//! catalog gateway, and the authorization-adjacent portion of the DDL/DML semantic validator.
//!
//! See `SPEC_FULL.md` for the full specification this crate implements; `DESIGN.md` for the
//! grounding ledger tying each module back to its source of imitation.

mod mac;

pub mod catalog;
pub mod cnf;
pub mod dbs;
pub mod engine;
pub mod err;
pub mod grant;
pub mod iam;
pub mod kvs;
pub mod show;
pub mod validator;

pub use engine::AuthorizationCore;
pub use err::Error;
