//! The Auth Row Gateway (spec §4.1) and its catalog row shape and internal-query scope.

pub mod gateway;
pub mod row;
pub mod scope;

pub use gateway::Gateway;
pub use row::AuthCatalogRow;
pub use scope::{AuthSwitch, InternalQueryScope};
