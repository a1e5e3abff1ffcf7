//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Borrows the pool, one short-lived repo per operation
//! - Returns `Option` for lookups; absence is not an error
//! - Multi-step writes go through a caller-owned transaction

pub mod drills;
pub mod tags;

pub use drills::{DrillRepo, DrillWriter, PgDrillWriter};
pub use tags::{Tag, TagRepo};
