//! Database layer - connection pool, schema and repositories
//!
//! # Design Principles
//!
//! - Connection pool (max 5 connections by default)
//! - List operations aggregate links in SQL - no N+1 queries
//! - Rely on DB constraints, translate violations - no check-then-insert
//! - Transactions for multi-step operations

pub mod constraints;
pub mod error;
pub mod pool;
pub mod repos;
pub mod schema;

pub use constraints::Constraint;
pub use error::DbError;
pub use pool::{create_pool, create_pool_with_options};
pub use sqlx::PgPool;
pub use repos::*;
