//! Store services: the use-case entry points consumed by presentation code.
//!
//! # Responsibility
//! - Orchestrate repository calls into user, priority and check-in use-cases.
//! - Own the clock; repositories never read the current time.
//!
//! # See also
//! - `crate::stats` for the aggregation rules behind the stats use-cases.

pub mod check_in_service;
pub mod priority_service;
pub mod user_service;
