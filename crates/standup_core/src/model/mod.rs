//! Domain model for standup check-ins.
//!
//! # Responsibility
//! - Define canonical records shared by stores, services and statistics.
//! - Keep timestamps as Unix epoch milliseconds (UTC) across the crate.
//!
//! # Invariants
//! - Every record is identified by a positive numeric id assigned by storage.
//! - A priority belongs to exactly one user and is never reassigned.

pub mod category;
pub mod check_in;
pub mod priority;
pub mod user;
