//! Text scanning over comment bodies.
//!
//! # Responsibility
//! - Extract structured tokens (mentions) from free-form comment text.
//!
//! # Invariants
//! - Scanning is pure: no storage or directory access.

pub mod mention;
