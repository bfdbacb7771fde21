//! Contact estimation root.
//!
//! Momentum observer of external joint efforts, the effort → wrench map
//! and the numeric pieces they share.

pub mod bandwidth;
pub mod integrator;
pub mod observer;
pub mod selector;
pub mod wrench;
