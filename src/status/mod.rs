//! Read-side status derivation.
//!
//! Everything here is recomputed from persisted check results on each call;
//! nothing is cached in memory.

mod aggregate;
mod uptime;

pub use aggregate::*;
pub use uptime::*;
