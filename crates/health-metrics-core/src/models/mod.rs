//! Domain models for the health-metrics system.

mod record;

pub use record::*;
