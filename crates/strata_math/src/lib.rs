//! Strata math primitives.
//!
//! Vector arithmetic comes from glam; this crate adds the ray and the
//! closed parameter interval used by intersection queries.

// Re-export glam for convenience
pub use glam::*;

mod interval;
mod ray;

pub use interval::Interval;
pub use ray::Ray;
