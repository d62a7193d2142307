//! # backsort-host
//!
//! Glue between the ordering engine and whatever presents backlinks.
//!
//! The engine in `backsort-core` only computes permutations. A host wires
//! it to a presentation area through [`PresentationSurface`] and drives it
//! with a [`Reorderer`], which decides when a change notification actually
//! warrants a new ordering pass.

pub mod reorder;
pub mod surface;

pub use reorder::{Outcome, Reorderer, SkipReason};
pub use surface::{PresentationSurface, VecSurface};
