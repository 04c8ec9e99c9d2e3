//! Deterministic point sampling inside the boundary mask.
//!
//! This module defines the [`PositionSource`] seam used by the point registry, the
//! [`Mulberry32`] generator and the rejection sampler [`MaskSampler`].
use glam::DVec2;
use rand::RngCore;

pub mod mask_sampler;
pub mod mulberry32;

pub use mask_sampler::{MaskSampler, Sample};
pub use mulberry32::Mulberry32;

/// Trait for producers of point positions in view box coordinates.
pub trait PositionSource {
    fn sample(&mut self) -> DVec2;
}

/// Generate a random float in the range [0, 1).
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f64 {
    rng.next_u32() as f64 / 4_294_967_296.0
}
