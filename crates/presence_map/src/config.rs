//! Configuration for the visualization and its live channel.
use std::time::Duration;

use crate::error::{Error, Result};

/// Default raster width of the boundary mask in cells.
pub const DEFAULT_MASK_WIDTH: u32 = 900;
/// Lower bound for the derived mask height.
pub const DEFAULT_MIN_MASK_HEIGHT: u32 = 300;
/// Fraction of the view box kept clear on each side when drawing candidates.
pub const DEFAULT_SAFE_INSET: f64 = 0.04;
/// Rejection-sampling attempts before the sampler falls back.
pub const DEFAULT_MAX_PICK_ATTEMPTS: u32 = 5000;
pub const DEFAULT_SEED: u32 = 123_456;
/// Most points kept on the map; larger counts are clamped.
pub const DEFAULT_MAX_POINTS: usize = 10_000;

/// Configuration for building the mask, sampling points and driving updates.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct VizConfig {
    /// Mask raster width in cells.
    pub mask_width: u32,
    /// Minimum mask raster height in cells.
    pub min_mask_height: u32,
    /// Inset fraction applied to each side of the view box when sampling.
    pub safe_inset: f64,
    /// Attempts per sample before returning the last rejected candidate.
    pub max_pick_attempts: u32,
    /// Seed of the point generator.
    pub seed: u32,
    /// Upper bound on placed points regardless of the received count.
    pub max_points: usize,
    /// Radius of rendered points in view box units.
    pub dot_radius: f64,
    /// Interval between generated counts in demo mode.
    pub demo_period: Duration,
    /// Demo mode cycles through `0..demo_cycle`.
    pub demo_cycle: u64,
    /// Upper bound for fetching the boundary asset. `None` waits indefinitely.
    pub load_timeout: Option<Duration>,
    /// Reconnect behavior of the live channel.
    pub reconnect: ReconnectPolicy,
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            mask_width: DEFAULT_MASK_WIDTH,
            min_mask_height: DEFAULT_MIN_MASK_HEIGHT,
            safe_inset: DEFAULT_SAFE_INSET,
            max_pick_attempts: DEFAULT_MAX_PICK_ATTEMPTS,
            seed: DEFAULT_SEED,
            max_points: DEFAULT_MAX_POINTS,
            dot_radius: 6.0,
            demo_period: Duration::from_secs(1),
            demo_cycle: 50,
            load_timeout: Some(Duration::from_secs(30)),
            reconnect: ReconnectPolicy::disabled(),
        }
    }
}

impl VizConfig {
    /// Creates a new [`VizConfig`] with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the mask raster width.
    pub fn with_mask_width(mut self, mask_width: u32) -> Self {
        self.mask_width = mask_width;
        self
    }

    /// Sets the minimum mask raster height.
    pub fn with_min_mask_height(mut self, min_mask_height: u32) -> Self {
        self.min_mask_height = min_mask_height;
        self
    }

    /// Sets the sampling inset fraction.
    pub fn with_safe_inset(mut self, safe_inset: f64) -> Self {
        self.safe_inset = safe_inset;
        self
    }

    /// Sets the number of attempts per sample.
    pub fn with_max_pick_attempts(mut self, max_pick_attempts: u32) -> Self {
        self.max_pick_attempts = max_pick_attempts;
        self
    }

    /// Sets the generator seed.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the point limit.
    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        self
    }

    /// Sets the rendered point radius.
    pub fn with_dot_radius(mut self, dot_radius: f64) -> Self {
        self.dot_radius = dot_radius;
        self
    }

    /// Sets the demo mode tick period.
    pub fn with_demo_period(mut self, demo_period: Duration) -> Self {
        self.demo_period = demo_period;
        self
    }

    /// Sets the length of the demo count cycle.
    pub fn with_demo_cycle(mut self, demo_cycle: u64) -> Self {
        self.demo_cycle = demo_cycle;
        self
    }

    /// Sets the boundary load timeout.
    pub fn with_load_timeout(mut self, load_timeout: Option<Duration>) -> Self {
        self.load_timeout = load_timeout;
        self
    }

    /// Sets the live channel reconnect policy.
    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.mask_width == 0 {
            return Err(Error::InvalidConfig("mask_width must be > 0".into()));
        }
        if !(0.0..0.5).contains(&self.safe_inset) {
            return Err(Error::InvalidConfig(
                "safe_inset must be in [0, 0.5)".into(),
            ));
        }
        if self.max_pick_attempts == 0 {
            return Err(Error::InvalidConfig("max_pick_attempts must be > 0".into()));
        }
        if self.max_points == 0 {
            return Err(Error::InvalidConfig("max_points must be > 0".into()));
        }
        if !self.dot_radius.is_finite() || self.dot_radius <= 0.0 {
            return Err(Error::InvalidConfig("dot_radius must be > 0".into()));
        }
        if self.demo_period.is_zero() {
            return Err(Error::InvalidConfig("demo_period must be > 0".into()));
        }
        if self.demo_cycle == 0 {
            return Err(Error::InvalidConfig("demo_cycle must be > 0".into()));
        }
        self.reconnect.validate()
    }
}

/// Retry behavior after the live channel disconnects or fails.
///
/// The default performs no retries: `Disconnected` and `Error` end the session.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    /// Number of reconnect attempts after the first session ends.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound for any single delay.
    pub max_backoff: Duration,
    /// Growth factor applied per retry.
    pub multiplier: f64,
}

impl ReconnectPolicy {
    /// A policy that never reconnects.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }

    /// Exponential backoff starting at 500ms, doubling up to 30s.
    pub fn exponential(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::disabled()
        }
    }

    pub fn with_initial_backoff(mut self, initial_backoff: Duration) -> Self {
        self.initial_backoff = initial_backoff;
        self
    }

    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.max_retries > 0
    }

    /// Delay before retry number `retry` (zero-based), capped at `max_backoff`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = self.multiplier.powi(retry.min(i32::MAX as u32) as i32);
        let secs = self.initial_backoff.as_secs_f64() * factor;
        if !secs.is_finite() || secs >= self.max_backoff.as_secs_f64() {
            return self.max_backoff;
        }
        Duration::from_secs_f64(secs)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(Error::InvalidConfig(
                "reconnect multiplier must be >= 1".into(),
            ));
        }
        if self.initial_backoff > self.max_backoff {
            return Err(Error::InvalidConfig(
                "reconnect initial_backoff must not exceed max_backoff".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}
