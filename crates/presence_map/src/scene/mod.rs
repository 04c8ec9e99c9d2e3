//! Scene deltas and sinks for rendering backends.
//!
//! Core components never touch a renderer directly. They emit [`SceneDelta`]s into a
//! [`SceneSink`]; a backend (SVG document, canvas, headless recorder) applies them.
use crate::clip::ClipRegion;
use crate::registry::{Point, PointId};
use crate::status::Status;

pub mod svg;

pub use svg::SvgScene;

/// Incremental change to the rendered scene.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum SceneDelta {
    /// Clip region applied to the container holding all points.
    ClipInstalled(ClipRegion),
    PointAdded(Point),
    PointRemoved(PointId),
    StatusChanged(Status),
    /// Latest count, rendered as plain text.
    CountChanged(u64),
}

/// A generic sink that accepts [`SceneDelta`]s.
pub trait SceneSink {
    fn apply(&mut self, delta: SceneDelta);
}

/// A no-op scene sink.
impl SceneSink for () {
    #[inline]
    fn apply(&mut self, _delta: SceneDelta) {}
}

impl<S: SceneSink + ?Sized> SceneSink for &mut S {
    #[inline]
    fn apply(&mut self, delta: SceneDelta) {
        (**self).apply(delta);
    }
}

/// A scene sink that records every delta, used as a headless renderer.
#[derive(Default)]
pub struct VecSink {
    deltas: Vec<SceneDelta>,
}

impl VecSink {
    pub fn new() -> Self {
        Self { deltas: Vec::new() }
    }

    pub fn into_inner(self) -> Vec<SceneDelta> {
        self.deltas
    }

    pub fn as_slice(&self) -> &[SceneDelta] {
        &self.deltas
    }

    pub fn clear(&mut self) {
        self.deltas.clear();
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// All status changes in order.
    pub fn statuses(&self) -> Vec<Status> {
        self.deltas
            .iter()
            .filter_map(|d| match d {
                SceneDelta::StatusChanged(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    /// All rendered counts in order.
    pub fn counts(&self) -> Vec<u64> {
        self.deltas
            .iter()
            .filter_map(|d| match d {
                SceneDelta::CountChanged(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    /// Number of points alive after replaying all add/remove deltas.
    pub fn live_points(&self) -> usize {
        self.deltas.iter().fold(0usize, |n, d| match d {
            SceneDelta::PointAdded(_) => n + 1,
            SceneDelta::PointRemoved(_) => n.saturating_sub(1),
            _ => n,
        })
    }
}

impl SceneSink for VecSink {
    #[inline]
    fn apply(&mut self, delta: SceneDelta) {
        self.deltas.push(delta);
    }
}
