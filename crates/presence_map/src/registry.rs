//! Point registry: the placed points, reconciled against a target count.
use glam::DVec2;
use tracing::debug;

use crate::sampling::PositionSource;
use crate::scene::{SceneDelta, SceneSink};

/// Identifier of a placed point. Ids start at 1 and are never reused within a registry.
pub type PointId = u64;

/// A placed point in view box coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub id: PointId,
    pub position: DVec2,
}

/// Counts of points changed by one [`PointRegistry::resize`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResizeSummary {
    pub added: usize,
    pub removed: usize,
}

impl ResizeSummary {
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

/// Ordered collection of placed points.
///
/// Growing appends freshly sampled points with increasing ids; shrinking removes the
/// highest ids first. Points that survive a resize keep their positions.
#[derive(Debug, Clone)]
pub struct PointRegistry {
    /// Sorted by ascending id.
    points: Vec<Point>,
    next_id: PointId,
}

impl PointRegistry {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> + '_ {
        self.points.iter()
    }

    pub fn ids(&self) -> Vec<PointId> {
        self.points.iter().map(|p| p.id).collect()
    }

    pub fn get(&self, id: PointId) -> Option<&Point> {
        self.points
            .binary_search_by_key(&id, |p| p.id)
            .ok()
            .map(|i| &self.points[i])
    }

    /// Id the next grown point will receive.
    pub fn next_id(&self) -> PointId {
        self.next_id
    }

    /// Grows or shrinks to exactly `target` points, emitting one delta per change.
    pub fn resize(
        &mut self,
        target: usize,
        source: &mut dyn PositionSource,
        sink: &mut dyn SceneSink,
    ) -> ResizeSummary {
        let current = self.points.len();
        let mut summary = ResizeSummary::default();

        if target > current {
            self.points.reserve(target - current);
            for _ in current..target {
                let point = Point {
                    id: self.next_id,
                    position: source.sample(),
                };
                self.next_id += 1;
                self.points.push(point);
                sink.apply(SceneDelta::PointAdded(point));
                summary.added += 1;
            }
        } else if target < current {
            while self.points.len() > target {
                if let Some(point) = self.points.pop() {
                    sink.apply(SceneDelta::PointRemoved(point.id));
                    summary.removed += 1;
                }
            }
        }

        if !summary.is_noop() {
            debug!(
                from = current,
                to = target,
                added = summary.added,
                removed = summary.removed,
                "registry resized"
            );
        }
        summary
    }
}

impl Default for PointRegistry {
    fn default() -> Self {
        Self::new()
    }
}
