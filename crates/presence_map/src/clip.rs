//! Exact render-time clip region derived from the boundary paths.
//!
//! The mask is a finite-resolution approximation and the sampler may fall back to a
//! rejected candidate; the clip region guarantees nothing renders outside the boundary.
use glam::DVec2;
use kurbo::{BezPath, Point, Rect, Shape};

use crate::boundary::{Boundary, FillRule, ViewBox};

#[derive(Debug, Clone)]
struct ClipPath {
    data: String,
    fill_rule: FillRule,
    path: BezPath,
    bounds: Rect,
}

/// Union of the boundary paths, tested with their fill rules.
#[derive(Debug, Clone)]
pub struct ClipRegion {
    view_box: ViewBox,
    paths: Vec<ClipPath>,
}

impl ClipRegion {
    /// Derives the clip region from the same paths used for the mask.
    pub fn install(boundary: &Boundary) -> Self {
        let paths = boundary
            .paths()
            .iter()
            .map(|p| ClipPath {
                data: p.data().to_owned(),
                fill_rule: p.fill_rule(),
                path: p.path().clone(),
                bounds: p.path().bounding_box(),
            })
            .collect();
        Self {
            view_box: *boundary.view_box(),
            paths,
        }
    }

    pub fn view_box(&self) -> &ViewBox {
        &self.view_box
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Returns `true` if `p` is inside any path.
    pub fn contains(&self, p: DVec2) -> bool {
        let pt = Point::new(p.x, p.y);
        self.paths.iter().any(|clip| {
            clip.bounds.contains(pt) && clip.fill_rule.is_inside(clip.path.winding(pt))
        })
    }

    /// Path data and fill rule of each clip path, in boundary order.
    pub fn path_data(&self) -> impl Iterator<Item = (&str, FillRule)> + '_ {
        self.paths.iter().map(|p| (p.data.as_str(), p.fill_rule))
    }
}
