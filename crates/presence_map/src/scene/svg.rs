//! SVG document backend: keeps the scene state and serializes it on demand.
use std::collections::BTreeMap;
use std::fmt::Write as _;

use glam::DVec2;

use crate::clip::ClipRegion;
use crate::registry::PointId;
use crate::scene::{SceneDelta, SceneSink};
use crate::status::Status;

const CLIP_ID: &str = "boundary-clip";

/// Scene backend producing a standalone SVG document.
///
/// Points live in a group clipped by the boundary; status and count are exposed as
/// plain text and embedded as `data-*` attributes on the root element.
#[derive(Debug, Clone)]
pub struct SvgScene {
    dot_radius: f64,
    fill: String,
    clip: Option<ClipRegion>,
    points: BTreeMap<PointId, DVec2>,
    status: Option<Status>,
    count: Option<u64>,
}

impl SvgScene {
    pub fn new(dot_radius: f64) -> Self {
        Self {
            dot_radius,
            fill: "#e53935".to_owned(),
            clip: None,
            points: BTreeMap::new(),
            status: None,
            count: None,
        }
    }

    /// Sets the point fill color (any SVG paint value).
    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = fill.into();
        self
    }

    pub fn clip(&self) -> Option<&ClipRegion> {
        self.clip.as_ref()
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn count(&self) -> Option<u64> {
        self.count
    }

    /// Status line as shown to the user, e.g. `Connected · 12`.
    pub fn status_text(&self) -> String {
        match (&self.status, self.count) {
            (Some(status), Some(count)) => format!("{status} · {count}"),
            (Some(status), None) => status.to_string(),
            (None, Some(count)) => count.to_string(),
            (None, None) => String::new(),
        }
    }

    /// Points that survive the installed clip region (all points if none is installed).
    pub fn visible_points(&self) -> impl Iterator<Item = (PointId, DVec2)> + '_ {
        self.points
            .iter()
            .filter(|(_, p)| self.clip.as_ref().map_or(true, |clip| clip.contains(**p)))
            .map(|(id, p)| (*id, *p))
    }

    /// Serializes the scene as an SVG document.
    pub fn to_svg_string(&self) -> String {
        let mut out = String::new();
        out.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg""#);
        if let Some(clip) = &self.clip {
            let _ = write!(out, r#" viewBox="{}""#, clip.view_box().to_attribute());
        }
        if let Some(status) = &self.status {
            let _ = write!(out, r#" data-status="{}""#, escape_attribute(&status.to_string()));
        }
        if let Some(count) = self.count {
            let _ = write!(out, r#" data-count="{count}""#);
        }
        out.push_str(">\n");

        if let Some(clip) = &self.clip {
            let _ = writeln!(out, r#"  <defs><clipPath id="{CLIP_ID}">"#);
            for (data, rule) in clip.path_data() {
                let _ = writeln!(
                    out,
                    r#"    <path d="{}" clip-rule="{}"/>"#,
                    escape_attribute(data),
                    rule.as_attribute()
                );
            }
            out.push_str("  </clipPath></defs>\n");
            let _ = writeln!(
                out,
                r#"  <g clip-path="url(#{CLIP_ID})" fill="{}">"#,
                escape_attribute(&self.fill)
            );
        } else {
            let _ = writeln!(out, r#"  <g fill="{}">"#, escape_attribute(&self.fill));
        }

        for (id, p) in &self.points {
            let _ = writeln!(
                out,
                r#"    <circle data-id="{id}" cx="{:.3}" cy="{:.3}" r="{}"/>"#,
                p.x, p.y, self.dot_radius
            );
        }
        out.push_str("  </g>\n</svg>\n");
        out
    }
}

impl SceneSink for SvgScene {
    fn apply(&mut self, delta: SceneDelta) {
        match delta {
            SceneDelta::ClipInstalled(clip) => self.clip = Some(clip),
            SceneDelta::PointAdded(point) => {
                self.points.insert(point.id, point.position);
            }
            SceneDelta::PointRemoved(id) => {
                self.points.remove(&id);
            }
            SceneDelta::StatusChanged(status) => self.status = Some(status),
            SceneDelta::CountChanged(count) => self.count = Some(count),
        }
    }
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
