//! Boundary geometry: the view box frame and the closed paths points must fall within.
//!
//! A [`Boundary`] is parsed from an SVG document. Only the root `viewBox` (or
//! `width`/`height`) and the `d` and `fill-rule` attributes of `<path>` elements are read;
//! transforms, styles and other shapes are ignored.
use glam::DVec2;
use kurbo::{BezPath, PathEl};
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub mod loader;

pub use loader::{load_boundary, BoundarySource};

/// Rectangular coordinate frame shared by boundary, mask and rendered points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    /// Creates a view box, rejecting non-finite values and non-positive extents.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self> {
        let finite = [x, y, width, height].iter().all(|v| v.is_finite());
        if !finite || width <= 0.0 || height <= 0.0 {
            return Err(Error::Initialization(format!(
                "view box must have positive extent (got {x} {y} {width} {height})"
            )));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Parses an SVG `viewBox` attribute value (`"x y w h"`, commas allowed).
    pub fn parse(value: &str) -> Result<Self> {
        let numbers = value
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .map(str::parse::<f64>)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Initialization(format!("invalid viewBox '{value}': {e}")))?;

        match numbers.as_slice() {
            &[x, y, width, height] => Self::new(x, y, width, height),
            _ => Err(Error::Initialization(format!(
                "viewBox '{value}' must contain four numbers"
            ))),
        }
    }

    pub fn min(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn max(&self) -> DVec2 {
        DVec2::new(self.x + self.width, self.y + self.height)
    }

    pub fn extent(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    /// Maps a position into the unit square spanned by the view box.
    pub fn to_unit(&self, p: DVec2) -> DVec2 {
        (p - self.min()) / self.extent()
    }

    /// Returns `true` if `p` lies within the view box (edges inclusive).
    pub fn contains(&self, p: DVec2) -> bool {
        let u = self.to_unit(p);
        (0.0..=1.0).contains(&u.x) && (0.0..=1.0).contains(&u.y)
    }

    /// Formats the view box as an SVG attribute value.
    pub fn to_attribute(&self) -> String {
        format!("{} {} {} {}", self.x, self.y, self.width, self.height)
    }
}

/// Fill rule deciding which regions of a path are inside.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

impl FillRule {
    /// Parses an SVG `fill-rule` value, defaulting to non-zero for unknown input.
    pub fn from_attribute(value: &str) -> Self {
        match value.trim() {
            "evenodd" => FillRule::EvenOdd,
            _ => FillRule::NonZero,
        }
    }

    /// Decides whether a winding number counts as inside.
    #[inline]
    pub fn is_inside(self, winding: i32) -> bool {
        match self {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => winding % 2 != 0,
        }
    }

    pub fn as_attribute(self) -> &'static str {
        match self {
            FillRule::NonZero => "nonzero",
            FillRule::EvenOdd => "evenodd",
        }
    }
}

/// A single closed path of the boundary in view box coordinates.
#[derive(Debug, Clone)]
pub struct BoundaryPath {
    data: String,
    fill_rule: FillRule,
    path: BezPath,
}

impl BoundaryPath {
    /// Parses SVG path data. Open subpaths are closed, matching fill semantics.
    pub fn parse(data: &str, fill_rule: FillRule) -> Result<Self> {
        let trimmed = data.trim();
        if trimmed.is_empty() {
            return Err(Error::Initialization("path data is empty".into()));
        }
        let parsed = BezPath::from_svg(trimmed)
            .map_err(|e| Error::Initialization(format!("invalid path data: {e}")))?;
        Ok(Self {
            data: trimmed.to_owned(),
            fill_rule,
            path: close_subpaths(&parsed),
        })
    }

    /// Path data as written in the document.
    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    /// The parsed path with every subpath closed.
    pub fn path(&self) -> &BezPath {
        &self.path
    }
}

/// Closed paths plus the frame they are defined in.
#[derive(Debug, Clone)]
pub struct Boundary {
    view_box: ViewBox,
    paths: Vec<BoundaryPath>,
}

impl Boundary {
    /// Creates a boundary; fails if `paths` is empty.
    pub fn new(view_box: ViewBox, paths: Vec<BoundaryPath>) -> Result<Self> {
        if paths.is_empty() {
            return Err(Error::Initialization(
                "boundary has no usable <path>".into(),
            ));
        }
        Ok(Self { view_box, paths })
    }

    /// Parses an SVG document into a boundary.
    pub fn from_svg_str(text: &str) -> Result<Self> {
        let mut options = roxmltree::ParsingOptions::default();
        options.allow_dtd = true;
        let doc = roxmltree::Document::parse_with_options(text, options)
            .map_err(|e| Error::Initialization(format!("malformed boundary document: {e}")))?;

        let root = doc.root_element();
        if root.tag_name().name() != "svg" {
            return Err(Error::Initialization(format!(
                "boundary document has no <svg> root (found <{}>)",
                root.tag_name().name()
            )));
        }

        let view_box = match root.attribute("viewBox") {
            Some(value) => ViewBox::parse(value)?,
            None => view_box_from_size(root.attribute("width"), root.attribute("height"))?,
        };

        let mut paths = Vec::new();
        let mut skipped = 0usize;
        for (index, node) in root
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == "path")
            .enumerate()
        {
            let data = node.attribute("d").unwrap_or_default();
            if data.trim().is_empty() {
                debug!(index, "skipping <path> without draw commands");
                continue;
            }
            let fill_rule = node
                .ancestors()
                .find_map(|n| n.attribute("fill-rule"))
                .map(FillRule::from_attribute)
                .unwrap_or_default();
            match BoundaryPath::parse(data, fill_rule) {
                Ok(path) => paths.push(path),
                Err(err) => {
                    warn!(index, %err, "skipping <path> with invalid data");
                    skipped += 1;
                }
            }
        }

        debug!(paths = paths.len(), skipped, ?view_box, "parsed boundary document");
        if paths.is_empty() && skipped > 0 {
            return Err(Error::Initialization(format!(
                "boundary has no usable <path> ({skipped} with invalid data)"
            )));
        }
        Self::new(view_box, paths)
    }

    pub fn view_box(&self) -> &ViewBox {
        &self.view_box
    }

    pub fn paths(&self) -> &[BoundaryPath] {
        &self.paths
    }
}

fn view_box_from_size(width: Option<&str>, height: Option<&str>) -> Result<ViewBox> {
    let parse = |value: Option<&str>, name: &str| -> Result<f64> {
        let value = value.ok_or_else(|| {
            Error::Initialization(format!("<svg> has neither viewBox nor {name}"))
        })?;
        value
            .trim()
            .trim_end_matches("px")
            .parse::<f64>()
            .map_err(|e| Error::Initialization(format!("invalid <svg> {name} '{value}': {e}")))
    };
    ViewBox::new(0.0, 0.0, parse(width, "width")?, parse(height, "height")?)
}

/// Returns a copy of `path` where every subpath ends in `ClosePath`.
fn close_subpaths(path: &BezPath) -> BezPath {
    let mut out = BezPath::new();
    let mut open = false;
    for el in path.iter() {
        match el {
            PathEl::MoveTo(_) => {
                if open {
                    out.push(PathEl::ClosePath);
                }
                open = false;
                out.push(el);
            }
            PathEl::ClosePath => {
                open = false;
                out.push(el);
            }
            _ => {
                open = true;
                out.push(el);
            }
        }
    }
    if open {
        out.push(PathEl::ClosePath);
    }
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SQUARE_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
        <path d="M0 0 H100 V100 H0 Z"/>
    </svg>"#;

    pub(crate) fn square_boundary() -> Boundary {
        Boundary::from_svg_str(SQUARE_SVG).expect("square boundary")
    }

    #[test]
    fn parses_view_box_variants() {
        let vb = ViewBox::parse("0 0 100 50").unwrap();
        assert_eq!(vb, ViewBox::new(0.0, 0.0, 100.0, 50.0).unwrap());

        let vb = ViewBox::parse(" -10,5 , 20 30 ").unwrap();
        assert_eq!(vb.min(), DVec2::new(-10.0, 5.0));
        assert_eq!(vb.extent(), DVec2::new(20.0, 30.0));

        assert!(ViewBox::parse("0 0 100").is_err());
        assert!(ViewBox::parse("0 0 0 10").is_err());
        assert!(ViewBox::parse("0 0 a b").is_err());
    }

    #[test]
    fn unit_mapping_and_containment() {
        let vb = ViewBox::new(10.0, 20.0, 100.0, 50.0).unwrap();
        assert_eq!(vb.to_unit(DVec2::new(60.0, 45.0)), DVec2::new(0.5, 0.5));
        assert!(vb.contains(DVec2::new(10.0, 20.0)));
        assert!(vb.contains(DVec2::new(110.0, 70.0)));
        assert!(!vb.contains(DVec2::new(9.9, 30.0)));
    }

    #[test]
    fn parses_square_document() {
        let boundary = square_boundary();
        assert_eq!(boundary.paths().len(), 1);
        assert_eq!(boundary.view_box().width, 100.0);
        assert_eq!(boundary.paths()[0].fill_rule(), FillRule::NonZero);
    }

    #[test]
    fn falls_back_to_width_and_height() {
        let svg = r#"<svg width="200px" height="100"><path d="M0 0 L10 0 L10 10 Z"/></svg>"#;
        let boundary = Boundary::from_svg_str(svg).unwrap();
        assert_eq!(*boundary.view_box(), ViewBox::new(0.0, 0.0, 200.0, 100.0).unwrap());
    }

    #[test]
    fn skips_blank_paths_and_reads_inherited_fill_rule() {
        let svg = r#"<svg viewBox="0 0 10 10">
            <path d="   "/>
            <g fill-rule="evenodd"><path d="M0 0 L10 0 L10 10 Z"/></g>
        </svg>"#;
        let boundary = Boundary::from_svg_str(svg).unwrap();
        assert_eq!(boundary.paths().len(), 1);
        assert_eq!(boundary.paths()[0].fill_rule(), FillRule::EvenOdd);
    }

    #[test]
    fn rejects_documents_without_usable_paths() {
        let err = Boundary::from_svg_str(r#"<svg viewBox="0 0 10 10"><rect/></svg>"#)
            .unwrap_err();
        assert!(matches!(err, Error::Initialization(_)));

        let err = Boundary::from_svg_str(r#"<html><path d="M0 0 L1 1 Z"/></html>"#).unwrap_err();
        assert!(err.to_string().contains("<svg>"));

        assert!(Boundary::from_svg_str("not xml at all").is_err());
        assert!(Boundary::from_svg_str(r#"<svg><path d="M0 0 L1 1"/></svg>"#).is_err());
    }

    #[test]
    fn invalid_paths_are_skipped() {
        let svg = r#"<svg viewBox="0 0 10 10"><path d="M0 0 H10 V10 H0 Z"/><path d="M 0 0 Q"/></svg>"#;
        let boundary = Boundary::from_svg_str(svg).unwrap();
        assert_eq!(boundary.paths().len(), 1);
        assert_eq!(boundary.paths()[0].data(), "M0 0 H10 V10 H0 Z");
    }

    #[test]
    fn only_invalid_paths_fail_with_a_single_prefix() {
        let svg = r#"<svg viewBox="0 0 10 10"><path d="M 0 0 Q"/><path d="L"/></svg>"#;
        let err = Boundary::from_svg_str(svg).unwrap_err();
        assert!(matches!(err, Error::Initialization(_)));
        let text = err.to_string();
        assert_eq!(text.matches("initialization failed").count(), 1, "{text}");
        assert!(text.contains("2 with invalid data"), "{text}");
    }

    #[test]
    fn open_subpaths_are_closed() {
        let path = BoundaryPath::parse("M0 0 L10 0 L10 10 M20 20 L30 20 L30 30", FillRule::NonZero)
            .unwrap();
        let closes = path
            .path()
            .iter()
            .filter(|el| matches!(el, PathEl::ClosePath))
            .count();
        assert_eq!(closes, 2);
        assert_eq!(path.data(), "M0 0 L10 0 L10 10 M20 20 L30 20 L30 30");
    }

    #[test]
    fn fill_rule_decisions() {
        assert!(FillRule::NonZero.is_inside(2));
        assert!(!FillRule::EvenOdd.is_inside(2));
        assert!(FillRule::EvenOdd.is_inside(-1));
        assert_eq!(FillRule::from_attribute("evenodd"), FillRule::EvenOdd);
        assert_eq!(FillRule::from_attribute("inherit"), FillRule::NonZero);
    }
}
