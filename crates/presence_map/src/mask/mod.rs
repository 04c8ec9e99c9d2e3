//! Boundary mask: a fixed-resolution occupancy raster used for fast containment tests.
//!
//! The mask is built once per boundary by filling every path into an off-screen
//! pixmap and reading back its alpha channel. Any nonzero cell counts as inside.
use glam::DVec2;
use kurbo::{BezPath, PathEl};
use tracing::{info, warn};
use vello_cpu::peniko::{Color, Fill};
use vello_cpu::{Pixmap, RenderContext};

use crate::boundary::{Boundary, FillRule, ViewBox};
use crate::error::{Error, Result};

/// Mask height for a view box: `max(min_height, round(width * vb.height / vb.width))`.
pub fn mask_height_for(view_box: &ViewBox, width: u32, min_height: u32) -> u32 {
    let derived = (width as f64 * (view_box.height / view_box.width)).round();
    let derived = if derived.is_finite() && derived > 0.0 {
        derived.min(u32::MAX as f64) as u32
    } else {
        0
    };
    derived.max(min_height)
}

/// Occupancy raster over a view box.
#[derive(Clone, Debug)]
pub struct Mask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Mask {
    /// Wraps raw row-major occupancy bytes.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::MaskBuild(format!(
                "mask dimensions must be > 0 (got {width}x{height})"
            )));
        }
        if data.len() != width as usize * height as usize {
            return Err(Error::MaskBuild(format!(
                "mask data has {} cells, expected {}",
                data.len(),
                width as usize * height as usize
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Rasterizes all boundary paths into a `width × height` mask.
    ///
    /// Height is derived with [`mask_height_for`]. Fails if no path covers any cell.
    pub fn build(boundary: &Boundary, width: u32, min_height: u32) -> Result<Self> {
        let view_box = boundary.view_box();
        let height = mask_height_for(view_box, width, min_height);
        if width == 0 || height == 0 {
            return Err(Error::MaskBuild(format!(
                "mask dimensions must be > 0 (got {width}x{height})"
            )));
        }

        let (Ok(raster_width), Ok(raster_height)) = (u16::try_from(width), u16::try_from(height))
        else {
            return Err(Error::MaskBuild(format!(
                "mask {width}x{height} exceeds the raster limit of {}",
                u16::MAX
            )));
        };

        let sx = width as f64 / view_box.width;
        let sy = height as f64 / view_box.height;
        let mut ctx = RenderContext::new(raster_width, raster_height);
        ctx.set_transform(vello_cpu::kurbo::Affine::new([
            sx,
            0.0,
            0.0,
            sy,
            -view_box.x * sx,
            -view_box.y * sy,
        ]));
        ctx.set_paint(Color::from_rgba8(255, 255, 255, 255));
        for path in boundary.paths() {
            ctx.set_fill_rule(fill_for(path.fill_rule()));
            ctx.fill_path(&to_render_path(path.path()));
        }
        ctx.flush();

        let mut pixmap = Pixmap::new(raster_width, raster_height);
        ctx.render_to_pixmap(&mut pixmap);
        let cells: Vec<u8> = pixmap
            .data_as_u8_slice()
            .chunks_exact(4)
            .map(|rgba| rgba[3])
            .collect();

        let mask = Self {
            width,
            height,
            data: cells,
        };
        let occupied = mask.occupied_cells();
        if occupied == 0 {
            warn!(paths = boundary.paths().len(), "boundary produced an empty mask");
            return Err(Error::MaskBuild(
                "no path yields a non-degenerate fill".into(),
            ));
        }

        info!(
            width,
            height,
            paths = boundary.paths().len(),
            occupied_fraction = mask.occupied_fraction(),
            "mask built"
        );
        Ok(mask)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size as `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the occupancy byte at the given cell, returning `0` if out of bounds.
    pub fn get(&self, px: i64, py: i64) -> u8 {
        if px < 0 || py < 0 || px >= self.width as i64 || py >= self.height as i64 {
            return 0;
        }
        self.data[py as usize * self.width as usize + px as usize]
    }

    pub fn is_occupied(&self, px: i64, py: i64) -> bool {
        self.get(px, py) > 0
    }

    /// Maps a view box position to its cell, clamped to the grid.
    pub fn cell_for(&self, view_box: &ViewBox, p: DVec2) -> (u32, u32) {
        let uv = view_box.to_unit(p);
        let px = ((uv.x * self.width as f64).floor().max(0.0) as u32).min(self.width - 1);
        let py = ((uv.y * self.height as f64).floor().max(0.0) as u32).min(self.height - 1);
        (px, py)
    }

    /// Returns `true` if `p` lies inside the view box and its cell is occupied.
    pub fn contains(&self, view_box: &ViewBox, p: DVec2) -> bool {
        if !view_box.contains(p) {
            return false;
        }
        let (px, py) = self.cell_for(view_box, p);
        self.is_occupied(px as i64, py as i64)
    }

    pub fn occupied_cells(&self) -> usize {
        self.data.iter().filter(|v| **v > 0).count()
    }

    /// Share of occupied cells in `[0, 1]`.
    pub fn occupied_fraction(&self) -> f64 {
        self.occupied_cells() as f64 / self.data.len() as f64
    }
}

fn fill_for(rule: FillRule) -> Fill {
    match rule {
        FillRule::NonZero => Fill::NonZero,
        FillRule::EvenOdd => Fill::EvenOdd,
    }
}

/// Copies a boundary path into the renderer's own geometry types.
fn to_render_path(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use vello_cpu::kurbo::Point;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => out.move_to(Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(Point::new(p1.x, p1.y), Point::new(p2.x, p2.y)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                Point::new(p1.x, p1.y),
                Point::new(p2.x, p2.y),
                Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}
