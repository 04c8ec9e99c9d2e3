#![forbid(unsafe_code)]
//! presence_map: live presence visualization on a vector boundary.
//!
//! Each connected client is drawn as a point placed at a deterministic pseudo-random
//! position inside a boundary shape. The point count follows a live counter pushed over
//! a WebSocket, or a demo generator when no channel is configured.
//!
//! Modules:
//! - boundary: SVG boundary documents, view boxes and their loading
//! - mask: rasterized occupancy mask of the boundary interior
//! - sampling: seeded generator and rejection sampling against the mask
//! - clip: render-time clip region derived from the boundary
//! - registry: id-ordered points grown and shrunk to a target count
//! - sync: count updates from the live channel or the demo generator
//! - scene: deltas and sinks for rendering backends
pub mod app;
pub mod boundary;
pub mod clip;
pub mod config;
pub mod error;
pub mod mask;
pub mod protocol;
pub mod registry;
pub mod sampling;
pub mod scene;
pub mod status;
pub mod sync;

pub use app::run;

/// Convenient re-exports for common types. Import with `use presence_map::prelude::*;`.
pub mod prelude {
    pub use crate::app::{run, Visualization};
    pub use crate::boundary::{
        load_boundary, Boundary, BoundaryPath, BoundarySource, FillRule, ViewBox,
    };
    pub use crate::clip::ClipRegion;
    pub use crate::config::{ReconnectPolicy, VizConfig};
    pub use crate::error::{Error, Result};
    pub use crate::mask::Mask;
    pub use crate::protocol::{parse_count, ChannelMessage};
    pub use crate::registry::{Point, PointId, PointRegistry, ResizeSummary};
    pub use crate::sampling::{MaskSampler, Mulberry32, PositionSource, Sample};
    pub use crate::scene::{SceneDelta, SceneSink, SvgScene, VecSink};
    pub use crate::status::Status;
    pub use crate::sync::{demo_counts, ChannelFrame, CountSource, SessionEnd, SyncDriver};
}
