//! Start-up sequence and top-level run loop of the visualization.
use tracing::{error, info};

use crate::boundary::{load_boundary, Boundary, BoundarySource};
use crate::clip::ClipRegion;
use crate::config::VizConfig;
use crate::error::Result;
use crate::mask::Mask;
use crate::sampling::MaskSampler;
use crate::scene::{SceneDelta, SceneSink};
use crate::status::Status;
use crate::sync::{CountSource, SessionEnd, SyncDriver};

/// An initialized visualization: boundary loaded, mask built, clip installed.
#[derive(Debug, Clone)]
pub struct Visualization {
    config: VizConfig,
    boundary: Boundary,
    sampler: MaskSampler,
}

impl Visualization {
    /// Loads the boundary, builds the mask and installs the clip region on `sink`.
    ///
    /// Emits `Loading`, `BuildingMask` and `Ready` in that order. No points are placed.
    pub async fn initialize(
        config: VizConfig,
        source: &BoundarySource,
        sink: &mut dyn SceneSink,
    ) -> Result<Self> {
        config.validate()?;

        sink.apply(SceneDelta::StatusChanged(Status::Loading));
        let boundary = load_boundary(source, config.load_timeout).await?;

        sink.apply(SceneDelta::StatusChanged(Status::BuildingMask));
        let mask = Mask::build(&boundary, config.mask_width, config.min_mask_height)?;
        let sampler = MaskSampler::from_config(*boundary.view_box(), mask, &config);

        sink.apply(SceneDelta::ClipInstalled(ClipRegion::install(&boundary)));
        sink.apply(SceneDelta::StatusChanged(Status::Ready));
        info!(%source, "visualization ready");

        Ok(Self {
            config,
            boundary,
            sampler,
        })
    }

    pub fn config(&self) -> &VizConfig {
        &self.config
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn sampler(&self) -> &MaskSampler {
        &self.sampler
    }

    /// Hands the sampler to a sync driver rendering into `sink`.
    pub fn into_driver<S: SceneSink>(self, sink: S) -> SyncDriver<MaskSampler, S> {
        SyncDriver::new(self.sampler, sink).with_max_points(self.config.max_points)
    }
}

/// Initializes the visualization and consumes count updates until the source ends.
///
/// Failures never escape: they are logged and shown as [`Status::Error`]. Demo mode
/// keeps running until the returned future is dropped.
pub async fn run<S: SceneSink>(
    config: VizConfig,
    boundary: &BoundarySource,
    counts: &CountSource,
    mut sink: S,
) -> S {
    let viz = match Visualization::initialize(config, boundary, &mut sink).await {
        Ok(viz) => viz,
        Err(err) => {
            error!(%err, "initialization failed");
            sink.apply(SceneDelta::StatusChanged(Status::Error(err.to_string())));
            return sink;
        }
    };

    let config = viz.config().clone();
    let mut driver = viz.into_driver(sink);
    match driver.run(counts, &config).await {
        Some(SessionEnd::Failed(reason)) => error!(%reason, "count channel ended with an error"),
        Some(SessionEnd::Disconnected) => info!("count channel ended"),
        None => {}
    }
    driver.into_sink()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::boundary::tests::SQUARE_SVG;
    use crate::scene::VecSink;

    fn square_source() -> BoundarySource {
        BoundarySource::Inline(SQUARE_SVG.into())
    }

    #[tokio::test]
    async fn initialize_reports_progress_and_installs_clip() {
        let mut sink = VecSink::new();
        let viz = Visualization::initialize(VizConfig::new(), &square_source(), &mut sink)
            .await
            .unwrap();

        assert_eq!(
            sink.statuses(),
            vec![Status::Loading, Status::BuildingMask, Status::Ready]
        );
        assert!(sink
            .as_slice()
            .iter()
            .any(|d| matches!(d, SceneDelta::ClipInstalled(clip) if clip.len() == 1)));
        assert_eq!(sink.live_points(), 0);
        assert_eq!(viz.sampler().mask().size(), (900, 900));
        assert_eq!(viz.boundary().paths().len(), 1);
    }

    #[tokio::test]
    async fn driver_takes_point_limit_from_config() {
        let config = VizConfig::new().with_mask_width(50).with_max_points(8);
        let viz = Visualization::initialize(config, &square_source(), &mut ())
            .await
            .unwrap();
        let mut driver = viz.into_driver(VecSink::new());
        assert_eq!(driver.max_points(), 8);

        driver.apply_count(1_000_000_000);
        assert_eq!(driver.registry().len(), 8);
    }

    #[tokio::test]
    async fn invalid_config_fails_before_loading() {
        let mut sink = VecSink::new();
        let result = Visualization::initialize(
            VizConfig::new().with_mask_width(0),
            &square_source(),
            &mut sink,
        )
        .await;
        assert!(result.is_err());
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn run_shows_initialization_errors() {
        let boundary = BoundarySource::Inline(r#"<svg viewBox="0 0 10 10"></svg>"#.into());
        let sink = run(VizConfig::new(), &boundary, &CountSource::Demo, VecSink::new()).await;

        let statuses = sink.statuses();
        assert_eq!(statuses[0], Status::Loading);
        assert!(matches!(statuses.last(), Some(Status::Error(_))));
        assert!(!statuses.contains(&Status::Ready));
        assert!(sink.counts().is_empty());
    }

    #[tokio::test]
    async fn run_reports_unreachable_channel() {
        let counts = CountSource::Live {
            url: "ws://127.0.0.1:1".into(),
        };
        let sink = run(VizConfig::new(), &square_source(), &counts, VecSink::new()).await;

        let statuses = sink.statuses();
        assert_eq!(&statuses[2..4], &[Status::Ready, Status::Connecting]);
        assert!(matches!(statuses.last(), Some(Status::Error(_))));
        assert_eq!(sink.live_points(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn demo_run_places_points_inside_boundary() {
        let mut sink = VecSink::new();
        let config = VizConfig::new().with_mask_width(100);
        let outcome = tokio::time::timeout(
            Duration::from_millis(3500),
            run(config, &square_source(), &CountSource::Demo, &mut sink),
        )
        .await;

        assert!(outcome.is_err());
        assert_eq!(sink.counts(), vec![0, 1, 2, 3]);
        assert_eq!(sink.live_points(), 3);
        assert_eq!(sink.statuses().last(), Some(&Status::Demo));
        for delta in sink.as_slice() {
            if let SceneDelta::PointAdded(point) = delta {
                assert!((4.0..=96.0).contains(&point.position.x));
                assert!((4.0..=96.0).contains(&point.position.y));
            }
        }
    }
}
