//! Sync driver: feeds count updates from the live channel or the demo generator into
//! the point registry, one update at a time and in arrival order.
//!
//! Live sessions move through `Connecting → Connected → (Disconnected | Error)`. Demo mode
//! shows [`Status::Demo`] and never enters the connected states. Without a
//! [`ReconnectPolicy`] a session that ends is final.
use std::future::Future;
use std::pin::pin;

use futures::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::config::{ReconnectPolicy, VizConfig, DEFAULT_MAX_POINTS};
use crate::error::Result;
use crate::protocol::parse_count;
use crate::registry::{PointRegistry, ResizeSummary};
use crate::sampling::PositionSource;
use crate::scene::{SceneDelta, SceneSink};
use crate::status::Status;

pub mod demo;
pub mod live;

pub use demo::demo_counts;

/// Where count updates come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountSource {
    /// Internal periodic generator.
    Demo,
    /// WebSocket URL of the counting service.
    Live { url: String },
}

impl CountSource {
    /// Live when a non-blank URL is configured, demo otherwise.
    pub fn from_url(url: Option<&str>) -> Self {
        match url.map(str::trim) {
            Some(url) if !url.is_empty() => CountSource::Live {
                url: url.to_owned(),
            },
            _ => CountSource::Demo,
        }
    }
}

/// A frame received on the count channel, independent of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelFrame {
    Text(String),
    /// The peer closed the channel.
    Closed,
    /// Binary, ping and other frames without meaning for the count.
    Other,
}

/// How a live session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Disconnected,
    Failed(String),
}

/// Owns the point registry and reconciles it against incoming counts.
pub struct SyncDriver<P, S> {
    registry: PointRegistry,
    source: P,
    sink: S,
    status: Option<Status>,
    last_count: Option<u64>,
    max_points: usize,
}

impl<P: PositionSource, S: SceneSink> SyncDriver<P, S> {
    pub fn new(source: P, sink: S) -> Self {
        Self {
            registry: PointRegistry::new(),
            source,
            sink,
            status: None,
            last_count: None,
            max_points: DEFAULT_MAX_POINTS,
        }
    }

    /// Caps the number of placed points. Zero is treated as one.
    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points.max(1);
        self
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    pub fn registry(&self) -> &PointRegistry {
        &self.registry
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Last count applied to the registry.
    pub fn last_count(&self) -> Option<u64> {
        self.last_count
    }

    /// Updates the status text; repeated identical states are not re-emitted.
    pub fn set_status(&mut self, status: Status) {
        if self.status.as_ref() == Some(&status) {
            return;
        }
        info!(status = %status, "status changed");
        self.sink.apply(SceneDelta::StatusChanged(status.clone()));
        self.status = Some(status);
    }

    /// Reconciles the registry to `count` points, at most `max_points`, and renders the
    /// received count.
    pub fn apply_count(&mut self, count: u64) -> ResizeSummary {
        let target = match usize::try_from(count) {
            Ok(target) if target <= self.max_points => target,
            _ => {
                warn!(count, max_points = self.max_points, "count exceeds point limit, clamping");
                self.max_points
            }
        };
        let summary = self
            .registry
            .resize(target, &mut self.source, &mut self.sink);
        self.last_count = Some(count);
        self.sink.apply(SceneDelta::CountChanged(count));
        summary
    }

    /// Applies a text payload from the channel; malformed payloads are ignored.
    pub fn handle_text(&mut self, text: &str) -> Option<ResizeSummary> {
        match parse_count(text) {
            Some(count) => Some(self.apply_count(count)),
            None => {
                debug!(len = text.len(), "ignoring malformed channel message");
                None
            }
        }
    }

    /// Applies every generated count. Returns when the stream ends.
    pub async fn run_demo<C>(&mut self, counts: C)
    where
        C: Stream<Item = u64>,
    {
        self.set_status(Status::Demo);
        let mut counts = pin!(counts);
        while let Some(count) = counts.next().await {
            self.apply_count(count);
        }
    }

    /// Processes frames of one connected session until it closes or fails.
    pub async fn run_session<F>(&mut self, frames: F) -> SessionEnd
    where
        F: Stream<Item = Result<ChannelFrame>>,
    {
        self.set_status(Status::Connected);
        let mut frames = pin!(frames);
        while let Some(frame) = frames.next().await {
            match frame {
                Ok(ChannelFrame::Text(text)) => {
                    self.handle_text(&text);
                }
                Ok(ChannelFrame::Closed) => break,
                Ok(ChannelFrame::Other) => {}
                Err(err) => {
                    warn!(%err, count = ?self.last_count, "count channel failed");
                    self.set_status(Status::Error(err.to_string()));
                    return SessionEnd::Failed(err.to_string());
                }
            }
        }

        info!(count = ?self.last_count, "count channel closed");
        self.set_status(Status::Disconnected);
        SessionEnd::Disconnected
    }

    /// Runs live sessions opened by `connect`, retrying according to `policy`.
    pub async fn run_live_with<C, Fut, F>(
        &mut self,
        mut connect: C,
        policy: &ReconnectPolicy,
    ) -> SessionEnd
    where
        C: FnMut() -> Fut,
        Fut: Future<Output = Result<F>>,
        F: Stream<Item = Result<ChannelFrame>>,
    {
        let mut retry = 0;
        loop {
            self.set_status(Status::Connecting);
            let end = match connect().await {
                Ok(frames) => self.run_session(frames).await,
                Err(err) => {
                    warn!(%err, "count channel unavailable");
                    self.set_status(Status::Error(err.to_string()));
                    SessionEnd::Failed(err.to_string())
                }
            };

            if retry >= policy.max_retries {
                return end;
            }
            let delay = policy.backoff(retry);
            retry += 1;
            info!(retry, ?delay, "reconnecting count channel");
            tokio::time::sleep(delay).await;
        }
    }

    /// Runs live sessions against the WebSocket at `url`.
    pub async fn run_live(&mut self, url: &str, policy: &ReconnectPolicy) -> SessionEnd {
        self.run_live_with(|| live::connect(url), policy).await
    }

    /// Consumes updates from `source`. Demo mode runs until the future is dropped.
    pub async fn run(&mut self, source: &CountSource, config: &VizConfig) -> Option<SessionEnd> {
        match source {
            CountSource::Demo => {
                self.run_demo(demo_counts(config.demo_period, config.demo_cycle))
                    .await;
                None
            }
            CountSource::Live { url } => Some(self.run_live(url, &config.reconnect).await),
        }
    }
}
