//! Scene sink that keeps an [`SvgScene`] and mirrors it to a file.
//!
//! The sink runs inside the update loop and never touches the file system. It publishes
//! the rendered document on a watch channel; a [`SnapshotWriter`] task writes whatever is
//! newest, so a slow disk skips intermediate snapshots instead of stalling updates.
use std::path::{Path, PathBuf};

use presence_map::scene::{SceneDelta, SceneSink, SvgScene};
use tokio::sync::watch;
use tracing::{debug, warn};

/// Publishes the scene whenever the clip, status or count changes.
///
/// Point deltas are batched: they always precede the count change of the same update,
/// so each update produces one snapshot.
#[derive(Debug)]
pub struct SnapshotSink {
    scene: SvgScene,
    updates: Option<watch::Sender<String>>,
    published: usize,
}

/// Writes snapshots published by a [`SnapshotSink`] to `path`.
#[derive(Debug)]
pub struct SnapshotWriter {
    path: PathBuf,
    rx: watch::Receiver<String>,
}

impl SnapshotSink {
    /// A sink that only tracks the scene.
    pub fn new(scene: SvgScene) -> Self {
        Self {
            scene,
            updates: None,
            published: 0,
        }
    }

    /// A sink whose snapshots are written to `path` by the returned writer.
    pub fn with_writer(scene: SvgScene, path: PathBuf) -> (Self, SnapshotWriter) {
        let (tx, rx) = watch::channel(String::new());
        let sink = Self {
            scene,
            updates: Some(tx),
            published: 0,
        };
        (sink, SnapshotWriter { path, rx })
    }

    pub fn scene(&self) -> &SvgScene {
        &self.scene
    }

    /// Number of snapshots handed to the writer so far.
    pub fn published(&self) -> usize {
        self.published
    }

    fn publish(&mut self) {
        let Some(tx) = &self.updates else {
            return;
        };
        if tx.send(self.scene.to_svg_string()).is_err() {
            debug!("snapshot writer is gone");
            return;
        }
        self.published += 1;
    }
}

impl SceneSink for SnapshotSink {
    fn apply(&mut self, delta: SceneDelta) {
        let publish = matches!(
            delta,
            SceneDelta::ClipInstalled(_) | SceneDelta::StatusChanged(_) | SceneDelta::CountChanged(_)
        );
        self.scene.apply(delta);
        if publish {
            self.publish();
        }
    }
}

impl SnapshotWriter {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the newest snapshot after every change until the sink is dropped.
    ///
    /// Returns the number of successful writes. Failures are logged and not retried.
    pub async fn run(mut self) -> usize {
        let mut writes = 0;
        while self.rx.changed().await.is_ok() {
            let svg = self.rx.borrow_and_update().clone();
            match tokio::fs::write(&self.path, svg).await {
                Ok(()) => {
                    writes += 1;
                    debug!(path = %self.path.display(), "snapshot written");
                }
                Err(err) => warn!(path = %self.path.display(), %err, "cannot write snapshot"),
            }
        }
        writes
    }
}
