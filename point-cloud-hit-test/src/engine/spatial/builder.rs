use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bevy::log::{debug, info, warn};
use crossbeam_channel::{Receiver, Sender, TryRecvError};

use super::octree::{OctreeConfig, PointOctree};
use crate::engine::point_set::PointSet;
use crate::errors::{HitTestError, Result};

/// Where an index build runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    /// Dedicated worker thread. Falls back to `Inline` on wasm32.
    #[default]
    Background,
    /// On the calling thread, inside `OctreeBuild::start`.
    Inline,
}

/// Something the build has reported since the last poll.
#[derive(Debug)]
pub enum BuildUpdate {
    Progress(f32),
    Ready(Arc<PointOctree>),
    Failed(HitTestError),
}

/// An in-flight (or finished) index build over one `PointSet` snapshot.
///
/// Progress and completion travel on separate channels. Dropping the build
/// cancels the worker and discards anything it still sends.
pub struct OctreeBuild {
    points: PointSet,
    progress: Receiver<f32>,
    completion: Receiver<Result<Arc<PointOctree>>>,
    cancel: Arc<AtomicBool>,
    last_progress: f32,
    finished: bool,
}

impl OctreeBuild {
    pub fn start(points: PointSet, config: OctreeConfig, mode: BuildMode) -> Self {
        let (progress_tx, progress_rx) = crossbeam_channel::unbounded();
        let (completion_tx, completion_rx) = crossbeam_channel::bounded(1);
        let cancel = Arc::new(AtomicBool::new(false));

        info!("Building point octree over {} points", points.len());

        let build = Self {
            points: points.clone(),
            progress: progress_rx,
            completion: completion_rx,
            cancel: cancel.clone(),
            last_progress: 0.0,
            finished: false,
        };

        #[cfg(target_arch = "wasm32")]
        let mode = BuildMode::Inline;

        match mode {
            BuildMode::Inline => run_build(points, config, &progress_tx, &completion_tx, &cancel),
            BuildMode::Background => {
                let worker_completion = completion_tx.clone();
                let spawned = std::thread::Builder::new()
                    .name("point-octree-build".into())
                    .spawn(move || {
                        run_build(points, config, &progress_tx, &worker_completion, &cancel)
                    });
                if let Err(e) = spawned {
                    // The receiver is alive and the bounded slot is empty.
                    let _ = completion_tx.send(Err(HitTestError::BuildFailed(format!(
                        "could not start build worker: {e}"
                    ))));
                }
            }
        }

        build
    }

    /// Snapshot this build indexes.
    pub fn points(&self) -> &PointSet {
        &self.points
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Drain everything reported since the last poll. Progress always precedes
    /// the terminal `Ready`/`Failed`, which is reported once.
    pub fn poll(&mut self) -> Vec<BuildUpdate> {
        let mut updates = Vec::new();
        if self.finished {
            return updates;
        }

        // Completion is sent after the last progress value, so reading it first
        // guarantees the progress drain below sees everything before it.
        let terminal = match self.completion.try_recv() {
            Ok(Ok(tree)) => Some(BuildUpdate::Ready(tree)),
            Ok(Err(e)) => Some(BuildUpdate::Failed(e)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(BuildUpdate::Failed(
                HitTestError::BuildFailed("build worker exited without a result".into()),
            )),
        };

        for fraction in self.progress.try_iter() {
            if fraction >= self.last_progress {
                self.last_progress = fraction;
                updates.push(BuildUpdate::Progress(fraction));
            }
        }

        if let Some(terminal) = terminal {
            self.finished = true;
            updates.push(terminal);
        }
        updates
    }
}

impl Drop for OctreeBuild {
    fn drop(&mut self) {
        if !self.finished {
            debug!("Discarding unfinished point octree build");
        }
        self.cancel();
    }
}

fn run_build(
    points: PointSet,
    config: OctreeConfig,
    progress: &Sender<f32>,
    completion: &Sender<Result<Arc<PointOctree>>>,
    cancel: &AtomicBool,
) {
    let mut report = |fraction: f32| {
        // A dropped receiver means the build was superseded.
        let _ = progress.send(fraction);
    };
    let result = PointOctree::build_with_progress(points, config, &mut report, Some(cancel));
    match &result {
        Ok(tree) => info!(
            "Point octree ready: {} points in {} nodes",
            tree.len(),
            tree.node_count()
        ),
        Err(HitTestError::BuildCancelled) => debug!("Point octree build cancelled"),
        Err(e) => warn!("Point octree build failed: {}", e),
    }
    let _ = completion.send(result.map(Arc::new));
}
