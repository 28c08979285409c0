//! Single-flight background field builds.
//!
//! [`FieldBuilder`] owns at most one in-flight voxelization. A new
//! [`request`](FieldBuilder::request) cancels the outstanding build (its
//! cancel flag is raised and its result channel dropped) before spawning the
//! next one, so a stale field can never be published after a fresh one.
//!
//! The render loop calls [`poll`](FieldBuilder::poll) once per frame and never
//! blocks; headless callers can [`wait`](FieldBuilder::wait) instead.
//!
//! ```ignore
//! let mut builder = FieldBuilder::new();
//! builder.request(FieldBuildRequest::from_params(&params, clusters))?;
//! loop {
//!     if let Some(Ok(built)) = builder.poll() {
//!         current = Some(built.field);
//!     }
//!     render(current.as_ref());
//! }
//! ```

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use crate::error::BuildError;
use crate::field::{build_density_field, DensityField, FieldBuildRequest};

/// A finished build, tagged with the generation that requested it.
#[derive(Debug)]
pub struct BuiltField {
    /// Generation number returned by [`FieldBuilder::request`].
    pub generation: u64,
    /// The field, ready to publish.
    pub field: DensityField,
}

struct InFlight {
    generation: u64,
    cancel: Arc<AtomicBool>,
    receiver: Receiver<Result<DensityField, BuildError>>,
}

impl InFlight {
    fn abandon(self) {
        self.cancel.store(true, Ordering::Relaxed);
        log::debug!("cancelled density field build {}", self.generation);
    }
}

/// Starts a named build thread running `job`.
pub(crate) type Spawner = fn(thread::Builder, Box<dyn FnOnce() + Send>) -> io::Result<()>;

fn spawn_thread(builder: thread::Builder, job: Box<dyn FnOnce() + Send>) -> io::Result<()> {
    builder.spawn(job).map(drop)
}

/// Runs density field builds on a background thread, one at a time.
pub struct FieldBuilder {
    generation: u64,
    in_flight: Option<InFlight>,
    spawn: Spawner,
}

impl Default for FieldBuilder {
    fn default() -> Self {
        Self {
            generation: 0,
            in_flight: None,
            spawn: spawn_thread,
        }
    }
}

impl FieldBuilder {
    /// Builder with nothing in flight.
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn with_spawner(spawn: Spawner) -> Self {
        let mut builder = Self::default();
        builder.spawn = spawn;
        builder
    }

    /// Start building `request`, cancelling any outstanding build.
    ///
    /// Returns the new generation number. If the thread cannot be spawned the
    /// error is logged and returned; the caller should carry on without
    /// volumetrics.
    pub fn request(&mut self, request: FieldBuildRequest) -> Result<u64, BuildError> {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;

        let cancel = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = mpsc::channel();
        let thread_cancel = Arc::clone(&cancel);

        let named = thread::Builder::new().name(format!("density-field-{generation}"));
        let spawned = (self.spawn)(
            named,
            Box::new(move || {
                let bounds = request.bounds();
                let result = build_density_field(&request, &thread_cancel)
                    .and_then(|built| DensityField::from_result(built, bounds));
                // The receiver is gone if this build was superseded.
                let _ = sender.send(result);
            }),
        );

        match spawned {
            Ok(()) => {
                log::debug!("started density field build {generation}");
                self.in_flight = Some(InFlight {
                    generation,
                    cancel,
                    receiver,
                });
                Ok(generation)
            }
            Err(e) => {
                log::error!("could not start density field build: {e}; rendering without volumetrics");
                Err(BuildError::Spawn(e))
            }
        }
    }

    /// Cancel the outstanding build, if any.
    pub fn cancel(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.abandon();
        }
    }

    /// Whether a build is outstanding.
    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Generation of the most recent request (0 before the first).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Non-blocking check for a finished build.
    ///
    /// Returns `None` while nothing is finished (or nothing is in flight).
    pub fn poll(&mut self) -> Option<Result<BuiltField, BuildError>> {
        let in_flight = self.in_flight.as_ref()?;
        let outcome = match in_flight.receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(BuildError::Disconnected),
        };
        self.finish(outcome)
    }

    /// Block until the outstanding build finishes.
    ///
    /// Returns `None` if nothing is in flight.
    pub fn wait(&mut self) -> Option<Result<BuiltField, BuildError>> {
        let in_flight = self.in_flight.as_ref()?;
        let outcome = in_flight
            .receiver
            .recv()
            .unwrap_or(Err(BuildError::Disconnected));
        self.finish(outcome)
    }

    fn finish(
        &mut self,
        outcome: Result<DensityField, BuildError>,
    ) -> Option<Result<BuiltField, BuildError>> {
        let in_flight = self.in_flight.take()?;
        let generation = in_flight.generation;
        Some(match outcome {
            Ok(field) => {
                let stats = field.stats();
                log::debug!(
                    "density field {generation} ready: {} non-empty cells, max {:.3}, mean {:.4}",
                    stats.non_zero,
                    stats.max_density,
                    stats.mean_density
                );
                if stats.non_zero == 0 {
                    log::warn!("density field {generation} is empty");
                }
                Ok(BuiltField { generation, field })
            }
            Err(e) => {
                log::error!("density field build {generation} failed: {e}");
                Err(e)
            }
        })
    }
}

impl Drop for FieldBuilder {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clusters::{generate_clusters, ClusterSpec};
    use crate::params::GalaxyParams;
    use crate::sampling::SampleRng;

    fn request(grid: u32) -> FieldBuildRequest {
        let params = GalaxyParams::default().with_grid_size(grid);
        let mut rng = SampleRng::seeded(3);
        let clusters = generate_clusters(&ClusterSpec::from_params(&params), &mut rng);
        FieldBuildRequest::from_params(&params, clusters.into())
    }

    #[test]
    fn test_idle_builder() {
        let mut builder = FieldBuilder::new();
        assert!(!builder.is_pending());
        assert!(builder.poll().is_none());
        assert!(builder.wait().is_none());
        assert_eq!(builder.generation(), 0);
    }

    #[test]
    fn test_request_and_wait() {
        let mut builder = FieldBuilder::new();
        let generation = builder.request(request(8)).unwrap();
        assert!(builder.is_pending());
        let built = builder.wait().unwrap().unwrap();
        assert_eq!(built.generation, generation);
        assert_eq!(built.field.grid_size(), 8);
        assert!(!builder.is_pending());
    }

    #[test]
    fn test_newer_request_supersedes() {
        let mut builder = FieldBuilder::new();
        let first = builder.request(request(32)).unwrap();
        let second = builder.request(request(8)).unwrap();
        assert!(second > first);
        let built = builder.wait().unwrap().unwrap();
        assert_eq!(built.generation, second);
        assert_eq!(built.field.grid_size(), 8);
        // Nothing from the first build can arrive afterwards.
        assert!(builder.poll().is_none());
    }

    #[test]
    fn test_poll_eventually_ready() {
        let mut builder = FieldBuilder::new();
        builder.request(request(8)).unwrap();
        let start = std::time::Instant::now();
        loop {
            if let Some(result) = builder.poll() {
                assert!(result.is_ok());
                break;
            }
            assert!(start.elapsed().as_secs() < 60, "build never finished");
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
    }

    #[test]
    fn test_spawn_failure_is_returned() {
        let mut builder = FieldBuilder::with_spawner(|_, _| Err(io::Error::other("no threads left")));
        let result = builder.request(request(8));
        assert!(matches!(result, Err(BuildError::Spawn(_))));
        assert!(!builder.is_pending());
        assert!(builder.poll().is_none());
        assert!(builder.wait().is_none());
    }

    #[test]
    fn test_cancel_clears_pending() {
        let mut builder = FieldBuilder::new();
        builder.request(request(16)).unwrap();
        builder.cancel();
        assert!(!builder.is_pending());
        assert!(builder.poll().is_none());
    }
}
