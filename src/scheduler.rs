//! Latest-wins scheduling of projection requests
//!
//! Interactive callers change parameters faster than they need answers. The
//! scheduler keeps a single pending slot: a new request replaces whatever has
//! not started yet, and the worker always computes the most recent one.
//! Projections run on the blocking pool; a result whose request was
//! superseded while it ran is dropped instead of published.
//! Results are published on a watch channel tagged with the generation of
//! the request that produced them, so a caller can tell a stale answer from
//! the one it is waiting for.
//!
//! Must be created inside a tokio runtime.

use log::{debug, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::projection::{ProjectionConfig, ProjectionOutput};
use crate::scenario::ScenarioRunner;

/// Parameters for one projection of one variant
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionRequest {
    pub variant: String,
    pub config: ProjectionConfig,
}

impl ProjectionRequest {
    pub fn new(variant: impl Into<String>, config: ProjectionConfig) -> Self {
        Self {
            variant: variant.into(),
            config,
        }
    }
}

/// A finished projection and the request generation it answers
#[derive(Debug)]
pub struct ScheduledProjection {
    pub generation: u64,
    pub request: ProjectionRequest,
    pub outcome: Result<ProjectionOutput>,
}

type Pending = Option<(u64, ProjectionRequest)>;
type Published = Option<Arc<ScheduledProjection>>;

pub struct ProjectionScheduler {
    requests: watch::Sender<Pending>,
    results: watch::Receiver<Published>,
    generation: AtomicU64,
    worker: JoinHandle<()>,
}

impl ProjectionScheduler {
    /// Start the worker task on the current runtime
    pub fn spawn(runner: Arc<ScenarioRunner>) -> Self {
        let (requests, mut pending) = watch::channel::<Pending>(None);
        let (published, results) = watch::channel::<Published>(None);

        let worker = tokio::spawn(async move {
            while pending.changed().await.is_ok() {
                let latest = pending.borrow_and_update().clone();
                let Some((generation, request)) = latest else {
                    continue;
                };

                debug!("Projecting {} for generation {}", request.variant, generation);
                let job_runner = Arc::clone(&runner);
                let job = request.clone();
                let task = tokio::task::spawn_blocking(move || job_runner.run(&job.variant, &job.config));
                let outcome = match task.await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!("Projection task for generation {} failed: {}", generation, e);
                        continue;
                    }
                };

                // A newer request arrived while this one ran
                if pending.has_changed().unwrap_or(false) {
                    debug!("Discarding superseded generation {}", generation);
                    continue;
                }

                let done = ScheduledProjection {
                    generation,
                    request,
                    outcome,
                };
                if published.send(Some(Arc::new(done))).is_err() {
                    break;
                }
            }
        });

        Self {
            requests,
            results,
            generation: AtomicU64::new(0),
            worker,
        }
    }

    /// Replace the pending request; returns its generation number
    pub fn submit(&self, request: ProjectionRequest) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        self.requests.send_replace(Some((generation, request)));
        generation
    }

    /// Receiver for published results; subscribe before submitting
    pub fn subscribe(&self) -> watch::Receiver<Published> {
        self.results.clone()
    }

    /// Most recently published result, if any
    pub fn latest(&self) -> Published {
        self.results.borrow().clone()
    }

    /// Stop accepting requests and wait for the worker to finish
    pub async fn shutdown(self) {
        let Self { requests, worker, .. } = self;
        drop(requests);
        let _ = worker.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CalibrationSettings;
    use crate::error::ModelError;
    use crate::population::{PopulationIndex, Record};
    use std::time::Duration;

    fn runner() -> Arc<ScenarioRunner> {
        let mut records = Vec::new();
        for year in 2024..=2026 {
            for age in 0..=100 {
                records.push(Record {
                    location: "Argentina".to_string(),
                    year,
                    age,
                    value: 10.0,
                    variant: "Estimates".to_string(),
                });
            }
        }
        let index = PopulationIndex::from_records(&records, &records);
        Arc::new(ScenarioRunner::calibrate(&index, CalibrationSettings::default()))
    }

    fn request(variant: &str, bias: f64) -> ProjectionRequest {
        ProjectionRequest::new(
            variant,
            ProjectionConfig {
                fertility_bias: bias,
                end_year: 2050,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_rapid_requests_coalesce_to_latest() {
        let runner = runner();
        let scheduler = ProjectionScheduler::spawn(runner.clone());
        let mut results = scheduler.subscribe();

        for bias in [-1.0, 0.0, 1.0] {
            scheduler.submit(request("Estimates", bias));
        }

        results.changed().await.unwrap();
        let first = results.borrow_and_update().clone().unwrap();

        // The worker never saw the two superseded requests
        assert_eq!(first.generation, 3);
        assert_eq!(first.request.config.fertility_bias, 1.0);
        let expected = runner.run("Estimates", &first.request.config).unwrap();
        assert_eq!(first.outcome.as_ref().unwrap(), &expected);

        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn test_each_settled_request_is_answered() {
        let scheduler = ProjectionScheduler::spawn(runner());
        let mut results = scheduler.subscribe();

        let first = scheduler.submit(request("Estimates", 0.0));
        results.changed().await.unwrap();
        assert_eq!(results.borrow_and_update().as_ref().unwrap().generation, first);

        let second = scheduler.submit(request("Estimates", 0.5));
        results.changed().await.unwrap();
        assert_eq!(results.borrow_and_update().as_ref().unwrap().generation, second);
        assert_eq!(scheduler.latest().unwrap().generation, second);

        scheduler.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_request_superseded_mid_run_is_not_published() {
        let runner = runner();
        let scheduler = ProjectionScheduler::spawn(runner.clone());
        let mut results = scheduler.subscribe();

        let long = ProjectionRequest::new(
            "Estimates",
            ProjectionConfig {
                end_year: 2026 + 1_000_000,
                ..Default::default()
            },
        );
        let first = scheduler.submit(long);
        tokio::time::sleep(Duration::from_millis(20)).await;
        let second = scheduler.submit(request("Estimates", 0.5));

        results.changed().await.unwrap();
        let published = results.borrow_and_update().clone().unwrap();

        assert_eq!(first, 1);
        assert_eq!(published.generation, second);
        let expected = runner.run("Estimates", &published.request.config).unwrap();
        assert_eq!(published.outcome.as_ref().unwrap(), &expected);

        scheduler.shutdown().await;
        assert_eq!(results.borrow().as_ref().unwrap().generation, second);
    }

    #[tokio::test]
    async fn test_unknown_variant_is_reported_not_dropped() {
        let scheduler = ProjectionScheduler::spawn(runner());
        let mut results = scheduler.subscribe();

        scheduler.submit(request("High", 0.0));
        results.changed().await.unwrap();

        let done = results.borrow_and_update().clone().unwrap();
        assert!(matches!(done.outcome, Err(ModelError::UnknownVariant(_))));

        scheduler.shutdown().await;
    }
}
