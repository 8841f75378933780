// THEORY:
// The `parallel_pipeline` module hosts detections for an interactive caller.
// Photographs arrive faster than the pipeline can trace them when an operator
// is retaking shots, so the session hands each submission to a worker pool
// and tags it with a generation number. Only the most recent submission is
// current; awaiting a superseded one yields `None` rather than a stale
// polygon the operator no longer wants.
//
// Layout mirrors the rest of the engine: a single dispatcher task fans
// submissions out round-robin to one worker per core, each worker owning its
// own `DetectionPipeline`, with a oneshot channel carrying the result back.

use crate::pipeline::{BoundaryPolygon, DetectionConfig, DetectionPipeline, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, oneshot};

struct DetectionTask {
    generation: u64,
    png_bytes: Vec<u8>,
    result_sender: oneshot::Sender<Result<BoundaryPolygon>>,
}

/// A handle to one submitted photograph.
pub struct SubmittedDetection {
    generation: u64,
    latest_generation: Arc<AtomicU64>,
    result_receiver: oneshot::Receiver<Result<BoundaryPolygon>>,
}

impl SubmittedDetection {
    /// Waits for the detection. Returns `None` when a newer submission has
    /// superseded this one, whether or not its result was ever computed.
    pub async fn outcome(self) -> Option<Result<BoundaryPolygon>> {
        let result = self.result_receiver.await.ok()?;
        if self.latest_generation.load(Ordering::SeqCst) != self.generation {
            return None;
        }
        Some(result)
    }
}

/// A long-lived detection service for one measurement session.
pub struct DetectionSession {
    task_sender: mpsc::UnboundedSender<DetectionTask>,
    latest_generation: Arc<AtomicU64>,
    dispatcher: tokio::task::JoinHandle<()>,
    workers: Vec<tokio::task::JoinHandle<()>>,
}

impl DetectionSession {
    pub fn new(config: DetectionConfig) -> Self {
        Self::with_workers(config, num_cpus::get().max(1))
    }

    pub fn with_workers(config: DetectionConfig, worker_count: usize) -> Self {
        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<DetectionTask>();
        let latest_generation = Arc::new(AtomicU64::new(0));

        // Create a single dispatcher that distributes tasks to workers.
        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..worker_count.max(1))
            .map(|_| mpsc::unbounded_channel::<DetectionTask>())
            .unzip();

        let dispatcher = tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(task) = task_receiver.recv().await {
                let _ = worker_senders[worker_idx].send(task);
                worker_idx = (worker_idx + 1) % worker_senders.len();
            }
        });

        let mut workers = Vec::new();
        for mut worker_receiver in worker_receivers {
            let pipeline = DetectionPipeline::new(config.clone());
            let worker_latest = Arc::clone(&latest_generation);

            workers.push(tokio::spawn(async move {
                while let Some(task) = worker_receiver.recv().await {
                    // A superseded submission is not worth tracing. Dropping
                    // the sender resolves its receiver as superseded.
                    if worker_latest.load(Ordering::SeqCst) != task.generation {
                        log::debug!("skipping superseded submission {}", task.generation);
                        continue;
                    }
                    let result = pipeline.detect(&task.png_bytes);
                    let _ = task.result_sender.send(result);
                }
            }));
        }

        Self {
            task_sender,
            latest_generation,
            dispatcher,
            workers,
        }
    }

    /// Queues one photograph and makes it the current submission, superseding
    /// every earlier one.
    pub fn submit(&self, png_bytes: Vec<u8>) -> SubmittedDetection {
        let generation = self.latest_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (result_sender, result_receiver) = oneshot::channel();

        let _ = self.task_sender.send(DetectionTask {
            generation,
            png_bytes,
            result_sender,
        });

        SubmittedDetection {
            generation,
            latest_generation: Arc::clone(&self.latest_generation),
            result_receiver,
        }
    }

    /// Drains the pool and waits for every worker to exit.
    pub async fn shutdown(self) {
        let Self {
            task_sender,
            dispatcher,
            workers,
            ..
        } = self;
        drop(task_sender);
        let _ = dispatcher.await;
        let _ = futures::future::join_all(workers).await;
    }
}
