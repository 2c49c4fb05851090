/// Spawns, partitions and joins the compute workers of a run
use crate::cancel::CancellationToken;
use crate::error::LabError;
use crate::grid::{ComputeJobSpec, SamplingGrid};
use crate::progress::ProgressListener;
use crate::store::ResultStore;
use crate::surface::SurfaceFunction;
use crate::worker::{ComputeWorker, WorkerOutcome};
use constants::sampling::DEFAULT_GRID_STEP;
use log::{debug, error, info};
use parking_lot::Mutex;
use std::mem;
use std::sync::Arc;
use std::thread::{self, ScopedJoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub outcomes: Vec<WorkerOutcome>,
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn samples_written(&self) -> usize {
        self.outcomes.iter().map(|o| o.samples_written).sum()
    }

    pub fn samples_failed(&self) -> usize {
        self.outcomes.iter().map(|o| o.samples_failed).sum()
    }
}

/// Runs one group of workers at a time against a shared [`ResultStore`].
///
/// `run` blocks until every worker has returned. Starting a new run while one
/// is in flight cancels the old group and waits for it before the store is
/// cleared, so two groups never write concurrently.
pub struct ComputeCoordinator {
    store: Arc<ResultStore>,
    surface: Arc<dyn SurfaceFunction>,
    step: f32,
    active: Mutex<CancellationToken>,
    run_lock: Mutex<()>,
}

impl ComputeCoordinator {
    pub fn new(store: Arc<ResultStore>, surface: Arc<dyn SurfaceFunction>) -> Self {
        Self {
            store,
            surface,
            step: DEFAULT_GRID_STEP,
            active: Mutex::new(CancellationToken::new()),
            run_lock: Mutex::new(()),
        }
    }

    pub fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    pub fn store(&self) -> &Arc<ResultStore> {
        &self.store
    }

    pub fn run(
        &self,
        spec: &ComputeJobSpec,
        listener: &dyn ProgressListener,
    ) -> Result<RunSummary, LabError> {
        let grid = SamplingGrid::new(spec, self.step)?;

        // swap in this run's token and stop the previous group under one lock
        let token = CancellationToken::new();
        mem::replace(&mut *self.active.lock(), token.clone()).cancel();
        let _running = self.run_lock.lock();

        self.store.clear()?;

        let ranges = grid.partition(spec.thread_count as usize);
        let batch_size = spec.sample_count_per_thread as usize;
        info!(
            "Sampling {}x{} grid (step {}) with {} workers",
            grid.columns,
            grid.rows,
            grid.step,
            ranges.len()
        );

        let started = Instant::now();
        let surface = self.surface.as_ref();
        let store = self.store.as_ref();

        let outcomes = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(ranges.len());
            for range in ranges {
                let worker_id = range.worker_id;
                debug!(
                    "Worker {} takes columns {:?} (x {}..={})",
                    worker_id,
                    range.columns,
                    range.min_x(),
                    range.max_x()
                );

                let worker = ComputeWorker::new(range, batch_size, surface, store, token.clone());
                let spawned = thread::Builder::new()
                    .name(format!("compute-worker-{}", worker_id))
                    .spawn_scoped(scope, move || worker.run(listener));

                match spawned {
                    Ok(handle) => handles.push((worker_id, handle)),
                    Err(source) => {
                        token.cancel();
                        join_all(handles);
                        return Err(LabError::Spawn { worker_id, source });
                    }
                }
            }
            Ok(join_all(handles))
        })?;

        let summary = RunSummary {
            cancelled: token.is_cancelled(),
            elapsed: started.elapsed(),
            outcomes,
        };
        info!(
            "Run finished in {:.3} s: {} samples written, {} skipped{}",
            summary.elapsed.as_secs_f64(),
            summary.samples_written(),
            summary.samples_failed(),
            if summary.cancelled { " (cancelled)" } else { "" }
        );
        Ok(summary)
    }

    /// Ask the running group, if any, to stop at its next sample.
    pub fn cancel(&self) {
        self.active.lock().cancel();
    }
}

fn join_all(handles: Vec<(usize, ScopedJoinHandle<'_, WorkerOutcome>)>) -> Vec<WorkerOutcome> {
    handles
        .into_iter()
        .map(|(worker_id, handle)| {
            handle.join().unwrap_or_else(|_| {
                error!("Worker {} panicked", worker_id);
                WorkerOutcome::panicked(worker_id)
            })
        })
        .collect()
}
