/// One unit of parallel sampling work
use crate::cancel::CancellationToken;
use crate::grid::GridRange;
use crate::point::PointRecord;
use crate::progress::{ProgressListener, ProgressReport};
use crate::store::ResultStore;
use crate::surface::SurfaceFunction;
use chrono::{DateTime, Local};
use log::{debug, warn};
use std::time::{Duration, Instant};

/// What a worker did before it returned.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerOutcome {
    pub worker_id: usize,
    pub samples_written: usize,
    /// Samples whose line could not be appended
    pub samples_failed: usize,
    pub cancelled: bool,
    pub panicked: bool,
    pub elapsed: Duration,
}

impl WorkerOutcome {
    pub(crate) fn panicked(worker_id: usize) -> Self {
        Self {
            worker_id,
            samples_written: 0,
            samples_failed: 0,
            cancelled: false,
            panicked: true,
            elapsed: Duration::ZERO,
        }
    }
}

/// Samples a [`GridRange`] and appends the results to the shared store in
/// lines of `batch_size` records.
pub struct ComputeWorker<'a> {
    range: GridRange,
    batch_size: usize,
    surface: &'a dyn SurfaceFunction,
    store: &'a ResultStore,
    token: CancellationToken,
}

impl<'a> ComputeWorker<'a> {
    pub fn new(
        range: GridRange,
        batch_size: usize,
        surface: &'a dyn SurfaceFunction,
        store: &'a ResultStore,
        token: CancellationToken,
    ) -> Self {
        Self {
            range,
            batch_size: batch_size.max(1),
            surface,
            store,
            token,
        }
    }

    pub fn id(&self) -> usize {
        self.range.worker_id
    }

    /// Run to completion or until cancelled. Write failures are logged and the
    /// affected samples skipped; nothing is raised to the caller.
    pub fn run(&self, listener: &dyn ProgressListener) -> WorkerOutcome {
        let started_at = Local::now();
        let clock = Instant::now();
        let total = self.range.sample_count();

        let mut batch = Vec::with_capacity(self.batch_size.min(total));
        let mut tally = Tally::default();
        let mut cancelled = false;

        for (x, y) in self.range.samples() {
            if self.token.is_cancelled() {
                cancelled = true;
                break;
            }

            batch.push(PointRecord::new(x, y, self.surface.evaluate(x, y)));
            if batch.len() >= self.batch_size {
                self.flush(&mut batch, &mut tally);
                self.report(listener, started_at, clock, percent(tally.processed(), total));
            }
        }

        if !batch.is_empty() {
            self.flush(&mut batch, &mut tally);
        }
        let final_percent = if cancelled {
            percent(tally.processed(), total)
        } else {
            100
        };
        self.report(listener, started_at, clock, final_percent);

        debug!(
            "Worker {} done: {} written, {} failed, cancelled={}",
            self.id(),
            tally.written,
            tally.failed,
            cancelled
        );

        WorkerOutcome {
            worker_id: self.id(),
            samples_written: tally.written,
            samples_failed: tally.failed,
            cancelled,
            panicked: false,
            elapsed: clock.elapsed(),
        }
    }

    fn flush(&self, batch: &mut Vec<PointRecord>, tally: &mut Tally) {
        match self.store.append_line(batch) {
            Ok(()) => tally.written += batch.len(),
            Err(err) => {
                warn!("Worker {} skipped {} samples: {}", self.id(), batch.len(), err);
                tally.failed += batch.len();
            }
        }
        batch.clear();
    }

    fn report(
        &self,
        listener: &dyn ProgressListener,
        started_at: DateTime<Local>,
        clock: Instant,
        percent_complete: i32,
    ) {
        listener.on_progress(&ProgressReport {
            thread_id: self.id(),
            start_time: started_at,
            finish_time: Local::now(),
            duration: clock.elapsed(),
            percent_complete,
        });
    }
}

#[derive(Default)]
struct Tally {
    written: usize,
    failed: usize,
}

impl Tally {
    fn processed(&self) -> usize {
        self.written + self.failed
    }
}

fn percent(done: usize, total: usize) -> i32 {
    if total == 0 {
        return 100;
    }
    (done.saturating_mul(100) / total).min(100) as i32
}
