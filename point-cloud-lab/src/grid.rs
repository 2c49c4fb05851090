/// Job specification and index-space partitioning of the sampling grid
use crate::error::JobError;
use constants::sampling::{GRID_STEP_EPSILON, MAX_GRID_SAMPLES, MAX_THREAD_COUNT};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Input contract handed over by the caller for one computation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeJobSpec {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
    pub thread_count: i32,
    /// Records each worker buffers before appending them as one line
    pub sample_count_per_thread: i32,
}

impl ComputeJobSpec {
    pub fn validate(&self) -> Result<(), JobError> {
        if !(1..=MAX_THREAD_COUNT).contains(&self.thread_count) {
            return Err(JobError::InvalidArgument(format!(
                "thread count must be between 1 and {}, got {}",
                MAX_THREAD_COUNT, self.thread_count
            )));
        }
        if self.sample_count_per_thread < 1 {
            return Err(JobError::InvalidArgument(format!(
                "sample count per thread must be at least 1, got {}",
                self.sample_count_per_thread
            )));
        }
        if self.max_x <= self.min_x {
            return Err(JobError::InvalidArgument(format!(
                "degenerate X range [{}, {}]",
                self.min_x, self.max_x
            )));
        }
        if self.max_y <= self.min_y {
            return Err(JobError::InvalidArgument(format!(
                "degenerate Y range [{}, {}]",
                self.min_y, self.max_y
            )));
        }
        Ok(())
    }
}

/// The full `[min_x, max_x] × [min_y, max_y]` grid sampled at a fixed step.
/// Sample values are always derived from their index so no drift accumulates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingGrid {
    pub origin_x: f32,
    pub origin_y: f32,
    pub step: f32,
    pub columns: usize,
    pub rows: usize,
}

impl SamplingGrid {
    pub fn new(spec: &ComputeJobSpec, step: f32) -> Result<Self, JobError> {
        spec.validate()?;
        if !step.is_finite() || step <= 0.0 {
            return Err(JobError::InvalidArgument(format!(
                "grid step must be a positive number, got {}",
                step
            )));
        }

        let columns = steps_in(spec.min_x, spec.max_x, step);
        let rows = steps_in(spec.min_y, spec.max_y, step);
        if columns * rows > MAX_GRID_SAMPLES as f64 {
            return Err(JobError::InvalidArgument(format!(
                "grid of {}x{} samples at step {} exceeds the limit of {}",
                columns, rows, step, MAX_GRID_SAMPLES
            )));
        }
        let (columns, rows) = (columns as usize, rows as usize);

        Ok(Self {
            origin_x: spec.min_x as f32,
            origin_y: spec.min_y as f32,
            step,
            columns,
            rows,
        })
    }

    pub fn x_at(&self, column: usize) -> f32 {
        self.origin_x + column as f32 * self.step
    }

    pub fn y_at(&self, row: usize) -> f32 {
        self.origin_y + row as f32 * self.step
    }

    pub fn sample_count(&self) -> usize {
        self.columns * self.rows
    }

    /// Split the column index space into `parts` contiguous ranges. The last
    /// range absorbs the remainder, so together they cover every column once.
    pub fn partition(&self, parts: usize) -> Vec<GridRange> {
        let parts = parts.max(1);
        let base = self.columns / parts;

        (0..parts)
            .map(|i| {
                let start = i * base;
                let end = if i + 1 == parts {
                    self.columns
                } else {
                    start + base
                };
                GridRange {
                    worker_id: i + 1,
                    columns: start..end,
                    grid: *self,
                }
            })
            .collect()
    }
}

/// Inclusive sample count along one axis, kept in f64 until it is known to fit.
fn steps_in(min: i32, max: i32, step: f32) -> f64 {
    let span = (max as i64 - min as i64) as f64;
    (span / step as f64 + GRID_STEP_EPSILON as f64).floor() + 1.0
}

/// The slice of the grid one worker samples: a run of whole columns.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRange {
    pub worker_id: usize,
    pub columns: Range<usize>,
    grid: SamplingGrid,
}

impl GridRange {
    pub fn step(&self) -> f32 {
        self.grid.step
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.grid.rows == 0
    }

    pub fn min_x(&self) -> f32 {
        self.grid.x_at(self.columns.start)
    }

    pub fn max_x(&self) -> f32 {
        self.grid.x_at(self.columns.end.max(self.columns.start + 1) - 1)
    }

    pub fn min_y(&self) -> f32 {
        self.grid.origin_y
    }

    pub fn max_y(&self) -> f32 {
        self.grid.y_at(self.grid.rows.saturating_sub(1))
    }

    pub fn sample_count(&self) -> usize {
        self.columns.len() * self.grid.rows
    }

    /// Column-major `(x, y)` pairs in deterministic order.
    pub fn samples(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        let grid = self.grid;
        self.columns
            .clone()
            .flat_map(move |column| (0..grid.rows).map(move |row| (grid.x_at(column), grid.y_at(row))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn spec(min_x: i32, max_x: i32, min_y: i32, max_y: i32, threads: i32) -> ComputeJobSpec {
        ComputeJobSpec {
            min_x,
            max_x,
            min_y,
            max_y,
            thread_count: threads,
            sample_count_per_thread: 10,
        }
    }

    #[test]
    fn rejects_invalid_specs() {
        assert!(spec(0, 4, 0, 4, 0).validate().is_err());
        assert!(spec(4, 4, 0, 4, 1).validate().is_err());
        assert!(spec(0, 4, 3, 1, 1).validate().is_err());

        let mut no_batch = spec(0, 4, 0, 4, 2);
        no_batch.sample_count_per_thread = 0;
        assert!(matches!(no_batch.validate(), Err(JobError::InvalidArgument(_))));

        assert!(SamplingGrid::new(&spec(0, 4, 0, 4, 1), 0.0).is_err());
        assert!(SamplingGrid::new(&spec(0, 4, 0, 4, 1), f32::NAN).is_err());
    }

    #[test]
    fn rejects_oversized_groups() {
        assert!(spec(0, 4, 0, 4, MAX_THREAD_COUNT).validate().is_ok());
        for threads in [MAX_THREAD_COUNT + 1, i32::MAX] {
            assert!(matches!(
                spec(0, 4, 0, 4, threads).validate(),
                Err(JobError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn rejects_grids_too_fine_to_sample() {
        for step in [1e-20, f32::MIN_POSITIVE, 1e-4] {
            assert!(matches!(
                SamplingGrid::new(&spec(0, 1, 0, 1, 1), step),
                Err(JobError::InvalidArgument(_))
            ));
        }
        let wide = spec(i32::MIN, i32::MAX, i32::MIN, i32::MAX, 1);
        assert!(SamplingGrid::new(&wide, 1.0).is_err());
    }

    #[test]
    fn counts_inclusive_grid_cells() {
        let grid = SamplingGrid::new(&spec(0, 4, 0, 4, 2), 1.0).unwrap();
        assert_eq!((grid.columns, grid.rows), (5, 5));

        let fine = SamplingGrid::new(&spec(-1, 1, 0, 1, 1), 0.1).unwrap();
        assert_eq!((fine.columns, fine.rows), (21, 11));
        assert!((fine.x_at(20) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn two_workers_split_zero_to_four() {
        let grid = SamplingGrid::new(&spec(0, 4, 0, 4, 2), 1.0).unwrap();
        let parts = grid.partition(2);

        assert_eq!(parts[0].columns, 0..2);
        assert_eq!(parts[1].columns, 2..5);
        assert_eq!((parts[0].min_x(), parts[0].max_x()), (0.0, 1.0));
        assert_eq!((parts[1].min_x(), parts[1].max_x()), (2.0, 4.0));
        assert_eq!(parts[0].worker_id, 1);
        assert_eq!(parts[1].worker_id, 2);
    }

    #[test]
    fn partitions_cover_grid_exactly_once() {
        for (min_x, max_x) in [(0, 4), (-7, 13), (0, 1), (-100, 100)] {
            let grid = SamplingGrid::new(&spec(min_x, max_x, -3, 3, 1), 1.0).unwrap();
            for threads in 1..=16 {
                let mut seen = HashSet::new();
                let mut total = 0;
                let mut next_column = 0;

                for range in grid.partition(threads) {
                    assert_eq!(range.columns.start, next_column, "gap or overlap");
                    next_column = range.columns.end;
                    for (x, y) in range.samples() {
                        assert!(seen.insert((x.to_bits(), y.to_bits())), "duplicate sample");
                        total += 1;
                    }
                }

                assert_eq!(next_column, grid.columns);
                assert_eq!(total, grid.sample_count());
            }
        }
    }

    #[test]
    fn more_threads_than_columns_leaves_empty_ranges() {
        let grid = SamplingGrid::new(&spec(0, 1, 0, 1, 5), 1.0).unwrap();
        let parts = grid.partition(5);

        assert_eq!(parts.len(), 5);
        assert!(parts[..4].iter().all(GridRange::is_empty));
        assert_eq!(parts[4].sample_count(), 4);
    }
}
