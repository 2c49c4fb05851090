/// Distance between neighbouring grid samples on both axes
pub const DEFAULT_GRID_STEP: f32 = 1.0;

/// Tolerance used when counting how many steps fit in a range
pub const GRID_STEP_EPSILON: f32 = 1e-4;

pub const DEFAULT_RESULTS_FILE: &str = "results.txt";
pub const DEFAULT_IMAGE_FILE: &str = "surface.png";

/// Separates records sharing one physical line of the results file
pub const RECORD_SEPARATOR: char = ';';

pub const DEFAULT_MIN_X: i32 = -10;
pub const DEFAULT_MAX_X: i32 = 10;
pub const DEFAULT_MIN_Y: i32 = -10;
pub const DEFAULT_MAX_Y: i32 = 10;
pub const DEFAULT_THREAD_COUNT: i32 = 4;
pub const DEFAULT_SAMPLES_PER_LINE: i32 = 25;

/// Largest worker group one job may request
pub const MAX_THREAD_COUNT: i32 = 1024;

/// Upper bound on the number of samples one job may request
pub const MAX_GRID_SAMPLES: usize = 50_000_000;
