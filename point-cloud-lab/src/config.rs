/// Run configuration: JSON file layer plus command line overrides
use crate::error::ConfigError;
use crate::grid::ComputeJobSpec;
use crate::surface::Surface;
use clap::Parser;
use constants::render_settings::{DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH};
use constants::sampling::{
    DEFAULT_GRID_STEP, DEFAULT_IMAGE_FILE, DEFAULT_MAX_X, DEFAULT_MAX_Y, DEFAULT_MIN_X,
    DEFAULT_MIN_Y, DEFAULT_RESULTS_FILE, DEFAULT_SAMPLES_PER_LINE, DEFAULT_THREAD_COUNT,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything one lab run needs. Keys missing from a config file take their
/// default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
    pub thread_count: i32,
    pub sample_count_per_thread: i32,
    pub step: f32,
    pub surface: Surface,
    pub results_path: PathBuf,
    pub image_path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Cancel the run once this many seconds have passed
    pub timeout_secs: Option<u64>,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            min_x: DEFAULT_MIN_X,
            max_x: DEFAULT_MAX_X,
            min_y: DEFAULT_MIN_Y,
            max_y: DEFAULT_MAX_Y,
            thread_count: DEFAULT_THREAD_COUNT,
            sample_count_per_thread: DEFAULT_SAMPLES_PER_LINE,
            step: DEFAULT_GRID_STEP,
            surface: Surface::default(),
            results_path: PathBuf::from(DEFAULT_RESULTS_FILE),
            image_path: PathBuf::from(DEFAULT_IMAGE_FILE),
            width: DEFAULT_SURFACE_WIDTH,
            height: DEFAULT_SURFACE_HEIGHT,
            timeout_secs: None,
        }
    }
}

impl LabConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn job_spec(&self) -> ComputeJobSpec {
        ComputeJobSpec {
            min_x: self.min_x,
            max_x: self.max_x,
            min_y: self.min_y,
            max_y: self.max_y,
            thread_count: self.thread_count,
            sample_count_per_thread: self.sample_count_per_thread,
        }
    }
}

/// Sample a surface on a grid with worker threads, then render the cloud.
#[derive(Debug, Parser)]
#[command(version, about, allow_negative_numbers = true)]
pub struct Cli {
    /// JSON config file; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub min_x: Option<i32>,
    #[arg(long)]
    pub max_x: Option<i32>,
    #[arg(long)]
    pub min_y: Option<i32>,
    #[arg(long)]
    pub max_y: Option<i32>,
    /// Number of worker threads
    #[arg(long, short = 't')]
    pub threads: Option<i32>,
    /// Records each worker writes per results line
    #[arg(long, short = 'n')]
    pub samples_per_line: Option<i32>,
    /// Grid step on both axes
    #[arg(long)]
    pub step: Option<f32>,
    #[arg(long, value_enum)]
    pub surface: Option<Surface>,
    #[arg(long)]
    pub results: Option<PathBuf>,
    /// Where the rendered PNG frame is written
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl Cli {
    /// Defaults, then the config file, then flags.
    pub fn resolve(&self) -> Result<LabConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => LabConfig::load(path)?,
            None => LabConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(&self, config: &mut LabConfig) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }

        set(&mut config.min_x, &self.min_x);
        set(&mut config.max_x, &self.max_x);
        set(&mut config.min_y, &self.min_y);
        set(&mut config.max_y, &self.max_y);
        set(&mut config.thread_count, &self.threads);
        set(&mut config.sample_count_per_thread, &self.samples_per_line);
        set(&mut config.step, &self.step);
        set(&mut config.surface, &self.surface);
        set(&mut config.results_path, &self.results);
        set(&mut config.image_path, &self.output);
        set(&mut config.width, &self.width);
        set(&mut config.height, &self.height);
        if self.timeout_secs.is_some() {
            config.timeout_secs = self.timeout_secs;
        }
    }
}
