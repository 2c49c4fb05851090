/// Error taxonomy for the compute, storage and render stages
use std::path::PathBuf;
use thiserror::Error;

/// Rejected job specifications. Raised before any worker is spawned.
#[derive(Debug, Error, PartialEq)]
pub enum JobError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open results file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to append to results file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to clear results file {path}: {source}")]
    Clear {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read results file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("surface {width}x{height} leaves no room to draw")]
    EmptySurface { width: u32, height: u32 },
    #[error("no points to draw")]
    NoPoints,
    #[error("projection produced a non-finite coordinate for point {index}")]
    NonFinite { index: usize },
    #[error("failed to encode frame: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum LabError {
    #[error(transparent)]
    Job(#[from] JobError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to spawn worker thread {worker_id}: {source}")]
    Spawn {
        worker_id: usize,
        source: std::io::Error,
    },
}
