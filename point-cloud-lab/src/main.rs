/// Surface sampling lab entry point
use clap::Parser;
use log::{info, warn};
use point_cloud_lab::config::Cli;
use point_cloud_lab::progress::{ChannelListener, ProgressBoard};
use point_cloud_lab::renderer::save_png;
use point_cloud_lab::{LabSession, ResultStore};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let config = Cli::parse().resolve()?;
    info!("Configuration: {:?}", config);

    let store = Arc::new(ResultStore::open(&config.results_path)?);
    let mut session = LabSession::new(store, Arc::new(config.surface), config.step);

    // Progress is marshalled onto a single consumer thread
    let (progress_tx, progress_rx) = mpsc::channel();
    let board = thread::spawn(move || ProgressBoard::new().drain(progress_rx));

    let (done_tx, done_rx) = mpsc::channel::<()>();
    let watchdog = config.timeout_secs.map(|secs| {
        let coordinator = session.coordinator();
        thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = done_rx.recv_timeout(Duration::from_secs(secs)) {
                warn!("Deadline of {} s reached, cancelling workers", secs);
                coordinator.cancel();
            }
        })
    });

    let listener = ChannelListener::new(progress_tx);
    let summary = session.run_computation(&config.job_spec(), &listener);
    drop(listener);
    drop(done_tx);

    if let Some(watchdog) = watchdog {
        if watchdog.join().is_err() {
            warn!("Deadline watchdog panicked");
        }
    }
    if board.join().is_err() {
        warn!("Progress board panicked");
    }
    let summary = summary?;

    let points = session.load_points()?;
    if summary.cancelled {
        warn!("Run was cancelled, rendering {} partial samples", points.len());
    }

    let frame = session.render(&points, config.width, config.height)?;
    save_png(frame, &config.image_path)?;
    info!("Saved {}", config.image_path.display());

    Ok(())
}
