/// Progress reports emitted by compute workers and their consumers
use chrono::{DateTime, Local};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::BTreeMap;
use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    /// 1-based worker id
    pub thread_id: usize,
    pub start_time: DateTime<Local>,
    /// Time the report was produced
    pub finish_time: DateTime<Local>,
    pub duration: Duration,
    pub percent_complete: i32,
}

/// Display strings handed to UI consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressFields {
    pub start_time: String,
    pub finish_time: String,
    pub duration: String,
}

impl ProgressReport {
    pub fn clamped_percent(&self) -> u8 {
        self.percent_complete.clamp(0, 100) as u8
    }

    pub fn fields(&self) -> ProgressFields {
        ProgressFields {
            start_time: self.start_time.format("%H:%M:%S%.3f").to_string(),
            finish_time: self.finish_time.format("%H:%M:%S%.3f").to_string(),
            duration: format!("{:.3} s", self.duration.as_secs_f64()),
        }
    }
}

/// Receives progress from worker threads. Implementations must not assume
/// which thread calls them.
pub trait ProgressListener: Send + Sync {
    fn on_progress(&self, report: &ProgressReport);
}

impl<F> ProgressListener for F
where
    F: Fn(&ProgressReport) + Send + Sync,
{
    fn on_progress(&self, report: &ProgressReport) {
        self(report)
    }
}

/// Forwards reports over a channel to a single consumer loop.
pub struct ChannelListener {
    sender: Sender<ProgressReport>,
}

impl ChannelListener {
    pub fn new(sender: Sender<ProgressReport>) -> Self {
        Self { sender }
    }
}

impl ProgressListener for ChannelListener {
    fn on_progress(&self, report: &ProgressReport) {
        // a closed consumer only means nobody is watching any more
        let _ = self.sender.send(report.clone());
    }
}

/// Terminal progress board with one bar per worker.
pub struct ProgressBoard {
    multi: MultiProgress,
    bars: BTreeMap<usize, ProgressBar>,
    style: ProgressStyle,
}

impl Default for ProgressBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressBoard {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// A board that tracks state without drawing anything.
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let style = ProgressStyle::default_bar()
            .template("{prefix:>9} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("▉▊▋▌▍▎▏ ");

        Self {
            multi: MultiProgress::with_draw_target(target),
            bars: BTreeMap::new(),
            style,
        }
    }

    pub fn update(&mut self, report: &ProgressReport) {
        let bar = self.bars.entry(report.thread_id).or_insert_with(|| {
            let bar = self.multi.add(ProgressBar::new(100));
            bar.set_style(self.style.clone());
            bar.set_prefix(format!("worker {}", report.thread_id));
            bar
        });

        let fields = report.fields();
        bar.set_position(u64::from(report.clamped_percent()));
        bar.set_message(format!(
            "{} -> {} ({})",
            fields.start_time, fields.finish_time, fields.duration
        ));
    }

    pub fn position(&self, thread_id: usize) -> Option<u64> {
        self.bars.get(&thread_id).map(ProgressBar::position)
    }

    pub fn finish(&self) {
        for bar in self.bars.values() {
            bar.finish();
        }
    }

    /// Consume reports until every sender is dropped.
    pub fn drain(mut self, receiver: Receiver<ProgressReport>) -> Self {
        for report in receiver {
            self.update(&report);
        }
        self.finish();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;

    fn report(thread_id: usize, percent: i32) -> ProgressReport {
        let now = Local::now();
        ProgressReport {
            thread_id,
            start_time: now,
            finish_time: now,
            duration: Duration::from_millis(1500),
            percent_complete: percent,
        }
    }

    #[test]
    fn clamps_percent() {
        assert_eq!(report(1, -5).clamped_percent(), 0);
        assert_eq!(report(1, 42).clamped_percent(), 42);
        assert_eq!(report(1, 250).clamped_percent(), 100);
    }

    #[test]
    fn formats_fields() {
        let fields = report(1, 0).fields();
        assert_eq!(fields.duration, "1.500 s");
        assert_eq!(fields.start_time.len(), "00:00:00.000".len());
    }

    #[test]
    fn board_drains_channel_from_workers() {
        let (sender, receiver) = mpsc::channel();
        let consumer = thread::spawn(move || ProgressBoard::hidden().drain(receiver));

        let producers: Vec<_> = (1..=3)
            .map(|id| {
                let listener = ChannelListener::new(sender.clone());
                thread::spawn(move || {
                    for percent in [10, 60, 120] {
                        listener.on_progress(&report(id, percent));
                    }
                })
            })
            .collect();
        drop(sender);
        for producer in producers {
            producer.join().unwrap();
        }

        let board = consumer.join().unwrap();
        for id in 1..=3 {
            assert_eq!(board.position(id), Some(100));
        }
        assert_eq!(board.position(4), None);
    }
}
