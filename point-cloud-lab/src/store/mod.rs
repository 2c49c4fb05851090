/// File-backed append-only sink for computed points
pub mod codec;

use crate::error::StoreError;
use crate::point::PointRecord;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Results file shared by all workers of a run.
///
/// Every append encodes a complete line and writes it with a single call while
/// holding the writer lock, so lines from different workers never interleave.
pub struct ResultStore {
    path: PathBuf,
    writer: Mutex<File>,
}

impl ResultStore {
    /// Open (or create) the results file in append mode.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source| StoreError::Open {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(open_err)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(open_err)?;

        debug!("Results file opened: {}", path.display());
        Ok(Self {
            path,
            writer: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &PointRecord) -> Result<(), StoreError> {
        self.append_line(std::slice::from_ref(record))
    }

    /// Append `records` as one physical line.
    pub fn append_line(&self, records: &[PointRecord]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut line = codec::encode_line(records);
        line.push('\n');

        let mut file = self.writer.lock();
        file.write_all(line.as_bytes())
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })
    }

    /// Truncate the store. Must succeed before a run starts, otherwise a later
    /// read would mix in stale records.
    pub fn clear(&self) -> Result<(), StoreError> {
        let file = self.writer.lock();
        file.set_len(0)
            .and_then(|_| file.sync_all())
            .map_err(|source| StoreError::Clear {
                path: self.path.clone(),
                source,
            })?;

        debug!("Results file cleared: {}", self.path.display());
        Ok(())
    }

    /// Parse every recoverable record in file order. A missing file reads as
    /// an empty cloud.
    pub fn read_all(&self) -> Result<Vec<PointRecord>, StoreError> {
        let read_err = |source| StoreError::Read {
            path: self.path.clone(),
            source,
        };

        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!("Results file not found: {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(err) => return Err(read_err(err)),
        };

        let mut points = Vec::new();
        let mut dropped = 0;
        for line in BufReader::new(file).lines() {
            let line = line.map_err(read_err)?;
            dropped += codec::parse_line_into(&line, &mut points);
        }

        if dropped > 0 {
            warn!("Dropped {} malformed records from {}", dropped, self.path.display());
        }
        info!("Loaded {} points from {}", points.len(), self.path.display());
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    fn key(p: &PointRecord) -> (u32, u32, u32) {
        (p.x.to_bits(), p.y.to_bits(), p.z.to_bits())
    }

    #[test_log::test]
    fn write_then_read_returns_same_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::open(dir.path().join("results.txt")).unwrap();

        let records: Vec<_> = (0..10)
            .map(|i| PointRecord::new(i as f32, -(i as f32), i as f32 * 0.25))
            .collect();
        store.append(&records[0]).unwrap();
        store.append_line(&records[1..6]).unwrap();
        store.append_line(&records[6..]).unwrap();

        assert_eq!(store.read_all().unwrap(), records);
    }

    #[test_log::test]
    fn clear_discards_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::open(dir.path().join("results.txt")).unwrap();
        store.append(&PointRecord::new(1.0, 1.0, 1.0)).unwrap();

        store.clear().unwrap();
        assert!(store.read_all().unwrap().is_empty());

        store.append(&PointRecord::new(2.0, 2.0, 8.0)).unwrap();
        assert_eq!(store.read_all().unwrap(), vec![PointRecord::new(2.0, 2.0, 8.0)]);
    }

    #[test_log::test]
    fn tolerates_noise_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");
        fs::write(
            &path,
            "header line\n[0][0] z = 0, x = 0, y = 0\n\n[1][0] z = 1,5, x = 1\ngarbage [\n[2][0] z = 4, x = 2, y = 0\n",
        )
        .unwrap();

        let store = ResultStore::open(&path).unwrap();
        assert_eq!(
            store.read_all().unwrap(),
            vec![PointRecord::new(0.0, 0.0, 0.0), PointRecord::new(2.0, 0.0, 4.0)]
        );
    }

    #[test_log::test]
    fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");
        let store = ResultStore::open(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert!(store.read_all().unwrap().is_empty());
    }

    #[test_log::test]
    fn concurrent_appends_keep_lines_whole() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ResultStore::open(dir.path().join("nested/results.txt")).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for batch in 0..50 {
                        let records: Vec<_> = (0..7)
                            .map(|i| PointRecord::new(worker as f32, (batch * 7 + i) as f32, 0.5))
                            .collect();
                        store.append_line(&records).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let contents = fs::read_to_string(store.path()).unwrap();
        assert_eq!(contents.lines().count(), 8 * 50);
        assert!(contents.lines().all(|l| codec::parse_line(l).len() == 7));

        let points = store.read_all().unwrap();
        let unique: HashSet<_> = points.iter().map(key).collect();
        assert_eq!(points.len(), 8 * 50 * 7);
        assert_eq!(unique.len(), points.len());
    }
}
