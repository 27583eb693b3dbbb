use crate::config::BackupOptions;
use crate::error::Error;
use crate::model::{Archive, BackupProgress, STAGE_COMPLETED, STAGE_RUNNING, STAGE_STARTING};
use crate::notify::BackupNotifier;
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::warn;

pub const BACKUP_STARTED: &str = "Backup update started";
pub const BACKUP_COMPLETED: &str = "Backup finished successfully";
pub const BACKUP_COMPLETED_WITH_ERRORS: &str = "Backup finished with errors:";

/// Copies an archive under a bounded concurrency cap.
///
/// Workers run on a dedicated thread pool sized to the parallelism degree, so
/// the pool itself is the concurrency limiter: a worker holds its thread for
/// the whole transfer. Byte and item counters are atomics, the error list is
/// a mutex-guarded vec held only for the push. Individual file failures are
/// recorded and never abort the run; only invalid configuration does.
pub struct CopyExecutor {
    options: BackupOptions,
    notifier: Arc<dyn BackupNotifier>,
}

impl CopyExecutor {
    pub fn new(
        options: BackupOptions,
        notifier: Arc<dyn BackupNotifier>,
    ) -> Result<Self, Error> {
        options.validate()?;
        Ok(Self { options, notifier })
    }

    /// Copy every item in the archive, reporting progress to the notifier.
    ///
    /// Returns the per-item error list; completion means every scheduled copy
    /// finished, successfully or not. An empty archive is trivially
    /// successful.
    pub fn execute(&self, label: &str, archive: &Archive) -> Result<Vec<String>, Error> {
        let total_items = archive.len();
        let total_bytes = archive.total_bytes();

        self.notifier.progress(
            label,
            &BackupProgress {
                state: STAGE_STARTING,
                bytes_copied: 0,
                total_bytes,
                total_items,
                items_processed: 0,
            },
        );

        // All destination directories are created sequentially up front so
        // concurrent workers never race on directory creation. A failure here
        // surfaces again as the item's copy error, so it is only logged.
        for item in archive.items() {
            if let Some(dir) = item.target_path.parent() {
                if let Err(e) = fs::create_dir_all(dir) {
                    warn!("Could not create target directory {}: {}", dir.display(), e);
                }
            }
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.parallelism_degree)
            .build()
            .map_err(|e| Error::Other(format!("could not build copy pool: {}", e)))?;

        let bytes_copied = AtomicU64::new(0);
        let items_processed = AtomicUsize::new(0);
        let errors: Mutex<Vec<String>> = Mutex::new(Vec::new());
        let gate = ProgressGate::new();

        pool.install(|| {
            archive.items().par_iter().for_each(|item| {
                match copy_file(&item.source_path, &item.target_path, self.options.buffer_size)
                {
                    Ok(()) => {
                        bytes_copied.fetch_add(item.size_bytes.unwrap_or(0), Ordering::Relaxed);
                    }
                    Err(e) => {
                        errors.lock().unwrap().push(format!(
                            "[PATH]: {} [ERROR]: {}",
                            item.source_path.display(),
                            e
                        ));
                    }
                }
                let processed = items_processed.fetch_add(1, Ordering::Relaxed) + 1;
                let snapshot = BackupProgress {
                    state: STAGE_RUNNING,
                    bytes_copied: bytes_copied.load(Ordering::Relaxed),
                    total_bytes,
                    total_items,
                    items_processed: processed,
                };
                gate.report(self.notifier.as_ref(), label, &snapshot);
            });
        });

        self.notifier.progress(
            label,
            &BackupProgress {
                state: STAGE_COMPLETED,
                bytes_copied: bytes_copied.load(Ordering::Relaxed),
                total_bytes,
                total_items,
                items_processed: items_processed.load(Ordering::Relaxed),
            },
        );

        let errors = errors.into_inner().unwrap();
        let status = if errors.is_empty() {
            BACKUP_COMPLETED.to_string()
        } else {
            format!("{} {}", BACKUP_COMPLETED_WITH_ERRORS, errors.len())
        };
        self.notifier.notify(label, &status);

        Ok(errors)
    }
}

/// Stream `source` into `target` through a bounded buffer, overwriting the
/// destination. Any failure is the caller's to record.
fn copy_file(source: &Path, target: &Path, buffer_size: usize) -> io::Result<()> {
    let mut input = File::open(source)?;
    let mut output = File::create(target)?;
    let mut buffer = vec![0u8; buffer_size];

    loop {
        let read = input.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        output.write_all(&buffer[..read])?;
    }
    output.flush()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum PercentState {
    Initial,
    Above25,
    Above50,
    Above75,
    Final,
}

const THRESHOLDS: [(PercentState, f64); 4] = [
    (PercentState::Above25, 25.0),
    (PercentState::Above50, 50.0),
    (PercentState::Above75, 75.0),
    (PercentState::Final, 100.0),
];

/// Gate that turns a stream of per-item snapshots into at most four
/// notifications per run (25/50/75/100% of items processed).
///
/// The mutex serializes the compare-and-advance decision across copy workers;
/// it is held only for that comparison and the callback, never across I/O.
/// The state only moves forward, so late or reordered snapshots can never
/// re-emit a threshold.
struct ProgressGate {
    state: Mutex<PercentState>,
}

impl ProgressGate {
    fn new() -> Self {
        Self {
            state: Mutex::new(PercentState::Initial),
        }
    }

    fn report(&self, notifier: &dyn BackupNotifier, label: &str, progress: &BackupProgress) {
        let mut state = self.state.lock().unwrap();
        if *state == PercentState::Final {
            return;
        }

        let percent = progress.percent_items();
        let mut highest = *state;
        for (threshold, bound) in THRESHOLDS {
            if threshold > *state && percent >= bound && threshold > highest {
                highest = threshold;
            }
        }

        if highest > *state {
            notifier.progress(label, progress);
            *state = highest;
        }
    }
}
