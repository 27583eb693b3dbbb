use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const STAGE_STARTING: &str = "Starting";
pub const STAGE_RUNNING: &str = "Running";
pub const STAGE_COMPLETED: &str = "Completed";

/// One resolved copy operation. `size_bytes` is `None` when the source could
/// not be stat'ed; totals treat it as zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveItem {
    pub source_path: PathBuf,
    pub target_path: PathBuf,
    pub size_bytes: Option<u64>,
}

/// The concrete set of copy operations produced by one planning pass.
/// Built fresh on every call and never mutated afterwards; item order
/// carries no meaning.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Archive {
    items: Vec<ArchiveItem>,
    total_bytes: u64,
}

impl Archive {
    pub fn new(items: Vec<ArchiveItem>) -> Self {
        let total_bytes = items.iter().map(|i| i.size_bytes.unwrap_or(0)).sum();
        Self { items, total_bytes }
    }

    pub fn items(&self) -> &[ArchiveItem] {
        &self.items
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Snapshot of a running backup, re-created for every report.
#[derive(Debug, Clone)]
pub struct BackupProgress {
    pub state: &'static str,
    pub bytes_copied: u64,
    pub total_bytes: u64,
    pub total_items: usize,
    pub items_processed: usize,
}

impl BackupProgress {
    pub fn percent_items(&self) -> f64 {
        if self.total_items == 0 {
            0.0
        } else {
            self.items_processed as f64 * 100.0 / self.total_items as f64
        }
    }

    pub fn percent_bytes(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            self.bytes_copied as f64 * 100.0 / self.total_bytes as f64
        }
    }
}
