pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod inspector;
pub mod model;
pub mod notify;
pub mod planner;
pub mod profile;

pub use config::{AppConfig, BackupOptions};
pub use engine::BackupEngine;
pub use error::Error;
pub use executor::CopyExecutor;
pub use inspector::PathAccessState;
pub use model::{Archive, ArchiveItem, BackupProgress};
pub use notify::{BackupNotifier, SilentNotifier};
pub use profile::Profile;
