use crate::config::BackupOptions;
use crate::error::Error;
use crate::executor::{CopyExecutor, BACKUP_STARTED};
use crate::model::Archive;
use crate::notify::BackupNotifier;
use crate::planner;
use crate::profile::{self, Profile};
use dashmap::DashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

/// Orchestrates one backup run: compute the common parent, plan, execute,
/// merge the error lists. Owns the notifier and the per-profile pending-update
/// flags; profile persistence belongs to the caller.
pub struct BackupEngine {
    options: BackupOptions,
    notifier: Arc<dyn BackupNotifier>,
    update_flags: DashMap<Uuid, bool>,
}

impl BackupEngine {
    pub fn new(options: BackupOptions, notifier: Arc<dyn BackupNotifier>) -> Result<Self, Error> {
        options.validate()?;
        Ok(Self {
            options,
            notifier,
            update_flags: DashMap::new(),
        })
    }

    /// Full backup: copy everything not yet present in the target.
    pub fn start_backup(&self, profile: &Profile) -> Result<Vec<String>, Error> {
        self.notifier.notify(&profile.name, BACKUP_STARTED);
        fs::create_dir_all(profile.target_root())?;

        let common = self.common_parent_for(profile);

        info!("Planning full backup for '{}'", profile.name);
        let plan_start = Instant::now();
        let (archive, mut errors) = planner::build_archive(false, profile, common.as_deref());
        debug!(
            "Planning completed in {:.2}s: {} items, {} bytes",
            plan_start.elapsed().as_secs_f64(),
            archive.len(),
            archive.total_bytes(),
        );

        let copy_start = Instant::now();
        let executor = CopyExecutor::new(self.options.clone(), Arc::clone(&self.notifier))?;
        errors.extend(executor.execute(&profile.name, &archive)?);
        debug!(
            "Copy completed in {:.2}s: {} errors",
            copy_start.elapsed().as_secs_f64(),
            errors.len(),
        );

        self.update_flags.insert(profile.id, false);
        Ok(errors)
    }

    /// Planning-only probe: what would an update copy right now?
    pub fn archive_to_update(&self, profile: &Profile) -> (Archive, Vec<String>) {
        let common = self.common_parent_for(profile);
        planner::build_archive(true, profile, common.as_deref())
    }

    /// Incremental re-synchronization: copy only what changed since the last
    /// run. Skips the executor entirely when nothing changed.
    pub fn update_backup(&self, profile: &Profile) -> Result<Vec<String>, Error> {
        let (archive, mut errors) = self.archive_to_update(profile);
        if !archive.is_empty() {
            self.notifier.notify(&profile.name, BACKUP_STARTED);
            let executor = CopyExecutor::new(self.options.clone(), Arc::clone(&self.notifier))?;
            errors.extend(executor.execute(&profile.name, &archive)?);
        }
        self.update_flags.insert(profile.id, false);
        Ok(errors)
    }

    /// Recompute the pending-update flag for every tracked profile. Returns
    /// true when any flag changed, so periodic callers know when to refresh
    /// what they display.
    pub fn refresh_update_flags(&self, profiles: &[Profile]) -> bool {
        let mut changed = false;
        for profile in profiles {
            let pending = if !profile.keep_track || !profile.target_path.is_dir() {
                false
            } else {
                let (archive, _) = self.archive_to_update(profile);
                !archive.is_empty()
            };
            let previous = self
                .update_flags
                .insert(profile.id, pending)
                .unwrap_or(false);
            if previous != pending {
                changed = true;
            }
        }
        changed
    }

    pub fn has_pending_update(&self, id: Uuid) -> bool {
        self.update_flags.get(&id).map(|flag| *flag).unwrap_or(false)
    }

    fn common_parent_for(&self, profile: &Profile) -> Option<PathBuf> {
        if !profile.keep_structure {
            return None;
        }
        profile::common_parent(
            profile
                .folders
                .iter()
                .chain(profile.files.iter())
                .map(PathBuf::as_path),
        )
    }
}
