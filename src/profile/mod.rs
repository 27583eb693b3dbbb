use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

pub mod mapping;

pub use mapping::{common_parent, ProfileMapping};

/// A named backup configuration: which sources go where, and how.
///
/// `folders` and `files` hold absolute, normalized paths. `mapping` is
/// present only when `keep_structure` is false and at least one top-level
/// basename collides; it is computed once at creation time and never
/// recomputed afterwards. The planner consumes profiles read-only; mutation
/// goes through the typed setters below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub folders: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
    pub target_path: PathBuf,
    pub keep_structure: bool,
    pub keep_track: bool,
    pub saved_at: DateTime<Utc>,
    pub mapping: Option<ProfileMapping>,
}

impl Profile {
    pub fn new(
        name: impl Into<String>,
        folders: Vec<PathBuf>,
        files: Vec<PathBuf>,
        target_path: PathBuf,
        keep_structure: bool,
        keep_track: bool,
    ) -> Self {
        let mut folders = folders;
        folders.sort();
        let mut files = files;
        files.sort();
        // a mapping with no collisions carries no information, so it is not kept
        let mapping = (!keep_structure)
            .then(|| ProfileMapping::from_selection(&folders, &files))
            .filter(|mapping| !mapping.is_empty());
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            folders,
            files,
            target_path,
            keep_structure,
            keep_track,
            saved_at: Utc::now(),
            mapping,
        }
    }

    /// Root directory of this profile's backup inside the target.
    pub fn target_root(&self) -> PathBuf {
        self.target_path.join(&self.name)
    }

    pub fn set_saved_at(&mut self, at: DateTime<Utc>) {
        self.saved_at = at;
    }

    pub fn set_keep_track(&mut self, flag: bool) {
        self.keep_track = flag;
    }
}

impl PartialEq for Profile {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Profile {}
