use crate::inspector::{self, PathAccessState};
use crate::model::{Archive, ArchiveItem};
use crate::profile::Profile;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Build the archive for one planning pass.
///
/// Top-level folders are walked independently in parallel so a failure in one
/// subtree never aborts the others. Every path is inspected (shallow,
/// read-only) before it is touched; entries that fail inspection or
/// enumeration are recorded as `[PATH]: .. [ERROR]: ..` strings and pruned,
/// siblings continue. The function always returns a best-effort archive plus
/// the error list, never an `Err`.
///
/// Full mode includes a file whenever its destination does not exist yet;
/// update mode also includes it when the source mtime is strictly newer than
/// the destination's.
pub fn build_archive(
    is_update: bool,
    profile: &Profile,
    common_parent: Option<&Path>,
) -> (Archive, Vec<String>) {
    let items: Mutex<Vec<ArchiveItem>> = Mutex::new(Vec::new());
    let errors: Mutex<Vec<String>> = Mutex::new(Vec::new());

    profile.folders.par_iter().for_each(|folder| {
        let state = inspector::inspect(folder, true, true, false, false);
        if state != PathAccessState::Success {
            errors
                .lock()
                .unwrap()
                .push(path_error(folder, state.label()));
            return;
        }
        enumerate_safe(
            is_update,
            folder,
            folder,
            profile,
            common_parent,
            &items,
            &errors,
        );
    });

    profile.files.par_iter().for_each(|file| {
        let state = inspector::inspect(file, false, true, false, false);
        if state != PathAccessState::Success {
            // top-level files are recorded as the bare path, without a label
            errors.lock().unwrap().push(file.display().to_string());
            return;
        }
        match candidate_item(is_update, profile, file, file, common_parent) {
            Ok(Some(item)) => items.lock().unwrap().push(item),
            Ok(None) => {}
            Err(e) => errors.lock().unwrap().push(path_error(file, &e.to_string())),
        }
    });

    let archive = Archive::new(items.into_inner().unwrap());
    debug!(
        "Planned {} items ({} bytes) for '{}'",
        archive.len(),
        archive.total_bytes(),
        profile.name,
    );
    (archive, errors.into_inner().unwrap())
}

fn enumerate_safe(
    is_update: bool,
    folder: &Path,
    selected_root: &Path,
    profile: &Profile,
    common_parent: Option<&Path>,
    items: &Mutex<Vec<ArchiveItem>>,
    errors: &Mutex<Vec<String>>,
) {
    let entries = match fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) => {
            errors.lock().unwrap().push(path_error(folder, &e.to_string()));
            return;
        }
    };

    for entry in entries {
        let source_path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                errors.lock().unwrap().push(path_error(folder, &e.to_string()));
                continue;
            }
        };

        let is_dir = source_path.is_dir();
        let state = inspector::inspect(&source_path, is_dir, true, false, false);
        if state != PathAccessState::Success {
            errors
                .lock()
                .unwrap()
                .push(path_error(&source_path, state.label()));
            continue;
        }

        if is_dir {
            enumerate_safe(
                is_update,
                &source_path,
                selected_root,
                profile,
                common_parent,
                items,
                errors,
            );
            continue;
        }

        match candidate_item(is_update, profile, selected_root, &source_path, common_parent) {
            Ok(Some(item)) => items.lock().unwrap().push(item),
            Ok(None) => {}
            Err(e) => errors
                .lock()
                .unwrap()
                .push(path_error(&source_path, &e.to_string())),
        }
    }
}

/// Resolve `file_path` to a copy operation, or `None` when the destination is
/// already current.
fn candidate_item(
    is_update: bool,
    profile: &Profile,
    selected_root: &Path,
    file_path: &Path,
    common_parent: Option<&Path>,
) -> io::Result<Option<ArchiveItem>> {
    let target_path = destination_path(profile, selected_root, file_path, common_parent);
    let source_meta = fs::metadata(file_path)?;

    let include = match fs::metadata(&target_path) {
        // an unreadable or missing destination is treated as absent
        Err(_) => true,
        Ok(target_meta) => {
            is_update
                && match (source_meta.modified(), target_meta.modified()) {
                    (Ok(source_mtime), Ok(target_mtime)) => source_mtime > target_mtime,
                    _ => false,
                }
        }
    };

    if !include {
        return Ok(None);
    }
    Ok(Some(ArchiveItem {
        source_path: file_path.to_path_buf(),
        target_path,
        size_bytes: Some(source_meta.len()),
    }))
}

/// Compute where `file_path` lands inside the target.
///
/// Flattened layout: top-level items map to `target/<profile>/<basename>`
/// (disambiguated via the profile mapping on collision); nested files keep
/// their path relative to the selected folder, under the folder's mapped or
/// original name.
///
/// Kept structure: destinations mirror the path relative to the common
/// parent. When there is no common parent and folders were selected, the
/// entire absolute source path (minus the leading separator) is replicated
/// under the target. That preserves full path depth rather than just the
/// item's own name; kept as observed for compatibility with existing backups.
fn destination_path(
    profile: &Profile,
    selected_root: &Path,
    file_path: &Path,
    common_parent: Option<&Path>,
) -> PathBuf {
    let base = profile.target_root();

    if !profile.keep_structure {
        let mapping = profile.mapping.as_ref();
        if paths_equal_ignore_case(selected_root, file_path) {
            // top-level file
            let name = mapping
                .and_then(|m| m.file_name(selected_root))
                .map(str::to_owned)
                .unwrap_or_else(|| basename_of(selected_root));
            return base.join(name);
        }

        // file nested inside a selected folder: relative to the folder's
        // parent, so the first segment is the folder's own name
        let parent = selected_root.parent().unwrap_or_else(|| Path::new("/"));
        let relative = file_path.strip_prefix(parent).unwrap_or(file_path);
        return match mapping.and_then(|m| m.folder_name(selected_root)) {
            Some(mapped) => {
                let rest: PathBuf = relative.components().skip(1).collect();
                base.join(mapped).join(rest)
            }
            None => base.join(relative),
        };
    }

    let relative: PathBuf = match common_parent {
        Some(parent) => file_path
            .strip_prefix(parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| file_path.to_path_buf()),
        None if profile.folders.is_empty() => {
            // a single file was selected; copy just the file
            PathBuf::from(basename_of(file_path))
        }
        None => {
            // sources share only the root: replicate the absolute path
            file_path
                .strip_prefix("/")
                .unwrap_or(file_path)
                .to_path_buf()
        }
    };
    base.join(relative)
}

fn basename_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn paths_equal_ignore_case(a: &Path, b: &Path) -> bool {
    a.to_string_lossy()
        .eq_ignore_ascii_case(&b.to_string_lossy())
}

fn path_error(path: &Path, message: &str) -> String {
    format!("[PATH]: {} [ERROR]: {}", path.display(), message)
}
