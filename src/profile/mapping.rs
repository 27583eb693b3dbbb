use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Disambiguated names for top-level selected items whose basenames collide.
///
/// Keyed by the full selected path: colliding items share a basename, so the
/// basename itself cannot be the key. Folders become `Name(1)`, `Name(2)`;
/// files keep their extension: `Report(1).txt`, `Report(2).txt`. Only
/// top-level selections participate, nested names never collide in the
/// target because their parent directories are already distinct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileMapping {
    pub folders: HashMap<PathBuf, String>,
    pub files: HashMap<PathBuf, String>,
}

impl ProfileMapping {
    pub fn from_selection(folders: &[PathBuf], files: &[PathBuf]) -> Self {
        Self {
            folders: disambiguate(folders, false),
            files: disambiguate(files, true),
        }
    }

    pub fn folder_name(&self, path: &Path) -> Option<&str> {
        self.folders.get(path).map(String::as_str)
    }

    pub fn file_name(&self, path: &Path) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }
}

fn disambiguate(paths: &[PathBuf], split_extension: bool) -> HashMap<PathBuf, String> {
    let mut groups: HashMap<String, Vec<&PathBuf>> = HashMap::new();
    for path in paths {
        let Some(basename) = path.file_name().map(|n| n.to_string_lossy().into_owned())
        else {
            continue; // root has no basename
        };
        groups.entry(basename).or_default().push(path);
    }

    let mut mapping = HashMap::new();
    for (basename, group) in groups {
        if group.len() == 1 {
            continue;
        }
        for (counter, path) in group.into_iter().enumerate() {
            let new_name = if split_extension {
                match basename.rsplit_once('.') {
                    Some((stem, ext)) => format!("{}({}).{}", stem, counter + 1, ext),
                    None => format!("{}({})", basename, counter + 1),
                }
            } else {
                format!("{}({})", basename, counter + 1)
            };
            mapping.insert(path.clone(), new_name);
        }
    }
    mapping
}

/// Longest directory prefix shared by every path, or `None` when the paths
/// share only the filesystem root (or a single path was given).
///
/// Segments are compared case-insensitively. That is wrong on case-sensitive
/// filesystems and could merge distinct directories, but it is the behavior
/// existing backups were laid out with, so it stays until a deliberate
/// decision changes it.
pub fn common_parent<'a, I>(paths: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = &'a Path>,
{
    let all_parts: Vec<Vec<String>> = paths
        .into_iter()
        .map(|path| {
            path.components()
                .map(|c| match c {
                    Component::RootDir => String::from("/"),
                    other => other.as_os_str().to_string_lossy().into_owned(),
                })
                .collect()
        })
        .collect();

    if all_parts.len() <= 1 {
        return None;
    }

    let mut prefix: Vec<String> = all_parts[0].clone();
    for parts in &all_parts[1..] {
        let shared = prefix
            .iter()
            .zip(parts.iter())
            .take_while(|(a, b)| a.eq_ignore_ascii_case(b))
            .count();
        prefix.truncate(shared);
    }

    // a prefix of just the root segment means no useful common parent
    if prefix.len() <= 1 {
        return None;
    }

    let mut parent = PathBuf::new();
    for part in &prefix {
        parent.push(part);
    }
    Some(parent)
}
