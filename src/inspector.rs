use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Read};
use std::os::unix::fs::{FileTypeExt, PermissionsExt};
use std::path::Path;
use uuid::Uuid;

// Mode bits alone frequently lie:
//   - a file can stat as readable yet vanish before open (tmp files),
//   - remote mounts report readable metadata while the server denies the read,
//   - SELinux/AppArmor policy can deny what the bits allow,
//   - a write bit means nothing on a read-only mount,
//   - another process may hold the file locked.
// The deep checks below perform one real, low-impact operation to catch these.

/// Classification of a path's accessibility before it is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathAccessState {
    Success,
    NotFound,
    PermissionDenied,
    NotReadable,
    NotWritable,
    IsSymlink,
    IsDevice,
    Locked,
    UnknownError,
}

impl PathAccessState {
    pub fn label(self) -> &'static str {
        match self {
            PathAccessState::Success => "",
            PathAccessState::NotFound => "[NOT FOUND]",
            PathAccessState::PermissionDenied => "[DENIED ACCESS]",
            PathAccessState::NotReadable => "[NOT READABLE]",
            PathAccessState::NotWritable => "[NOT WRITABLE]",
            PathAccessState::IsSymlink => "[SYMLINK]",
            PathAccessState::IsDevice => "[DEVICE FILE]",
            PathAccessState::Locked => "[FILE LOCKED]",
            PathAccessState::UnknownError => "[EXCEPTION UNKNOWN]",
        }
    }
}

/// Prefixes that must never be read: probing them can hang or crash the
/// process (virtual filesystems, device trees, runtime state).
const READ_FORBIDDEN: &[&str] = &[
    // Linux
    "/proc/",       // virtual filesystem with process/kernel info, can block
    "/sys/",        // kernel/hardware interface
    "/run/",        // runtime state, PID files, sockets, FIFOs
    "/var/run/",    // same as /run
    "/var/lock/",   // lock files
    // Both Linux and macOS
    "/dev/",        // device nodes, raw I/O
    "/lost+found/", // fs recovery area, corrupted fragments
    // macOS
    "/System/Volumes/", // OS boot/system volumes, VM, snapshots
];

/// Prefixes that must never be written (system libraries, audit logs, caches).
const WRITE_FORBIDDEN: &[&str] = &[
    // macOS
    "/System/Volumes/",
    "/System/Library/",
    "/System/DriverKit/",
    "/System/Cryptexes/",
    // Both Linux and macOS
    "/var/log/",   // logs, could break auditing
    "/var/cache/", // system-managed cache
];

/// Where external drives are mounted; deep probing is skipped under this root
/// because freshly mounted media can stall for seconds on the first access.
const MOUNT_ROOT: &str = "/Volumes/";

fn is_dangerous(path: &str, forbidden: &[&str]) -> bool {
    forbidden.iter().any(|prefix| path.starts_with(prefix))
}

/// Classify `path` before it is used as a backup source or destination.
///
/// Checks run in order and short-circuit on the first match: existence of the
/// expected kind, denylisted prefixes, symlinks, device files, permission
/// bits, and finally (when `deep_check` is set) one real filesystem operation
/// proving the claimed access actually works. Never panics and never returns
/// an error; anything unanticipated maps to `UnknownError`.
pub fn inspect(
    path: &Path,
    is_folder: bool,
    want_read: bool,
    want_write: bool,
    deep_check: bool,
) -> PathAccessState {
    let path_str = path.to_string_lossy();
    if path_str.trim().is_empty() {
        return PathAccessState::NotFound;
    }

    // Existence of the expected kind. is_dir/is_file follow symlinks, so a
    // dangling symlink counts as absent, same as a plain missing path.
    let present = if is_folder { path.is_dir() } else { path.exists() && !path.is_dir() };
    if !present {
        return PathAccessState::NotFound;
    }

    let mut deep_check = deep_check;
    if is_folder && path_str.starts_with(MOUNT_ROOT) {
        deep_check = false;
    }

    if want_read && is_dangerous(&path_str, READ_FORBIDDEN) {
        return PathAccessState::PermissionDenied;
    }
    if want_write && is_dangerous(&path_str, WRITE_FORBIDDEN) {
        return PathAccessState::PermissionDenied;
    }

    // symlink_metadata stats the link itself, not its target
    let metadata = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => return PathAccessState::NotFound,
        Err(_) => return PathAccessState::PermissionDenied,
    };

    let file_type = metadata.file_type();
    if file_type.is_symlink() {
        return PathAccessState::IsSymlink;
    }
    if file_type.is_block_device()
        || file_type.is_char_device()
        || file_type.is_fifo()
        || file_type.is_socket()
    {
        return PathAccessState::IsDevice;
    }

    let mode = metadata.permissions().mode();
    if want_read && mode & 0o444 == 0 {
        return PathAccessState::NotReadable;
    }
    if want_write && mode & 0o222 == 0 {
        return PathAccessState::NotWritable;
    }

    if deep_check && is_folder {
        return deep_check_folder(path, want_read, want_write);
    }
    if deep_check && !is_folder {
        return deep_check_file(path, want_read, want_write);
    }

    PathAccessState::Success
}

fn deep_check_folder(path: &Path, want_read: bool, want_write: bool) -> PathAccessState {
    if want_read {
        match fs::read_dir(path) {
            Ok(mut entries) => {
                if let Some(Err(e)) = entries.next() {
                    return classify_io_error(&e);
                }
            }
            Err(e) => return classify_io_error(&e),
        }
    }
    if want_write {
        let probe = path.join(format!(".archup_tmp_{}", Uuid::new_v4()));
        match File::create(&probe) {
            Ok(handle) => {
                drop(handle);
                let _ = fs::remove_file(&probe);
            }
            Err(e) => return classify_io_error(&e),
        }
    }
    PathAccessState::Success
}

fn deep_check_file(path: &Path, want_read: bool, want_write: bool) -> PathAccessState {
    if want_read {
        match File::open(path) {
            Ok(mut handle) => {
                let mut byte = [0u8; 1];
                if let Err(e) = handle.read(&mut byte) {
                    return classify_io_error(&e);
                }
            }
            Err(e) => return classify_io_error(&e),
        }
    }
    if want_write {
        // open for write without truncating: proves access, changes nothing
        if let Err(e) = OpenOptions::new().write(true).open(path) {
            return classify_io_error(&e);
        }
    }
    PathAccessState::Success
}

fn classify_io_error(err: &io::Error) -> PathAccessState {
    if err.kind() == ErrorKind::PermissionDenied {
        return PathAccessState::PermissionDenied;
    }
    // EAGAIN / EBUSY / ETXTBSY: the path works but something holds it right now
    match err.raw_os_error() {
        Some(libc_code) if matches!(libc_code, 11 | 16 | 26) => PathAccessState::Locked,
        _ if err.kind() == ErrorKind::WouldBlock => PathAccessState::Locked,
        _ => PathAccessState::UnknownError,
    }
}
