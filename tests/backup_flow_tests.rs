use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;
use tempfile::tempdir;

use archup::{BackupEngine, BackupOptions, Profile, SilentNotifier};

fn engine() -> BackupEngine {
    BackupEngine::new(BackupOptions::default(), Arc::new(SilentNotifier)).unwrap()
}

fn create_source_tree(root: &Path) {
    fs::create_dir_all(root.join("SourceFolderTest1/Folder1")).unwrap();
    fs::create_dir_all(root.join("SourceFolderTest2/Folder2")).unwrap();
    fs::create_dir_all(root.join("TargetFolderTest")).unwrap();

    fs::write(root.join("SourceFolderTest1/Folder1/FileName.txt"), "HELLO").unwrap();
    fs::write(root.join("SourceFolderTest1/FileName.txt"), "hello").unwrap();
    fs::write(root.join("SourceFolderTest2/Folder2/FileName.txt"), "HELLO").unwrap();
}

#[test]
fn test_full_backup_copies_content_to_planned_destinations() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    create_source_tree(root);

    let profile = Profile::new(
        "Backup1",
        vec![
            root.join("SourceFolderTest1/Folder1"),
            root.join("SourceFolderTest2/Folder2"),
        ],
        vec![root.join("SourceFolderTest1/FileName.txt")],
        root.join("TargetFolderTest"),
        true,
        false,
    );

    let errors = engine().start_backup(&profile).unwrap();
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);

    let base = root.join("TargetFolderTest/Backup1");
    assert_eq!(
        fs::read_to_string(base.join("SourceFolderTest1/Folder1/FileName.txt")).unwrap(),
        "HELLO"
    );
    assert_eq!(
        fs::read_to_string(base.join("SourceFolderTest2/Folder2/FileName.txt")).unwrap(),
        "HELLO"
    );
    assert_eq!(
        fs::read_to_string(base.join("SourceFolderTest1/FileName.txt")).unwrap(),
        "hello"
    );
}

#[test]
fn test_flattened_backup_uses_disambiguated_names() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("A/Docs")).unwrap();
    fs::create_dir_all(root.join("B/Docs")).unwrap();
    fs::create_dir_all(root.join("Target")).unwrap();
    fs::write(root.join("A/Docs/one.txt"), "one").unwrap();
    fs::write(root.join("B/Docs/two.txt"), "two").unwrap();

    let profile = Profile::new(
        "Flat",
        vec![root.join("A/Docs"), root.join("B/Docs")],
        vec![],
        root.join("Target"),
        false,
        false,
    );

    let errors = engine().start_backup(&profile).unwrap();
    assert!(errors.is_empty());

    let base = root.join("Target/Flat");
    assert_eq!(fs::read_to_string(base.join("Docs(1)/one.txt")).unwrap(), "one");
    assert_eq!(fs::read_to_string(base.join("Docs(2)/two.txt")).unwrap(), "two");
}

#[test]
fn test_update_after_full_backup_is_idempotent() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    create_source_tree(root);

    let profile = Profile::new(
        "Backup1",
        vec![root.join("SourceFolderTest1")],
        vec![],
        root.join("TargetFolderTest"),
        false,
        false,
    );

    let engine = engine();
    engine.start_backup(&profile).unwrap();

    // nothing changed, so an update plans nothing
    let (archive, errors) = engine.archive_to_update(&profile);
    assert!(errors.is_empty());
    assert!(archive.is_empty());

    // one source file rewritten: exactly that file is replanned and recopied
    sleep(Duration::from_millis(20));
    let changed = root.join("SourceFolderTest1/FileName.txt");
    fs::write(&changed, "hello again").unwrap();

    let (archive, _) = engine.archive_to_update(&profile);
    assert_eq!(archive.len(), 1);
    assert_eq!(archive.items()[0].source_path, changed);

    let errors = engine.update_backup(&profile).unwrap();
    assert!(errors.is_empty());

    let copied = root.join("TargetFolderTest/Backup1/SourceFolderTest1/FileName.txt");
    assert_eq!(fs::read_to_string(copied).unwrap(), "hello again");

    // and the update is consumed
    let (archive, _) = engine.archive_to_update(&profile);
    assert!(archive.is_empty());
}

#[test]
fn test_refresh_update_flags_tracks_pending_changes() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    create_source_tree(root);

    let profile = Profile::new(
        "Tracked",
        vec![root.join("SourceFolderTest1")],
        vec![],
        root.join("TargetFolderTest"),
        false,
        true,
    );

    let engine = engine();
    engine.start_backup(&profile).unwrap();
    assert!(!engine.has_pending_update(profile.id));

    let profiles = vec![profile.clone()];
    assert!(!engine.refresh_update_flags(&profiles));

    sleep(Duration::from_millis(20));
    fs::write(root.join("SourceFolderTest1/FileName.txt"), "changed").unwrap();

    assert!(engine.refresh_update_flags(&profiles));
    assert!(engine.has_pending_update(profile.id));

    // a second scan with no further changes reports nothing new
    assert!(!engine.refresh_update_flags(&profiles));
    assert!(engine.has_pending_update(profile.id));

    engine.update_backup(&profile).unwrap();
    assert!(!engine.has_pending_update(profile.id));
}

#[test]
fn test_untracked_profiles_never_flag_updates() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    create_source_tree(root);

    let profile = Profile::new(
        "Untracked",
        vec![root.join("SourceFolderTest1")],
        vec![],
        root.join("TargetFolderTest"),
        false,
        false,
    );

    let engine = engine();
    engine.start_backup(&profile).unwrap();

    sleep(Duration::from_millis(20));
    fs::write(root.join("SourceFolderTest1/FileName.txt"), "changed").unwrap();

    assert!(!engine.refresh_update_flags(std::slice::from_ref(&profile)));
    assert!(!engine.has_pending_update(profile.id));
}

#[test]
fn test_backup_reports_source_errors_but_still_copies() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    create_source_tree(root);

    let profile = Profile::new(
        "Partial",
        vec![
            root.join("SourceFolderTest1/Folder1"),
            root.join("Missing"),
        ],
        vec![],
        root.join("TargetFolderTest"),
        false,
        false,
    );

    let errors = engine().start_backup(&profile).unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("[NOT FOUND]"));

    let copied = root.join("TargetFolderTest/Partial/Folder1/FileName.txt");
    assert_eq!(fs::read_to_string(copied).unwrap(), "HELLO");
}
