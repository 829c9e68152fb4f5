//! Discovery and manifest I/O against real directory trees.

use segprep_dataset::{DataSourceConfig, DatasetError, DatasetLayout, read_manifest, write_manifest};
use segprep_kernel::{DEFAULT_FOLD, FoldPlan, assign_folds};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent dir should be created");
    }
    fs::write(path, b"").expect("file should be written");
}

fn build_tree(root: &Path, train: &[&str], test: &[&str]) {
    fs::create_dir_all(root.join("imagesTs")).expect("imagesTs");
    fs::create_dir_all(root.join("imagesTr")).expect("imagesTr");
    fs::create_dir_all(root.join("labelsTr")).expect("labelsTr");
    for name in train {
        touch(&root.join("imagesTr").join(name));
        touch(&root.join("labelsTr").join(name));
    }
    for name in test {
        touch(&root.join("imagesTs").join(name));
    }
}

#[test]
fn discover_filters_sorts_and_pairs_labels() {
    let tmp = TempDir::new().expect("tempdir");
    let root = tmp.path();
    build_tree(
        root,
        &["spleen_9.nii.gz", "spleen_10.nii.gz", "spleen_2.nii.gz"],
        &["spleen_1.nii.gz"],
    );
    touch(&root.join("imagesTr").join("._spleen_9.nii.gz"));
    touch(&root.join("imagesTr").join("dataset.json"));
    touch(&root.join("imagesTs").join("._spleen_1.nii.gz"));
    fs::create_dir_all(root.join("imagesTr").join("nested.nii.gz")).expect("nested dir");

    let datalist = DatasetLayout::new(root).discover().expect("discover");

    let testing: Vec<&str> = datalist.testing.iter().map(|c| c.image.as_str()).collect();
    assert_eq!(testing, vec!["./imagesTs/spleen_1.nii.gz"]);

    let training: Vec<(&str, &str, u32)> = datalist
        .training
        .iter()
        .map(|c| (c.image.as_str(), c.label.as_str(), c.fold))
        .collect();
    assert_eq!(
        training,
        vec![
            ("./imagesTr/spleen_10.nii.gz", "./labelsTr/spleen_10.nii.gz", DEFAULT_FOLD),
            ("./imagesTr/spleen_2.nii.gz", "./labelsTr/spleen_2.nii.gz", DEFAULT_FOLD),
            ("./imagesTr/spleen_9.nii.gz", "./labelsTr/spleen_9.nii.gz", DEFAULT_FOLD),
        ]
    );
}

#[test]
fn missing_directory_is_reported() {
    let tmp = TempDir::new().expect("tempdir");
    let err = DatasetLayout::new(tmp.path().join("absent"))
        .discover()
        .expect_err("should fail");
    assert!(matches!(err, DatasetError::MissingDirectory { .. }), "{err}");
}

#[test]
fn empty_training_directory_is_reported() {
    let tmp = TempDir::new().expect("tempdir");
    build_tree(tmp.path(), &[], &["t.nii.gz"]);
    let err = DatasetLayout::new(tmp.path())
        .discover()
        .expect_err("should fail");
    assert!(matches!(err, DatasetError::EmptyDirectory { .. }), "{err}");
}

#[test]
fn empty_testing_directory_is_allowed() {
    let tmp = TempDir::new().expect("tempdir");
    build_tree(tmp.path(), &["a.nii.gz"], &[]);
    let datalist = DatasetLayout::new(tmp.path()).discover().expect("discover");
    assert!(datalist.testing.is_empty());
    assert_eq!(datalist.training.len(), 1);
}

#[test]
fn missing_label_is_reported_unless_disabled() {
    let tmp = TempDir::new().expect("tempdir");
    build_tree(tmp.path(), &["a.nii.gz"], &[]);
    touch(&tmp.path().join("imagesTr").join("b.nii.gz"));

    let mut layout = DatasetLayout::new(tmp.path());
    let err = layout.discover().expect_err("should fail");
    match err {
        DatasetError::MissingLabel { image, .. } => assert_eq!(image, "./imagesTr/b.nii.gz"),
        other => panic!("unexpected error: {other}"),
    }

    layout.require_labels = false;
    let datalist = layout.discover().expect("discover");
    assert_eq!(datalist.training[1].label, "./labelsTr/b.nii.gz");
}

#[test]
fn manifest_round_trips_after_fold_assignment() {
    let tmp = TempDir::new().expect("tempdir");
    let names: Vec<String> = (0..9).map(|i| format!("case{i}.nii.gz")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    build_tree(tmp.path(), &refs, &["t0.nii.gz", "t1.nii.gz"]);

    let mut datalist = DatasetLayout::new(tmp.path()).discover().expect("discover");
    assign_folds(&mut datalist.training, FoldPlan::new(5, 42)).expect("assign");

    let path = tmp.path().join("folds.json");
    write_manifest(&path, &datalist).expect("write");
    let back = read_manifest(&path).expect("read");
    assert_eq!(back, datalist);
    assert_eq!(back.digest(), datalist.digest());

    let heads: Vec<&str> = back.training[..5].iter().map(|c| c.image.as_str()).collect();
    assert_eq!(
        heads,
        vec![
            "./imagesTr/case3.nii.gz",
            "./imagesTr/case6.nii.gz",
            "./imagesTr/case7.nii.gz",
            "./imagesTr/case4.nii.gz",
            "./imagesTr/case8.nii.gz",
        ]
    );
}

#[test]
fn write_manifest_overwrites_existing_file() {
    let tmp = TempDir::new().expect("tempdir");
    build_tree(tmp.path(), &["a.nii.gz"], &[]);
    let datalist = DatasetLayout::new(tmp.path()).discover().expect("discover");

    let path = tmp.path().join("folds.json");
    fs::write(&path, "stale").expect("stale file");
    write_manifest(&path, &datalist).expect("write");
    assert_eq!(read_manifest(&path).expect("read"), datalist);
}

#[test]
fn write_manifest_leaves_only_the_final_file() {
    let tmp = TempDir::new().expect("tempdir");
    let dir = tmp.path().join("Task09_Spleen");
    fs::create_dir_all(&dir).expect("manifest dir");

    let path = dir.join("Task09_Spleen_folds.json");
    write_manifest(&path, &Default::default()).expect("first write");
    write_manifest(&path, &Default::default()).expect("second write");

    let names: Vec<String> = fs::read_dir(&dir)
        .expect("read dir")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["Task09_Spleen_folds.json".to_string()]);
}

#[test]
fn write_manifest_fails_when_parent_is_missing() {
    let tmp = TempDir::new().expect("tempdir");
    let path = tmp.path().join("no-such-dir").join("folds.json");
    let err = write_manifest(&path, &Default::default()).expect_err("should fail");
    assert!(matches!(err, DatasetError::Io { .. }), "{err}");
    assert!(!path.exists());
}

#[test]
fn read_manifest_rejects_malformed_json() {
    let tmp = TempDir::new().expect("tempdir");
    let path = tmp.path().join("folds.json");
    fs::write(&path, "{\"training\": [{\"image\": 3}]}").expect("write");
    let err = read_manifest(&path).expect_err("should fail");
    assert!(matches!(err, DatasetError::Json { .. }), "{err}");
}

#[test]
fn data_source_descriptor_round_trips_through_yaml() {
    let tmp = TempDir::new().expect("tempdir");
    let path = tmp.path().join("nnUNet").join("data_src_cfg.yaml");
    let cfg = DataSourceConfig::new(
        "09",
        tmp.path().join("Task09_Spleen/Task09_Spleen_folds.json"),
        tmp.path().join("Task09_Spleen"),
    );
    cfg.write_yaml(&path).expect("write");
    assert_eq!(DataSourceConfig::read_yaml(&path).expect("read"), cfg);
}
