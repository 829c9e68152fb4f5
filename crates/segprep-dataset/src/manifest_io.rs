//! Fold manifest files.
//!
//! Pretty JSON with a four-space indent, non-ASCII kept verbatim and no
//! trailing newline, matching what Python's `json.dump(indent=4,
//! ensure_ascii=False)` writes. Writes go through a sibling temp file and a
//! rename so readers never observe a half-written manifest.

use crate::error::DatasetError;
use segprep_kernel::Datalist;
use serde::Serialize;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const INDENT: &[u8] = b"    ";

/// Encode a manifest in the on-disk format.
pub fn manifest_bytes(datalist: &Datalist) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    datalist.serialize(&mut serializer)?;
    Ok(buf)
}

/// Write a manifest, replacing any existing file at `path`.
///
/// The parent directory must already exist and be writable.
pub fn write_manifest(path: impl AsRef<Path>, datalist: &Datalist) -> Result<(), DatasetError> {
    let path = path.as_ref();
    let bytes = manifest_bytes(datalist).map_err(|source| DatasetError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp_path = tmp_write_path(path);
    let write_result = (|| -> Result<(), DatasetError> {
        let file = File::create(&tmp_path).map_err(|e| DatasetError::io(&tmp_path, e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(&bytes)
            .map_err(|e| DatasetError::io(&tmp_path, e))?;
        let file = writer
            .into_inner()
            .map_err(|e| DatasetError::io(&tmp_path, e.into_error()))?;
        file.sync_all().map_err(|e| DatasetError::io(&tmp_path, e))?;
        Ok(())
    })();

    if let Err(error) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        DatasetError::io(path, e)
    })?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        let dir = File::open(parent).map_err(|e| DatasetError::io(parent, e))?;
        dir.sync_all().map_err(|e| DatasetError::io(parent, e))?;
    }

    tracing::info!(
        path = %path.display(),
        testing = datalist.testing.len(),
        training = datalist.training.len(),
        "manifest written"
    );
    Ok(())
}

/// Read a manifest written by [`write_manifest`] (or by Python tooling).
pub fn read_manifest(path: impl AsRef<Path>) -> Result<Datalist, DatasetError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| DatasetError::io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|source| DatasetError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use segprep_kernel::{TestingCase, TrainingCase};

    #[test]
    fn bytes_use_four_space_indent_without_trailing_newline() {
        let datalist = Datalist::new(
            vec![TestingCase::new("./imagesTs/t.nii.gz")],
            vec![TrainingCase::new("./imagesTr/a.nii.gz", "./labelsTr/a.nii.gz").with_fold(3)],
        );
        let text = String::from_utf8(manifest_bytes(&datalist).expect("encode")).expect("utf8");
        let expected = r#"{
    "testing": [
        {
            "image": "./imagesTs/t.nii.gz"
        }
    ],
    "training": [
        {
            "image": "./imagesTr/a.nii.gz",
            "label": "./labelsTr/a.nii.gz",
            "fold": 3
        }
    ]
}"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn empty_sections_encode_as_empty_arrays() {
        let text = String::from_utf8(manifest_bytes(&Datalist::default()).expect("encode"))
            .expect("utf8");
        assert_eq!(text, "{\n    \"testing\": [],\n    \"training\": []\n}");
    }

    #[test]
    fn non_ascii_is_written_verbatim() {
        let datalist = Datalist::new(vec![TestingCase::new("./imagesTs/milz_ö.nii.gz")], vec![]);
        let text = String::from_utf8(manifest_bytes(&datalist).expect("encode")).expect("utf8");
        assert!(text.contains("milz_ö.nii.gz"));
    }
}
