//! # segprep-dataset
//!
//! Filesystem layer between an MSD-style dataset tree and the kernel.
//!
//! This crate provides:
//! - `DatasetLayout` discovery (`imagesTs` / `imagesTr` / `labelsTr`)
//! - fold manifest read/write (atomic, Python-compatible JSON layout)
//! - the YAML data-source descriptor consumed by the nnU-Net runner
//!
//! Fold computation itself lives in `segprep-kernel`.

pub mod data_src;
pub mod error;
pub mod layout;
pub mod manifest_io;

pub use data_src::{DATA_SRC_FILE_NAME, DEFAULT_MODALITY, DataSourceConfig, numeric_dataset_id};
pub use error::DatasetError;
pub use layout::{
    DEFAULT_EXTENSION, DEFAULT_HIDDEN_MARKER, DEFAULT_LABEL_DIR, DEFAULT_TEST_DIR,
    DEFAULT_TRAIN_DIR, DatasetLayout,
};
pub use manifest_io::{manifest_bytes, read_manifest, write_manifest};
