//! Persistence of pattern configurations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub mod document;
pub mod store;

pub use document::{parse_config, render_config, DOCUMENT_VERSION};
pub use store::{export_with_hits, load_config, load_into, save_config, LoadMode};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: quick_xml::DeError,
    },
    #[error("failed to decode config document: {0}")]
    Decode(#[from] quick_xml::DeError),
    #[error("failed to encode config document: {0}")]
    Encode(#[source] quick_xml::DeError),
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to prepare directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
