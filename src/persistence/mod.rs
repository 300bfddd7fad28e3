use crate::task::ParseDependencyError;
use serde_json::Error as SerdeJsonError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid dependency in row {row}: {source}")]
    Dependency {
        row: usize,
        #[source]
        source: ParseDependencyError,
    },
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub mod file;

pub use file::{
    load_network_from_csv, load_network_from_json, save_network_to_json, save_snapshot_to_csv,
    save_snapshot_to_json,
};
