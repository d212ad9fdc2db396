//! Error type for `lore-store-memory`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] lore_core::Error),

  #[error("failed to read seed file {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("toml error: {0}")]
  Toml(#[from] toml::de::Error),

  #[error("unsupported seed format: {0:?} (expected .json or .toml)")]
  SeedFormat(PathBuf),

  /// The seed has no users, so there is nobody to sign in as.
  #[error("seed contains no users")]
  NoUsers,

  #[error("duplicate {kind} id in seed: {id}")]
  DuplicateId { kind: &'static str, id: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
