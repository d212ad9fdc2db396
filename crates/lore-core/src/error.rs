//! Error types for `lore-core`.

use thiserror::Error;

use crate::{connector::ValidationReport, user::Role};

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(String),

  #[error("no user holds the role {0}")]
  NoUserWithRole(Role),

  #[error("document not found: {0}")]
  DocumentNotFound(String),

  #[error("use case not found: {0}")]
  UseCaseNotFound(String),

  #[error("connector not found: {0}")]
  ConnectorNotFound(String),

  #[error("{role} may not open {id}")]
  AccessDenied { id: String, role: Role },

  #[error("invalid connector config: {0}")]
  InvalidConfig(ValidationReport),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
