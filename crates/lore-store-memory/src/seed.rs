//! Seed data: the records a store starts from.
//!
//! The console's demo data set is embedded at compile time. Other data sets
//! load from JSON or TOML files with the same shape.

use std::{collections::HashSet, path::Path};

use lore_core::{
  connector::Connector, document::Document, use_case::UseCase, user::User,
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The demo data set shipped with the console.
pub const DEMO_SEED: &str = include_str!("seed/demo.json");

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seed {
  /// Id of the user signed in at start; defaults to the first user.
  #[serde(default)]
  pub default_user: Option<String>,
  pub users:        Vec<User>,
  #[serde(default)]
  pub documents:    Vec<Document>,
  #[serde(default)]
  pub use_cases:    Vec<UseCase>,
  #[serde(default)]
  pub connectors:   Vec<Connector>,
}

impl Seed {
  pub fn demo() -> Result<Self> { Ok(serde_json::from_str(DEMO_SEED)?) }

  /// Load a seed file. The format follows the extension: `.json` or `.toml`.
  /// Dates in TOML seeds are written as quoted strings.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Io {
      path: path.to_path_buf(),
      source,
    })?;
    match path.extension().and_then(|e| e.to_str()) {
      Some("json") => Ok(serde_json::from_str(&raw)?),
      Some("toml") => Ok(toml::from_str(&raw)?),
      _ => Err(Error::SeedFormat(path.to_path_buf())),
    }
  }

  /// Reject seeds a store cannot start from: no users, or ids that collide
  /// within a collection.
  pub fn check(&self) -> Result<()> {
    if self.users.is_empty() {
      return Err(Error::NoUsers);
    }
    unique("user", self.users.iter().map(|u| u.id.as_str()))?;
    unique("document", self.documents.iter().map(|d| d.id.as_str()))?;
    unique("use case", self.use_cases.iter().map(|u| u.id.as_str()))?;
    unique("connector", self.connectors.iter().map(|c| c.id.as_str()))?;
    Ok(())
  }
}

fn unique<'a>(
  kind: &'static str,
  ids: impl Iterator<Item = &'a str>,
) -> Result<()> {
  let mut seen = HashSet::new();
  for id in ids {
    if !seen.insert(id) {
      return Err(Error::DuplicateId {
        kind,
        id: id.to_owned(),
      });
    }
  }
  Ok(())
}
