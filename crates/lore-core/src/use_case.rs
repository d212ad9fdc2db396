//! Use cases: captured problem/resolution write-ups that reference documents
//! and incidents without owning them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::document::SAFETY_TAG;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum UseCaseStatus {
  #[default]
  Draft,
  Review,
  Approved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UseCase {
  pub id:               String,
  pub title:            String,
  #[serde(default)]
  pub problem:          String,
  #[serde(default)]
  pub context:          String,
  #[serde(default)]
  pub root_cause:       String,
  #[serde(default)]
  pub resolution:       String,
  #[serde(default)]
  pub lessons_learned:  String,
  /// Free-form; not restricted to [`crate::document::Domain`].
  pub domain:           String,
  pub owner:            String,
  #[serde(default)]
  pub status:           UseCaseStatus,
  /// Referenced document ids.
  #[serde(default)]
  pub linked_docs:      Vec<String>,
  /// Referenced incident ids.
  #[serde(default)]
  pub linked_incidents: Vec<String>,
  #[serde(default)]
  pub tags:             BTreeSet<String>,
  /// Incremented by whoever records a reuse event; never decreases.
  #[serde(default)]
  pub reuse_count:      u32,
}

impl UseCase {
  pub fn has_tag(&self, tag: &str) -> bool { self.tags.contains(tag) }

  pub fn is_safety(&self) -> bool { self.has_tag(SAFETY_TAG) }
}
