//! Library documents and their classification vocabulary.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::connector::ConnectorKind;

/// Tag that opens safety material to roles that would otherwise be denied.
pub const SAFETY_TAG: &str = "Safety";

// ─── Vocabulary ──────────────────────────────────────────────────────────────

/// Classification label controlling baseline visibility.
///
/// The derived ordering runs from least to most restrictive, but access is not
/// a threshold on it; see [`crate::policy::can_access_document`].
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Sensitivity {
  Public,
  Internal,
  Confidential,
  Restricted,
}

/// Organisational owner of a document.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
pub enum Domain {
  Engineering,
  Operations,
  #[serde(rename = "HR")]
  #[strum(serialize = "HR")]
  Hr,
  Legal,
  Finance,
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum DocumentType {
  Policy,
  #[serde(rename = "SOP")]
  #[strum(serialize = "SOP")]
  Sop,
  Runbook,
  Design,
  Memo,
  Report,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
  #[default]
  En,
  Ar,
}

// ─── Document ────────────────────────────────────────────────────────────────

/// A document ingested into the library. Seeded once and read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
  pub id:              String,
  pub title:           String,
  #[serde(rename = "type")]
  pub doc_type:        DocumentType,
  pub domain:          Domain,
  /// The kind of connector the document was ingested through.
  pub source:          ConnectorKind,
  pub sensitivity:     Sensitivity,
  #[serde(default)]
  pub language:        Language,
  pub updated_at:      NaiveDate,
  #[serde(default)]
  pub content_snippet: String,
  #[serde(default)]
  pub tags:            BTreeSet<String>,
}

impl Document {
  pub fn has_tag(&self, tag: &str) -> bool { self.tags.contains(tag) }

  pub fn is_safety(&self) -> bool { self.has_tag(SAFETY_TAG) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deserialises_console_record() {
    let raw = serde_json::json!({
      "id": "doc-001",
      "title": "Electrical Safety Policy",
      "type": "Policy",
      "domain": "Engineering",
      "source": "SharePoint",
      "sensitivity": "Internal",
      "language": "en",
      "updatedAt": "2025-10-15",
      "contentSnippet": "Mandatory lockout procedures.",
      "tags": ["Safety"]
    });
    let doc: Document = serde_json::from_value(raw).unwrap();
    assert_eq!(doc.doc_type, DocumentType::Policy);
    assert_eq!(doc.updated_at, NaiveDate::from_ymd_opt(2025, 10, 15).unwrap());
    assert!(doc.is_safety());
  }

  #[test]
  fn unknown_sensitivity_is_rejected() {
    let raw = serde_json::json!({
      "id": "doc-x",
      "title": "x",
      "type": "Memo",
      "domain": "HR",
      "source": "Confluence",
      "sensitivity": "TopSecret",
      "updatedAt": "2025-01-01"
    });
    assert!(serde_json::from_value::<Document>(raw).is_err());
  }

  #[test]
  fn sensitivity_order_is_nominal_strictness() {
    assert!(Sensitivity::Public < Sensitivity::Internal);
    assert!(Sensitivity::Confidential < Sensitivity::Restricted);
  }
}
