//! Audit trail records for governance views.
//!
//! The store appends one [`AuditEntry`] per gated open and per listing. The
//! entries are display data; nothing reads them back to make decisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use crate::user::{Role, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum AuditAction {
  Query,
  View,
  Export,
  Approve,
  Override,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum AuditOutcome {
  Allowed,
  Denied,
  /// The request succeeded but some records were withheld from the result.
  Redacted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
  pub id:        Uuid,
  pub timestamp: DateTime<Utc>,
  /// Display name of the acting user.
  pub user:      String,
  pub role:      Role,
  pub action:    AuditAction,
  pub details:   String,
  pub outcome:   AuditOutcome,
}

impl AuditEntry {
  pub fn new(
    user: &User,
    action: AuditAction,
    details: impl Into<String>,
    outcome: AuditOutcome,
  ) -> Self {
    Self {
      id:        Uuid::new_v4(),
      timestamp: Utc::now(),
      user:      user.name.clone(),
      role:      user.role,
      action,
      details:   details.into(),
      outcome,
    }
  }
}
