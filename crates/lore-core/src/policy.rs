//! Access policy: who may see which document or use case.
//!
//! Documents are judged sensitivity first. Each tier is a closed rule set;
//! within a tier, domain ownership and role refine the answer. A tier never
//! inherits permissions from a looser one.
//!
//! | Sensitivity    | Rule                                                                 |
//! |----------------|----------------------------------------------------------------------|
//! | `Public`       | everyone                                                             |
//! | `Internal`     | everyone except contractors; contractors only for `Safety`-tagged    |
//! | `Confidential` | no contractors; `Legal` needs Legal Counsel                          |
//! | `Restricted`   | `Legal` → Legal Counsel, `HR` → HR Manager, `Finance` → CIO or HR, else CIO |
//!
//! Every function here is pure. Inputs that cannot be interpreted are denied.

use std::collections::HashMap;

use serde_json::Value;

use crate::{
  Result,
  connector::ConnectorConfig,
  document::{Document, Domain, Sensitivity},
  use_case::UseCase,
  user::{Role, User},
};

// ─── Documents ───────────────────────────────────────────────────────────────

/// Whether `user` may see `doc`.
pub fn can_access_document(user: &User, doc: &Document) -> bool {
  document_rule(user.role, doc.sensitivity, doc.domain, doc.is_safety())
}

fn document_rule(
  role: Role,
  sensitivity: Sensitivity,
  domain: Domain,
  safety: bool,
) -> bool {
  use Role::*;
  match sensitivity {
    Sensitivity::Public => true,
    Sensitivity::Internal => role != ExternalContractor || safety,
    Sensitivity::Confidential => match (role, domain) {
      (ExternalContractor, _) => false,
      (_, Domain::Legal) => role == LegalCounsel,
      _ => true,
    },
    Sensitivity::Restricted => match domain {
      Domain::Legal => role == LegalCounsel,
      Domain::Hr => role == HrManager,
      Domain::Finance => matches!(role, CioAdmin | HrManager),
      Domain::Engineering | Domain::Operations => role == CioAdmin,
    },
  }
}

/// The document decision further narrowed by the allowed-roles list of the
/// connector the document came through. An empty list adds no restriction.
///
/// Not applied by default listings; callers opt in.
pub fn can_access_ingested(
  user: &User,
  doc: &Document,
  source: &ConnectorConfig,
) -> bool {
  can_access_document(user, doc) && source.permits_role(user.role)
}

// ─── Use cases ───────────────────────────────────────────────────────────────

/// Whether `user` may see `use_case`.
///
/// Contractors see only `Safety`-tagged use cases. Otherwise `Legal` and `HR`
/// use cases are reserved for their owning role and everything else is open.
pub fn can_access_use_case(user: &User, use_case: &UseCase) -> bool {
  if user.role.is_contractor() {
    return use_case.is_safety();
  }
  match use_case.domain.parse::<Domain>() {
    Ok(Domain::Legal) => user.role == Role::LegalCounsel,
    Ok(Domain::Hr) => user.role == Role::HrManager,
    _ => true,
  }
}

// ─── Untyped records ─────────────────────────────────────────────────────────

/// Parse a raw document record. A record with no `sensitivity` key inherits
/// the default of `source`, when one is given.
pub fn parse_document_record(
  record: &Value,
  source: Option<&ConnectorConfig>,
) -> Result<Document> {
  let mut record = record.clone();
  if let (Some(obj), Some(source)) = (record.as_object_mut(), source)
    && !obj.contains_key("sensitivity")
  {
    obj.insert(
      "sensitivity".to_owned(),
      serde_json::to_value(source.resolve_sensitivity(None))?,
    );
  }
  Ok(serde_json::from_value(record)?)
}

/// [`can_access_document`] over an untyped record. Anything that does not
/// parse into a [`Document`] is denied.
pub fn can_access_document_record(
  user: &User,
  record: &Value,
  source: Option<&ConnectorConfig>,
) -> bool {
  match parse_document_record(record, source) {
    Ok(doc) => can_access_document(user, &doc),
    Err(e) => {
      tracing::warn!(
        record_id = record.get("id").and_then(serde_json::Value::as_str),
        error = %e,
        "denying access to unreadable document record"
      );
      false
    }
  }
}

/// [`can_access_use_case`] over an untyped record. Anything that does not
/// parse into a [`UseCase`] is denied.
pub fn can_access_use_case_record(user: &User, record: &Value) -> bool {
  match serde_json::from_value::<UseCase>(record.clone()) {
    Ok(uc) => can_access_use_case(user, &uc),
    Err(e) => {
      tracing::warn!(
        record_id = record.get("id").and_then(serde_json::Value::as_str),
        error = %e,
        "denying access to unreadable use case record"
      );
      false
    }
  }
}

// ─── Memoisation ─────────────────────────────────────────────────────────────

/// Everything [`can_access_document`] looks at. Of a document's tags only the
/// presence of `Safety` affects the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct DecisionKey {
  role:        Role,
  sensitivity: Sensitivity,
  domain:      Domain,
  safety:      bool,
}

/// Per-listing cache of document decisions. Answers are identical to
/// [`can_access_document`]; it only avoids re-evaluating the same combination.
#[derive(Debug, Default)]
pub struct PolicyCache {
  decisions: HashMap<DecisionKey, bool>,
}

impl PolicyCache {
  pub fn new() -> Self { Self::default() }

  pub fn can_access_document(&mut self, user: &User, doc: &Document) -> bool {
    let key = DecisionKey {
      role:        user.role,
      sensitivity: doc.sensitivity,
      domain:      doc.domain,
      safety:      doc.is_safety(),
    };
    *self.decisions.entry(key).or_insert_with(|| {
      document_rule(key.role, key.sensitivity, key.domain, key.safety)
    })
  }

  /// Number of distinct combinations evaluated so far.
  pub fn len(&self) -> usize { self.decisions.len() }

  pub fn is_empty(&self) -> bool { self.decisions.is_empty() }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
