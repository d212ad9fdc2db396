//! The `KnowledgeStore` trait and supporting query types.
//!
//! A store holds the console's mutable state: who is signed in, the seeded
//! documents and use cases, and the connector collection. Backends (e.g.
//! `lore-store-memory`) implement the trait; the policy engine and the
//! connector model never see it.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  audit::AuditEntry,
  connector::{Connector, ConnectorPatch, ConnectorStatus, NewConnector},
  document::{Document, DocumentType, Domain, Sensitivity},
  use_case::{UseCase, UseCaseStatus},
  user::{Role, User},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`KnowledgeStore::list_documents`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentQuery {
  /// Case-insensitive substring matched against title, snippet, and tags.
  pub text:        Option<String>,
  pub domain:      Option<Domain>,
  pub doc_type:    Option<DocumentType>,
  pub sensitivity: Option<Sensitivity>,
  /// Returned documents must carry all of these tags.
  #[serde(default)]
  pub tags:        Vec<String>,
  pub limit:       Option<usize>,
  pub offset:      Option<usize>,
}

impl DocumentQuery {
  /// Whether `doc` passes the query's filters. Access is not considered.
  pub fn matches(&self, doc: &Document) -> bool {
    if self.domain.is_some_and(|d| d != doc.domain)
      || self.doc_type.is_some_and(|t| t != doc.doc_type)
      || self.sensitivity.is_some_and(|s| s != doc.sensitivity)
      || !self.tags.iter().all(|t| doc.has_tag(t))
    {
      return false;
    }
    self.text.as_deref().is_none_or(|text| {
      let needle = text.to_lowercase();
      doc.title.to_lowercase().contains(&needle)
        || doc.content_snippet.to_lowercase().contains(&needle)
        || doc.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    })
  }
}

/// Parameters for [`KnowledgeStore::list_use_cases`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UseCaseQuery {
  /// Case-insensitive substring matched against the title and narrative.
  pub text:   Option<String>,
  /// Exact match on the free-form domain.
  pub domain: Option<String>,
  pub status: Option<UseCaseStatus>,
  #[serde(default)]
  pub tags:   Vec<String>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

impl UseCaseQuery {
  pub fn matches(&self, uc: &UseCase) -> bool {
    if self.domain.as_deref().is_some_and(|d| d != uc.domain)
      || self.status.is_some_and(|s| s != uc.status)
      || !self.tags.iter().all(|t| uc.has_tag(t))
    {
      return false;
    }
    self.text.as_deref().is_none_or(|text| {
      let needle = text.to_lowercase();
      [
        &uc.title,
        &uc.problem,
        &uc.context,
        &uc.root_cause,
        &uc.resolution,
        &uc.lessons_learned,
      ]
      .into_iter()
      .any(|field| field.to_lowercase().contains(&needle))
    })
  }
}

/// A policy-filtered result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing<T> {
  pub items:    Vec<T>,
  /// Records that matched the query but were hidden from the current user.
  pub withheld: usize,
}

impl<T> Listing<T> {
  /// Split `matching` into what `visible` admits and a withheld count, then
  /// page through the admitted part.
  pub fn build(
    matching: impl IntoIterator<Item = T>,
    mut visible: impl FnMut(&T) -> bool,
    offset: Option<usize>,
    limit: Option<usize>,
  ) -> Self {
    let mut withheld = 0;
    let admitted: Vec<T> = matching
      .into_iter()
      .filter(|item| {
        let admit = visible(item);
        withheld += usize::from(!admit);
        admit
      })
      .collect();
    let items = admitted
      .into_iter()
      .skip(offset.unwrap_or(0))
      .take(limit.unwrap_or(usize::MAX))
      .collect();
    Self { items, withheld }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the console's state container.
///
/// Reads are evaluated for the current user. Backends serialise their own
/// mutations; callers never see a partially applied update.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded runtimes.
pub trait KnowledgeStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Identity ──────────────────────────────────────────────────────────

  fn current_user(
    &self,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Make the user with `user_id` current. Fails if no such user exists.
  fn set_user<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + 'a;

  /// Make the first user holding `role` current.
  fn set_role(
    &self,
    role: Role,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  // ── Documents and use cases ───────────────────────────────────────────

  /// Documents matching `query` that the current user may see.
  fn list_documents<'a>(
    &'a self,
    query: &'a DocumentQuery,
  ) -> impl Future<Output = Result<Listing<Document>, Self::Error>> + Send + 'a;

  /// Fetch a document for viewing. Fails with a not-found error if the id is
  /// unknown and with an access error if the current user may not see it.
  fn open_document<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + 'a;

  fn list_use_cases<'a>(
    &'a self,
    query: &'a UseCaseQuery,
  ) -> impl Future<Output = Result<Listing<UseCase>, Self::Error>> + Send + 'a;

  fn open_use_case<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<UseCase, Self::Error>> + Send + 'a;

  // ── Connectors ────────────────────────────────────────────────────────

  fn list_connectors(
    &self,
  ) -> impl Future<Output = Result<Vec<Connector>, Self::Error>> + Send + '_;

  /// Returns `None` if not found.
  fn get_connector<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Connector>, Self::Error>> + Send + 'a;

  /// Persist a new connector. The store assigns the id and the initial run
  /// markers. The config is kept as given, complete or not; it is validated
  /// when a replacement is saved through [`Self::update_connector`].
  fn add_connector(
    &self,
    input: NewConnector,
  ) -> impl Future<Output = Result<Connector, Self::Error>> + Send + '_;

  /// Apply `patch`. A replacement config is validated first; an invalid one
  /// leaves the connector untouched.
  fn update_connector<'a>(
    &'a self,
    id: &'a str,
    patch: ConnectorPatch,
  ) -> impl Future<Output = Result<Connector, Self::Error>> + Send + 'a;

  fn set_connector_status<'a>(
    &'a self,
    id: &'a str,
    status: ConnectorStatus,
  ) -> impl Future<Output = Result<Connector, Self::Error>> + Send + 'a;

  fn delete_connector<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Audit ─────────────────────────────────────────────────────────────

  /// Recorded audit entries, oldest first.
  fn audit_log(
    &self,
  ) -> impl Future<Output = Result<Vec<AuditEntry>, Self::Error>> + Send + '_;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn listing_counts_withheld_before_paging() {
    let listing = Listing::build(1..=10, |n| n % 2 == 0, Some(1), Some(2));
    assert_eq!(listing.items, vec![4, 6]);
    assert_eq!(listing.withheld, 5);
  }

  #[test]
  fn empty_page_still_reports_every_withheld_record() {
    let mut calls = 0;
    let listing = Listing::build(
      1..=10,
      |n| {
        calls += 1;
        n % 3 == 0
      },
      Some(2),
      Some(0),
    );
    assert!(listing.items.is_empty());
    assert_eq!(listing.withheld, 7);
    assert_eq!(calls, 10);
  }
}
