//! Integration tests for `MemoryStore` against the demo seed.

use lore_core::{
  audit::{AuditAction, AuditOutcome},
  connector::{
    AuthMethod, ConfigField, ConnectorConfig, ConnectorKind, ConnectorPatch,
    ConnectorStatus, NewConnector,
  },
  document::{Domain, Sensitivity},
  store::{DocumentQuery, KnowledgeStore, UseCaseQuery},
  user::Role,
};
use tempfile::TempDir;

use crate::{Error, MemoryStore, Seed};

fn store() -> MemoryStore { MemoryStore::demo().expect("demo store") }

fn valid_config() -> ConnectorConfig {
  ConnectorConfig {
    endpoint_url: Some("https://snow.example.com".into()),
    client_id: Some("client-9".into()),
    client_secret: Some("s3cret".into()),
    ..ConnectorConfig::default()
  }
}

// ─── Seed ────────────────────────────────────────────────────────────────────

#[test]
fn demo_seed_parses() {
  let seed = Seed::demo().unwrap();
  seed.check().unwrap();
  assert_eq!(seed.users.len(), 6);
  assert!(seed.use_cases.iter().any(|uc| uc.id == "uc-045"));
}

#[test]
fn seed_without_users_is_rejected() {
  let result = MemoryStore::from_seed(Seed::default());
  assert!(matches!(result, Err(Error::NoUsers)));
}

#[test]
fn seed_with_duplicate_ids_is_rejected() {
  let mut seed = Seed::demo().unwrap();
  let dup = seed.documents[0].clone();
  seed.documents.push(dup);
  assert!(matches!(
    MemoryStore::from_seed(seed),
    Err(Error::DuplicateId { kind: "document", .. })
  ));
}

#[test]
fn seed_with_unknown_default_user_is_rejected() {
  let mut seed = Seed::demo().unwrap();
  seed.default_user = Some("u99".into());
  assert!(matches!(
    MemoryStore::from_seed(seed),
    Err(Error::Core(lore_core::Error::UserNotFound(_)))
  ));
}

#[test]
fn toml_seed_loads() {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("seed.toml");
  std::fs::write(
    &path,
    r#"
defaultUser = "c1"

[[users]]
id = "c1"
name = "Casey"
role = "External Contractor"
avatar = "CA"

[[documents]]
id = "doc-t1"
title = "Ladder Safety"
type = "SOP"
domain = "Operations"
source = "Confluence"
sensitivity = "Internal"
updatedAt = "2025-03-01"
tags = ["Safety"]
"#,
  )
  .unwrap();

  let seed = Seed::load(&path).unwrap();
  assert_eq!(seed.users[0].role, Role::ExternalContractor);
  assert_eq!(seed.documents.len(), 1);
}

#[test]
fn unknown_seed_extension_is_rejected() {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("seed.yaml");
  std::fs::write(&path, "users: []").unwrap();
  assert!(matches!(Seed::load(&path), Err(Error::SeedFormat(_))));
}

// ─── Identity ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn starts_as_default_user() {
  let s = store();
  let user = s.current_user().await.unwrap();
  assert_eq!(user.id, "u3");
  assert_eq!(user.role, Role::OperationsEngineer);
}

#[tokio::test]
async fn switch_user_and_role() {
  let s = store();
  let legal = s.set_user("u4").await.unwrap();
  assert_eq!(legal.role, Role::LegalCounsel);
  assert_eq!(s.current_user().await.unwrap(), legal);

  let admin = s.set_role(Role::CioAdmin).await.unwrap();
  assert_eq!(admin.id, "u6");
}

#[tokio::test]
async fn switch_to_unknown_user_keeps_current() {
  let s = store();
  let err = s.set_user("nobody").await.unwrap_err();
  assert!(matches!(err, Error::Core(lore_core::Error::UserNotFound(_))));
  assert_eq!(s.current_user().await.unwrap().id, "u3");
}

#[tokio::test]
async fn switch_to_unheld_role_fails() {
  let mut seed = Seed::demo().unwrap();
  seed.users.retain(|u| u.role != Role::LegalCounsel);
  let s = MemoryStore::from_seed(seed).unwrap();
  let err = s.set_role(Role::LegalCounsel).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(lore_core::Error::NoUserWithRole(Role::LegalCounsel))
  ));
}

// ─── Documents ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn contractor_library_is_public_plus_safety() {
  let s = store();
  s.set_role(Role::ExternalContractor).await.unwrap();
  let listing = s.list_documents(&DocumentQuery::default()).await.unwrap();

  for doc in &listing.items {
    assert!(
      doc.sensitivity == Sensitivity::Public
        || (doc.sensitivity == Sensitivity::Internal && doc.is_safety()),
      "{} should be hidden",
      doc.id
    );
  }
  let ids: Vec<_> = listing.items.iter().map(|d| d.id.as_str()).collect();
  assert_eq!(ids, ["doc-001", "doc-003"]);
  assert_eq!(listing.withheld, 10);
}

#[tokio::test]
async fn admin_sees_everything_but_legal_and_hr_restrictions() {
  let s = store();
  s.set_role(Role::CioAdmin).await.unwrap();
  let listing = s.list_documents(&DocumentQuery::default()).await.unwrap();
  let hidden: Vec<_> = Seed::demo()
    .unwrap()
    .documents
    .into_iter()
    .filter(|d| !listing.items.iter().any(|i| i.id == d.id))
    .map(|d| d.id)
    .collect();
  // Confidential legal memo, restricted legal notice, restricted HR report.
  assert_eq!(hidden, ["doc-006", "doc-007", "doc-008"]);
  assert_eq!(listing.withheld, 3);
}

#[tokio::test]
async fn query_filters_apply_before_policy() {
  let s = store();
  s.set_role(Role::HrManager).await.unwrap();
  let query = DocumentQuery {
    domain: Some(Domain::Finance),
    ..DocumentQuery::default()
  };
  let listing = s.list_documents(&query).await.unwrap();
  assert_eq!(listing.items.len(), 2);
  assert_eq!(listing.withheld, 0);

  let query = DocumentQuery {
    text: Some("BUDGET".into()),
    limit: Some(1),
    ..DocumentQuery::default()
  };
  let listing = s.list_documents(&query).await.unwrap();
  assert_eq!(listing.items.len(), 1);
}

#[tokio::test]
async fn open_document_gates_and_audits() {
  let s = store();
  s.set_role(Role::ExternalContractor).await.unwrap();

  let doc = s.open_document("doc-001").await.unwrap();
  assert_eq!(doc.title, "Electrical Safety Policy");

  let err = s.open_document("doc-002").await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(lore_core::Error::AccessDenied {
      role: Role::ExternalContractor,
      ..
    })
  ));

  let err = s.open_document("doc-404").await.unwrap_err();
  assert!(matches!(err, Error::Core(lore_core::Error::DocumentNotFound(_))));

  let log = s.audit_log().await.unwrap();
  let outcomes: Vec<_> = log.iter().map(|e| (e.action, e.outcome)).collect();
  assert_eq!(
    outcomes,
    [
      (AuditAction::View, AuditOutcome::Allowed),
      (AuditAction::View, AuditOutcome::Denied),
    ]
  );
  assert!(log.iter().all(|e| e.role == Role::ExternalContractor));
}

#[tokio::test]
async fn redacted_listing_is_audited() {
  let s = store();
  s.set_role(Role::ExternalContractor).await.unwrap();
  s.list_documents(&DocumentQuery::default()).await.unwrap();
  let log = s.audit_log().await.unwrap();
  assert_eq!(log.len(), 1);
  assert_eq!(log[0].action, AuditAction::Query);
  assert_eq!(log[0].outcome, AuditOutcome::Redacted);
}

#[tokio::test]
async fn audit_capacity_bounds_the_trail() {
  let s = store();
  s.set_audit_capacity(2).await;
  for _ in 0..5 {
    s.open_document("doc-003").await.unwrap();
  }
  assert_eq!(s.audit_log().await.unwrap().len(), 2);

  s.set_audit_capacity(0).await;
  s.open_document("doc-003").await.unwrap();
  assert!(s.audit_log().await.unwrap().is_empty());
}

// ─── Use cases ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn contractor_use_cases_are_safety_only() {
  let s = store();
  s.set_role(Role::ExternalContractor).await.unwrap();
  let listing = s.list_use_cases(&UseCaseQuery::default()).await.unwrap();
  let ids: Vec<_> = listing.items.iter().map(|uc| uc.id.as_str()).collect();
  assert_eq!(ids, ["uc-051"]);
  assert_eq!(listing.withheld, 3);

  let err = s.open_use_case("uc-045").await.unwrap_err();
  assert!(matches!(err, Error::Core(lore_core::Error::AccessDenied { .. })));
}

#[tokio::test]
async fn operations_engineer_sees_pump_use_case() {
  let s = store();
  let uc = s.open_use_case("uc-045").await.unwrap();
  assert_eq!(uc.reuse_count, 12);

  // Legal and HR use cases stay with their owners.
  let listing = s.list_use_cases(&UseCaseQuery::default()).await.unwrap();
  assert_eq!(listing.withheld, 2);
}

#[tokio::test]
async fn use_case_text_search() {
  let s = store();
  s.set_role(Role::LegalCounsel).await.unwrap();
  let query = UseCaseQuery {
    text: Some("notice".into()),
    ..UseCaseQuery::default()
  };
  let listing = s.list_use_cases(&query).await.unwrap();
  assert_eq!(listing.items.len(), 1);
  assert_eq!(listing.items[0].id, "uc-060");
}

// ─── Connectors ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_connector_assigns_id_and_markers() {
  let s = store();
  let mut input = NewConnector::new("ServiceNow KB", ConnectorKind::ServiceNow);
  input.config = valid_config();

  let conn = s.add_connector(input).await.unwrap();
  assert!(conn.id.starts_with("conn-"));
  assert_eq!(conn.last_run, "Never");
  assert_eq!(conn.next_run, "Pending");
  assert_eq!(conn.records_ingested, 0);

  let fetched = s.get_connector(&conn.id).await.unwrap().unwrap();
  assert_eq!(fetched, conn);
  assert_eq!(s.list_connectors().await.unwrap().len(), 3);
}

#[tokio::test]
async fn add_connector_starts_from_default_config() {
  let s = store();
  let input = NewConnector::new("Fresh", ConnectorKind::SharePoint);
  let conn = s.add_connector(input).await.unwrap();
  assert_eq!(conn.config, ConnectorConfig::default());
  assert_eq!(
    conn.config.validate().missing_fields,
    [
      ConfigField::EndpointUrl,
      ConfigField::ClientId,
      ConfigField::ClientSecret
    ]
  );
  assert_eq!(s.list_connectors().await.unwrap().len(), 3);

  // The draft is completed field by field; an incomplete replacement is
  // refused and leaves the stored draft in place.
  let mut partial = conn.config.clone();
  partial.endpoint_url = Some("https://tenant.sharepoint.com".into());
  let err = s
    .update_connector(&conn.id, ConnectorPatch::config(partial.clone()))
    .await
    .unwrap_err();
  let Error::Core(lore_core::Error::InvalidConfig(report)) = err else {
    panic!("expected an invalid config error");
  };
  assert_eq!(
    report.missing_fields,
    [ConfigField::ClientId, ConfigField::ClientSecret]
  );
  assert_eq!(s.get_connector(&conn.id).await.unwrap().unwrap(), conn);

  partial.client_id = Some("client-123".into());
  partial.client_secret = Some("s3cret".into());
  let saved = s
    .update_connector(&conn.id, ConnectorPatch::config(partial))
    .await
    .unwrap();
  assert!(saved.config.validate().is_valid());
}

#[tokio::test]
async fn update_connector_validates_replacement_config() {
  let s = store();
  let original = s.get_connector("conn-2").await.unwrap().unwrap();

  let mut broken = original.config.clone();
  broken.api_key = None;
  let err = s
    .update_connector("conn-2", ConnectorPatch::config(broken))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(lore_core::Error::InvalidConfig(_))));
  assert_eq!(s.get_connector("conn-2").await.unwrap().unwrap(), original);

  let mut switched = original.config.clone();
  switched.set_auth_method(AuthMethod::Basic);
  switched.username = Some("svc".into());
  switched.password = Some("pw".into());
  let updated = s
    .update_connector("conn-2", ConnectorPatch::config(switched))
    .await
    .unwrap();
  assert_eq!(updated.config.auth_method, AuthMethod::Basic);
  // The API key survives the switch.
  assert_eq!(updated.config.api_key.as_deref(), Some("sk-xxxxxxxx"));
}

#[tokio::test]
async fn update_without_config_skips_validation() {
  let s = store();
  // conn-1 is seeded without a client secret.
  assert!(!s.get_connector("conn-1").await.unwrap().unwrap().config.validate().valid);
  let patch = ConnectorPatch {
    name: Some("SharePoint (Corp)".into()),
    ..ConnectorPatch::default()
  };
  let updated = s.update_connector("conn-1", patch).await.unwrap();
  assert_eq!(updated.name, "SharePoint (Corp)");
}

#[tokio::test]
async fn status_changes_carry_error_message() {
  let s = store();
  let conn = s
    .set_connector_status(
      "conn-1",
      ConnectorStatus::Error {
        error_msg: "Throttled".into(),
      },
    )
    .await
    .unwrap();
  assert_eq!(conn.status.error_msg(), Some("Throttled"));

  let conn = s
    .set_connector_status("conn-1", ConnectorStatus::Paused)
    .await
    .unwrap();
  assert_eq!(conn.status.error_msg(), None);
}

#[tokio::test]
async fn delete_connector() {
  let s = store();
  s.delete_connector("conn-2").await.unwrap();
  assert!(s.get_connector("conn-2").await.unwrap().is_none());

  let err = s.delete_connector("conn-2").await.unwrap_err();
  assert!(matches!(err, Error::Core(lore_core::Error::ConnectorNotFound(_))));
}

#[tokio::test]
async fn clones_share_state() {
  let a = store();
  let b = a.clone();
  a.set_user("u2").await.unwrap();
  assert_eq!(b.current_user().await.unwrap().id, "u2");
}
