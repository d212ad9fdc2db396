//! [`MemoryStore`]: the in-memory implementation of [`KnowledgeStore`].

use std::{collections::VecDeque, sync::Arc};

use tokio::sync::RwLock;
use uuid::Uuid;

use lore_core::{
  audit::{AuditAction, AuditEntry, AuditOutcome},
  connector::{Connector, ConnectorPatch, ConnectorStatus, NewConnector},
  document::Document,
  policy::{PolicyCache, can_access_use_case},
  store::{DocumentQuery, KnowledgeStore, Listing, UseCaseQuery},
  use_case::UseCase,
  user::{Role, User},
};

use crate::{Error, Result, seed::Seed};

/// Audit entries kept before the oldest are dropped.
pub const DEFAULT_AUDIT_CAPACITY: usize = 500;

// ─── State ───────────────────────────────────────────────────────────────────

struct State {
  current_user:   User,
  users:          Vec<User>,
  documents:      Vec<Document>,
  use_cases:      Vec<UseCase>,
  connectors:     Vec<Connector>,
  audit:          VecDeque<AuditEntry>,
  audit_capacity: usize,
}

impl State {
  fn record(&mut self, action: AuditAction, details: String, outcome: AuditOutcome) {
    if self.audit_capacity == 0 {
      return;
    }
    while self.audit.len() >= self.audit_capacity {
      self.audit.pop_front();
    }
    let entry = AuditEntry::new(&self.current_user, action, details, outcome);
    self.audit.push_back(entry);
  }

  fn connector_mut(&mut self, id: &str) -> Result<&mut Connector> {
    self
      .connectors
      .iter_mut()
      .find(|c| c.id == id)
      .ok_or_else(|| lore_core::Error::ConnectorNotFound(id.to_owned()).into())
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A knowledge store held entirely in memory.
///
/// Clones share the same state.
#[derive(Clone)]
pub struct MemoryStore {
  state: Arc<RwLock<State>>,
}

impl MemoryStore {
  /// Build a store from `seed`, signing in as its default user.
  pub fn from_seed(seed: Seed) -> Result<Self> {
    seed.check()?;
    let current_user = match &seed.default_user {
      Some(id) => seed
        .users
        .iter()
        .find(|u| &u.id == id)
        .cloned()
        .ok_or_else(|| lore_core::Error::UserNotFound(id.clone()))?,
      None => seed.users[0].clone(),
    };

    tracing::debug!(
      users = seed.users.len(),
      documents = seed.documents.len(),
      use_cases = seed.use_cases.len(),
      connectors = seed.connectors.len(),
      "seeded store"
    );

    Ok(Self {
      state: Arc::new(RwLock::new(State {
        current_user,
        users: seed.users,
        documents: seed.documents,
        use_cases: seed.use_cases,
        connectors: seed.connectors,
        audit: VecDeque::new(),
        audit_capacity: DEFAULT_AUDIT_CAPACITY,
      })),
    })
  }

  /// A store loaded with the embedded demo data.
  pub fn demo() -> Result<Self> { Self::from_seed(Seed::demo()?) }

  /// Keep at most `capacity` audit entries; `0` disables the trail.
  pub async fn set_audit_capacity(&self, capacity: usize) {
    let mut state = self.state.write().await;
    state.audit_capacity = capacity;
    while state.audit.len() > capacity {
      state.audit.pop_front();
    }
  }
}

// ─── KnowledgeStore impl ─────────────────────────────────────────────────────

impl KnowledgeStore for MemoryStore {
  type Error = Error;

  // ── Identity ──────────────────────────────────────────────────────────────

  async fn current_user(&self) -> Result<User> {
    Ok(self.state.read().await.current_user.clone())
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    Ok(self.state.read().await.users.clone())
  }

  async fn set_user(&self, user_id: &str) -> Result<User> {
    let mut state = self.state.write().await;
    let user = state
      .users
      .iter()
      .find(|u| u.id == user_id)
      .cloned()
      .ok_or_else(|| lore_core::Error::UserNotFound(user_id.to_owned()))?;
    tracing::info!(user = %user.name, role = %user.role, "switched user");
    state.current_user = user.clone();
    Ok(user)
  }

  async fn set_role(&self, role: Role) -> Result<User> {
    let mut state = self.state.write().await;
    let user = state
      .users
      .iter()
      .find(|u| u.role == role)
      .cloned()
      .ok_or(lore_core::Error::NoUserWithRole(role))?;
    tracing::info!(user = %user.name, role = %user.role, "switched role");
    state.current_user = user.clone();
    Ok(user)
  }

  // ── Documents and use cases ───────────────────────────────────────────────

  async fn list_documents(&self, query: &DocumentQuery) -> Result<Listing<Document>> {
    let mut state = self.state.write().await;
    let user = state.current_user.clone();
    let mut cache = PolicyCache::new();

    let listing = Listing::build(
      state.documents.iter().filter(|d| query.matches(d)).cloned(),
      |d| cache.can_access_document(&user, d),
      query.offset,
      query.limit,
    );

    tracing::debug!(
      user = %user.name,
      shown = listing.items.len(),
      withheld = listing.withheld,
      "listed documents"
    );
    let outcome = if listing.withheld > 0 {
      AuditOutcome::Redacted
    } else {
      AuditOutcome::Allowed
    };
    let details = format!(
      "document search {:?}: {} shown, {} withheld",
      query.text.as_deref().unwrap_or(""),
      listing.items.len(),
      listing.withheld
    );
    state.record(AuditAction::Query, details, outcome);
    Ok(listing)
  }

  async fn open_document(&self, id: &str) -> Result<Document> {
    let mut state = self.state.write().await;
    let doc = state
      .documents
      .iter()
      .find(|d| d.id == id)
      .cloned()
      .ok_or_else(|| lore_core::Error::DocumentNotFound(id.to_owned()))?;

    let role = state.current_user.role;
    if !lore_core::can_access_document(&state.current_user, &doc) {
      tracing::warn!(document = id, %role, "document access denied");
      state.record(AuditAction::View, format!("opened {id}"), AuditOutcome::Denied);
      return Err(
        lore_core::Error::AccessDenied {
          id: id.to_owned(),
          role,
        }
        .into(),
      );
    }

    state.record(AuditAction::View, format!("opened {id}"), AuditOutcome::Allowed);
    Ok(doc)
  }

  async fn list_use_cases(&self, query: &UseCaseQuery) -> Result<Listing<UseCase>> {
    let mut state = self.state.write().await;
    let user = state.current_user.clone();

    let listing = Listing::build(
      state.use_cases.iter().filter(|uc| query.matches(uc)).cloned(),
      |uc| can_access_use_case(&user, uc),
      query.offset,
      query.limit,
    );

    let outcome = if listing.withheld > 0 {
      AuditOutcome::Redacted
    } else {
      AuditOutcome::Allowed
    };
    let details = format!(
      "use case search {:?}: {} shown, {} withheld",
      query.text.as_deref().unwrap_or(""),
      listing.items.len(),
      listing.withheld
    );
    state.record(AuditAction::Query, details, outcome);
    Ok(listing)
  }

  async fn open_use_case(&self, id: &str) -> Result<UseCase> {
    let mut state = self.state.write().await;
    let uc = state
      .use_cases
      .iter()
      .find(|uc| uc.id == id)
      .cloned()
      .ok_or_else(|| lore_core::Error::UseCaseNotFound(id.to_owned()))?;

    let role = state.current_user.role;
    if !can_access_use_case(&state.current_user, &uc) {
      tracing::warn!(use_case = id, %role, "use case access denied");
      state.record(AuditAction::View, format!("opened {id}"), AuditOutcome::Denied);
      return Err(
        lore_core::Error::AccessDenied {
          id: id.to_owned(),
          role,
        }
        .into(),
      );
    }

    state.record(AuditAction::View, format!("opened {id}"), AuditOutcome::Allowed);
    Ok(uc)
  }

  // ── Connectors ────────────────────────────────────────────────────────────

  async fn list_connectors(&self) -> Result<Vec<Connector>> {
    Ok(self.state.read().await.connectors.clone())
  }

  async fn get_connector(&self, id: &str) -> Result<Option<Connector>> {
    let state = self.state.read().await;
    Ok(state.connectors.iter().find(|c| c.id == id).cloned())
  }

  async fn add_connector(&self, input: NewConnector) -> Result<Connector> {
    let report = input.config.validate();

    let connector = Connector {
      id:               format!("conn-{}", Uuid::new_v4().simple()),
      name:             input.name,
      kind:             input.kind,
      description:      input.description,
      status:           input.status,
      last_run:         "Never".to_owned(),
      next_run:         "Pending".to_owned(),
      records_ingested: 0,
      config:           input.config,
    };

    tracing::info!(id = %connector.id, name = %connector.name, "added connector");
    if !report.is_valid() {
      tracing::debug!(id = %connector.id, %report, "connector config incomplete");
    }
    self.state.write().await.connectors.push(connector.clone());
    Ok(connector)
  }

  async fn update_connector(&self, id: &str, patch: ConnectorPatch) -> Result<Connector> {
    if let Some(config) = &patch.config {
      let report = config.validate();
      if !report.is_valid() {
        return Err(lore_core::Error::InvalidConfig(report).into());
      }
    }

    let mut state = self.state.write().await;
    let connector = state.connector_mut(id)?;
    patch.apply(connector);
    tracing::info!(id, "updated connector");
    Ok(connector.clone())
  }

  async fn set_connector_status(&self, id: &str, status: ConnectorStatus) -> Result<Connector> {
    let mut state = self.state.write().await;
    let connector = state.connector_mut(id)?;
    tracing::info!(id, from = %connector.status, to = %status, "connector status changed");
    connector.status = status;
    Ok(connector.clone())
  }

  async fn delete_connector(&self, id: &str) -> Result<()> {
    let mut state = self.state.write().await;
    let before = state.connectors.len();
    state.connectors.retain(|c| c.id != id);
    if state.connectors.len() == before {
      return Err(lore_core::Error::ConnectorNotFound(id.to_owned()).into());
    }
    tracing::info!(id, "deleted connector");
    Ok(())
  }

  // ── Audit ─────────────────────────────────────────────────────────────────

  async fn audit_log(&self) -> Result<Vec<AuditEntry>> {
    Ok(self.state.read().await.audit.iter().cloned().collect())
  }
}
