//! Connectors and the connector configuration model.
//!
//! A [`ConnectorConfig`] is a discriminated shape: its [`AuthMethod`] decides
//! which credential fields are *active*. Inactive credentials are kept (so a
//! user can switch methods back and forth without retyping) but are ignored
//! by validation and display.

use std::{
  collections::{BTreeMap, BTreeSet},
  fmt,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{document::Sensitivity, user::Role};

// ─── Connector vocabulary ────────────────────────────────────────────────────

/// The external system a connector ingests from.
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
pub enum ConnectorKind {
  SharePoint,
  Confluence,
  ServiceNow,
  Salesforce,
}

/// Run state of a connector. The error message exists exactly when the
/// status is [`ConnectorStatus::Error`].
///
/// Flattened into [`Connector`] it serialises as `"status": "Error",
/// "errorMsg": "..."`. Reading a record that pairs `errorMsg` with any other
/// status, or `Error` without one, fails.
#[derive(Debug, Clone, PartialEq, Eq, Default, IntoStaticStr)]
pub enum ConnectorStatus {
  #[default]
  Active,
  Error { error_msg: String },
  Syncing,
  Paused,
}

#[derive(Debug, Clone, Copy, Deserialize)]
enum StatusKind {
  Active,
  Error,
  Syncing,
  Paused,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusOut<'a> {
  status:    &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  error_msg: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusIn {
  status:    StatusKind,
  #[serde(default)]
  error_msg: Option<String>,
}

impl Serialize for ConnectorStatus {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    StatusOut {
      status:    self.label(),
      error_msg: self.error_msg(),
    }
    .serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for ConnectorStatus {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let StatusIn { status, error_msg } = StatusIn::deserialize(deserializer)?;
    match (status, error_msg) {
      (StatusKind::Error, Some(error_msg)) => Ok(Self::Error { error_msg }),
      (StatusKind::Error, None) => Err(de::Error::missing_field("errorMsg")),
      (kind, Some(_)) => Err(de::Error::custom(format_args!(
        "errorMsg is only valid with status Error, not {kind:?}"
      ))),
      (StatusKind::Active, None) => Ok(Self::Active),
      (StatusKind::Syncing, None) => Ok(Self::Syncing),
      (StatusKind::Paused, None) => Ok(Self::Paused),
    }
  }
}

impl ConnectorStatus {
  pub fn label(&self) -> &'static str { self.into() }

  pub fn error_msg(&self) -> Option<&str> {
    match self {
      Self::Error { error_msg } => Some(error_msg),
      _ => None,
    }
  }
}

impl fmt::Display for ConnectorStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Error { error_msg } => write!(f, "Error ({error_msg})"),
      other => f.write_str(other.label()),
    }
  }
}

// ─── Configuration vocabulary ────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum AuthMethod {
  #[default]
  OAuth2,
  #[serde(rename = "APIKey")]
  #[strum(serialize = "APIKey")]
  ApiKey,
  Basic,
  ServiceAccount,
}

impl AuthMethod {
  /// Fields shown and considered for this method, in editor order.
  pub fn active_fields(self) -> &'static [ConfigField] {
    use ConfigField::*;
    match self {
      Self::OAuth2 => &[EndpointUrl, ClientId, ClientSecret, TenantId],
      Self::ApiKey => &[EndpointUrl, ApiKey],
      Self::Basic => &[EndpointUrl, Username, Password],
      Self::ServiceAccount => &[EndpointUrl, ServiceAccount],
    }
  }

  /// The subset of [`Self::active_fields`] that must be non-empty to save.
  pub fn required_fields(self) -> &'static [ConfigField] {
    use ConfigField::*;
    match self {
      Self::OAuth2 => &[EndpointUrl, ClientId, ClientSecret],
      Self::ApiKey => &[EndpointUrl, ApiKey],
      Self::Basic => &[EndpointUrl, Username, Password],
      Self::ServiceAccount => &[EndpointUrl, ServiceAccount],
    }
  }
}

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
  EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum SyncFrequency {
  RealTime,
  Hourly,
  #[default]
  Daily,
  Weekly,
}

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
pub enum SyncMode {
  #[default]
  Incremental,
  Full,
}

/// A named field of [`ConnectorConfig`], as reported by validation and by
/// [`active_fields_for`]. Serialised with the record's camelCase key.
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
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ConfigField {
  EndpointUrl,
  ClientId,
  ClientSecret,
  TenantId,
  ApiKey,
  Username,
  Password,
  ServiceAccount,
  FileExtensions,
}

// ─── ConnectorConfig ─────────────────────────────────────────────────────────

/// How a connector authenticates, what it syncs, when, and which permission
/// defaults apply to what it ingests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorConfig {
  // ── Auth ────────────────────────────────────────────────────────────────
  #[serde(default)]
  pub auth_method:         AuthMethod,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub endpoint_url:        Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub client_id:           Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub client_secret:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tenant_id:           Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub api_key:             Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub username:            Option<String>,
  /// Opaque credential for [`AuthMethod::Basic`].
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub password:            Option<String>,
  /// Service-account identifier for [`AuthMethod::ServiceAccount`].
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub service_account:     Option<String>,

  // ── Scope ───────────────────────────────────────────────────────────────
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub root_path:           Option<String>,
  /// Folder identifiers from the externally supplied source tree.
  #[serde(default)]
  pub selected_folders:    BTreeSet<String>,
  /// Lowercase, without a leading dot.
  #[serde(default)]
  pub file_extensions:     BTreeSet<String>,
  #[serde(default)]
  pub include_subfolders:  bool,

  // ── Sync ────────────────────────────────────────────────────────────────
  #[serde(default)]
  pub sync_frequency:      SyncFrequency,
  #[serde(default)]
  pub sync_mode:           SyncMode,

  // ── Permissions ─────────────────────────────────────────────────────────
  /// Applied to ingested documents that carry no classification of their own.
  #[serde(default = "default_sensitivity")]
  pub default_sensitivity: Sensitivity,
  /// Empty means no gating beyond the sensitivity policy.
  #[serde(default)]
  pub allowed_roles:       BTreeSet<Role>,
}

impl Default for ConnectorConfig {
  /// The state a fresh connector editor starts from.
  fn default() -> Self {
    Self {
      auth_method:         AuthMethod::OAuth2,
      endpoint_url:        None,
      client_id:           None,
      client_secret:       None,
      tenant_id:           None,
      api_key:             None,
      username:            None,
      password:            None,
      service_account:     None,
      root_path:           None,
      selected_folders:    BTreeSet::new(),
      file_extensions:     ["pdf", "docx"].into_iter().map(String::from).collect(),
      include_subfolders:  true,
      sync_frequency:      SyncFrequency::Daily,
      sync_mode:           SyncMode::Incremental,
      default_sensitivity: default_sensitivity(),
      allowed_roles:       BTreeSet::new(),
    }
  }
}

impl ConnectorConfig {
  /// The stored value of a credential field, regardless of whether it is
  /// active. Returns `None` for [`ConfigField::FileExtensions`].
  pub fn field_value(&self, field: ConfigField) -> Option<&str> {
    let value = match field {
      ConfigField::EndpointUrl => &self.endpoint_url,
      ConfigField::ClientId => &self.client_id,
      ConfigField::ClientSecret => &self.client_secret,
      ConfigField::TenantId => &self.tenant_id,
      ConfigField::ApiKey => &self.api_key,
      ConfigField::Username => &self.username,
      ConfigField::Password => &self.password,
      ConfigField::ServiceAccount => &self.service_account,
      ConfigField::FileExtensions => return None,
    };
    value.as_deref()
  }

  /// Active credential fields paired with their current values, for display.
  pub fn active_credentials(&self) -> BTreeMap<ConfigField, Option<&str>> {
    self
      .auth_method
      .active_fields()
      .iter()
      .map(|&f| (f, self.field_value(f)))
      .collect()
  }

  /// Switch the auth method. Credentials for other methods are left intact.
  pub fn set_auth_method(&mut self, method: AuthMethod) {
    self.auth_method = method;
  }

  /// Select the folder if unselected, otherwise deselect it.
  pub fn toggle_folder(&mut self, folder_id: &str) {
    if !self.selected_folders.remove(folder_id) {
      self.selected_folders.insert(folder_id.to_owned());
    }
  }

  /// Toggle an extension; `".PDF"` and `"pdf"` name the same entry.
  pub fn toggle_extension(&mut self, ext: &str) {
    let Some(ext) = normalize_extension(ext) else {
      return;
    };
    if !self.file_extensions.remove(&ext) {
      self.file_extensions.insert(ext);
    }
  }

  pub fn toggle_role(&mut self, role: Role) {
    if !self.allowed_roles.remove(&role) {
      self.allowed_roles.insert(role);
    }
  }

  /// Bring free-typed values into canonical shape: extensions lowercased
  /// without leading dots (empty ones dropped) and surrounding whitespace
  /// trimmed from identifiers and the root path. The password is opaque and
  /// kept byte for byte.
  pub fn normalize(&mut self) {
    self.file_extensions = self
      .file_extensions
      .iter()
      .filter_map(|e| normalize_extension(e))
      .collect();

    for value in [
      &mut self.endpoint_url,
      &mut self.client_id,
      &mut self.client_secret,
      &mut self.tenant_id,
      &mut self.api_key,
      &mut self.username,
      &mut self.service_account,
      &mut self.root_path,
    ] {
      if let Some(v) = value {
        let trimmed = v.trim();
        if trimmed.len() != v.len() {
          *v = trimmed.to_owned();
        }
      }
    }
  }

  pub fn validate(&self) -> ValidationReport {
    let missing_fields = self
      .auth_method
      .required_fields()
      .iter()
      .copied()
      .filter(|&f| {
        self
          .field_value(f)
          .is_none_or(|v| v.trim().is_empty())
      })
      .collect();

    let mut invalid_fields = Vec::new();
    if !self.file_extensions.iter().all(|e| is_canonical_extension(e)) {
      invalid_fields.push(ConfigField::FileExtensions);
    }

    ValidationReport::new(missing_fields, invalid_fields)
  }

  /// The classification an ingested document ends up with: its own, if it
  /// declared one, otherwise this connector's default.
  pub fn resolve_sensitivity(&self, declared: Option<Sensitivity>) -> Sensitivity {
    declared.unwrap_or(self.default_sensitivity)
  }

  /// Whether `role` passes this connector's allowed-roles gate.
  pub fn permits_role(&self, role: Role) -> bool {
    self.allowed_roles.is_empty() || self.allowed_roles.contains(&role)
  }
}

fn default_sensitivity() -> Sensitivity { Sensitivity::Internal }

fn normalize_extension(raw: &str) -> Option<String> {
  let ext = raw.trim().trim_start_matches('.').to_ascii_lowercase();
  (!ext.is_empty()).then_some(ext)
}

fn is_canonical_extension(ext: &str) -> bool {
  !ext.is_empty()
    && !ext.starts_with('.')
    && ext
      .chars()
      .all(|c| !c.is_whitespace() && !c.is_ascii_uppercase() && c != '/' && c != '\\')
}

/// The fields the editor should show for `method`.
pub fn active_fields_for(method: AuthMethod) -> BTreeSet<ConfigField> {
  method.active_fields().iter().copied().collect()
}

/// Check a candidate configuration before it is saved. Never fails; problems
/// are reported in the returned [`ValidationReport`].
pub fn validate_connector_config(config: &ConnectorConfig) -> ValidationReport {
  config.validate()
}

// ─── Validation report ───────────────────────────────────────────────────────

/// Outcome of [`validate_connector_config`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
  pub valid:          bool,
  /// Required fields for the chosen auth method that are absent or blank.
  pub missing_fields: Vec<ConfigField>,
  /// Fields present but in the wrong shape.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub invalid_fields: Vec<ConfigField>,
}

impl ValidationReport {
  pub fn new(
    missing_fields: Vec<ConfigField>,
    invalid_fields: Vec<ConfigField>,
  ) -> Self {
    Self {
      valid: missing_fields.is_empty() && invalid_fields.is_empty(),
      missing_fields,
      invalid_fields,
    }
  }

  pub fn is_valid(&self) -> bool { self.valid }
}

impl fmt::Display for ValidationReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.valid {
      return f.write_str("valid");
    }
    let join = |fields: &[ConfigField]| {
      fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
    };
    let mut parts = Vec::new();
    if !self.missing_fields.is_empty() {
      parts.push(format!("missing {}", join(&self.missing_fields)));
    }
    if !self.invalid_fields.is_empty() {
      parts.push(format!("invalid {}", join(&self.invalid_fields)));
    }
    f.write_str(&parts.join("; "))
  }
}

// ─── Connector ───────────────────────────────────────────────────────────────

/// A configured ingestion source. Owns exactly one [`ConnectorConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
  pub id:               String,
  pub name:             String,
  #[serde(rename = "type")]
  pub kind:             ConnectorKind,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description:      Option<String>,
  #[serde(flatten)]
  pub status:           ConnectorStatus,
  /// Opaque schedule marker (a timestamp or a word like `"Never"`).
  pub last_run:         String,
  pub next_run:         String,
  #[serde(default)]
  pub records_ingested: u64,
  pub config:           ConnectorConfig,
}

/// Input to [`crate::store::KnowledgeStore::add_connector`]. The id and run
/// markers are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewConnector {
  pub name:        String,
  pub kind:        ConnectorKind,
  pub description: Option<String>,
  pub status:      ConnectorStatus,
  pub config:      ConnectorConfig,
}

impl NewConnector {
  /// An active connector with the editor's default configuration.
  pub fn new(name: impl Into<String>, kind: ConnectorKind) -> Self {
    Self {
      name: name.into(),
      kind,
      description: None,
      status: ConnectorStatus::Active,
      config: ConnectorConfig::default(),
    }
  }
}

/// Partial update for [`crate::store::KnowledgeStore::update_connector`].
/// `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ConnectorPatch {
  pub name:             Option<String>,
  pub kind:             Option<ConnectorKind>,
  pub description:      Option<Option<String>>,
  pub status:           Option<ConnectorStatus>,
  pub last_run:         Option<String>,
  pub next_run:         Option<String>,
  pub records_ingested: Option<u64>,
  pub config:           Option<ConnectorConfig>,
}

impl ConnectorPatch {
  pub fn config(config: ConnectorConfig) -> Self {
    Self {
      config: Some(config),
      ..Self::default()
    }
  }

  /// Apply onto `connector`. The caller is expected to have validated
  /// `self.config` already.
  pub fn apply(self, connector: &mut Connector) {
    if let Some(name) = self.name {
      connector.name = name;
    }
    if let Some(kind) = self.kind {
      connector.kind = kind;
    }
    if let Some(description) = self.description {
      connector.description = description;
    }
    if let Some(status) = self.status {
      connector.status = status;
    }
    if let Some(last_run) = self.last_run {
      connector.last_run = last_run;
    }
    if let Some(next_run) = self.next_run {
      connector.next_run = next_run;
    }
    if let Some(records) = self.records_ingested {
      connector.records_ingested = records;
    }
    if let Some(config) = self.config {
      connector.config = config;
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
