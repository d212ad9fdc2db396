//! `lore`: command-line front end for the Lore knowledge console.
//!
//! Each invocation seeds an in-memory store, signs in as a user, runs one
//! command against it, and exits.
//!
//! # Usage
//!
//! ```
//! lore users
//! lore --role "External Contractor" docs --text pump
//! lore --as u4 open doc-008
//! lore validate connector.toml
//! lore fields APIKey
//! ```

mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand};
use lore_core::{
  connector::{AuthMethod, ConnectorConfig, ConnectorKind, NewConnector},
  document::{DocumentType, Domain, Sensitivity},
  store::{DocumentQuery, KnowledgeStore, UseCaseQuery},
  use_case::UseCaseStatus,
  user::Role,
};
use lore_store_memory::{DEFAULT_AUDIT_CAPACITY, MemoryStore, Seed};
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "lore", version, about = "Lore knowledge console")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "lore.toml")]
  config: PathBuf,

  /// Seed file (.json or .toml) to load instead of the demo data.
  #[arg(long, env = "LORE_SEED", value_name = "FILE")]
  seed: Option<PathBuf>,

  /// Sign in as the user with this id.
  #[arg(long = "as", value_name = "USER_ID", conflicts_with = "role")]
  as_user: Option<String>,

  /// Sign in as the first user holding this role.
  #[arg(long)]
  role: Option<Role>,

  /// Print results as JSON.
  #[arg(long, global = true)]
  json: bool,

  /// Print the audit trail recorded by the command.
  #[arg(long, global = true)]
  show_audit: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List the seeded users.
  Users,
  /// Show the signed-in user.
  Whoami,
  /// Search documents visible to the signed-in user.
  Docs {
    #[arg(long)]
    text:        Option<String>,
    #[arg(long)]
    domain:      Option<Domain>,
    #[arg(long = "type")]
    doc_type:    Option<DocumentType>,
    #[arg(long)]
    sensitivity: Option<Sensitivity>,
    /// Require this tag; repeat for more.
    #[arg(long = "tag")]
    tags:        Vec<String>,
    #[arg(long)]
    limit:       Option<usize>,
    #[arg(long)]
    offset:      Option<usize>,
  },
  /// Open a document by id.
  Open { id: String },
  /// Search use cases visible to the signed-in user.
  UseCases {
    #[arg(long)]
    text:   Option<String>,
    #[arg(long)]
    domain: Option<String>,
    #[arg(long)]
    status: Option<UseCaseStatus>,
    #[arg(long = "tag")]
    tags:   Vec<String>,
    #[arg(long)]
    limit:  Option<usize>,
    #[arg(long)]
    offset: Option<usize>,
  },
  /// Open a use case by id.
  UseCase { id: String },
  /// List connectors with their configuration status.
  Connectors,
  /// Add a connector. Without a config file it starts from the editor
  /// defaults and is completed later.
  AddConnector {
    #[arg(long)]
    name:        String,
    #[arg(long = "type")]
    kind:        ConnectorKind,
    #[arg(long)]
    description: Option<String>,
    /// Connector config (.json or .toml).
    config:      Option<PathBuf>,
  },
  /// Validate a connector config file.
  Validate { file: PathBuf },
  /// Show the credential fields an auth method uses.
  Fields {
    /// Omit to list every method.
    method: Option<AuthMethod>,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Console settings, read from the config file and `LORE_*` variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct ConsoleConfig {
  seed_path:      Option<PathBuf>,
  /// User id signed in when no `--as`/`--role` is given.
  default_user:   Option<String>,
  audit_capacity: usize,
}

impl Default for ConsoleConfig {
  fn default() -> Self {
    Self {
      seed_path:      None,
      default_user:   None,
      audit_capacity: DEFAULT_AUDIT_CAPACITY,
    }
  }
}

fn load_config(path: &Path) -> Result<ConsoleConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("LORE"))
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise ConsoleConfig")
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let cfg = load_config(&cli.config)?;

  let store = open_store(cli.seed.as_deref().or(cfg.seed_path.as_deref()))?;
  store.set_audit_capacity(cfg.audit_capacity).await;

  if let Some(id) = &cli.as_user {
    store.set_user(id).await?;
  } else if let Some(role) = cli.role {
    store.set_role(role).await?;
  } else if let Some(id) = &cfg.default_user {
    store.set_user(id).await?;
  }

  let outcome = run(&store, &cli).await;

  if cli.show_audit {
    let trail = store.audit_log().await?;
    if cli.json {
      render::json(&trail)?;
    } else {
      render::audit(&trail);
    }
  }

  outcome
}

fn open_store(seed: Option<&Path>) -> Result<MemoryStore> {
  tracing::debug!(seed = ?seed, "opening store");
  let seed = match seed {
    Some(path) => Seed::load(path)
      .with_context(|| format!("failed to load seed {}", path.display()))?,
    None => Seed::demo().context("failed to parse demo seed")?,
  };
  MemoryStore::from_seed(seed).context("failed to build store")
}

async fn run(store: &MemoryStore, cli: &Cli) -> Result<()> {
  match &cli.command {
    Command::Users => {
      let users = store.list_users().await?;
      if cli.json {
        render::json(&users)?;
      } else {
        let current = store.current_user().await?;
        render::users(&users, &current.id);
      }
    }

    Command::Whoami => {
      let user = store.current_user().await?;
      if cli.json {
        render::json(&user)?;
      } else {
        println!("{} ({}) as {}", user.name, user.id, user.role);
      }
    }

    Command::Docs {
      text,
      domain,
      doc_type,
      sensitivity,
      tags,
      limit,
      offset,
    } => {
      let query = DocumentQuery {
        text:        text.clone(),
        domain:      *domain,
        doc_type:    *doc_type,
        sensitivity: *sensitivity,
        tags:        tags.clone(),
        limit:       *limit,
        offset:      *offset,
      };
      let listing = store.list_documents(&query).await?;
      if cli.json {
        render::json(&listing)?;
      } else {
        render::documents(&listing);
      }
    }

    Command::Open { id } => {
      let doc = store.open_document(id).await?;
      if cli.json {
        render::json(&doc)?;
      } else {
        render::document(&doc);
      }
    }

    Command::UseCases {
      text,
      domain,
      status,
      tags,
      limit,
      offset,
    } => {
      let query = UseCaseQuery {
        text:   text.clone(),
        domain: domain.clone(),
        status: *status,
        tags:   tags.clone(),
        limit:  *limit,
        offset: *offset,
      };
      let listing = store.list_use_cases(&query).await?;
      if cli.json {
        render::json(&listing)?;
      } else {
        render::use_cases(&listing);
      }
    }

    Command::UseCase { id } => {
      let uc = store.open_use_case(id).await?;
      if cli.json {
        render::json(&uc)?;
      } else {
        render::use_case(&uc);
      }
    }

    Command::Connectors => {
      let connectors = store.list_connectors().await?;
      if cli.json {
        render::json(&connectors)?;
      } else {
        render::connectors(&connectors);
      }
    }

    Command::AddConnector {
      name,
      kind,
      description,
      config,
    } => {
      let mut input = NewConnector::new(name.clone(), *kind);
      input.description = description.clone();
      if let Some(path) = config {
        input.config = read_connector_config(path)?;
        input.config.normalize();
      }

      let connector = store.add_connector(input).await?;
      if cli.json {
        render::json(&connector)?;
      } else {
        println!("added {} ({})", connector.name, connector.id);
        println!("  config: {}", connector.config.validate());
      }
    }

    Command::Validate { file } => {
      let config = read_connector_config(file)?;
      let report = config.validate();
      if cli.json {
        render::json(&report)?;
      } else {
        println!("{report}");
      }
      if !report.is_valid() {
        bail!("{} is not a valid connector config", file.display());
      }
    }

    Command::Fields { method } => match method {
      Some(method) => render::fields(*method),
      None => {
        for method in <AuthMethod as strum::IntoEnumIterator>::iter() {
          render::fields(method);
        }
      }
    },
  }
  Ok(())
}

/// Read a [`ConnectorConfig`] from a `.json` or `.toml` file.
fn read_connector_config(path: &Path) -> Result<ConnectorConfig> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading connector config {}", path.display()))?;
  match path.extension().and_then(|e| e.to_str()) {
    Some("json") => serde_json::from_str(&raw).context("parsing connector config"),
    Some("toml") => toml::from_str(&raw).context("parsing connector config"),
    _ => bail!("{} must be a .json or .toml file", path.display()),
  }
}
