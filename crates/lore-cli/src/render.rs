//! Plain-text and JSON output for the `lore` commands.

use anyhow::Result;
use lore_core::{
  audit::AuditEntry,
  connector::{AuthMethod, Connector},
  document::Document,
  store::Listing,
  use_case::UseCase,
  user::User,
};
use serde::Serialize;

pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

fn join<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
  items
    .into_iter()
    .map(String::as_str)
    .collect::<Vec<_>>()
    .join(", ")
}

// ─── Identity ─────────────────────────────────────────────────────────────────

pub fn users(users: &[User], current_id: &str) {
  for user in users {
    let marker = if user.id == current_id { "*" } else { " " };
    println!("{marker} {:<4} {:<22} {}", user.id, user.name, user.role);
  }
}

// ─── Library ──────────────────────────────────────────────────────────────────

fn withheld(count: usize) {
  if count > 0 {
    println!("({count} withheld by access policy)");
  }
}

pub fn documents(listing: &Listing<Document>) {
  for doc in &listing.items {
    println!(
      "{:<8} {:<12} {:<11} {:<7} {}",
      doc.id, doc.sensitivity, doc.domain, doc.doc_type, doc.title
    );
  }
  withheld(listing.withheld);
}

pub fn document(doc: &Document) {
  println!("{}  {}", doc.id, doc.title);
  println!("  type:        {}", doc.doc_type);
  println!("  domain:      {}", doc.domain);
  println!("  sensitivity: {}", doc.sensitivity);
  println!("  source:      {}", doc.source);
  println!("  language:    {}", doc.language);
  println!("  updated:     {}", doc.updated_at);
  if !doc.tags.is_empty() {
    println!("  tags:        {}", join(&doc.tags));
  }
  if !doc.content_snippet.is_empty() {
    println!();
    println!("{}", doc.content_snippet);
  }
}

pub fn use_cases(listing: &Listing<UseCase>) {
  for uc in &listing.items {
    println!(
      "{:<8} {:<9} {:<12} {}",
      uc.id, uc.status, uc.domain, uc.title
    );
  }
  withheld(listing.withheld);
}

pub fn use_case(uc: &UseCase) {
  println!("{}  {}", uc.id, uc.title);
  println!("  domain: {}  owner: {}  status: {}", uc.domain, uc.owner, uc.status);
  println!("  reused: {} times", uc.reuse_count);
  if !uc.tags.is_empty() {
    println!("  tags:   {}", join(&uc.tags));
  }
  for (label, text) in [
    ("Problem", &uc.problem),
    ("Context", &uc.context),
    ("Root cause", &uc.root_cause),
    ("Resolution", &uc.resolution),
    ("Lessons learned", &uc.lessons_learned),
  ] {
    if !text.is_empty() {
      println!();
      println!("{label}:");
      println!("  {text}");
    }
  }
  if !uc.linked_docs.is_empty() {
    println!();
    println!("Linked documents: {}", join(&uc.linked_docs));
  }
  if !uc.linked_incidents.is_empty() {
    println!("Linked incidents: {}", join(&uc.linked_incidents));
  }
}

// ─── Connectors ───────────────────────────────────────────────────────────────

pub fn connectors(connectors: &[Connector]) {
  for c in connectors {
    println!("{}  {} ({})", c.id, c.name, c.kind);
    match c.status.error_msg() {
      Some(msg) => println!("  status:   {} ({msg})", c.status.label()),
      None => println!("  status:   {}", c.status.label()),
    }
    println!(
      "  runs:     last {}, next {}, {} records",
      c.last_run, c.next_run, c.records_ingested
    );
    println!(
      "  auth:     {} ({})",
      c.config.auth_method,
      c.config.validate()
    );
    if !c.config.allowed_roles.is_empty() {
      let roles = c
        .config
        .allowed_roles
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
      println!("  roles:    {roles}");
    }
    println!("  default:  {}", c.config.default_sensitivity);
  }
}

pub fn fields(method: AuthMethod) {
  let required = method.required_fields();
  let listed = method
    .active_fields()
    .iter()
    .map(|f| {
      if required.contains(f) {
        f.to_string()
      } else {
        format!("{f} (optional)")
      }
    })
    .collect::<Vec<_>>()
    .join(", ");
  println!("{method}: {listed}");
}

// ─── Audit ────────────────────────────────────────────────────────────────────

pub fn audit(entries: &[AuditEntry]) {
  for e in entries {
    println!(
      "{} {:<8} {:<7} {} ({}): {}",
      e.timestamp.format("%Y-%m-%dT%H:%M:%SZ"),
      e.outcome,
      e.action,
      e.user,
      e.role,
      e.details
    );
  }
}
