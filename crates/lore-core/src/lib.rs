//! Core types and decision logic for the Lore knowledge console.
//!
//! This crate is deliberately free of storage and presentation concerns. The
//! access policy and the connector configuration model are plain functions
//! over the domain types; the [`store::KnowledgeStore`] trait is the only seam
//! towards mutable state, and nothing in [`policy`] or [`connector`] depends
//! on it.

pub mod audit;
pub mod connector;
pub mod document;
pub mod error;
pub mod policy;
pub mod store;
pub mod use_case;
pub mod user;

pub use connector::{active_fields_for, validate_connector_config};
pub use error::{Error, Result};
pub use policy::{can_access_document, can_access_use_case};
