//! Core library for bizdash.
//!
//! This crate holds everything the CLI needs to bulk-load dashboard records:
//! - `csv` tokenizes and parses CSV documents into rows
//! - `entity` maps rows onto typed customer / inventory drafts and validates them
//! - `import` drives a sequential import and collects the per-row ledger
//! - `client` talks to the dashboard REST API

pub mod client;
pub mod config;
pub mod csv;
pub mod entity;
pub mod error;
pub mod import;

pub use client::{Client, ClientError};
pub use config::BizdashConfig;
pub use entity::{EntityDraft, EntityKind};
pub use error::{BizdashError, BizdashResult, FormatError, ValidationError};
pub use import::{ImportCancel, ImportProgress, ImportSummary, Importer};
