//! core
//!
//! Core domain types and configuration for rewind.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Oid, HistoryEntry, ResetMode
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing

pub mod config;
pub mod types;
