//! Core infrastructure for tugextract.
//!
//! This crate provides language-agnostic infrastructure:
//! - Error types and error codes
//! - JSON output types for CLI and MCP responses
//! - Patch types (edits, spans, content hashes) and unified diff generation
//! - Session directory management
//! - Backup store and change journal used to persist and undo edits
//! - Layered configuration
//! - Text utilities

pub mod backup;
pub mod config;
pub mod diff;
pub mod error;
pub mod journal;
pub mod output;
pub mod patch;
pub mod session;
pub mod text;
pub mod util;
