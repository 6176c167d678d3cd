// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! tugextract: extract-method refactoring for C# and TypeScript.
//!
//! Turns a range of lines inside a method body into a new method and
//! replaces the range with a call to it. The engine itself is pure; this
//! crate adds the front doors agents use:
//!
//! - `cli` - command implementations behind the `tugx` binary
//! - `mcp` - Model Context Protocol server (feature-gated)

// Core infrastructure - re-exported from tugextract-core
pub use tugextract_core::backup;
pub use tugextract_core::config;
pub use tugextract_core::diff;
pub use tugextract_core::error;
pub use tugextract_core::journal;
pub use tugextract_core::output;
pub use tugextract_core::patch;
pub use tugextract_core::session;
pub use tugextract_core::text;
pub use tugextract_core::util;

// Refactoring engine
pub use tugextract_engine as engine;

// Front doors for agents
pub mod cli;
#[cfg(feature = "mcp")]
pub mod mcp;

// Converts engine outcomes into TugError
mod error_bridges;

pub use tugextract_core::error::{OutputErrorCode, TugError};
pub use tugextract_core::output::{ErrorInfo, ErrorResponse, UndoResponse, SCHEMA_VERSION};
pub use tugextract_core::session::{Session, SessionOptions};
