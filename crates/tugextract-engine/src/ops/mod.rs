// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Refactoring operations.
//!
//! Each operation owns its orchestration: validation, analysis, generation
//! and splicing, and produces both the engine-level result and the CLI
//! response envelope.

pub mod extract_method;
