// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! CLI front door for agent integration.
//!
//! Command implementations behind `tugx`:
//! - `extract-method` - extract and write the result (or preview with `--dry-run`)
//! - `analyze extract-method` - preview only
//! - `undo` - restore the file touched by a journaled extraction
//!
//! ## Session Integration
//!
//! Every function takes an open [`Session`]. The session fixes the workspace
//! root that file arguments are resolved against and the directory holding
//! backups and the change journal. The caller (typically `main.rs`) opens it
//! with `Session::open()` after resolving configuration.
//!
//! ## Error Handling
//!
//! All functions return `Result<T, TugError>`. A rejected extraction becomes
//! `TugError::ExtractionFailed`, whose stage selects the exit code.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use tugextract_core::backup::BackupStore;
use tugextract_core::config::ResolvedConfig;
use tugextract_core::error::TugError;
use tugextract_core::journal::{ChangeJournal, ChangeRecord};
use tugextract_core::output::UndoResponse;
use tugextract_core::session::{write_file_atomic, Session};
use tugextract_engine::{
    EngineOptions, ExtractMethodEngine, ExtractMethodOutput, ExtractionRequest, SourceLanguage,
};

use crate::error_bridges::{extraction_failure, read_failure, write_failure};

/// Journal label for extractions.
pub const EXTRACT_METHOD_OPERATION: &str = "extract_method";

/// What to extract, as given on the command line or by an MCP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractArgs {
    /// Workspace-relative (or absolute) path of the source file.
    pub file: String,
    /// First line, 1-based.
    pub start_line: usize,
    /// Last line, 1-based, inclusive.
    pub end_line: usize,
    /// Name of the new method.
    pub name: String,
    /// Access modifier; the configured or language default when `None`.
    pub access: Option<String>,
    /// Declare the new method static.
    pub is_static: bool,
    /// Language override; derived from the file extension when `None`.
    pub language: Option<String>,
}

/// Engine options from resolved configuration.
pub fn engine_options(config: &ResolvedConfig) -> EngineOptions {
    let mut options = EngineOptions::default()
        .with_known_static_types(config.known_static_type_names())
        .with_strict_mixed_returns(config.strict_mixed_returns.value)
        .with_promote_static(config.promote_static.value);
    if let Some(access) = &config.default_access {
        options = options.with_default_access(access.value.clone());
    }
    options
}

/// Run an extraction and, when `apply` is set, write the result.
///
/// Writing takes a backup of the original first and journals the change, so
/// the returned output carries a `backup_id` and an `undo_token`.
pub fn run_extract_method(
    session: &Session,
    config: &ResolvedConfig,
    args: &ExtractArgs,
    apply: bool,
) -> Result<ExtractMethodOutput, TugError> {
    let (path, relative) = workspace_path(session, &args.file)?;
    let language = match &args.language {
        Some(name) => SourceLanguage::from_name(name).ok_or_else(|| TugError::UnsupportedLanguage {
            language: name.clone(),
        })?,
        None => SourceLanguage::from_path(&path).ok_or_else(|| TugError::UnsupportedLanguage {
            language: path
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_else(|| relative.clone()),
        })?,
    };
    let original = fs::read_to_string(&path).map_err(|e| read_failure(&path, &relative, e))?;

    let mut request =
        ExtractionRequest::new(args.start_line, args.end_line, &args.name, language.name())
            .with_static(args.is_static);
    if let Some(access) = &args.access {
        request = request.with_access(access);
    }
    let mut engine = ExtractMethodEngine::new(engine_options(config));
    let result = engine.extract(&original, &request);
    if !result.success {
        return Err(extraction_failure(&result));
    }

    let output = ExtractMethodOutput::new(relative.clone(), &original, result);
    if !apply {
        debug!(file = %relative, "preview only, nothing written");
        return Ok(output);
    }

    let modified = output
        .result
        .modified_text
        .clone()
        .ok_or_else(|| TugError::internal("successful extraction carried no text"))?;
    let backup = BackupStore::for_session(session).create(&relative, &original)?;
    write_file_atomic(&path, modified.as_bytes()).map_err(|e| write_failure(&relative, e))?;
    let entry = ChangeJournal::for_session(session).record(ChangeRecord {
        file_path: &relative,
        original_text: &original,
        modified_text: &modified,
        operation_label: EXTRACT_METHOD_OPERATION,
        backup_id: &backup.backup_id,
        metadata: output.result.metadata.clone(),
    })?;
    info!(
        file = %relative,
        method = %args.name,
        backup_id = %backup.backup_id,
        "extraction written"
    );
    Ok(output.applied(backup.backup_id, entry.entry_id))
}

/// Revert the most recent journaled change, or the one named by `backup_id`.
pub fn run_undo(session: &Session, backup_id: Option<&str>) -> Result<UndoResponse, TugError> {
    let outcome = ChangeJournal::for_session(session).undo(session, backup_id)?;
    Ok(UndoResponse::from_outcome(&outcome))
}

/// Absolute path of `file` and its workspace-relative display form.
///
/// Paths that leave the workspace (absolute elsewhere, or through `..`)
/// are rejected.
fn workspace_path(session: &Session, file: &str) -> Result<(PathBuf, String), TugError> {
    let path = session.resolve(file);
    let relative = path
        .strip_prefix(session.workspace_root())
        .ok()
        .filter(|rel| {
            rel.components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        })
        .map(Path::to_path_buf)
        .ok_or_else(|| TugError::invalid_args(format!("{} is outside the workspace", file)))?;
    let display = relative.to_string_lossy().replace('\\', "/");
    Ok((path, display))
}
