// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! MCP server front door for agent integration.
//!
//! Start the server with `tugx mcp`. It speaks JSON-RPC 2.0 over stdio and
//! exposes:
//! - `tugx_analyze_extract_method` - preview an extraction (patch + plan)
//! - `tugx_extract_method` - extract, optionally writing the file
//! - `tugx_undo` - revert a journaled extraction
//!
//! Tool results are the same JSON documents the CLI prints.

#![cfg(feature = "mcp")]

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, ErrorCode, Implementation, ProtocolVersion, ServerCapabilities,
        ServerInfo,
    },
    tool, tool_handler, tool_router,
    transport::stdio,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use tugextract_core::config::{CliOverrides, ResolvedConfig};
use tugextract_core::error::TugError;
use tugextract_core::session::{Session, SessionOptions};

use crate::cli::{run_extract_method, run_undo, ExtractArgs};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the analyze tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AnalyzeExtractMethodParams {
    /// File path relative to workspace.
    #[schemars(description = "File path relative to workspace")]
    pub file: String,

    /// First line of the range (1-based).
    #[schemars(description = "First line of the range (1-based)")]
    pub start_line: u32,

    /// Last line of the range (1-based, inclusive).
    #[schemars(description = "Last line of the range (1-based, inclusive)")]
    pub end_line: u32,

    /// Name of the new method.
    #[schemars(description = "Name of the new method")]
    pub new_method_name: String,

    /// Access modifier (defaults to config, then the language default).
    #[schemars(description = "Access modifier (defaults to config, then the language default)")]
    #[serde(default)]
    pub access_modifier: Option<String>,

    /// Declare the new method static.
    #[schemars(description = "Declare the new method static")]
    #[serde(default)]
    pub is_static: bool,

    /// Source language: csharp or typescript (defaults to the file extension).
    #[schemars(description = "Source language: csharp or typescript (default: by extension)")]
    #[serde(default)]
    pub language: Option<String>,

    /// Path to workspace (optional, defaults to current directory).
    #[schemars(description = "Path to workspace (optional, defaults to current directory)")]
    #[serde(default)]
    pub workspace_path: Option<String>,
}

impl AnalyzeExtractMethodParams {
    fn extract_args(&self) -> ExtractArgs {
        ExtractArgs {
            file: self.file.clone(),
            start_line: self.start_line as usize,
            end_line: self.end_line as usize,
            name: self.new_method_name.clone(),
            access: self.access_modifier.clone(),
            is_static: self.is_static,
            language: self.language.clone(),
        }
    }
}

/// Parameters for the extract tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExtractMethodParams {
    #[serde(flatten)]
    pub target: AnalyzeExtractMethodParams,

    /// Whether to write the result (false = preview).
    #[schemars(description = "Whether to write the result (false = preview)")]
    #[serde(default)]
    pub apply: bool,
}

/// Parameters for the undo tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UndoParams {
    /// Backup id or undo token to revert (defaults to the most recent change).
    #[schemars(description = "Backup id or undo token to revert (default: latest change)")]
    #[serde(default)]
    pub backup_id: Option<String>,

    /// Path to workspace (optional, defaults to current directory).
    #[schemars(description = "Path to workspace (optional, defaults to current directory)")]
    #[serde(default)]
    pub workspace_path: Option<String>,
}

// ============================================================================
// Server
// ============================================================================

/// MCP server exposing the extract-method operation.
///
/// The session is opened lazily on the first tool call and reused while
/// calls target the same workspace.
#[derive(Clone)]
pub struct TugxServer {
    tool_router: ToolRouter<Self>,
    session: Arc<Mutex<Option<Session>>>,
    workspace_path: Arc<Mutex<Option<PathBuf>>>,
}

#[tool_router]
impl TugxServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
            session: Arc::new(Mutex::new(None)),
            workspace_path: Arc::new(Mutex::new(None)),
        }
    }

    /// Session for `workspace_path` (or the current directory), opening a
    /// new one when the workspace changed.
    async fn session_for(
        &self,
        workspace_path: Option<&str>,
    ) -> Result<(Session, ResolvedConfig), McpError> {
        let mut session_guard = self.session.lock().await;
        let mut workspace_guard = self.workspace_path.lock().await;

        let target = match workspace_path {
            Some(path) => PathBuf::from(path),
            None => std::env::current_dir().map_err(|e| {
                McpError::internal_error(
                    "Failed to get current directory",
                    Some(serde_json::json!({ "error": e.to_string() })),
                )
            })?,
        };
        let target = target.canonicalize().map_err(|e| {
            McpError::invalid_params(
                "Invalid workspace path",
                Some(serde_json::json!({
                    "path": target.display().to_string(),
                    "error": e.to_string()
                })),
            )
        })?;

        // Configuration is re-read on every call so edits to .tugx.toml apply.
        let config = ResolvedConfig::resolve(&target, &CliOverrides::default())
            .map_err(|e| mcp_error(e.into()))?;

        let reuse = matches!(
            (&*session_guard, &*workspace_guard),
            (Some(_), Some(current)) if current == &target
        );
        let cached = if reuse { session_guard.clone() } else { None };
        let session = match cached {
            Some(session) => session,
            None => {
                let mut options = SessionOptions::default();
                if let Some(dir) = &config.session_dir {
                    options.session_dir = Some(target.join(&dir.value));
                }
                let session = Session::open(&target, options).map_err(|e| mcp_error(e.into()))?;
                debug!(workspace = %target.display(), "mcp session opened");
                *session_guard = Some(session.clone());
                *workspace_guard = Some(target);
                session
            }
        };
        Ok((session, config))
    }

    /// Preview an extraction without writing anything.
    #[tool(description = "Preview extracting a line range into a new method (C# or TypeScript)")]
    async fn tugx_analyze_extract_method(
        &self,
        Parameters(params): Parameters<AnalyzeExtractMethodParams>,
    ) -> Result<CallToolResult, McpError> {
        let (session, config) = self.session_for(params.workspace_path.as_deref()).await?;
        let output = run_extract_method(&session, &config, &params.extract_args(), false)
            .map_err(mcp_error)?;
        json_result(&output)
    }

    /// Extract a line range into a new method, writing the file when `apply`
    /// is set.
    #[tool(description = "Extract a line range into a new method and optionally write the file")]
    async fn tugx_extract_method(
        &self,
        Parameters(params): Parameters<ExtractMethodParams>,
    ) -> Result<CallToolResult, McpError> {
        let target = &params.target;
        let (session, config) = self.session_for(target.workspace_path.as_deref()).await?;
        let output = run_extract_method(&session, &config, &target.extract_args(), params.apply)
            .map_err(mcp_error)?;
        json_result(&output)
    }

    /// Revert a journaled extraction.
    #[tool(description = "Revert the most recent (or a named) extraction from its backup")]
    async fn tugx_undo(
        &self,
        Parameters(params): Parameters<UndoParams>,
    ) -> Result<CallToolResult, McpError> {
        let (session, _) = self.session_for(params.workspace_path.as_deref()).await?;
        let response = run_undo(&session, params.backup_id.as_deref()).map_err(mcp_error)?;
        json_result(&response)
    }
}

impl Default for TugxServer {
    fn default() -> Self {
        Self::new()
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        McpError::internal_error(format!("JSON serialization error: {}", e), None)
    })?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Error Conversions
// ============================================================================

/// JSON-RPC error codes in the server-defined range.
mod error_codes {
    /// The engine rejected the extraction after validation.
    pub const EXTRACTION_ERROR: i32 = -32000;
    /// File not found.
    pub const RESOURCE_NOT_FOUND: i32 = -32001;
    /// Failed to write changes.
    pub const APPLY_ERROR: i32 = -32002;
}

/// Convert a `TugError` into an MCP error carrying the CLI exit code as
/// `tugx_code`.
fn mcp_error(err: TugError) -> McpError {
    let tugx_code = err.error_code().code();
    let message = err.to_string();

    match err {
        TugError::InvalidArguments { details, .. } => {
            let mut data = serde_json::json!({ "tugx_code": tugx_code });
            if let Some(d) = details {
                data["details"] = d;
            }
            McpError::invalid_params(message, Some(data))
        }
        TugError::InvalidIdentifier { name, reason } => McpError::invalid_params(
            message,
            Some(serde_json::json!({ "tugx_code": tugx_code, "name": name, "reason": reason })),
        ),
        TugError::UnsupportedLanguage { language } => McpError::invalid_params(
            message,
            Some(serde_json::json!({
                "tugx_code": tugx_code,
                "language": language,
                "supported": ["csharp", "typescript"]
            })),
        ),
        TugError::ConfigError { .. } => {
            McpError::invalid_params(message, Some(serde_json::json!({ "tugx_code": tugx_code })))
        }
        TugError::FileNotFound { path } => McpError::new(
            ErrorCode(error_codes::RESOURCE_NOT_FOUND),
            message,
            Some(serde_json::json!({ "tugx_code": tugx_code, "path": path })),
        ),
        TugError::ExtractionFailed { stage, details, .. } => {
            let data = serde_json::json!({
                "tugx_code": tugx_code,
                "stage": stage,
                "details": details,
            });
            if stage == "validation" {
                McpError::invalid_params(message, Some(data))
            } else {
                McpError::new(ErrorCode(error_codes::EXTRACTION_ERROR), message, Some(data))
            }
        }
        TugError::ApplyError { file, .. } => McpError::new(
            ErrorCode(error_codes::APPLY_ERROR),
            message,
            Some(serde_json::json!({ "tugx_code": tugx_code, "file": file })),
        ),
        TugError::InternalError { .. } | TugError::SessionError { .. } => {
            McpError::internal_error(message, Some(serde_json::json!({ "tugx_code": tugx_code })))
        }
    }
}

// ============================================================================
// ServerHandler Implementation
// ============================================================================

#[tool_handler]
impl ServerHandler for TugxServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "tugx".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "tugx is an extract-method refactoring tool for C# and TypeScript. \
                 Preview with tugx_analyze_extract_method, apply with tugx_extract_method, \
                 and revert with tugx_undo."
                    .to_string(),
            ),
        }
    }
}

// ============================================================================
// Entry Point
// ============================================================================

/// Run the MCP server on stdio until the client disconnects.
pub async fn run_mcp_server() -> Result<(), TugError> {
    let service = TugxServer::new()
        .serve(stdio())
        .await
        .map_err(|e| TugError::internal(format!("MCP server failed to start: {}", e)))?;

    service
        .waiting()
        .await
        .map_err(|e| TugError::internal(format!("MCP server error: {}", e)))?;

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
