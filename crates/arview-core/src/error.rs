// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the ARView bridge.

use thiserror::Error;

use crate::types::PayloadField;

/// Top-level error type for all ARView operations.
#[derive(Debug, Error)]
pub enum ArViewError {
    // -- Invocation errors --
    #[error("bundle name is missing or empty")]
    MissingBundleName,

    #[error("argument {index} must be {expected}")]
    InvalidArgument { index: usize, expected: &'static str },

    #[error("{field} payload is not valid Base64: {reason}")]
    Decode { field: PayloadField, reason: String },

    // -- Permission errors --
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("{outstanding} permission request(s) already outstanding")]
    PermissionBusy { outstanding: usize },

    #[error("permission request could not be issued: {0}")]
    PermissionRequest(String),

    #[error("permission request aborted before a result arrived")]
    PermissionAborted,

    // -- Viewer errors --
    #[error("AR viewer launch failed: {0}")]
    LaunchFailure(String),

    #[error("host context has been disposed")]
    ContextDisposed,

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

impl ArViewError {
    /// Stable machine-readable code sent to the web caller.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingBundleName => "MISSING_BUNDLE_NAME",
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::Decode { .. } => "DECODE_ERROR",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::PermissionBusy { .. } => "PERMISSION_BUSY",
            Self::PermissionRequest(_) => "PERMISSION_REQUEST_FAILED",
            Self::PermissionAborted => "PERMISSION_ABORTED",
            Self::LaunchFailure(_) => "LAUNCH_FAILURE",
            Self::ContextDisposed => "CONTEXT_DISPOSED",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Bridge(_) => "BRIDGE_ERROR",
            Self::PlatformUnavailable => "PLATFORM_UNAVAILABLE",
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ArViewError>;
