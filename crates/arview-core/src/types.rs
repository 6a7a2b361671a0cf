// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the ARView bridge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ArViewError, Result};

/// Android `PackageManager.PERMISSION_GRANTED`.
pub const PERMISSION_GRANTED: i32 = 0;

/// Android `PackageManager.PERMISSION_DENIED`.
pub const PERMISSION_DENIED: i32 = -1;

/// Unique identifier for one web-originated invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(pub Uuid);

impl InvocationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Integer tag correlating a permission prompt with its result callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestCode(pub i32);

impl std::fmt::Display for RequestCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// OS-guarded capabilities the bridge may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Camera,
}

impl Capability {
    /// Platform permission identifier (Android manifest name).
    pub fn permission(&self) -> &'static str {
        match self {
            Self::Camera => "android.permission.CAMERA",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.permission())
    }
}

/// Raw permission callback payload as delivered by the OS.
///
/// `permissions` and `grant_results` are parallel arrays, mirroring
/// `onRequestPermissionsResult(int, String[], int[])`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionResponse {
    pub request_code: RequestCode,
    pub permissions: Vec<String>,
    pub grant_results: Vec<i32>,
}

impl PermissionResponse {
    pub fn new(request_code: RequestCode, permissions: Vec<String>, grant_results: Vec<i32>) -> Self {
        Self {
            request_code,
            permissions,
            grant_results,
        }
    }

    /// A single-capability answer with the given grant result.
    pub fn single(request_code: RequestCode, capability: Capability, grant_result: i32) -> Self {
        Self::new(
            request_code,
            vec![capability.permission().to_string()],
            vec![grant_result],
        )
    }

    /// A capability counts as granted only when its own result entry says so.
    /// A missing entry (e.g. the prompt was dismissed) counts as denied.
    pub fn is_granted(&self, capability: Capability) -> bool {
        self.permissions
            .iter()
            .position(|p| p == capability.permission())
            .and_then(|idx| self.grant_results.get(idx))
            .is_some_and(|&result| result == PERMISSION_GRANTED)
    }
}

/// Which encoded argument a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadField {
    Model,
    Texture,
}

impl std::fmt::Display for PayloadField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Model => f.write_str("model"),
            Self::Texture => f.write_str("texture"),
        }
    }
}

/// Decoded payload for one AR session.
///
/// The bytes are opaque here; format checks belong to the AR engine.
#[derive(Clone, PartialEq, Eq)]
pub struct AssetBundle {
    name: String,
    model: Vec<u8>,
    texture: Vec<u8>,
}

impl AssetBundle {
    /// Build a bundle. Fails with `MissingBundleName` when `name` is empty.
    pub fn new(name: impl Into<String>, model: Vec<u8>, texture: Vec<u8>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ArViewError::MissingBundleName);
        }
        Ok(Self {
            name,
            model,
            texture,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &[u8] {
        &self.model
    }

    pub fn texture(&self) -> &[u8] {
        &self.texture
    }

    /// Consume the bundle, yielding `(name, model, texture)`.
    pub fn into_parts(self) -> (String, Vec<u8>, Vec<u8>) {
        (self.name, self.model, self.texture)
    }
}

// Payloads can be megabytes; only their sizes are useful in logs.
impl std::fmt::Debug for AssetBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetBundle")
            .field("name", &self.name)
            .field("model_bytes", &self.model.len())
            .field("texture_bytes", &self.texture.len())
            .finish()
    }
}

/// Where a permission request ended up.
#[derive(Debug, PartialEq, Eq)]
pub enum PermissionOutcome {
    /// Camera granted; the pending bundle is released for launch.
    Granted(AssetBundle),
    /// Camera declined; the bundle has been dropped.
    Denied,
    /// The request was withdrawn before a result arrived (context torn down).
    Aborted,
}

/// Structured response delivered to the web caller through its result handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BridgeResponse {
    /// The AR viewer was started.
    Launched {
        invocation_id: InvocationId,
        bundle_name: String,
        launched_at: DateTime<Utc>,
    },
    /// The request was abandoned.
    Error {
        invocation_id: InvocationId,
        code: String,
        message: String,
        suggestion: String,
        retriable: bool,
    },
}

impl BridgeResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Launched { .. })
    }

    /// The error code, if this is a failure response.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Launched { .. } => None,
            Self::Error { code, .. } => Some(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bundle_name_rejected() {
        let err = AssetBundle::new("", vec![1], vec![2]).unwrap_err();
        assert!(matches!(err, ArViewError::MissingBundleName));
    }

    #[test]
    fn camera_granted_by_its_own_entry() {
        let response = PermissionResponse::new(
            RequestCode(0),
            vec![
                "android.permission.RECORD_AUDIO".into(),
                "android.permission.CAMERA".into(),
            ],
            vec![PERMISSION_DENIED, PERMISSION_GRANTED],
        );
        assert!(response.is_granted(Capability::Camera));
    }

    #[test]
    fn other_capability_grant_does_not_count() {
        let response = PermissionResponse::new(
            RequestCode(0),
            vec![
                "android.permission.CAMERA".into(),
                "android.permission.RECORD_AUDIO".into(),
            ],
            vec![PERMISSION_DENIED, PERMISSION_GRANTED],
        );
        assert!(!response.is_granted(Capability::Camera));
    }

    #[test]
    fn dismissed_prompt_counts_as_denied() {
        // Android delivers empty arrays when the dialog is interrupted.
        let response = PermissionResponse::new(RequestCode(3), vec![], vec![]);
        assert!(!response.is_granted(Capability::Camera));
    }

    #[test]
    fn bundle_debug_hides_payload() {
        let bundle = AssetBundle::new("cat", vec![0; 1024], vec![0; 16]).unwrap();
        let debug = format!("{bundle:?}");
        assert!(debug.contains("model_bytes: 1024"));
        assert!(!debug.contains("[0, 0"));
    }

    #[test]
    fn error_response_wire_shape() {
        let response = BridgeResponse::Error {
            invocation_id: InvocationId::new(),
            code: "PERMISSION_DENIED".into(),
            message: "m".into(),
            suggestion: "s".into(),
            retriable: true,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["code"], "PERMISSION_DENIED");
        assert_eq!(response.error_code(), Some("PERMISSION_DENIED"));
    }
}
