// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ArViewError, Result};

/// Highest request code Android accepts from `ActivityCompat.requestPermissions`
/// when the host is a `FragmentActivity` (lower 16 bits only).
pub const MAX_REQUEST_CODE: i32 = 0xFFFF;

/// Number of distinct request codes, and so the most prompts that can be outstanding.
pub const REQUEST_CODE_SPACE: usize = MAX_REQUEST_CODE as usize + 1;

/// Settings for the web-to-viewer hand-off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Action identifier the web layer uses to open the AR view.
    pub open_action: String,
    /// Fully-qualified component name of the external AR viewer.
    pub viewer_component: String,
    /// Launch-request key carrying the model bytes.
    pub model_extra_key: String,
    /// Launch-request key carrying the texture bytes.
    pub texture_extra_key: String,
    /// Activity-result code passed with the viewer launch (never interpreted).
    pub viewer_request_code: i32,
    /// First permission request code handed out; later requests count up from here.
    pub first_permission_request_code: i32,
    /// Permission requests allowed in flight at once. Further requests are rejected.
    pub max_pending_requests: usize,
    /// Report denial/launch failures to the web caller. `false` keeps the
    /// legacy behaviour of abandoning silently.
    pub report_failures: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            open_action: "openARView".into(),
            viewer_component: "com.google.ar.core.examples.java.helloar.ArTradeActivity".into(),
            model_extra_key: "obj_path".into(),
            texture_extra_key: "texture_path".into(),
            viewer_request_code: 1,
            first_permission_request_code: 0,
            max_pending_requests: 4,
            report_failures: true,
        }
    }
}

impl BridgeConfig {
    /// Parse and validate a JSON document. Absent fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file, falling back to defaults when it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(data) => Self::from_json_str(&data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject settings the hand-off cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.open_action.trim().is_empty() {
            return Err(ArViewError::Config("open_action must not be empty".into()));
        }
        if self.viewer_component.trim().is_empty() {
            return Err(ArViewError::Config("viewer_component must not be empty".into()));
        }
        if self.model_extra_key.is_empty() || self.texture_extra_key.is_empty() {
            return Err(ArViewError::Config("extra keys must not be empty".into()));
        }
        if self.model_extra_key == self.texture_extra_key {
            return Err(ArViewError::Config(
                "model and texture extra keys must differ".into(),
            ));
        }
        if !(0..=MAX_REQUEST_CODE).contains(&self.first_permission_request_code) {
            return Err(ArViewError::Config(format!(
                "first_permission_request_code must be within 0..={MAX_REQUEST_CODE}"
            )));
        }
        if self.max_pending_requests == 0 {
            return Err(ArViewError::Config(
                "max_pending_requests must be at least 1".into(),
            ));
        }
        if self.max_pending_requests > REQUEST_CODE_SPACE {
            return Err(ArViewError::Config(format!(
                "max_pending_requests must not exceed {REQUEST_CODE_SPACE} distinct request codes"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_legacy_plugin() {
        let config = BridgeConfig::default();
        assert_eq!(config.open_action, "openARView");
        assert_eq!(config.first_permission_request_code, 0);
        assert_eq!(config.viewer_request_code, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = BridgeConfig::from_json_str(r#"{ "report_failures": false }"#).unwrap();
        assert!(!config.report_failures);
        assert_eq!(config.model_extra_key, "obj_path");
    }

    #[test]
    fn zero_capacity_rejected() {
        let err = BridgeConfig::from_json_str(r#"{ "max_pending_requests": 0 }"#).unwrap_err();
        assert!(matches!(err, ArViewError::Config(_)));
    }

    #[test]
    fn capacity_beyond_code_space_rejected() {
        let at_limit = BridgeConfig {
            max_pending_requests: REQUEST_CODE_SPACE,
            ..BridgeConfig::default()
        };
        assert!(at_limit.validate().is_ok());

        let err = BridgeConfig::from_json_str(r#"{ "max_pending_requests": 70000 }"#).unwrap_err();
        assert!(matches!(err, ArViewError::Config(_)));
    }

    #[test]
    fn clashing_extra_keys_rejected() {
        let config = BridgeConfig {
            texture_extra_key: "obj_path".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = BridgeConfig::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.json");
        let config = BridgeConfig {
            max_pending_requests: 1,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(BridgeConfig::load(&path).unwrap(), config);
    }
}
