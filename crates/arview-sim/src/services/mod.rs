// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Harness services: config resolution and payload loading.

pub mod data_dir;

use std::path::{Path, PathBuf};

use arview_core::error::Result;
use arview_core::BridgeConfig;
use arview_plugin::decoder;
use tracing::info;

const CONFIG_FILE: &str = "bridge.json";

/// Load the bridge config from `explicit`, or from the default config
/// directory. A missing default file yields the built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<BridgeConfig> {
    let path: PathBuf = match explicit {
        Some(path) => path.to_path_buf(),
        None => data_dir::config_dir().join(CONFIG_FILE),
    };
    let config = BridgeConfig::load(&path)?;
    info!(path = %path.display(), action = %config.open_action, "bridge config loaded");
    Ok(config)
}

/// Produce the Base64 argument for one payload: inline text wins, else the
/// file is read and encoded, else an empty payload is sent.
pub fn encoded_payload(inline: Option<&str>, file: Option<&Path>) -> Result<String> {
    if let Some(text) = inline {
        return Ok(text.to_string());
    }
    match file {
        Some(path) => {
            let bytes = std::fs::read(path)?;
            info!(path = %path.display(), bytes = bytes.len(), "payload file read");
            Ok(decoder::encode(&bytes))
        }
        None => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_config_path_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"{ "open_action": "showModel" }"#).unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.open_action, "showModel");
    }

    #[test]
    fn file_payload_is_encoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.obj");
        std::fs::write(&path, b"obj data").unwrap();

        assert_eq!(encoded_payload(None, Some(&path)).unwrap(), "b2JqIGRhdGE=");
        assert_eq!(encoded_payload(Some("AA=="), Some(&path)).unwrap(), "AA==");
        assert_eq!(encoded_payload(None, None).unwrap(), "");
    }
}
