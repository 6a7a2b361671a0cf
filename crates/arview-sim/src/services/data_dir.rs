// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware config directory resolution.

use std::path::PathBuf;

/// Return the application config directory (not created).
///
/// On mobile the host app ships its own config; this is the desktop location.
pub fn config_dir() -> PathBuf {
    dirs_fallback().join("arview")
}

fn dirs_fallback() -> PathBuf {
    // Try XDG config dir, then fallback to home
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config");
    }
    // Last resort
    PathBuf::from(".")
}
