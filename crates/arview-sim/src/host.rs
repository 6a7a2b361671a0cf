// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Simulated host: a screen, a permission prompt that waits for the harness
// to answer, a viewer that dumps its payloads, and a console result handle.

use std::any::Any;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use arview_bridge::traits::{
    HostContext, PermissionHost, PlatformBridge, ResultHandle, ViewerHost, ViewerLaunchRequest,
};
use arview_core::error::{ArViewError, Result};
use arview_core::types::{BridgeResponse, Capability, RequestCode};
use tracing::{error, info};

/// Host bridge backed by the terminal.
pub struct SimHost {
    prompts: Mutex<Vec<RequestCode>>,
    launches: Mutex<Vec<String>>,
    /// Where launched payloads are written, if anywhere.
    dump_dir: Option<PathBuf>,
}

impl SimHost {
    pub fn new(dump_dir: Option<PathBuf>) -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            launches: Mutex::new(Vec::new()),
            dump_dir,
        }
    }

    /// Code of the most recent prompt, the one the harness answers.
    pub fn last_prompt(&self) -> Option<RequestCode> {
        self.prompts.lock().expect("prompts lock poisoned").last().copied()
    }

    pub fn launch_count(&self) -> usize {
        self.launches.lock().expect("launches lock poisoned").len()
    }
}

impl PlatformBridge for SimHost {
    fn platform_name(&self) -> &str {
        "Simulator"
    }
}

impl PermissionHost for SimHost {
    fn request_permission(
        &self,
        _context: &dyn HostContext,
        code: RequestCode,
        capability: Capability,
    ) -> Result<()> {
        info!(%code, %capability, "prompt shown");
        self.prompts.lock().expect("prompts lock poisoned").push(code);
        Ok(())
    }
}

impl ViewerHost for SimHost {
    fn start_viewer(&self, _context: &dyn HostContext, request: &ViewerLaunchRequest) -> Result<()> {
        for extra in &request.extras {
            info!(key = %extra.key, bytes = extra.bytes.len(), "viewer extra");
        }

        if let Some(dir) = &self.dump_dir {
            std::fs::create_dir_all(dir)
                .map_err(|e| ArViewError::LaunchFailure(format!("create {}: {e}", dir.display())))?;
            for extra in &request.extras {
                let path = dir.join(&extra.key);
                std::fs::write(&path, &extra.bytes)
                    .map_err(|e| ArViewError::LaunchFailure(format!("write {}: {e}", path.display())))?;
            }
        }

        info!(component = %request.component, result_code = request.result_code, "viewer started");
        self.launches
            .lock()
            .expect("launches lock poisoned")
            .push(request.component.clone());
        Ok(())
    }
}

/// The simulated screen hosting the web view.
pub struct SimScreen {
    open: AtomicBool,
}

impl SimScreen {
    pub fn new() -> Self {
        Self {
            open: AtomicBool::new(true),
        }
    }

    pub fn close(&self) {
        info!("screen closed");
        self.open.store(false, Ordering::SeqCst);
    }
}

impl Default for SimScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl HostContext for SimScreen {
    fn is_alive(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Prints the response the web caller would receive.
pub struct ConsoleResult;

impl ResultHandle for ConsoleResult {
    fn deliver(&self, response: BridgeResponse) {
        match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{json}"),
            Err(e) => error!(error = %e, "response could not be serialised"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arview_bridge::traits::ViewerExtra;

    #[test]
    fn viewer_dumps_extras() {
        let dir = tempfile::tempdir().unwrap();
        let host = SimHost::new(Some(dir.path().to_path_buf()));
        let request = ViewerLaunchRequest {
            component: "viewer".into(),
            extras: vec![ViewerExtra {
                key: "obj_path".into(),
                bytes: b"v 0 0 0".to_vec(),
            }],
            result_code: 1,
        };

        host.start_viewer(&SimScreen::new(), &request).unwrap();
        assert_eq!(std::fs::read(dir.path().join("obj_path")).unwrap(), b"v 0 0 0");
        assert_eq!(host.launch_count(), 1);
    }

    #[test]
    fn default_screen_is_open_until_closed() {
        let screen = SimScreen::default();
        assert!(screen.is_alive());
        screen.close();
        assert!(!screen.is_alive());
    }

    #[test]
    fn prompts_are_remembered() {
        let host = SimHost::new(None);
        host.request_permission(&SimScreen::new(), RequestCode(7), Capability::Camera)
            .unwrap();
        assert_eq!(host.last_prompt(), Some(RequestCode(7)));
    }
}
