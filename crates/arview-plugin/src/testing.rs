// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recording doubles for the host bridge, host context and result handle.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use arview_bridge::traits::{
    HostContext, PermissionHost, PlatformBridge, ResultHandle, ViewerHost, ViewerLaunchRequest,
};
use arview_core::error::{ArViewError, Result};
use arview_core::types::{BridgeResponse, Capability, RequestCode};

/// Host that records every prompt and launch instead of showing UI.
#[derive(Default)]
pub struct RecordingHost {
    prompts: Mutex<Vec<(RequestCode, Capability)>>,
    launches: Mutex<Vec<ViewerLaunchRequest>>,
    fail_prompt: AtomicBool,
    fail_launch: AtomicBool,
}

impl RecordingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn prompts(&self) -> Vec<(RequestCode, Capability)> {
        self.prompts.lock().expect("prompts lock poisoned").clone()
    }

    pub fn last_prompt_code(&self) -> Option<RequestCode> {
        self.prompts().last().map(|(code, _)| *code)
    }

    pub fn launches(&self) -> Vec<ViewerLaunchRequest> {
        self.launches.lock().expect("launches lock poisoned").clone()
    }

    /// Make the next prompts fail as if the OS refused to show them.
    pub fn set_fail_prompt(&self, fail: bool) {
        self.fail_prompt.store(fail, Ordering::SeqCst);
    }

    /// Make launches fail as if the viewer component were missing.
    pub fn set_fail_launch(&self, fail: bool) {
        self.fail_launch.store(fail, Ordering::SeqCst);
    }
}

impl PlatformBridge for RecordingHost {
    fn platform_name(&self) -> &str {
        "Recording"
    }
}

impl PermissionHost for RecordingHost {
    fn request_permission(
        &self,
        _context: &dyn HostContext,
        code: RequestCode,
        capability: Capability,
    ) -> Result<()> {
        if self.fail_prompt.load(Ordering::SeqCst) {
            return Err(ArViewError::PermissionRequest("prompt refused".into()));
        }
        self.prompts
            .lock()
            .expect("prompts lock poisoned")
            .push((code, capability));
        Ok(())
    }
}

impl ViewerHost for RecordingHost {
    fn start_viewer(&self, _context: &dyn HostContext, request: &ViewerLaunchRequest) -> Result<()> {
        if self.fail_launch.load(Ordering::SeqCst) {
            return Err(ArViewError::Bridge(format!(
                "ActivityNotFoundException: {}",
                request.component
            )));
        }
        self.launches
            .lock()
            .expect("launches lock poisoned")
            .push(request.clone());
        Ok(())
    }
}

/// Host context whose liveness can be switched off.
pub struct TestContext {
    alive: AtomicBool,
}

impl TestContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            alive: AtomicBool::new(true),
        })
    }

    /// Simulate the screen being torn down.
    pub fn dispose(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

impl HostContext for TestContext {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Result handle that keeps every delivered response.
#[derive(Default)]
pub struct RecordingResult {
    responses: Mutex<Vec<BridgeResponse>>,
}

impl RecordingResult {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn responses(&self) -> Vec<BridgeResponse> {
        self.responses.lock().expect("responses lock poisoned").clone()
    }
}

impl ResultHandle for RecordingResult {
    fn deliver(&self, response: BridgeResponse) {
        self.responses
            .lock()
            .expect("responses lock poisoned")
            .push(response);
    }
}
