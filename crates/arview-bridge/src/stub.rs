// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for desktop/CI builds where native mobile APIs are unavailable.
//
// Every capability returns `PlatformUnavailable`; the real implementation
// lives in the `android` module.

use std::any::Any;

use arview_core::error::{ArViewError, Result};
use arview_core::types::{Capability, RequestCode};

use crate::traits::*;

/// No-op bridge returned on non-mobile platforms.
pub struct StubBridge;

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl PermissionHost for StubBridge {
    fn request_permission(
        &self,
        _context: &dyn HostContext,
        code: RequestCode,
        capability: Capability,
    ) -> Result<()> {
        tracing::warn!(%code, %capability, "PermissionHost::request_permission called on stub bridge");
        Err(ArViewError::PlatformUnavailable)
    }
}

impl ViewerHost for StubBridge {
    fn start_viewer(&self, _context: &dyn HostContext, request: &ViewerLaunchRequest) -> Result<()> {
        tracing::warn!(
            component = %request.component,
            "ViewerHost::start_viewer called on stub bridge"
        );
        Err(ArViewError::PlatformUnavailable)
    }
}

/// Context that is always alive; pairs with [`StubBridge`] on desktop.
pub struct StubContext;

impl HostContext for StubContext {
    fn is_alive(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
