// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! ARView — Native host bridge abstractions.
//!
//! This crate defines the traits the hand-off logic talks to (permission
//! prompts, viewer launch, result delivery, host-context liveness) and the
//! platform dispatch that picks an implementation for the target OS.

pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

use std::sync::Arc;

use arview_core::error::Result;

/// Retrieves the bridge implementation for the target operating system.
///
/// RETURNS: a shared trait object (`dyn PlatformBridge`) that hides the
/// underlying native SDK details.
pub fn platform_bridge() -> Arc<dyn traits::PlatformBridge> {
    #[cfg(target_os = "android")]
    {
        // Android: uses `jni-rs` to invoke methods on the JVM/ART.
        Arc::new(android::AndroidBridge::new())
    }
    #[cfg(not(target_os = "android"))]
    {
        // DESKTOP/CI: every capability reports `PlatformUnavailable`.
        Arc::new(stub::StubBridge)
    }
}

/// Retrieves the host context the bridge operates in.
///
/// On Android this is the Activity published through `ndk-context`; the
/// caller owns the returned handle and keeps it for the Activity's lifetime.
pub fn platform_context() -> Result<Arc<dyn traits::HostContext>> {
    #[cfg(target_os = "android")]
    {
        let context: Arc<dyn traits::HostContext> =
            Arc::new(android::ActivityContext::from_ndk_context()?);
        Ok(context)
    }
    #[cfg(not(target_os = "android"))]
    {
        let context: Arc<dyn traits::HostContext> = Arc::new(stub::StubContext);
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{HostContext, PlatformBridge};

    #[cfg(not(target_os = "android"))]
    #[test]
    fn desktop_context_is_alive_stub() {
        let context = platform_context().unwrap();
        assert!(context.is_alive());
        assert!(context.as_any().is::<stub::StubContext>());
        assert_eq!(platform_bridge().platform_name(), "Desktop (stub)");
    }
}
