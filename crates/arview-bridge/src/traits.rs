// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the host capabilities the AR
// hand-off needs: the permission prompt, the viewer launch, the web caller's
// result channel and the liveness of the screen that owns a request.

use std::any::Any;
use std::sync::{Arc, Weak};

use arview_core::error::Result;
use arview_core::types::{BridgeResponse, Capability, RequestCode};

/// Unified bridge that groups the native capabilities the plugin drives.
pub trait PlatformBridge: PermissionHost + ViewerHost {
    /// Human-readable platform name (e.g. "Android").
    fn platform_name(&self) -> &str;
}

/// The host screen (activity, view controller) a request belongs to.
///
/// Permission callbacks may arrive after the screen is gone, so every
/// continuation checks [`HostContext::is_alive`] before touching it.
pub trait HostContext: Any + Send + Sync {
    /// Whether the context can still present UI.
    fn is_alive(&self) -> bool;

    /// Downcast hook for bridges that need their concrete context type.
    fn as_any(&self) -> &dyn Any;
}

/// Weak, liveness-checked reference to a [`HostContext`].
///
/// The host owns the context; the bridge never keeps it alive.
#[derive(Clone)]
pub struct ContextHandle {
    inner: Weak<dyn HostContext>,
}

impl ContextHandle {
    pub fn new(context: &Arc<dyn HostContext>) -> Self {
        Self {
            inner: Arc::downgrade(context),
        }
    }

    /// The context, if it still exists and reports itself alive.
    pub fn live(&self) -> Option<Arc<dyn HostContext>> {
        self.inner.upgrade().filter(|ctx| ctx.is_alive())
    }
}

impl std::fmt::Debug for ContextHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextHandle")
            .field("live", &self.live().is_some())
            .finish()
    }
}

/// OS runtime-permission subsystem.
pub trait PermissionHost: Send + Sync {
    /// Issue the OS prompt for `capability`, tagged with `code`.
    ///
    /// Must not block waiting for the user. The answer is delivered later
    /// by the host through the negotiator's `on_permission_result`, possibly
    /// re-entrantly from inside this call.
    fn request_permission(
        &self,
        context: &dyn HostContext,
        code: RequestCode,
        capability: Capability,
    ) -> Result<()>;
}

/// One opaque binary extra attached to a viewer launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerExtra {
    pub key: String,
    pub bytes: Vec<u8>,
}

/// Launch request addressed to the external AR viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerLaunchRequest {
    /// Fully-qualified component (activity class) name.
    pub component: String,
    pub extras: Vec<ViewerExtra>,
    /// Raw activity-result code. The viewer's result is never read.
    pub result_code: i32,
}

impl ViewerLaunchRequest {
    /// Bytes attached under `key`, if any.
    pub fn extra(&self, key: &str) -> Option<&[u8]> {
        self.extras
            .iter()
            .find(|extra| extra.key == key)
            .map(|extra| extra.bytes.as_slice())
    }
}

/// Starts the external AR viewer.
pub trait ViewerHost: Send + Sync {
    /// Start the viewer and return as soon as it has been launched.
    fn start_viewer(&self, context: &dyn HostContext, request: &ViewerLaunchRequest) -> Result<()>;
}

/// Response channel back to the web caller for one invocation.
///
/// Owned by the host runtime; the bridge holds it weakly and delivers at
/// most one response through it.
pub trait ResultHandle: Send + Sync {
    fn deliver(&self, response: BridgeResponse);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Screen(AtomicBool);

    impl HostContext for Screen {
        fn is_alive(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn handle_tracks_liveness() {
        let screen = Arc::new(Screen(AtomicBool::new(true)));
        let ctx: Arc<dyn HostContext> = screen.clone();
        let handle = ContextHandle::new(&ctx);
        assert!(handle.live().is_some());

        screen.0.store(false, Ordering::SeqCst);
        assert!(handle.live().is_none());
    }

    #[test]
    fn handle_does_not_keep_context_alive() {
        let ctx: Arc<dyn HostContext> = Arc::new(Screen(AtomicBool::new(true)));
        let handle = ContextHandle::new(&ctx);
        drop(ctx);
        assert!(handle.live().is_none());
    }

    #[test]
    fn extra_lookup_by_key() {
        let request = ViewerLaunchRequest {
            component: "viewer".into(),
            extras: vec![ViewerExtra {
                key: "obj_path".into(),
                bytes: vec![1, 2, 3],
            }],
            result_code: 1,
        };
        assert_eq!(request.extra("obj_path"), Some(&[1u8, 2, 3][..]));
        assert_eq!(request.extra("texture_path"), None);
    }
}
