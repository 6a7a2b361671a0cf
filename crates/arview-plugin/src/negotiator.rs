// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Camera permission negotiation.
//
// Each request gets its own request code and an entry in a keyed pending
// table. The OS answer arrives later through `on_permission_result`, which
// looks the entry up by code and resolves the `PermissionTicket` future the
// requester is awaiting:
//
//   Idle ──request_camera_access──▶ AwaitingPermission ──┬─▶ Granted(bundle)
//                                                       ├─▶ Denied
//                                                       └─▶ Aborted (context gone)
//
// Callbacks carrying a code with no pending entry are ignored.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};

use arview_bridge::traits::{ContextHandle, PermissionHost};
use arview_core::config::{BridgeConfig, MAX_REQUEST_CODE, REQUEST_CODE_SPACE};
use arview_core::error::{ArViewError, Result};
use arview_core::types::{
    AssetBundle, Capability, InvocationId, PermissionOutcome, PermissionResponse, RequestCode,
};

/// A prompt that has been issued and not yet answered.
struct PendingPermissionRequest {
    invocation_id: InvocationId,
    bundle: AssetBundle,
    requested_at: DateTime<Utc>,
    resolve: oneshot::Sender<PermissionOutcome>,
}

/// Future resolved when the OS answers the prompt for one request.
///
/// Resolves to [`PermissionOutcome::Aborted`] if the pending entry is
/// dropped without an answer.
#[derive(Debug)]
pub struct PermissionTicket {
    request_code: RequestCode,
    rx: oneshot::Receiver<PermissionOutcome>,
}

impl PermissionTicket {
    pub fn request_code(&self) -> RequestCode {
        self.request_code
    }
}

impl Future for PermissionTicket {
    type Output = PermissionOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(PermissionOutcome::Aborted))
    }
}

/// Issues camera prompts and routes their answers back to the requester.
pub struct PermissionNegotiator<H: PermissionHost + ?Sized> {
    host: Arc<H>,
    capability: Capability,
    pending: Mutex<HashMap<RequestCode, PendingPermissionRequest>>,
    next_code: AtomicI32,
    max_pending: usize,
}

impl<H: PermissionHost + ?Sized> PermissionNegotiator<H> {
    pub fn new(host: Arc<H>, config: &BridgeConfig) -> Self {
        Self {
            host,
            capability: Capability::Camera,
            pending: Mutex::new(HashMap::new()),
            next_code: AtomicI32::new(config.first_permission_request_code),
            max_pending: config.max_pending_requests,
        }
    }

    /// Park `bundle` and ask the OS for camera access.
    ///
    /// Returns as soon as the prompt is issued. Fails without prompting when
    /// the context is gone or `max_pending_requests` prompts are already
    /// outstanding.
    #[instrument(skip_all, fields(invocation = %invocation_id, bundle = bundle.name()))]
    pub fn request_camera_access(
        &self,
        context: &ContextHandle,
        invocation_id: InvocationId,
        bundle: AssetBundle,
    ) -> Result<PermissionTicket> {
        let ctx = context.live().ok_or(ArViewError::ContextDisposed)?;

        let (tx, rx) = oneshot::channel();
        let code = {
            let mut pending = self.pending.lock().expect("pending lock poisoned");
            if pending.len() >= self.max_pending {
                warn!(outstanding = pending.len(), "permission request rejected: too many outstanding");
                return Err(ArViewError::PermissionBusy {
                    outstanding: pending.len(),
                });
            }
            let Some(code) = self.allocate_code(&pending) else {
                warn!(outstanding = pending.len(), "permission request rejected: no free request code");
                return Err(ArViewError::PermissionBusy {
                    outstanding: pending.len(),
                });
            };
            pending.insert(
                code,
                PendingPermissionRequest {
                    invocation_id,
                    bundle,
                    requested_at: Utc::now(),
                    resolve: tx,
                },
            );
            code
        };

        // The lock is released here: hosts may answer from inside the call.
        if let Err(e) = self
            .host
            .request_permission(ctx.as_ref(), code, self.capability)
        {
            warn!(%code, error = %e, "permission prompt could not be issued");
            self.pending
                .lock()
                .expect("pending lock poisoned")
                .remove(&code);
            return Err(e);
        }

        info!(%code, capability = %self.capability, "permission requested");
        Ok(PermissionTicket {
            request_code: code,
            rx,
        })
    }

    /// Handle the OS answer for one prompt.
    ///
    /// Returns `false` (and changes nothing) when no request is pending under
    /// `response.request_code`.
    #[instrument(skip_all, fields(code = %response.request_code))]
    pub fn on_permission_result(&self, response: PermissionResponse) -> bool {
        let entry = self
            .pending
            .lock()
            .expect("pending lock poisoned")
            .remove(&response.request_code);

        let Some(entry) = entry else {
            debug!("no pending request for this code; ignoring callback");
            return false;
        };

        let waited_ms = (Utc::now() - entry.requested_at).num_milliseconds();
        let outcome = if response.is_granted(self.capability) {
            info!(invocation = %entry.invocation_id, waited_ms, "camera permission granted");
            PermissionOutcome::Granted(entry.bundle)
        } else {
            warn!(invocation = %entry.invocation_id, waited_ms, "camera permission denied");
            PermissionOutcome::Denied
        };

        if entry.resolve.send(outcome).is_err() {
            debug!(invocation = %entry.invocation_id, "ticket dropped before the answer arrived");
        }
        true
    }

    /// Abort every outstanding request, e.g. when the host screen is torn down.
    ///
    /// Returns how many requests were aborted.
    pub fn on_context_disposed(&self) -> usize {
        let drained: Vec<_> = self
            .pending
            .lock()
            .expect("pending lock poisoned")
            .drain()
            .collect();

        for (code, entry) in &drained {
            debug!(%code, invocation = %entry.invocation_id, "aborting pending permission request");
        }
        let count = drained.len();
        for (_, entry) in drained {
            let _ = entry.resolve.send(PermissionOutcome::Aborted);
        }
        if count > 0 {
            info!(count, "pending permission requests aborted");
        }
        count
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().expect("pending lock poisoned").len()
    }

    pub fn is_pending(&self, code: RequestCode) -> bool {
        self.pending
            .lock()
            .expect("pending lock poisoned")
            .contains_key(&code)
    }

    /// Next free code in `0..=MAX_REQUEST_CODE`, wrapping around. `None` once
    /// a full pass finds every code in use.
    fn allocate_code(
        &self,
        pending: &HashMap<RequestCode, PendingPermissionRequest>,
    ) -> Option<RequestCode> {
        (0..REQUEST_CODE_SPACE)
            .map(|_| RequestCode(self.next_code.fetch_add(1, Ordering::Relaxed) & MAX_REQUEST_CODE))
            .find(|code| !pending.contains_key(code))
    }
}
