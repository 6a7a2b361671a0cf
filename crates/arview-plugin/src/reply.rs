// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One-shot reply slot wrapping the web caller's result handle.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use arview_bridge::traits::ResultHandle;
use arview_core::error::ArViewError;
use arview_core::human_errors::error_response;
use arview_core::types::{BridgeResponse, InvocationId};

/// Delivers at most one response for an invocation.
///
/// The slot keeps the handle alive until a response has gone out, so a host
/// may hand its only reference to the dispatcher.
pub struct ReplySlot {
    invocation_id: InvocationId,
    handle: Option<Arc<dyn ResultHandle>>,
    report_failures: bool,
}

impl ReplySlot {
    pub fn new(
        invocation_id: InvocationId,
        handle: Arc<dyn ResultHandle>,
        report_failures: bool,
    ) -> Self {
        Self {
            invocation_id,
            handle: Some(handle),
            report_failures,
        }
    }

    pub fn invocation_id(&self) -> InvocationId {
        self.invocation_id
    }

    /// Report a successful viewer launch.
    pub fn launched(&mut self, bundle_name: &str) -> bool {
        self.deliver(BridgeResponse::Launched {
            invocation_id: self.invocation_id,
            bundle_name: bundle_name.to_string(),
            launched_at: Utc::now(),
        })
    }

    /// Report an abandoned request. Suppressed when failure reporting is off.
    pub fn failed(&mut self, err: &ArViewError) -> bool {
        if !self.report_failures {
            debug!(invocation = %self.invocation_id, code = err.code(), "failure reporting disabled");
            self.handle = None;
            return false;
        }
        self.deliver(error_response(self.invocation_id, err))
    }

    fn deliver(&mut self, response: BridgeResponse) -> bool {
        let Some(handle) = self.handle.take() else {
            warn!(invocation = %self.invocation_id, "response already delivered; dropping");
            return false;
        };
        handle.deliver(response);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingResult;

    #[test]
    fn delivers_only_once() {
        let result = Arc::new(RecordingResult::default());
        let handle: Arc<dyn ResultHandle> = result.clone();
        let mut slot = ReplySlot::new(InvocationId::new(), handle, true);

        assert!(slot.launched("cat"));
        assert!(!slot.failed(&ArViewError::PermissionDenied));
        assert_eq!(result.responses().len(), 1);
    }

    #[test]
    fn silent_mode_swallows_failures() {
        let result = Arc::new(RecordingResult::default());
        let handle: Arc<dyn ResultHandle> = result.clone();
        let mut slot = ReplySlot::new(InvocationId::new(), handle, false);

        assert!(!slot.failed(&ArViewError::PermissionDenied));
        assert!(!slot.launched("cat"));
        assert!(result.responses().is_empty());
    }

    #[test]
    fn slot_keeps_handle_alive_until_delivery() {
        let result = Arc::new(RecordingResult::default());
        let mut slot = ReplySlot::new(InvocationId::new(), result.clone(), true);
        assert_eq!(Arc::strong_count(&result), 2);

        assert!(slot.launched("cat"));
        assert_eq!(Arc::strong_count(&result), 1);
        assert_eq!(result.responses().len(), 1);
    }
}
