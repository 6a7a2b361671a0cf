// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plugin instance wired to the target platform's bridge and host context,
// with its own runtime for hand-off tasks. Native entry points that have no
// async context of their own go through this.

use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::Runtime;
use tracing::info;

use arview_bridge::traits::{ContextHandle, HostContext, PlatformBridge, ResultHandle};
use arview_core::config::BridgeConfig;
use arview_core::error::Result;
use arview_core::types::{InvocationId, PermissionResponse};

use crate::dispatcher::{CommandDispatcher, Invocation};
use crate::reply::ReplySlot;

pub struct PlatformPlugin {
    runtime: Runtime,
    report_failures: bool,
    // Strong reference; the dispatcher only holds the context weakly.
    context: Arc<dyn HostContext>,
    dispatcher: CommandDispatcher<dyn PlatformBridge>,
}

impl PlatformPlugin {
    pub fn new(config: &BridgeConfig) -> Result<Self> {
        config.validate()?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("arview-handoff")
            .enable_all()
            .build()?;
        let context = arview_bridge::platform_context()?;
        let dispatcher = CommandDispatcher::new(
            config,
            arview_bridge::platform_bridge(),
            ContextHandle::new(&context),
        );
        info!("platform plugin initialised");
        Ok(Self {
            runtime,
            report_failures: config.report_failures,
            context,
            dispatcher,
        })
    }

    /// Dispatch an invocation whose arguments arrive as JSON array text.
    ///
    /// Unparseable arguments are reported through `result`. Always returns
    /// `true`, like [`CommandDispatcher::dispatch`].
    pub fn dispatch_json(&self, action: &str, arguments: &str, result: Arc<dyn ResultHandle>) -> bool {
        let _entered = self.runtime.enter();
        match Invocation::from_json(action, arguments, Arc::clone(&result)) {
            Ok(invocation) => {
                let _ = self.dispatcher.execute(invocation);
            }
            Err(e) => {
                ReplySlot::new(InvocationId::new(), result, self.report_failures).failed(&e);
            }
        }
        true
    }

    pub fn dispatch(&self, action: &str, arguments: Vec<Value>, result: Arc<dyn ResultHandle>) -> bool {
        let _entered = self.runtime.enter();
        self.dispatcher.dispatch(action, arguments, result)
    }

    pub fn on_permission_result(&self, response: PermissionResponse) -> bool {
        self.dispatcher.on_permission_result(response)
    }

    pub fn on_context_disposed(&self) -> usize {
        self.dispatcher.on_context_disposed()
    }

    pub fn context(&self) -> &Arc<dyn HostContext> {
        &self.context
    }
}

#[cfg(all(test, not(target_os = "android")))]
mod tests {
    use arview_core::types::{BridgeResponse, Capability, RequestCode, PERMISSION_GRANTED};
    use serde_json::json;

    use super::*;
    use crate::testing::RecordingResult;

    fn responses_eventually(result: &RecordingResult) -> Vec<BridgeResponse> {
        for _ in 0..50 {
            let responses = result.responses();
            if !responses.is_empty() {
                return responses;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        result.responses()
    }

    #[test]
    fn desktop_plugin_reports_unavailable_platform() {
        let plugin = PlatformPlugin::new(&BridgeConfig::default()).unwrap();
        assert!(plugin.context().is_alive());

        let result = RecordingResult::new();
        assert!(plugin.dispatch(
            "openARView",
            vec![json!("demo"), json!("AAEC"), json!("AA==")],
            result.clone(),
        ));

        let responses = responses_eventually(&result);
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].error_code(), Some("PLATFORM_UNAVAILABLE"));
        assert!(!plugin.on_permission_result(PermissionResponse::single(
            RequestCode(0),
            Capability::Camera,
            PERMISSION_GRANTED,
        )));
        assert_eq!(plugin.on_context_disposed(), 0);
    }

    #[test]
    fn malformed_json_arguments_are_reported() {
        let plugin = PlatformPlugin::new(&BridgeConfig::default()).unwrap();
        let result = RecordingResult::new();

        assert!(plugin.dispatch_json("openARView", "{not json", result.clone()));
        assert_eq!(result.responses()[0].error_code(), Some("SERIALIZATION_ERROR"));
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = BridgeConfig {
            max_pending_requests: 0,
            ..BridgeConfig::default()
        };
        assert!(PlatformPlugin::new(&config).is_err());
    }
}
