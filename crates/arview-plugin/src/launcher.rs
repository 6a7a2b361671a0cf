// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Session launcher: hands a granted bundle to the external AR viewer.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use arview_bridge::traits::{ContextHandle, ViewerExtra, ViewerHost, ViewerLaunchRequest};
use arview_core::config::BridgeConfig;
use arview_core::error::{ArViewError, Result};
use arview_core::types::AssetBundle;

/// Builds viewer launch requests and starts the viewer without awaiting it.
pub struct SessionLauncher<H: ViewerHost + ?Sized> {
    host: Arc<H>,
    component: String,
    model_key: String,
    texture_key: String,
    result_code: i32,
}

impl<H: ViewerHost + ?Sized> SessionLauncher<H> {
    pub fn new(host: Arc<H>, config: &BridgeConfig) -> Self {
        Self {
            host,
            component: config.viewer_component.clone(),
            model_key: config.model_extra_key.clone(),
            texture_key: config.texture_extra_key.clone(),
            result_code: config.viewer_request_code,
        }
    }

    /// Attach the bundle's bytes to a launch request; no copying beyond the move.
    pub fn build_request(&self, bundle: AssetBundle) -> ViewerLaunchRequest {
        let (_, model, texture) = bundle.into_parts();
        ViewerLaunchRequest {
            component: self.component.clone(),
            extras: vec![
                ViewerExtra {
                    key: self.model_key.clone(),
                    bytes: model,
                },
                ViewerExtra {
                    key: self.texture_key.clone(),
                    bytes: texture,
                },
            ],
            result_code: self.result_code,
        }
    }

    /// Start the viewer for `bundle`.
    ///
    /// Any host error is reported as [`ArViewError::LaunchFailure`]. What the
    /// viewer does after it starts is not observed.
    #[instrument(skip_all, fields(
        bundle = bundle.name(),
        model_bytes = bundle.model().len(),
        texture_bytes = bundle.texture().len(),
    ))]
    pub fn launch(&self, context: &ContextHandle, bundle: AssetBundle) -> Result<()> {
        let Some(ctx) = context.live() else {
            warn!("host context gone before launch; dropping bundle");
            return Err(ArViewError::ContextDisposed);
        };

        let request = self.build_request(bundle);
        self.host
            .start_viewer(ctx.as_ref(), &request)
            .map_err(|e| match e {
                ArViewError::LaunchFailure(_) => e,
                other => ArViewError::LaunchFailure(other.to_string()),
            })?;

        info!(component = %self.component, "AR viewer started");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use arview_bridge::traits::HostContext;

    use super::*;
    use crate::testing::{RecordingHost, TestContext};

    fn handle(ctx: &Arc<TestContext>) -> ContextHandle {
        let ctx: Arc<dyn HostContext> = ctx.clone();
        ContextHandle::new(&ctx)
    }

    fn bundle() -> AssetBundle {
        AssetBundle::new("cat", vec![1, 2, 3], vec![9, 8]).unwrap()
    }

    #[test]
    fn request_carries_payloads_under_configured_keys() {
        let host = RecordingHost::new();
        let launcher = SessionLauncher::new(host, &BridgeConfig::default());
        let request = launcher.build_request(bundle());

        assert_eq!(
            request.component,
            "com.google.ar.core.examples.java.helloar.ArTradeActivity"
        );
        assert_eq!(request.extra("obj_path"), Some(&[1u8, 2, 3][..]));
        assert_eq!(request.extra("texture_path"), Some(&[9u8, 8][..]));
        assert_eq!(request.result_code, 1);
    }

    #[test]
    fn launch_reaches_host_once() {
        let host = RecordingHost::new();
        let launcher = SessionLauncher::new(host.clone(), &BridgeConfig::default());
        let ctx = TestContext::new();

        launcher.launch(&handle(&ctx), bundle()).unwrap();
        assert_eq!(host.launches().len(), 1);
    }

    #[test]
    fn host_error_becomes_launch_failure() {
        let host = RecordingHost::new();
        host.set_fail_launch(true);
        let launcher = SessionLauncher::new(host.clone(), &BridgeConfig::default());
        let ctx = TestContext::new();

        let err = launcher.launch(&handle(&ctx), bundle()).unwrap_err();
        assert!(matches!(err, ArViewError::LaunchFailure(_)));
        assert!(host.launches().is_empty());
    }

    #[test]
    fn disposed_context_is_not_touched() {
        let host = RecordingHost::new();
        let launcher = SessionLauncher::new(host.clone(), &BridgeConfig::default());
        let ctx = TestContext::new();
        ctx.dispose();

        let err = launcher.launch(&handle(&ctx), bundle()).unwrap_err();
        assert!(matches!(err, ArViewError::ContextDisposed));
        assert!(host.launches().is_empty());
    }
}
