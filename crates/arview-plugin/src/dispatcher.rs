// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command dispatcher: the plugin's entry point from the web-view host.
//
// `openARView` runs decode → permission prompt synchronously, then spawns a
// hand-off task that waits for the permission answer and launches the
// viewer. Every terminal path reports once through the caller's result
// handle. Any other action is accepted and ignored.

use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use arview_bridge::traits::{ContextHandle, PlatformBridge, ResultHandle};
use arview_core::config::BridgeConfig;
use arview_core::error::{ArViewError, Result};
use arview_core::types::{AssetBundle, InvocationId, PermissionOutcome, PermissionResponse, RequestCode};

use crate::decoder;
use crate::launcher::SessionLauncher;
use crate::negotiator::{PermissionNegotiator, PermissionTicket};
use crate::reply::ReplySlot;

/// Positional arguments of `openARView`.
pub const ARG_BUNDLE_NAME: usize = 0;
pub const ARG_MODEL: usize = 1;
pub const ARG_TEXTURE: usize = 2;

/// One web-originated request.
pub struct Invocation {
    pub id: InvocationId,
    pub action: String,
    pub arguments: Vec<Value>,
    /// Kept alive by the dispatcher until the single response is delivered.
    pub result: Arc<dyn ResultHandle>,
}

impl Invocation {
    pub fn new(action: impl Into<String>, arguments: Vec<Value>, result: Arc<dyn ResultHandle>) -> Self {
        Self {
            id: InvocationId::new(),
            action: action.into(),
            arguments,
            result,
        }
    }

    /// Build from the JSON array text some hosts marshal arguments as.
    pub fn from_json(
        action: impl Into<String>,
        arguments: &str,
        result: Arc<dyn ResultHandle>,
    ) -> Result<Self> {
        match serde_json::from_str::<Value>(arguments)? {
            Value::Array(items) => Ok(Self::new(action, items, result)),
            _ => Err(ArViewError::InvalidArgument {
                index: 0,
                expected: "a JSON array of arguments",
            }),
        }
    }
}

/// How a hand-off task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffOutcome {
    Launched,
    Denied,
    /// Context disposed or request withdrawn before the viewer started.
    Aborted,
    LaunchFailed,
}

/// Handle to the task waiting on a permission answer.
#[derive(Debug)]
pub struct HandoffTask {
    invocation_id: InvocationId,
    request_code: RequestCode,
    join: JoinHandle<HandoffOutcome>,
}

impl HandoffTask {
    pub fn invocation_id(&self) -> InvocationId {
        self.invocation_id
    }

    /// Request code of the permission prompt this task waits on.
    pub fn request_code(&self) -> RequestCode {
        self.request_code
    }

    /// Wait for the task to finish.
    pub async fn finished(self) -> HandoffOutcome {
        self.join.await.unwrap_or(HandoffOutcome::Aborted)
    }
}

/// What `execute` did with an invocation.
#[derive(Debug)]
pub enum Dispatch {
    /// Permission requested; the hand-off continues in the background.
    Handoff(HandoffTask),
    /// Unrecognised action, accepted without doing anything.
    Ignored,
}

/// Routes web invocations to the AR hand-off.
pub struct CommandDispatcher<B: PlatformBridge + ?Sized> {
    open_action: String,
    report_failures: bool,
    context: ContextHandle,
    negotiator: Arc<PermissionNegotiator<B>>,
    launcher: Arc<SessionLauncher<B>>,
}

impl<B: PlatformBridge + ?Sized + 'static> CommandDispatcher<B> {
    pub fn new(config: &BridgeConfig, bridge: Arc<B>, context: ContextHandle) -> Self {
        info!(
            platform = bridge.platform_name(),
            action = %config.open_action,
            "AR view dispatcher ready"
        );
        Self {
            open_action: config.open_action.clone(),
            report_failures: config.report_failures,
            context,
            negotiator: Arc::new(PermissionNegotiator::new(Arc::clone(&bridge), config)),
            launcher: Arc::new(SessionLauncher::new(bridge, config)),
        }
    }

    /// Bridge-facing entry point. Always returns `true` ("accepted").
    ///
    /// Synchronous failures are reported through `result`; see [`execute`]
    /// for the `Result`-returning form.
    ///
    /// [`execute`]: Self::execute
    pub fn dispatch(&self, action: &str, arguments: Vec<Value>, result: Arc<dyn ResultHandle>) -> bool {
        if let Err(e) = self.execute(Invocation::new(action, arguments, result)) {
            debug!(error = %e, "invocation rejected");
        }
        true
    }

    /// Run an invocation up to the permission prompt.
    ///
    /// Must be called from within a tokio runtime (the host's main context);
    /// the hand-off continuation is spawned onto it.
    #[instrument(skip_all, fields(invocation = %invocation.id, action = %invocation.action))]
    pub fn execute(&self, invocation: Invocation) -> Result<Dispatch> {
        if invocation.action != self.open_action {
            warn!("unrecognised action; accepted without effect");
            return Ok(Dispatch::Ignored);
        }

        let mut reply = ReplySlot::new(invocation.id, Arc::clone(&invocation.result), self.report_failures);

        let started = Handle::try_current()
            .map_err(|e| ArViewError::Bridge(format!("no async runtime for the hand-off: {e}")))
            .and_then(|runtime| {
                let ticket = self.open_ar_view(invocation.id, &invocation.arguments)?;
                Ok((runtime, ticket))
            });

        match started {
            Ok((runtime, ticket)) => Ok(Dispatch::Handoff(self.spawn_handoff(&runtime, ticket, reply))),
            Err(e) => {
                warn!(error = %e, code = e.code(), "AR view request abandoned");
                reply.failed(&e);
                Err(e)
            }
        }
    }

    /// Forward the OS permission answer. Returns `false` for unknown codes.
    pub fn on_permission_result(&self, response: PermissionResponse) -> bool {
        self.negotiator.on_permission_result(response)
    }

    /// The host screen was torn down: abort all outstanding prompts.
    pub fn on_context_disposed(&self) -> usize {
        self.negotiator.on_context_disposed()
    }

    pub fn negotiator(&self) -> &PermissionNegotiator<B> {
        &self.negotiator
    }

    /// Validate, decode, and ask for the camera.
    fn open_ar_view(&self, invocation_id: InvocationId, args: &[Value]) -> Result<PermissionTicket> {
        let name = match args.get(ARG_BUNDLE_NAME) {
            None | Some(Value::Null) => "",
            Some(Value::String(name)) => name.as_str(),
            Some(_) => {
                return Err(ArViewError::InvalidArgument {
                    index: ARG_BUNDLE_NAME,
                    expected: "a bundle name string",
                });
            }
        };
        if name.is_empty() {
            return Err(ArViewError::MissingBundleName);
        }

        let encoded_model = string_arg(args, ARG_MODEL)?;
        let encoded_texture = string_arg(args, ARG_TEXTURE)?;
        let (model, texture) = decoder::decode(encoded_model, encoded_texture)?;
        let bundle = AssetBundle::new(name, model, texture)?;

        info!(bundle = ?bundle, "AR view requested");
        self.negotiator
            .request_camera_access(&self.context, invocation_id, bundle)
    }

    fn spawn_handoff(&self, runtime: &Handle, ticket: PermissionTicket, mut reply: ReplySlot) -> HandoffTask {
        let invocation_id = reply.invocation_id();
        let request_code = ticket.request_code();
        let launcher = Arc::clone(&self.launcher);
        let context = self.context.clone();

        let join = runtime.spawn(async move {
            let outcome = match ticket.await {
                PermissionOutcome::Granted(bundle) => {
                    let name = bundle.name().to_string();
                    match launcher.launch(&context, bundle) {
                        Ok(()) => {
                            reply.launched(&name);
                            HandoffOutcome::Launched
                        }
                        Err(e) => {
                            warn!(invocation = %invocation_id, error = %e, "AR viewer not started");
                            reply.failed(&e);
                            match e {
                                ArViewError::ContextDisposed => HandoffOutcome::Aborted,
                                _ => HandoffOutcome::LaunchFailed,
                            }
                        }
                    }
                }
                PermissionOutcome::Denied => {
                    reply.failed(&ArViewError::PermissionDenied);
                    HandoffOutcome::Denied
                }
                PermissionOutcome::Aborted => {
                    reply.failed(&ArViewError::PermissionAborted);
                    HandoffOutcome::Aborted
                }
            };
            debug!(invocation = %invocation_id, code = %request_code, ?outcome, "hand-off finished");
            outcome
        });

        HandoffTask {
            invocation_id,
            request_code,
            join,
        }
    }
}

fn string_arg(args: &[Value], index: usize) -> Result<&str> {
    args.get(index)
        .and_then(Value::as_str)
        .ok_or(ArViewError::InvalidArgument {
            index,
            expected: "a Base64 string",
        })
}
