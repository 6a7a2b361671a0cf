// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ARView simulator
//
// Entry point. Initialises logging and config, then plays one web invocation
// through the dispatcher against a simulated host, answering the camera
// prompt the way the command line says.

mod host;
mod services;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use serde_json::json;

use arview_bridge::traits::{ContextHandle, HostContext};
use arview_core::types::{Capability, PermissionResponse, RequestCode, PERMISSION_DENIED, PERMISSION_GRANTED};
use arview_plugin::{CommandDispatcher, Dispatch, HandoffOutcome, Invocation};

use host::{ConsoleResult, SimHost, SimScreen};

/// How the simulated user answers the camera prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Answer {
    Grant,
    Deny,
    /// Dialog interrupted: the OS reports empty result arrays.
    Dismiss,
}

#[derive(Debug, Parser)]
#[command(name = "arview-sim", version, about = "Play an AR view request against a simulated host")]
struct Args {
    /// Bundle name (first positional argument of the invocation).
    #[arg(long, default_value = "demo")]
    name: String,

    /// Model file to send, Base64-encoded.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Texture file to send, Base64-encoded.
    #[arg(long)]
    texture: Option<PathBuf>,

    /// Raw Base64 model argument, sent as-is.
    #[arg(long, conflicts_with = "model")]
    model_b64: Option<String>,

    /// Raw Base64 texture argument, sent as-is.
    #[arg(long, conflicts_with = "texture")]
    texture_b64: Option<String>,

    /// Action to dispatch (defaults to the configured open action).
    #[arg(long)]
    action: Option<String>,

    /// Answer given to the camera prompt.
    #[arg(long, value_enum, default_value_t = Answer::Grant)]
    answer: Answer,

    /// Deliver a callback with an unrelated request code first.
    #[arg(long)]
    stale_first: bool,

    /// Close the screen while the prompt is showing.
    #[arg(long)]
    close_screen: bool,

    /// Write launched payloads into this directory.
    #[arg(long)]
    dump_dir: Option<PathBuf>,

    /// Bridge config file (JSON).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::info!("ARView simulator starting");

    let config = match services::load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "config could not be loaded");
            return ExitCode::FAILURE;
        }
    };

    let payloads = services::encoded_payload(args.model_b64.as_deref(), args.model.as_deref())
        .and_then(|model| {
            let texture = services::encoded_payload(args.texture_b64.as_deref(), args.texture.as_deref())?;
            Ok((model, texture))
        });
    let (model, texture) = match payloads {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!(error = %e, "payload could not be prepared");
            return ExitCode::FAILURE;
        }
    };

    let host = Arc::new(SimHost::new(args.dump_dir.clone()));
    let screen = Arc::new(SimScreen::new());
    let context: Arc<dyn HostContext> = screen.clone();
    let dispatcher = CommandDispatcher::new(&config, host.clone(), ContextHandle::new(&context));

    let action = args.action.clone().unwrap_or_else(|| config.open_action.clone());
    let invocation = Invocation::new(
        action,
        vec![json!(args.name), json!(model), json!(texture)],
        Arc::new(ConsoleResult),
    );

    let task = match dispatcher.execute(invocation) {
        Ok(Dispatch::Handoff(task)) => task,
        Ok(Dispatch::Ignored) => {
            tracing::info!("action not recognised; nothing to do");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            tracing::error!(error = %e, "request rejected");
            return ExitCode::FAILURE;
        }
    };

    let Some(code) = host.last_prompt() else {
        tracing::error!("dispatcher reported a hand-off but no prompt was shown");
        return ExitCode::FAILURE;
    };

    if args.stale_first {
        let stale = RequestCode(code.0.wrapping_add(1000));
        let handled = dispatcher.on_permission_result(PermissionResponse::single(
            stale,
            Capability::Camera,
            PERMISSION_GRANTED,
        ));
        tracing::info!(%stale, handled, "stale callback delivered");
    }

    if args.close_screen {
        screen.close();
        dispatcher.on_context_disposed();
    } else {
        let response = match args.answer {
            Answer::Grant => PermissionResponse::single(code, Capability::Camera, PERMISSION_GRANTED),
            Answer::Deny => PermissionResponse::single(code, Capability::Camera, PERMISSION_DENIED),
            Answer::Dismiss => PermissionResponse::new(code, Vec::new(), Vec::new()),
        };
        dispatcher.on_permission_result(response);
    }

    let outcome = task.finished().await;
    tracing::info!(?outcome, launches = host.launch_count(), "hand-off finished");

    match outcome {
        HandoffOutcome::Launched => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
