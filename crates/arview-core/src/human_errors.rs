// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the web caller.
//
// Every technical error is mapped to plain English with a clear suggestion,
// which the web layer can show as-is.

use crate::error::ArViewError;
use crate::types::{BridgeResponse, InvocationId};

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Try again and it will probably work.
    Transient,
    /// User must do something (grant access, close another AR view).
    ActionRequired,
    /// Cannot be fixed by retrying: bad data, missing component.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Whether repeating the same request may succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert an `ArViewError` into a `HumanError`.
pub fn humanize_error(err: &ArViewError) -> HumanError {
    match err {
        // -- Invocation errors --
        ArViewError::MissingBundleName => HumanError {
            message: "No model was chosen.".into(),
            suggestion: "Pick a model to view, then try again.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ArViewError::InvalidArgument { .. } => HumanError {
            message: "The AR request was incomplete.".into(),
            suggestion: format!("The app sent an unexpected request. ({err})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        ArViewError::Decode { field, .. } => HumanError {
            message: format!("The {field} file could not be read."),
            suggestion: "The download may be damaged. Try loading the model again.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        // -- Permission errors --
        ArViewError::PermissionDenied => HumanError {
            message: "Camera access is needed to show the model in AR.".into(),
            suggestion: "Allow camera access when asked, or enable it in the system settings."
                .into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        ArViewError::PermissionBusy { .. } => HumanError {
            message: "An AR view is already being opened.".into(),
            suggestion: "Wait for the current request to finish, then try again.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        ArViewError::PermissionRequest(_) | ArViewError::PermissionAborted => HumanError {
            message: "We couldn't ask for camera access.".into(),
            suggestion: "Return to the app and try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        // -- Viewer errors --
        ArViewError::LaunchFailure(_) => HumanError {
            message: "The AR viewer could not be opened.".into(),
            suggestion: "This device may not support AR, or AR services need updating.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ArViewError::ContextDisposed => HumanError {
            message: "The screen was closed before the AR view opened.".into(),
            suggestion: "Open the screen again and retry.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        // -- Ambient --
        ArViewError::Config(_) | ArViewError::Io(_) | ArViewError::Serialization(_) => {
            HumanError {
                message: "The AR bridge is misconfigured.".into(),
                suggestion: format!("Please report this problem. ({err})"),
                retriable: false,
                severity: Severity::Permanent,
            }
        }

        ArViewError::Bridge(_) | ArViewError::PlatformUnavailable => HumanError {
            message: "AR isn't available on this device.".into(),
            suggestion: "Try again on a phone or tablet that supports AR.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

/// Build the failure payload delivered to the web caller.
pub fn error_response(invocation_id: InvocationId, err: &ArViewError) -> BridgeResponse {
    let human = humanize_error(err);
    BridgeResponse::Error {
        invocation_id,
        code: err.code().to_string(),
        message: human.message,
        suggestion: human.suggestion,
        retriable: human.retriable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PayloadField;

    #[test]
    fn denial_is_action_required() {
        let human = humanize_error(&ArViewError::PermissionDenied);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.retriable);
    }

    #[test]
    fn decode_names_the_field() {
        let err = ArViewError::Decode {
            field: PayloadField::Texture,
            reason: "Invalid byte 33, offset 0.".into(),
        };
        let human = humanize_error(&err);
        assert!(human.message.contains("texture"));
        assert!(!human.retriable);
    }

    #[test]
    fn launch_failure_is_permanent() {
        let human = humanize_error(&ArViewError::LaunchFailure("ActivityNotFoundException".into()));
        assert_eq!(human.severity, Severity::Permanent);
    }

    #[test]
    fn error_response_carries_code() {
        let id = InvocationId::new();
        let response = error_response(id, &ArViewError::MissingBundleName);
        assert_eq!(response.error_code(), Some("MISSING_BUNDLE_NAME"));
        assert!(!response.is_success());
    }
}
