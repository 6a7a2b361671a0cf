// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ARView plugin — command dispatch, camera permission negotiation, and the
// hand-off of decoded assets to the external AR viewer.

pub mod decoder;
pub mod dispatcher;
pub mod launcher;
pub mod negotiator;
pub mod platform;
pub mod reply;

#[cfg(target_os = "android")]
mod android;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use dispatcher::{CommandDispatcher, Dispatch, HandoffOutcome, HandoffTask, Invocation};
pub use negotiator::{PermissionNegotiator, PermissionTicket};
pub use platform::PlatformPlugin;
