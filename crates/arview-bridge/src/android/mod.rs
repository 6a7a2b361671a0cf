// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android host bridge via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`. Each trait method invokes the corresponding
// Android API through JNI calls into the ART runtime.
//
// ## Architecture notes
//
// Both operations here are fire-and-forget from the JVM's point of view:
//
// - `requestPermissions` returns immediately; the answer arrives through the
//   host Activity's `onRequestPermissionsResult`, which must forward it into
//   the plugin (see [`permission_response_from_java`]).
// - the AR viewer is started with `startActivityForResult`; its result is
//   never read.
//
// Intent extras travel through Binder, so payloads beyond roughly 1 MiB make
// `startActivityForResult` throw `TransactionTooLargeException`. That surfaces
// as a launch failure.

#![cfg(target_os = "android")]

use std::any::Any;

use jni::objects::{GlobalRef, JIntArray, JObject, JObjectArray, JString, JValue};
use jni::sys::jint;
use jni::{JNIEnv, JavaVM};

use arview_core::error::{ArViewError, Result};
use arview_core::types::{BridgeResponse, Capability, PermissionResponse, RequestCode};

use crate::traits::*;

// ---------------------------------------------------------------------------
// JNI helpers
// ---------------------------------------------------------------------------

/// Convenience: map any `jni::errors::Error` into `ArViewError::Bridge`.
fn jni_err(context: &str, e: jni::errors::Error) -> ArViewError {
    ArViewError::Bridge(format!("{context}: {e}"))
}

/// Clear a pending Java exception so the next JNI call is legal.
///
/// Returns whether an exception was pending.
fn clear_exception(env: &mut JNIEnv<'_>) -> bool {
    match env.exception_check() {
        Ok(true) => {
            // Log it to logcat before dropping it.
            let _ = env.exception_describe();
            let _ = env.exception_clear();
            true
        }
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Host context
// ---------------------------------------------------------------------------

/// The Activity hosting the web view, held as a JNI global reference.
pub struct ActivityContext {
    vm: JavaVM,
    activity: GlobalRef,
}

impl ActivityContext {
    /// Capture the Activity published by the NDK glue code.
    ///
    /// `ndk_context::android_context()` exposes the `JavaVM*` and Activity
    /// `jobject` set by `android_main` or `ANativeActivity_onCreate`.
    pub fn from_ndk_context() -> Result<Self> {
        let ctx = ndk_context::android_context();
        // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the NDK glue code.
        // The pointer is guaranteed valid for the lifetime of the process.
        let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
            .map_err(|e| ArViewError::Bridge(format!("failed to obtain JavaVM: {e}")))?;

        let ptr = ctx.context();
        if ptr.is_null() {
            return Err(ArViewError::Bridge(
                "Android context is null — native activity not initialised".into(),
            ));
        }

        let activity = {
            let env = vm
                .attach_current_thread_permanently()
                .map_err(|e| jni_err("attach_current_thread", e))?;
            // SAFETY: the NDK guarantees this pointer is a valid global jobject
            // for the hosting Activity.
            let local = unsafe { JObject::from_raw(ptr.cast()) };
            env.new_global_ref(local)
                .map_err(|e| jni_err("new_global_ref(activity)", e))?
        };

        Ok(Self { vm, activity })
    }

    fn env(&self) -> Result<JNIEnv<'_>> {
        self.vm
            .attach_current_thread_permanently()
            .map_err(|e| jni_err("attach_current_thread", e))
    }

    fn activity(&self) -> &JObject<'static> {
        self.activity.as_obj()
    }

    fn check_alive(&self) -> Result<bool> {
        let mut env = self.env()?;
        let finishing = env
            .call_method(self.activity(), "isFinishing", "()Z", &[])
            .map_err(|e| jni_err("isFinishing", e))?
            .z()
            .map_err(|e| jni_err("isFinishing->z", e))?;
        let destroyed = env
            .call_method(self.activity(), "isDestroyed", "()Z", &[])
            .map_err(|e| jni_err("isDestroyed", e))?
            .z()
            .map_err(|e| jni_err("isDestroyed->z", e))?;
        Ok(!finishing && !destroyed)
    }
}

impl HostContext for ActivityContext {
    fn is_alive(&self) -> bool {
        match self.check_alive() {
            Ok(alive) => alive,
            Err(e) => {
                tracing::warn!(error = %e, "Android: activity liveness check failed");
                false
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn activity_context(context: &dyn HostContext) -> Result<&ActivityContext> {
    context
        .as_any()
        .downcast_ref::<ActivityContext>()
        .ok_or_else(|| ArViewError::Bridge("host context is not an Android activity".into()))
}

// ---------------------------------------------------------------------------
// Bridge struct
// ---------------------------------------------------------------------------

/// Android implementation of the ARView host bridge.
///
/// The struct is zero-sized; the Activity travels in the [`ActivityContext`]
/// passed to each call.
pub struct AndroidBridge;

impl AndroidBridge {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AndroidBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformBridge for AndroidBridge {
    fn platform_name(&self) -> &str {
        "Android"
    }
}

// ---------------------------------------------------------------------------
// PermissionHost — ActivityCompat.requestPermissions
// ---------------------------------------------------------------------------

impl PermissionHost for AndroidBridge {
    fn request_permission(
        &self,
        context: &dyn HostContext,
        code: RequestCode,
        capability: Capability,
    ) -> Result<()> {
        let ctx = activity_context(context)?;
        let mut env = ctx.env()?;

        tracing::info!(%code, %capability, "Android: requesting runtime permission");

        let j_permission: JString = env
            .new_string(capability.permission())
            .map_err(|e| jni_err("new_string(permission)", e))?;

        // new String[] { permission }
        let permissions: JObjectArray = env
            .new_object_array(1, "java/lang/String", &j_permission)
            .map_err(|e| jni_err("new_object_array(String)", e))?;

        let outcome = env.call_static_method(
            "androidx/core/app/ActivityCompat",
            "requestPermissions",
            "(Landroid/app/Activity;[Ljava/lang/String;I)V",
            &[
                JValue::Object(ctx.activity()),
                JValue::Object(&permissions),
                JValue::Int(code.0),
            ],
        );

        if let Err(e) = outcome {
            clear_exception(&mut env);
            return Err(ArViewError::PermissionRequest(format!(
                "ActivityCompat.requestPermissions: {e}"
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ViewerHost — explicit-component Intent with byte[] extras
// ---------------------------------------------------------------------------

impl ViewerHost for AndroidBridge {
    fn start_viewer(&self, context: &dyn HostContext, request: &ViewerLaunchRequest) -> Result<()> {
        let ctx = activity_context(context)?;
        let mut env = ctx.env()?;

        tracing::info!(
            component = %request.component,
            extras = request.extras.len(),
            "Android: building AR viewer intent"
        );

        let intent: JObject = env
            .new_object("android/content/Intent", "()V", &[])
            .map_err(|e| jni_err("new Intent", e))?;

        // intent.setClassName(activity, component)
        let j_component: JString = env
            .new_string(&request.component)
            .map_err(|e| jni_err("new_string(component)", e))?;
        env.call_method(
            &intent,
            "setClassName",
            "(Landroid/content/Context;Ljava/lang/String;)Landroid/content/Intent;",
            &[JValue::Object(ctx.activity()), JValue::Object(&j_component)],
        )
        .map_err(|e| jni_err("setClassName", e))?;

        // intent.putExtra(key, byte[])
        for extra in &request.extras {
            let j_key: JString = env
                .new_string(&extra.key)
                .map_err(|e| jni_err("new_string(extra key)", e))?;
            let j_bytes = env
                .byte_array_from_slice(&extra.bytes)
                .map_err(|e| jni_err("byte_array_from_slice", e))?;
            env.call_method(
                &intent,
                "putExtra",
                "(Ljava/lang/String;[B)Landroid/content/Intent;",
                &[JValue::Object(&j_key), JValue::Object(&j_bytes)],
            )
            .map_err(|e| jni_err("putExtra(byte[])", e))?;
        }

        // activity.startActivityForResult(intent, code)
        let launched = env.call_method(
            ctx.activity(),
            "startActivityForResult",
            "(Landroid/content/Intent;I)V",
            &[JValue::Object(&intent), JValue::Int(request.result_code)],
        );

        if let Err(e) = launched {
            // ActivityNotFoundException, TransactionTooLargeException, ...
            let thrown = clear_exception(&mut env);
            return Err(ArViewError::LaunchFailure(format!(
                "startActivityForResult({}): {e}{}",
                request.component,
                if thrown { " (Java exception cleared)" } else { "" }
            )));
        }

        tracing::info!(
            result_code = request.result_code,
            "Android: AR viewer intent dispatched"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Callback glue
// ---------------------------------------------------------------------------

/// Convert the arguments of `onRequestPermissionsResult(int, String[], int[])`
/// into a [`PermissionResponse`].
///
/// The host Activity's JNI shim calls this and passes the result to the
/// plugin's `on_permission_result`.
pub fn permission_response_from_java(
    env: &mut JNIEnv<'_>,
    request_code: jint,
    permissions: &JObjectArray<'_>,
    grant_results: &JIntArray<'_>,
) -> Result<PermissionResponse> {
    let count = env
        .get_array_length(permissions)
        .map_err(|e| jni_err("get_array_length(permissions)", e))?;

    let mut names = Vec::with_capacity(count.max(0) as usize);
    for idx in 0..count {
        let element = env
            .get_object_array_element(permissions, idx)
            .map_err(|e| jni_err("get_object_array_element", e))?;
        let name: String = env
            .get_string(&JString::from(element))
            .map_err(|e| jni_err("get_string(permission)", e))?
            .into();
        names.push(name);
    }

    let result_count = env
        .get_array_length(grant_results)
        .map_err(|e| jni_err("get_array_length(grantResults)", e))?;
    let mut results = vec![0 as jint; result_count.max(0) as usize];
    env.get_int_array_region(grant_results, 0, &mut results)
        .map_err(|e| jni_err("get_int_array_region", e))?;

    Ok(PermissionResponse::new(
        RequestCode(request_code),
        names,
        results,
    ))
}

/// Result handle backed by a Java callback object exposing
/// `success(String)` and `error(String)`, e.g. Cordova's `CallbackContext`.
///
/// The response travels as its JSON form.
pub struct JavaResultHandle {
    vm: JavaVM,
    callback: GlobalRef,
}

impl JavaResultHandle {
    pub fn new(env: &mut JNIEnv<'_>, callback: &JObject<'_>) -> Result<Self> {
        let vm = env.get_java_vm().map_err(|e| jni_err("get_java_vm", e))?;
        let callback = env
            .new_global_ref(callback)
            .map_err(|e| jni_err("new_global_ref(callback)", e))?;
        Ok(Self { vm, callback })
    }

    fn send(&self, response: &BridgeResponse) -> Result<()> {
        let json = serde_json::to_string(response)?;
        let method = if response.is_success() { "success" } else { "error" };

        let mut env = self
            .vm
            .attach_current_thread_permanently()
            .map_err(|e| jni_err("attach_current_thread", e))?;
        let payload = env
            .new_string(json)
            .map_err(|e| jni_err("new_string(response)", e))?;
        let called = env.call_method(
            self.callback.as_obj(),
            method,
            "(Ljava/lang/String;)V",
            &[JValue::Object(&payload)],
        );
        if let Err(e) = called {
            clear_exception(&mut env);
            return Err(jni_err(method, e));
        }
        Ok(())
    }
}

impl ResultHandle for JavaResultHandle {
    fn deliver(&self, response: BridgeResponse) {
        if let Err(e) = self.send(&response) {
            tracing::error!(error = %e, "Android: response could not reach the web layer");
        }
    }
}
