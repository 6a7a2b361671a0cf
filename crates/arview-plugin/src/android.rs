// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JNI entry points for the Java shim `com.arview.bridge.ARViewNative`.
//
// The shim forwards `execute`, `onRequestPermissionsResult` and `onDestroy`
// from the hosting plugin/Activity. One plugin instance lives per process.

#![cfg(target_os = "android")]

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

use jni::objects::{JClass, JIntArray, JObject, JObjectArray, JString};
use jni::sys::{jboolean, jint, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;
use tracing::{error, warn};

use arview_bridge::android::{permission_response_from_java, JavaResultHandle};
use arview_core::config::BridgeConfig;
use arview_core::error::{ArViewError, Result};

use crate::platform::PlatformPlugin;

static PLUGIN: OnceLock<PlatformPlugin> = OnceLock::new();

fn plugin() -> Result<&'static PlatformPlugin> {
    PLUGIN
        .get()
        .ok_or_else(|| ArViewError::Bridge("nativeInit has not been called".into()))
}

fn read_string(env: &mut JNIEnv<'_>, value: &JString<'_>) -> Result<String> {
    env.get_string(value)
        .map(Into::into)
        .map_err(|e| ArViewError::Bridge(format!("get_string: {e}")))
}

/// Run `f`, turning errors and panics into `false` for the Java side.
fn guarded(name: &str, f: impl FnOnce() -> Result<bool>) -> jboolean {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(true)) => JNI_TRUE,
        Ok(Ok(false)) => JNI_FALSE,
        Ok(Err(e)) => {
            error!(entry = name, error = %e, "JNI entry failed");
            JNI_FALSE
        }
        Err(_) => {
            error!(entry = name, "JNI entry panicked");
            JNI_FALSE
        }
    }
}

/// `static native boolean nativeInit(String configJson)`; empty text means defaults.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_arview_bridge_ARViewNative_nativeInit(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    config_json: JString<'_>,
) -> jboolean {
    guarded("nativeInit", || {
        let text = read_string(&mut env, &config_json)?;
        let config = if text.trim().is_empty() {
            BridgeConfig::default()
        } else {
            BridgeConfig::from_json_str(&text)?
        };
        if PLUGIN.get().is_some() {
            warn!("plugin already initialised; keeping the first instance");
            return Ok(true);
        }
        let _ = PLUGIN.set(PlatformPlugin::new(&config)?);
        Ok(true)
    })
}

/// `static native boolean nativeExecute(String action, String argsJson, Object callback)`.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_arview_bridge_ARViewNative_nativeExecute(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    action: JString<'_>,
    arguments: JString<'_>,
    callback: JObject<'_>,
) -> jboolean {
    guarded("nativeExecute", || {
        let plugin = plugin()?;
        let action = read_string(&mut env, &action)?;
        let arguments = read_string(&mut env, &arguments)?;
        let result = Arc::new(JavaResultHandle::new(&mut env, &callback)?);
        Ok(plugin.dispatch_json(&action, &arguments, result))
    })
}

/// `static native boolean nativeOnRequestPermissionsResult(int, String[], int[])`.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_arview_bridge_ARViewNative_nativeOnRequestPermissionsResult(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    request_code: jint,
    permissions: JObjectArray<'_>,
    grant_results: JIntArray<'_>,
) -> jboolean {
    guarded("nativeOnRequestPermissionsResult", || {
        let plugin = plugin()?;
        let response =
            permission_response_from_java(&mut env, request_code, &permissions, &grant_results)?;
        Ok(plugin.on_permission_result(response))
    })
}

/// `static native void nativeOnDestroy()`.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_arview_bridge_ARViewNative_nativeOnDestroy(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
) {
    guarded("nativeOnDestroy", || {
        plugin()?.on_context_disposed();
        Ok(true)
    });
}
