//! Exported symbols. Each one is a shim over [`crate::natives`].

use jni::objects::{JClass, JString};
use jni::sys::{jboolean, jchar, jdouble, jfloat, jint, jlong, jstring, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;
use std::ffi::c_int;

use inputbridge_core::{EventKind, RuntimeSide, WindowTarget};

use crate::natives;

#[inline]
fn to_jboolean(v: bool) -> jboolean {
    if v {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

#[inline]
fn from_jboolean(v: jboolean) -> bool {
    v != JNI_FALSE
}

/// Replaces the registered slot and hands back the previous pointer for chaining.
fn set_callback(kind: EventKind, callback: jlong) -> jlong {
    // SAFETY: the embedded runtime only registers GLFW callback pointers of the matching shape.
    let prev = unsafe { natives().bridge.set_callback_raw(kind, callback as usize) };
    log::debug!(
        target: "inputbridge::jni",
        "callback.set kind={} new={:#x} prev={:#x}",
        kind.name(),
        callback,
        prev
    );
    prev as jlong
}

/* =============================================================================================
   org.lwjgl.glfw.GLFW
   ============================================================================================= */

macro_rules! glfw_set_callback {
    ($($sym:ident => $kind:ident),* $(,)?) => {
        $(
            #[no_mangle]
            pub extern "system" fn $sym(
                _env: JNIEnv<'_>,
                _class: JClass<'_>,
                _window: jlong,
                callback: jlong,
            ) -> jlong {
                set_callback(EventKind::$kind, callback)
            }
        )*
    };
}

glfw_set_callback! {
    Java_org_lwjgl_glfw_GLFW_nglfwSetCharCallback => Char,
    Java_org_lwjgl_glfw_GLFW_nglfwSetCharModsCallback => CharMods,
    Java_org_lwjgl_glfw_GLFW_nglfwSetCursorEnterCallback => CursorEnter,
    Java_org_lwjgl_glfw_GLFW_nglfwSetCursorPosCallback => CursorPos,
    Java_org_lwjgl_glfw_GLFW_nglfwSetFramebufferSizeCallback => FramebufferSize,
    Java_org_lwjgl_glfw_GLFW_nglfwSetKeyCallback => Key,
    Java_org_lwjgl_glfw_GLFW_nglfwSetMouseButtonCallback => MouseButton,
    Java_org_lwjgl_glfw_GLFW_nglfwSetScrollCallback => Scroll,
    Java_org_lwjgl_glfw_GLFW_nglfwSetWindowSizeCallback => WindowSize,
}

#[no_mangle]
pub extern "system" fn Java_org_lwjgl_glfw_GLFW_nglfwSetShowingWindow(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
    window: jlong,
) {
    natives().bridge.set_window_target(WindowTarget(window as usize));
}

/* =============================================================================================
   org.lwjgl.glfw.CallbackBridge
   ============================================================================================= */

#[no_mangle]
pub extern "system" fn Java_org_lwjgl_glfw_CallbackBridge_nativeAttachThreadToOther(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
    is_android: jboolean,
    use_queue: jboolean,
) -> jboolean {
    let caller = if from_jboolean(is_android) {
        RuntimeSide::Host
    } else {
        RuntimeSide::Embedded
    };
    to_jboolean(natives().bridge.attach(caller, from_jboolean(use_queue)))
}

#[no_mangle]
pub extern "system" fn Java_org_lwjgl_glfw_CallbackBridge_nativeClipboard<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    action: jint,
    copy: JString<'local>,
) -> jstring {
    let text: Option<String> = if copy.is_null() {
        None
    } else {
        match env.get_string(&copy) {
            Ok(s) => Some(s.into()),
            Err(e) => {
                log::warn!(target: "inputbridge::jni", "clipboard: read argument: {e}");
                None
            }
        }
    };

    let Some(out) = natives().bridge.clipboard_access(action, text.as_deref()) else {
        return std::ptr::null_mut();
    };
    match env.new_string(out) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            log::warn!(target: "inputbridge::jni", "clipboard: build result: {e}");
            std::ptr::null_mut()
        }
    }
}

#[no_mangle]
pub extern "system" fn Java_org_lwjgl_glfw_CallbackBridge_nativeSetInputReady(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
    ready: jboolean,
) -> jboolean {
    to_jboolean(natives().bridge.set_input_ready(from_jboolean(ready)))
}

#[no_mangle]
pub extern "system" fn Java_org_lwjgl_glfw_CallbackBridge_nativeSetGrabbing(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
    grabbing: jboolean,
    x: jint,
    y: jint,
) {
    natives().bridge.set_grabbing(from_jboolean(grabbing), x, y);
}

#[no_mangle]
pub extern "system" fn Java_org_lwjgl_glfw_CallbackBridge_nativeIsGrabbing(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
) -> jboolean {
    to_jboolean(natives().bridge.is_grabbing())
}

#[no_mangle]
pub extern "system" fn Java_org_lwjgl_glfw_CallbackBridge_nativeSendChar(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
    codepoint: jchar,
) -> jboolean {
    to_jboolean(natives().bridge.send_char(u32::from(codepoint)).is_consumed())
}

#[no_mangle]
pub extern "system" fn Java_org_lwjgl_glfw_CallbackBridge_nativeSendCharMods(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
    codepoint: jchar,
    mods: jint,
) -> jboolean {
    to_jboolean(
        natives()
            .bridge
            .send_char_mods(u32::from(codepoint), mods)
            .is_consumed(),
    )
}

#[no_mangle]
pub extern "system" fn Java_org_lwjgl_glfw_CallbackBridge_nativeSendCursorPos(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
    x: jint,
    y: jint,
) {
    natives().bridge.send_cursor_pos(x, y);
}

#[no_mangle]
pub extern "system" fn Java_org_lwjgl_glfw_CallbackBridge_nativeSendKey(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
    key: jint,
    scancode: jint,
    action: jint,
    mods: jint,
) {
    natives().bridge.send_key(key, scancode, action, mods);
}

#[no_mangle]
pub extern "system" fn Java_org_lwjgl_glfw_CallbackBridge_nativeSendKeycode(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
    keycode: jint,
    keychar: jchar,
    scancode: jint,
    action: jint,
    mods: jint,
) {
    natives()
        .bridge
        .send_keycode(keycode, u32::from(keychar), scancode, action, mods);
}

#[no_mangle]
pub extern "system" fn Java_org_lwjgl_glfw_CallbackBridge_nativeSendMouseButton(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
    button: jint,
    action: jint,
    mods: jint,
) {
    natives().bridge.send_mouse_button(button, action, mods);
}

#[no_mangle]
pub extern "system" fn Java_org_lwjgl_glfw_CallbackBridge_nativeSendScreenSize(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
    width: jint,
    height: jint,
) {
    natives().bridge.send_screen_size(width, height);
}

#[no_mangle]
pub extern "system" fn Java_org_lwjgl_glfw_CallbackBridge_nativeSendScroll(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
    xoffset: jdouble,
    yoffset: jdouble,
) {
    natives().bridge.send_scroll(xoffset, yoffset);
}

/* =============================================================================================
   net.kdt.pojavlaunch.uikit.UIKit (embedded side -> host UI)
   ============================================================================================= */

#[no_mangle]
pub extern "system" fn Java_net_kdt_pojavlaunch_uikit_UIKit_updateProgress<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    progress: jfloat,
    message: JString<'local>,
) {
    // Copied out of the embedded VM; the host side builds its own string.
    let message: String = if message.is_null() {
        String::new()
    } else {
        match env.get_string(&message) {
            Ok(s) => s.into(),
            Err(e) => {
                log::warn!(target: "inputbridge::jni", "progress: read message: {e}");
                String::new()
            }
        }
    };
    natives().relay.report_progress(progress, &message);
}

#[no_mangle]
pub extern "system" fn Java_net_kdt_pojavlaunch_uikit_UIKit_launchMinecraftSurface(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
) {
    let n = natives();
    let (width, height) = n.bridge.screen_size();
    n.relay.notify_launch_surface(width, height);
}

/* =============================================================================================
   C ABI for the host launcher
   ============================================================================================= */

#[no_mangle]
pub extern "C" fn inputbridge_notify_install_requested() {
    natives().relay.notify_install_requested();
}

#[no_mangle]
pub extern "C" fn inputbridge_notify_launch_surface(width: c_int, height: c_int) {
    natives().relay.notify_launch_surface(width, height);
}

#[no_mangle]
pub extern "C" fn inputbridge_notify_touch(event: c_int, x: c_int, y: c_int) {
    natives().relay.notify_touch(event, x, y);
}
