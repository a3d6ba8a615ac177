#![forbid(unsafe_op_in_unsafe_fn)]

//! Native side of the LWJGL `CallbackBridge`.
//!
//! The library is loaded by the embedded runtime (`JNI_OnLoad` receives its VM). The launcher
//! installs the host VM afterwards through [`inputbridge_install_host_vm`]. All state lives in a
//! single [`Natives`] instance; the exported symbols are thin shims over it.

pub mod exports;
pub mod logging;
pub mod runtime;
pub mod ui;

use jni::sys::{jint, JNI_VERSION_1_4};
use jni::JavaVM;
use std::ffi::c_void;
use std::sync::{Arc, OnceLock};

use inputbridge_core::{BridgeConfig, InputBridge, RuntimeSide, UiRelay};

use crate::runtime::{JavaClipboard, JavaInputReceiver, JavaRuntime};
use crate::ui::JavaUiTarget;

/// Environment variable naming an optional TOML config file.
pub const CONFIG_ENV: &str = "INPUTBRIDGE_CONFIG";

pub struct Natives {
    pub bridge: InputBridge,
    pub relay: UiRelay<JavaUiTarget>,
}

impl Natives {
    pub fn new(config: BridgeConfig) -> Self {
        let relay = UiRelay::new(JavaUiTarget::new(
            config.ui_class.clone(),
            config.ui_methods.clone(),
        ));
        Self {
            bridge: InputBridge::new(config),
            relay,
        }
    }

    /// Wires the embedded VM: thread attachment plus the queued-dispatch receiver.
    pub fn install_embedded_vm(&self, vm: JavaVM) {
        let cfg = self.bridge.config();
        let runtime = JavaRuntime::new(RuntimeSide::Embedded, vm);
        self.bridge.install_runtime(RuntimeSide::Embedded, runtime.clone());
        self.bridge.install_receiver(Arc::new(JavaInputReceiver::new(
            runtime,
            cfg.receiver_class.clone(),
            cfg.receiver_method.clone(),
        )));
    }

    /// Wires the host VM: thread attachment, clipboard storage and the UI relay target.
    pub fn install_host_vm(&self, vm: JavaVM) {
        let cfg = self.bridge.config();
        let runtime = JavaRuntime::new(RuntimeSide::Host, vm);
        self.bridge.install_runtime(RuntimeSide::Host, runtime.clone());
        self.bridge.install_clipboard(Arc::new(JavaClipboard::new(
            runtime.clone(),
            cfg.receiver_class.clone(),
            cfg.clipboard_method.clone(),
        )));
        self.relay.target().set_host(runtime);
    }
}

static NATIVES: OnceLock<Natives> = OnceLock::new();

fn load_config() -> BridgeConfig {
    let Ok(path) = std::env::var(CONFIG_ENV) else {
        return BridgeConfig::default();
    };
    match BridgeConfig::load_or_default(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::warn!(target: "inputbridge::jni", "{e}; using defaults");
            BridgeConfig::default()
        }
    }
}

/// The process-wide bridge, created with the configured settings on first use.
pub fn natives() -> &'static Natives {
    NATIVES.get_or_init(|| Natives::new(load_config()))
}

#[no_mangle]
pub extern "system" fn JNI_OnLoad(vm: JavaVM, _reserved: *mut c_void) -> jint {
    let n = natives();
    logging::init(n.bridge.config().level_filter());
    log::info!(
        target: "inputbridge::jni",
        "loaded vm={:p} dispatch={:?}",
        vm.get_java_vm_pointer(),
        n.bridge.dispatch_mode()
    );

    n.install_embedded_vm(vm);
    JNI_VERSION_1_4
}

/// Teardown is not supported; threads stay attached for the life of the process.
#[no_mangle]
pub extern "system" fn JNI_OnUnload(vm: JavaVM, _reserved: *mut c_void) {
    log::info!(target: "inputbridge::jni", "unload vm={:p}", vm.get_java_vm_pointer());
}

/// Installs the host VM once it exists. Returns `false` for a null pointer.
///
/// # Safety
/// `vm` must be null or a valid `JavaVM*` that outlives the process.
#[no_mangle]
pub unsafe extern "C" fn inputbridge_install_host_vm(vm: *mut jni::sys::JavaVM) -> bool {
    // SAFETY: upheld by the caller.
    match unsafe { JavaVM::from_raw(vm) } {
        Ok(vm) => {
            natives().install_host_vm(vm);
            true
        }
        Err(e) => {
            log::error!(target: "inputbridge::jni", "install host vm: {e}");
            false
        }
    }
}
