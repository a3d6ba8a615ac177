use jni::objects::{JObject, JValue};
use std::sync::{Arc, OnceLock};

use inputbridge_core::{
    BridgeError, BridgeResult, RuntimeSide, UiCall, UiMethod, UiMethodNames, UiTarget,
};

use crate::runtime::{map_jni_error, JavaRuntime, StaticMethod};

/// Static methods of the host UI class, called on the host runtime.
///
/// The host runtime is installed after load; resolving before that is a lifecycle bug.
pub struct JavaUiTarget {
    class: String,
    names: UiMethodNames,
    host: OnceLock<Arc<JavaRuntime>>,
}

impl JavaUiTarget {
    pub fn new(class: String, names: UiMethodNames) -> Self {
        Self {
            class,
            names,
            host: OnceLock::new(),
        }
    }

    pub fn set_host(&self, runtime: Arc<JavaRuntime>) {
        if self.host.set(runtime).is_err() {
            log::warn!(target: "inputbridge::relay", "ui target: host runtime already set");
        }
    }

    fn host(&self) -> BridgeResult<&Arc<JavaRuntime>> {
        self.host
            .get()
            .ok_or(BridgeError::RuntimeUnavailable(RuntimeSide::Host))
    }
}

impl UiTarget for JavaUiTarget {
    type Handle = StaticMethod;

    fn resolve(&self, method: UiMethod) -> BridgeResult<StaticMethod> {
        let mut env = self.host()?.env()?;
        StaticMethod::resolve(
            &mut env,
            &self.class,
            method.name(&self.names),
            method.signature(),
        )
    }

    fn call(&self, handle: &StaticMethod, call: &UiCall<'_>) -> BridgeResult<()> {
        let mut env = self.host()?.env()?;

        match *call {
            UiCall::InstallRequested => handle.call_void(&mut env, &[]),
            UiCall::LaunchSurface { width, height } => handle.call_void(
                &mut env,
                &[JValue::Int(width).as_jni(), JValue::Int(height).as_jni()],
            ),
            UiCall::Touch { event, x, y } => handle.call_void(
                &mut env,
                &[
                    JValue::Int(event).as_jni(),
                    JValue::Int(x).as_jni(),
                    JValue::Int(y).as_jni(),
                ],
            ),
            UiCall::Progress { progress, message } => {
                let msg = JObject::from(
                    env.new_string(message)
                        .map_err(|e| map_jni_error(&mut env, e))?,
                );
                let res = handle.call_void(
                    &mut env,
                    &[JValue::Float(progress).as_jni(), JValue::Object(&msg).as_jni()],
                );
                let _ = env.delete_local_ref(msg);
                res
            }
        }
    }
}
