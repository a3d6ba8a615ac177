//! `jni`-backed implementations of the core runtime seams.

use jni::errors::Error as JniError;
use jni::objects::{GlobalRef, JClass, JObject, JString, JValue, JValueOwned};
use jni::signature::{Primitive, ReturnType};
use jni::sys::jvalue;
use jni::{JNIEnv, JavaVM};
use std::sync::{Arc, OnceLock};

use inputbridge_core::{
    BridgeError, BridgeResult, ClipboardStore, ExecutionContext, InputReceiver, ManagedRuntime,
    RuntimeSide, WirePacket,
};

/// Describes and clears a pending Java exception so it never leaks into the caller's VM.
pub(crate) fn map_jni_error(env: &mut JNIEnv<'_>, err: JniError) -> BridgeError {
    if matches!(err, JniError::JavaException) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
    BridgeError::Runtime(err.to_string())
}

/* =============================================================================================
   Runtime handle
   ============================================================================================= */

pub struct JavaRuntime {
    side: RuntimeSide,
    vm: JavaVM,
}

impl JavaRuntime {
    pub fn new(side: RuntimeSide, vm: JavaVM) -> Arc<Self> {
        Arc::new(Self { side, vm })
    }

    #[inline]
    pub fn side(&self) -> RuntimeSide {
        self.side
    }

    /// Env of the current thread, attaching it permanently on first use.
    pub(crate) fn env(&self) -> BridgeResult<JNIEnv<'_>> {
        self.vm
            .attach_current_thread_permanently()
            .map_err(|e| BridgeError::Runtime(format!("attach to {} vm: {e}", self.side)))
    }

    /// Env for a context handed out by the attachment manager. The context must belong to this
    /// runtime and to the calling thread.
    pub(crate) fn env_for(&self, ctx: &ExecutionContext) -> BridgeResult<JNIEnv<'_>> {
        if ctx.side() != self.side || ctx.thread() != std::thread::current().id() {
            return Err(BridgeError::NotAttached(self.side));
        }
        self.env()
    }
}

impl ManagedRuntime for JavaRuntime {
    fn attach_current_thread(&self) -> BridgeResult<()> {
        self.env().map(|_| ())
    }
}

/* =============================================================================================
   Static method handles
   ============================================================================================= */

/// A resolved `static` method, pinned by a global class reference.
#[derive(Clone)]
pub struct StaticMethod {
    class: GlobalRef,
    id: jni::objects::JStaticMethodID,
}

impl StaticMethod {
    pub(crate) fn resolve(
        env: &mut JNIEnv<'_>,
        class: &str,
        method: &str,
        signature: &str,
    ) -> BridgeResult<Self> {
        let unresolved = || BridgeError::Unresolved {
            class: class.to_string(),
            method: method.to_string(),
            signature: signature.to_string(),
        };

        let local = match env.find_class(class) {
            Ok(c) => c,
            Err(e) => {
                map_jni_error(env, e);
                return Err(unresolved());
            }
        };
        let id = match env.get_static_method_id(&local, method, signature) {
            Ok(id) => id,
            Err(e) => {
                map_jni_error(env, e);
                return Err(unresolved());
            }
        };
        let class_ref = env.new_global_ref(&local).map_err(|e| map_jni_error(env, e))?;
        let _ = env.delete_local_ref(local);

        log::debug!(target: "inputbridge::jni", "resolved {}.{}{}", class, method, signature);
        Ok(Self {
            class: class_ref,
            id,
        })
    }

    fn call<'local>(
        &self,
        env: &mut JNIEnv<'local>,
        ret: ReturnType,
        args: &[jvalue],
    ) -> BridgeResult<JValueOwned<'local>> {
        let class = <&JClass>::from(self.class.as_obj());
        // SAFETY: `id` was resolved on `class` with the descriptor the callers build `args` for.
        unsafe { env.call_static_method_unchecked(class, self.id, ret, args) }
            .map_err(|e| map_jni_error(env, e))
    }

    pub(crate) fn call_void(&self, env: &mut JNIEnv<'_>, args: &[jvalue]) -> BridgeResult<()> {
        self.call(env, ReturnType::Primitive(Primitive::Void), args)
            .map(|_| ())
    }

    pub(crate) fn call_object<'local>(
        &self,
        env: &mut JNIEnv<'local>,
        args: &[jvalue],
    ) -> BridgeResult<JObject<'local>> {
        self.call(env, ReturnType::Object, args)?
            .l()
            .map_err(|e| map_jni_error(env, e))
    }
}

/// Resolve-once cell. Concurrent first uses may both resolve; the first stored value wins.
pub(crate) fn resolved<'a>(
    cell: &'a OnceLock<StaticMethod>,
    resolve: impl FnOnce() -> BridgeResult<StaticMethod>,
) -> BridgeResult<&'a StaticMethod> {
    if let Some(m) = cell.get() {
        return Ok(m);
    }
    let m = resolve()?;
    Ok(cell.get_or_init(|| m))
}

/* =============================================================================================
   Queued receiver (embedded runtime)
   ============================================================================================= */

/// Calls `receiveCallback(IIIII)V` on the embedded runtime's bridge class.
pub struct JavaInputReceiver {
    runtime: Arc<JavaRuntime>,
    class: String,
    method: String,
    target: OnceLock<StaticMethod>,
}

impl JavaInputReceiver {
    pub const SIGNATURE: &'static str = "(IIIII)V";

    pub fn new(runtime: Arc<JavaRuntime>, class: String, method: String) -> Self {
        Self {
            runtime,
            class,
            method,
            target: OnceLock::new(),
        }
    }

    fn target(&self, env: &mut JNIEnv<'_>) -> BridgeResult<&StaticMethod> {
        resolved(&self.target, || {
            StaticMethod::resolve(env, &self.class, &self.method, Self::SIGNATURE)
        })
    }
}

impl InputReceiver for JavaInputReceiver {
    fn prepare(&self, ctx: &ExecutionContext) -> BridgeResult<()> {
        let mut env = self.runtime.env_for(ctx)?;
        self.target(&mut env).map(|_| ())
    }

    fn receive(&self, ctx: &ExecutionContext, packet: WirePacket) -> BridgeResult<()> {
        let mut env = self.runtime.env_for(ctx)?;
        let target = self.target(&mut env)?;

        let [a, b, c, d] = packet.args;
        let args = [
            JValue::Int(packet.kind).as_jni(),
            JValue::Int(a).as_jni(),
            JValue::Int(b).as_jni(),
            JValue::Int(c).as_jni(),
            JValue::Int(d).as_jni(),
        ];
        target.call_void(&mut env, &args)
    }
}

/* =============================================================================================
   Clipboard (host runtime)
   ============================================================================================= */

/// Host-side `accessAndroidClipboard(ILjava/lang/String;)Ljava/lang/String;`.
///
/// Strings are copied out of one VM and re-created in the other; references never cross VMs.
pub struct JavaClipboard {
    runtime: Arc<JavaRuntime>,
    class: String,
    method: String,
    target: OnceLock<StaticMethod>,
}

impl JavaClipboard {
    pub const SIGNATURE: &'static str = "(ILjava/lang/String;)Ljava/lang/String;";

    pub fn new(runtime: Arc<JavaRuntime>, class: String, method: String) -> Self {
        Self {
            runtime,
            class,
            method,
            target: OnceLock::new(),
        }
    }
}

impl ClipboardStore for JavaClipboard {
    fn access(
        &self,
        ctx: &ExecutionContext,
        action: i32,
        text: Option<&str>,
    ) -> BridgeResult<Option<String>> {
        let mut env = self.runtime.env_for(ctx)?;
        let target = resolved(&self.target, || {
            StaticMethod::resolve(&mut env, &self.class, &self.method, Self::SIGNATURE)
        })?;

        let arg = match text {
            Some(t) => JObject::from(env.new_string(t).map_err(|e| map_jni_error(&mut env, e))?),
            None => JObject::null(),
        };
        let out = target.call_object(
            &mut env,
            &[JValue::Int(action).as_jni(), JValue::Object(&arg).as_jni()],
        );
        if !arg.is_null() {
            let _ = env.delete_local_ref(arg);
        }

        let out = out?;
        if out.is_null() {
            return Ok(None);
        }
        let out = JString::from(out);
        let copied: String = env
            .get_string(&out)
            .map_err(|e| map_jni_error(&mut env, e))?
            .into();
        let _ = env.delete_local_ref(out);
        Ok(Some(copied))
    }
}
