//! Runtime attachment manager.
//!
//! Two managed runtimes share the process: the host (UI-owning) one and the embedded one running
//! the game. Before calling into a runtime, the calling native thread has to be attached to it.
//! Attachments are cached per (runtime, thread) and never detached.

use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use crate::dispatch::DispatchMode;
use crate::error::{BridgeError, BridgeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeSide {
    Host,
    Embedded,
}

impl RuntimeSide {
    #[inline]
    pub const fn other(self) -> Self {
        match self {
            RuntimeSide::Host => RuntimeSide::Embedded,
            RuntimeSide::Embedded => RuntimeSide::Host,
        }
    }

    #[inline]
    const fn index(self) -> usize {
        match self {
            RuntimeSide::Host => 0,
            RuntimeSide::Embedded => 1,
        }
    }
}

impl fmt::Display for RuntimeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeSide::Host => f.write_str("host"),
            RuntimeSide::Embedded => f.write_str("embedded"),
        }
    }
}

/// A managed runtime the bridge can attach native threads to.
pub trait ManagedRuntime: Send + Sync {
    /// Attaches the calling thread. Calling it on an already attached thread must be harmless.
    fn attach_current_thread(&self) -> BridgeResult<()>;
}

/// Proof that the current thread may call into `side`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionContext {
    side: RuntimeSide,
    thread: ThreadId,
}

impl ExecutionContext {
    #[inline]
    pub fn side(&self) -> RuntimeSide {
        self.side
    }

    #[inline]
    pub fn thread(&self) -> ThreadId {
        self.thread
    }
}

pub struct AttachmentManager {
    runtimes: RwLock<[Option<Arc<dyn ManagedRuntime>>; 2]>,
    attached: Mutex<HashSet<(RuntimeSide, ThreadId)>>,
}

impl Default for AttachmentManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AttachmentManager {
    #[inline]
    pub fn new() -> Self {
        Self {
            runtimes: RwLock::new([None, None]),
            attached: Mutex::new(HashSet::new()),
        }
    }

    /// Records the runtime handle for `side`. Called once per side at load time.
    pub fn install(&self, side: RuntimeSide, runtime: Arc<dyn ManagedRuntime>) {
        let prev = self.runtimes.write()[side.index()].replace(runtime);
        if prev.is_some() {
            log::warn!(
                target: "inputbridge::attach",
                "runtime.install side={} replaced existing handle",
                side
            );
        } else {
            log::info!(target: "inputbridge::attach", "runtime.install side={}", side);
        }
    }

    #[inline]
    pub fn runtime(&self, side: RuntimeSide) -> Option<Arc<dyn ManagedRuntime>> {
        self.runtimes.read()[side.index()].clone()
    }

    /// Cached context of the current thread for `side`, if it attached earlier.
    pub fn context(&self, side: RuntimeSide) -> Option<ExecutionContext> {
        let thread = thread::current().id();
        self.attached
            .lock()
            .contains(&(side, thread))
            .then_some(ExecutionContext { side, thread })
    }

    /// Attaches the current thread to `target` when `mode` needs cross-runtime calls.
    ///
    /// Idempotent. In direct mode nothing is attached and the returned context is not cached.
    /// Fails with `RuntimeUnavailable` while the target handle is not installed yet; callers
    /// treat that as "not ready", not as fatal.
    pub fn attach(
        &self,
        target: RuntimeSide,
        mode: DispatchMode,
    ) -> BridgeResult<ExecutionContext> {
        if let Some(ctx) = self.context(target) {
            return Ok(ctx);
        }

        let thread = thread::current().id();
        let ctx = ExecutionContext {
            side: target,
            thread,
        };

        if mode == DispatchMode::Direct {
            return Ok(ctx);
        }

        let runtime = self
            .runtime(target)
            .ok_or(BridgeError::RuntimeUnavailable(target))?;
        runtime.attach_current_thread()?;

        self.attached.lock().insert((target, thread));
        log::info!(
            target: "inputbridge::attach",
            "thread.attach side={} thread={:?} name={}",
            target,
            thread,
            thread::current().name().unwrap_or("<unnamed>")
        );
        Ok(ctx)
    }

    /// Lazily attaches for a cross-runtime call, regardless of dispatch mode.
    #[inline]
    pub fn ensure(&self, target: RuntimeSide) -> BridgeResult<ExecutionContext> {
        self.attach(target, DispatchMode::Queued)
    }
}
