//! Dispatch selector and the bridge context object.
//!
//! Every injected event goes through the same gate:
//! 1. input not ready -> dropped,
//! 2. no callback registered for the kind -> dropped,
//! 3. `Direct`: the registered callback runs on the calling thread,
//!    `Queued`: the event is encoded into a [`WirePacket`] and handed synchronously to the
//!    embedded runtime's receiver.
//!
//! Drops are logged, never returned as errors.

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::attach::{AttachmentManager, ExecutionContext, ManagedRuntime, RuntimeSide};
use crate::callbacks::{CallbackRegistry, GlfwCallback, WindowTarget};
use crate::clipboard::ClipboardStore;
use crate::config::BridgeConfig;
use crate::error::{fatal, BridgeError, BridgeResult};
use crate::event::{EventKind, InputEvent, WirePacket};
use crate::grab::GrabState;

/// Mouse button value that only means "resync the grab baseline".
pub const RESYNC_BUTTON: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Synchronous call into the embedded runtime's receiver. Blocks until it returns.
    Queued,
    /// Registered callback pointer invoked in-process.
    Direct,
}

/// Outcome of a single injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Input gate closed, or the queued path could not reach the receiver.
    NotReady,
    /// Nobody registered for this kind.
    NotConsumed,
    Consumed,
}

impl Delivery {
    #[inline]
    pub fn is_consumed(self) -> bool {
        self == Delivery::Consumed
    }
}

/// Receiving end of queued dispatch inside the embedded runtime.
pub trait InputReceiver: Send + Sync {
    /// Resolves the receiving endpoint ahead of the first event. Called on queued attach.
    fn prepare(&self, ctx: &ExecutionContext) -> BridgeResult<()> {
        let _ = ctx;
        Ok(())
    }

    fn receive(&self, ctx: &ExecutionContext, packet: WirePacket) -> BridgeResult<()>;
}

#[derive(Debug, Default)]
struct CursorState {
    grab: GrabState,
    entered: bool,
}

/// All bridge state, owned in one place.
///
/// Setup-time writers (callback registration, window target, runtime handles) and the steady
/// state UI-thread writer (injection) never need to hold a lock across a foreign call.
pub struct InputBridge {
    config: BridgeConfig,
    callbacks: CallbackRegistry,
    attachments: AttachmentManager,
    receiver: RwLock<Option<Arc<dyn InputReceiver>>>,
    clipboard: RwLock<Option<Arc<dyn ClipboardStore>>>,

    queued: AtomicBool,
    input_ready: AtomicBool,
    window: AtomicUsize,

    cursor: Mutex<CursorState>,
    screen: Mutex<(i32, i32)>,
}

impl Default for InputBridge {
    fn default() -> Self {
        Self::new(BridgeConfig::default())
    }
}

impl InputBridge {
    pub fn new(config: BridgeConfig) -> Self {
        let queued = config.dispatch == DispatchMode::Queued;
        Self {
            config,
            callbacks: CallbackRegistry::new(),
            attachments: AttachmentManager::new(),
            receiver: RwLock::new(None),
            clipboard: RwLock::new(None),
            queued: AtomicBool::new(queued),
            input_ready: AtomicBool::new(false),
            window: AtomicUsize::new(0),
            cursor: Mutex::new(CursorState::default()),
            screen: Mutex::new((0, 0)),
        }
    }

    #[inline]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    #[inline]
    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    #[inline]
    pub fn attachments(&self) -> &AttachmentManager {
        &self.attachments
    }

    /* -----------------------------------------------------------------------------------------
       Setup
       ----------------------------------------------------------------------------------------- */

    pub fn install_runtime(&self, side: RuntimeSide, runtime: Arc<dyn ManagedRuntime>) {
        self.attachments.install(side, runtime);
    }

    pub fn install_receiver(&self, receiver: Arc<dyn InputReceiver>) {
        *self.receiver.write() = Some(receiver);
    }

    pub fn install_clipboard(&self, store: Arc<dyn ClipboardStore>) {
        *self.clipboard.write() = Some(store);
    }

    /// Raw callback registration, replace-and-return.
    ///
    /// # Safety
    /// See [`GlfwCallback::from_raw`].
    pub unsafe fn set_callback_raw(&self, kind: EventKind, addr: usize) -> usize {
        // SAFETY: forwarded to the caller.
        unsafe { self.callbacks.replace_raw(kind, addr) }
    }

    /// Sets the window passed to direct callbacks.
    ///
    /// The embedded side may report a new window when it recreates its context, so a later
    /// handle replaces the earlier one. Replacement is logged at warn.
    pub fn set_window_target(&self, window: WindowTarget) {
        let prev = self.window.swap(window.0, Ordering::AcqRel);
        if prev != 0 && prev != window.0 {
            log::warn!(
                target: "inputbridge::dispatch",
                "window.set replaced {:#x} with {:#x}",
                prev,
                window.0
            );
        } else {
            log::debug!(target: "inputbridge::dispatch", "window.set {:#x}", window.0);
        }
    }

    #[inline]
    pub fn window_target(&self) -> WindowTarget {
        WindowTarget(self.window.load(Ordering::Acquire))
    }

    /* -----------------------------------------------------------------------------------------
       Mode and readiness
       ----------------------------------------------------------------------------------------- */

    #[inline]
    pub fn dispatch_mode(&self) -> DispatchMode {
        if self.queued.load(Ordering::Acquire) {
            DispatchMode::Queued
        } else {
            DispatchMode::Direct
        }
    }

    #[inline]
    pub fn set_dispatch_mode(&self, mode: DispatchMode) {
        self.queued
            .store(mode == DispatchMode::Queued, Ordering::Release);
    }

    /// Attaches the caller's thread to the other runtime and records the dispatch mode.
    ///
    /// A queued attach from the host side resolves the embedded receiver and re-arms the grab
    /// resync.
    pub fn attach(&self, caller: RuntimeSide, use_queued: bool) -> bool {
        let mode = if use_queued {
            DispatchMode::Queued
        } else {
            DispatchMode::Direct
        };
        self.set_dispatch_mode(mode);

        let target = caller.other();
        let ctx = match self.attachments.attach(target, mode) {
            Ok(ctx) => ctx,
            Err(e) => {
                log::debug!(
                    target: "inputbridge::attach",
                    "attach.skip caller={} target={}: {}",
                    caller,
                    target,
                    e
                );
                return false;
            }
        };

        if use_queued && caller == RuntimeSide::Host {
            self.prepare_receiver(&ctx);
            self.cursor.lock().grab.request_resync();
        }
        true
    }

    /// A receiver endpoint missing from the embedded build is fatal here, before any input flows.
    fn prepare_receiver(&self, ctx: &ExecutionContext) {
        let Some(receiver) = self.receiver.read().clone() else {
            log::debug!(target: "inputbridge::attach", "receiver.prepare skipped: none installed");
            return;
        };
        match receiver.prepare(ctx) {
            Ok(()) => log::debug!(target: "inputbridge::attach", "receiver.prepare ok"),
            Err(e @ BridgeError::Unresolved { .. }) => fatal(&e),
            Err(e) => log::warn!(target: "inputbridge::attach", "receiver.prepare failed: {}", e),
        }
    }

    /// Opens or closes the input gate. Returns whether queued dispatch is in effect.
    pub fn set_input_ready(&self, ready: bool) -> bool {
        self.input_ready.store(ready, Ordering::Release);
        if !ready {
            self.cursor.lock().entered = false;
        }
        let queued = self.dispatch_mode() == DispatchMode::Queued;
        log::debug!(
            target: "inputbridge::dispatch",
            "input.ready ready={} queued={}",
            ready,
            queued
        );
        queued
    }

    #[inline]
    pub fn is_input_ready(&self) -> bool {
        self.input_ready.load(Ordering::Acquire)
    }

    /* -----------------------------------------------------------------------------------------
       Grab
       ----------------------------------------------------------------------------------------- */

    pub fn set_grabbing(&self, grabbing: bool, seed_x: i32, seed_y: i32) {
        self.cursor.lock().grab.set_grabbing(grabbing, seed_x, seed_y);
    }

    #[inline]
    pub fn is_grabbing(&self) -> bool {
        self.cursor.lock().grab.is_grabbing()
    }

    /// Explicit "prepare grab position" signal.
    #[inline]
    pub fn request_resync(&self) {
        self.cursor.lock().grab.request_resync();
    }

    #[inline]
    pub fn grab_state(&self) -> GrabState {
        self.cursor.lock().grab
    }

    /* -----------------------------------------------------------------------------------------
       Injection
       ----------------------------------------------------------------------------------------- */

    pub fn send_char(&self, codepoint: u32) -> Delivery {
        self.forward(InputEvent::Char { codepoint })
    }

    pub fn send_char_mods(&self, codepoint: u32, mods: i32) -> Delivery {
        self.forward(InputEvent::CharMods { codepoint, mods })
    }

    pub fn send_cursor_pos(&self, x: i32, y: i32) {
        if !self.is_input_ready() {
            return;
        }
        let Some(pos_cb) = self.callbacks.get(EventKind::CursorPos) else {
            return;
        };
        let enter_cb = self.callbacks.get(EventKind::CursorEnter);

        let (enter, pos) = {
            let mut c = self.cursor.lock();
            let mut enter = false;
            if !c.entered {
                if enter_cb.is_some() {
                    c.entered = true;
                    enter = true;
                } else if c.grab.is_grabbing() {
                    // Consumers that never register CursorEnter only grab once the cursor is in.
                    c.entered = true;
                }
            }
            (enter, c.grab.track(x, y))
        };

        if let (true, Some(cb)) = (enter, enter_cb) {
            if self.deliver(cb, InputEvent::CursorEnter { entered: true }) == Delivery::NotReady {
                // Retried on the next position.
                self.cursor.lock().entered = false;
            }
        }
        if let Some((x, y)) = pos {
            self.deliver(pos_cb, InputEvent::CursorPos { x, y });
        }
    }

    pub fn send_key(&self, key: i32, scancode: i32, action: i32, mods: i32) {
        self.forward(InputEvent::Key {
            key,
            scancode,
            action,
            mods,
        });
    }

    /// Key, then CharMods, falling back to Char only when CharMods was not consumed.
    pub fn send_keycode(&self, keycode: i32, keychar: u32, scancode: i32, action: i32, mods: i32) {
        if !self.is_input_ready() {
            return;
        }
        self.send_key(keycode, scancode, action, mods);
        if !self.send_char_mods(keychar, mods).is_consumed() {
            self.send_char(keychar);
        }
    }

    pub fn send_mouse_button(&self, button: i32, action: i32, mods: i32) {
        if !self.is_input_ready() {
            return;
        }
        if button == RESYNC_BUTTON {
            self.request_resync();
            return;
        }
        self.forward(InputEvent::MouseButton {
            button,
            action,
            mods,
        });
    }

    /// Caches the size, then reports it as both framebuffer and window size.
    pub fn send_screen_size(&self, width: i32, height: i32) {
        *self.screen.lock() = (width, height);
        self.forward(InputEvent::FramebufferSize { width, height });
        self.forward(InputEvent::WindowSize { width, height });
    }

    #[inline]
    pub fn screen_size(&self) -> (i32, i32) {
        *self.screen.lock()
    }

    pub fn send_scroll(&self, xoffset: f64, yoffset: f64) {
        self.forward(InputEvent::Scroll { xoffset, yoffset });
    }

    /* -----------------------------------------------------------------------------------------
       Clipboard
       ----------------------------------------------------------------------------------------- */

    /// Forwards to host-side clipboard storage on the host runtime.
    pub fn clipboard_access(&self, action: i32, text: Option<&str>) -> Option<String> {
        let store = match self.clipboard.read().clone() {
            Some(s) => s,
            None => {
                log::warn!(target: "inputbridge::dispatch", "clipboard: no store installed");
                return None;
            }
        };

        let result = self
            .attachments
            .ensure(RuntimeSide::Host)
            .and_then(|ctx| store.access(&ctx, action, text));

        match result {
            Ok(v) => v,
            Err(e @ BridgeError::Unresolved { .. }) => fatal(&e),
            Err(e) => {
                log::warn!(
                    target: "inputbridge::dispatch",
                    "clipboard action={} failed: {}",
                    action,
                    e
                );
                None
            }
        }
    }

    /* -----------------------------------------------------------------------------------------
       Selector
       ----------------------------------------------------------------------------------------- */

    fn forward(&self, event: InputEvent) -> Delivery {
        let kind = event.kind();
        if !self.is_input_ready() {
            log::trace!(
                target: "inputbridge::dispatch",
                "drop kind={} reason=not_ready",
                kind.name()
            );
            return Delivery::NotReady;
        }
        let Some(cb) = self.callbacks.get(kind) else {
            log::trace!(
                target: "inputbridge::dispatch",
                "drop kind={} reason=no_consumer",
                kind.name()
            );
            return Delivery::NotConsumed;
        };
        self.deliver(cb, event)
    }

    fn deliver(&self, cb: GlfwCallback, event: InputEvent) -> Delivery {
        match self.dispatch_mode() {
            DispatchMode::Direct => {
                // SAFETY: registration contract of `set_callback_raw`.
                unsafe { cb.invoke(self.window_target(), &event) };
                Delivery::Consumed
            }
            DispatchMode::Queued => match self.send_queued(event.to_wire()) {
                Ok(()) => Delivery::Consumed,
                Err(e @ BridgeError::Unresolved { .. }) => fatal(&e),
                Err(e) => {
                    log::debug!(
                        target: "inputbridge::dispatch",
                        "drop kind={} reason={}",
                        event.kind().name(),
                        e
                    );
                    Delivery::NotReady
                }
            },
        }
    }

    fn send_queued(&self, packet: WirePacket) -> BridgeResult<()> {
        let ctx = self.attachments.ensure(RuntimeSide::Embedded)?;
        let receiver = self.receiver.read().clone().ok_or(BridgeError::NoReceiver)?;
        log::trace!(
            target: "inputbridge::dispatch",
            "queued kind={} args={:?}",
            packet.kind,
            packet.args
        );
        receiver.receive(&ctx, packet)
    }
}
