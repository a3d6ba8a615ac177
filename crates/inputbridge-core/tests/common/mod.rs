#![allow(dead_code)]

use std::cell::RefCell;
use std::ffi::{c_int, c_uint, c_void};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use inputbridge_core::callbacks::{
    CharFn, CharModsFn, CursorEnterFn, CursorPosFn, FramebufferSizeFn, KeyFn, MouseButtonFn,
    ScrollFn, WindowSizeFn,
};
use inputbridge_core::{
    BridgeConfig, BridgeError, BridgeResult, ClipboardStore, DispatchMode, EventKind,
    ExecutionContext, GlfwCallback, InputBridge, InputEvent, InputReceiver, ManagedRuntime,
    RuntimeSide, WirePacket,
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/* =============================================================================================
   Direct-mode callbacks, recording into a per-thread log
   ============================================================================================= */

thread_local! {
    static DIRECT: RefCell<Vec<(usize, InputEvent)>> = const { RefCell::new(Vec::new()) };
}

fn record(window: *mut c_void, ev: InputEvent) {
    DIRECT.with(|d| d.borrow_mut().push((window as usize, ev)));
}

pub fn take_direct() -> Vec<InputEvent> {
    DIRECT.with(|d| d.borrow_mut().drain(..).map(|(_, ev)| ev).collect())
}

pub fn take_direct_with_window() -> Vec<(usize, InputEvent)> {
    DIRECT.with(|d| d.borrow_mut().drain(..).collect())
}

unsafe extern "C" fn on_char(w: *mut c_void, codepoint: c_uint) {
    record(w, InputEvent::Char { codepoint });
}

unsafe extern "C" fn on_char_mods(w: *mut c_void, codepoint: c_uint, mods: c_int) {
    record(w, InputEvent::CharMods { codepoint, mods });
}

unsafe extern "C" fn on_cursor_enter(w: *mut c_void, entered: c_int) {
    record(w, InputEvent::CursorEnter { entered: entered != 0 });
}

unsafe extern "C" fn on_cursor_pos(w: *mut c_void, x: f64, y: f64) {
    record(
        w,
        InputEvent::CursorPos {
            x: x as i32,
            y: y as i32,
        },
    );
}

unsafe extern "C" fn on_framebuffer_size(w: *mut c_void, width: c_int, height: c_int) {
    record(w, InputEvent::FramebufferSize { width, height });
}

unsafe extern "C" fn on_key(
    w: *mut c_void,
    key: c_int,
    scancode: c_int,
    action: c_int,
    mods: c_int,
) {
    record(
        w,
        InputEvent::Key {
            key,
            scancode,
            action,
            mods,
        },
    );
}

unsafe extern "C" fn on_mouse_button(w: *mut c_void, button: c_int, action: c_int, mods: c_int) {
    record(
        w,
        InputEvent::MouseButton {
            button,
            action,
            mods,
        },
    );
}

unsafe extern "C" fn on_scroll(w: *mut c_void, xoffset: f64, yoffset: f64) {
    record(w, InputEvent::Scroll { xoffset, yoffset });
}

unsafe extern "C" fn on_window_size(w: *mut c_void, width: c_int, height: c_int) {
    record(w, InputEvent::WindowSize { width, height });
}

pub fn recording_callback(kind: EventKind) -> GlfwCallback {
    match kind {
        EventKind::Char => GlfwCallback::Char(on_char as CharFn),
        EventKind::CharMods => GlfwCallback::CharMods(on_char_mods as CharModsFn),
        EventKind::CursorEnter => GlfwCallback::CursorEnter(on_cursor_enter as CursorEnterFn),
        EventKind::CursorPos => GlfwCallback::CursorPos(on_cursor_pos as CursorPosFn),
        EventKind::FramebufferSize => {
            GlfwCallback::FramebufferSize(on_framebuffer_size as FramebufferSizeFn)
        }
        EventKind::Key => GlfwCallback::Key(on_key as KeyFn),
        EventKind::MouseButton => GlfwCallback::MouseButton(on_mouse_button as MouseButtonFn),
        EventKind::Scroll => GlfwCallback::Scroll(on_scroll as ScrollFn),
        EventKind::WindowSize => GlfwCallback::WindowSize(on_window_size as WindowSizeFn),
    }
}

pub fn register(bridge: &InputBridge, kinds: &[EventKind]) {
    for &k in kinds {
        bridge.callbacks().install(recording_callback(k));
    }
}

pub fn register_all(bridge: &InputBridge) {
    register(bridge, &EventKind::ALL);
}

/* =============================================================================================
   Queued-mode doubles
   ============================================================================================= */

#[derive(Default)]
pub struct FakeRuntime {
    pub attaches: AtomicUsize,
}

impl FakeRuntime {
    pub fn attaches(&self) -> usize {
        self.attaches.load(Ordering::SeqCst)
    }
}

impl ManagedRuntime for FakeRuntime {
    fn attach_current_thread(&self) -> BridgeResult<()> {
        self.attaches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingReceiver {
    packets: Mutex<Vec<WirePacket>>,
    prepared: AtomicUsize,
    unresolved: bool,
}

fn unresolved_receiver() -> BridgeError {
    BridgeError::Unresolved {
        class: "org/lwjgl/glfw/CallbackBridge".into(),
        method: "receiveCallback".into(),
        signature: "(IIIII)V".into(),
    }
}

impl RecordingReceiver {
    /// A receiver whose endpoint is missing from the embedded build.
    pub fn unresolved() -> Self {
        Self {
            unresolved: true,
            ..Self::default()
        }
    }

    pub fn prepared(&self) -> usize {
        self.prepared.load(Ordering::SeqCst)
    }

    pub fn packets(&self) -> Vec<WirePacket> {
        self.packets.lock().clone()
    }

    pub fn decoded(&self) -> Vec<InputEvent> {
        self.packets.lock().iter().filter_map(|p| p.decode()).collect()
    }

    pub fn clear(&self) {
        self.packets.lock().clear();
    }
}

impl InputReceiver for RecordingReceiver {
    fn prepare(&self, ctx: &ExecutionContext) -> BridgeResult<()> {
        assert_eq!(ctx.side(), RuntimeSide::Embedded);
        assert_eq!(ctx.thread(), std::thread::current().id());
        self.prepared.fetch_add(1, Ordering::SeqCst);
        if self.unresolved {
            return Err(unresolved_receiver());
        }
        Ok(())
    }

    fn receive(&self, ctx: &ExecutionContext, packet: WirePacket) -> BridgeResult<()> {
        assert_eq!(ctx.side(), RuntimeSide::Embedded);
        if self.unresolved {
            return Err(unresolved_receiver());
        }
        self.packets.lock().push(packet);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeClipboard {
    pub calls: Mutex<Vec<(RuntimeSide, i32, Option<String>)>>,
    pub unresolved: bool,
}

impl ClipboardStore for FakeClipboard {
    fn access(
        &self,
        ctx: &ExecutionContext,
        action: i32,
        text: Option<&str>,
    ) -> BridgeResult<Option<String>> {
        if self.unresolved {
            return Err(BridgeError::Unresolved {
                class: "org/lwjgl/glfw/CallbackBridge".into(),
                method: "accessAndroidClipboard".into(),
                signature: "(ILjava/lang/String;)Ljava/lang/String;".into(),
            });
        }
        self.calls
            .lock()
            .push((ctx.side(), action, text.map(str::to_owned)));
        Ok(Some(format!("host:{}", text.unwrap_or(""))))
    }
}

/* =============================================================================================
   Fixtures
   ============================================================================================= */

pub fn direct_bridge() -> InputBridge {
    init_logger();
    let bridge = InputBridge::new(BridgeConfig {
        dispatch: DispatchMode::Direct,
        ..BridgeConfig::default()
    });
    take_direct();
    bridge
}

pub struct QueuedFixture {
    pub bridge: InputBridge,
    pub embedded: Arc<FakeRuntime>,
    pub receiver: Arc<RecordingReceiver>,
}

pub fn queued_bridge() -> QueuedFixture {
    init_logger();
    let bridge = InputBridge::new(BridgeConfig::default());
    let embedded = Arc::new(FakeRuntime::default());
    let receiver = Arc::new(RecordingReceiver::default());
    bridge.install_runtime(RuntimeSide::Embedded, embedded.clone());
    bridge.install_receiver(receiver.clone());
    QueuedFixture {
        bridge,
        embedded,
        receiver,
    }
}
