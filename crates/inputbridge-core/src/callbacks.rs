//! GLFW-shaped callback slots.
//!
//! The consuming runtime registers raw native function pointers (one per event kind). They are
//! stored as typed [`GlfwCallback`] variants so the dispatcher can only ever call a pointer with
//! the signature its slot was registered for.

use parking_lot::RwLock;
use std::ffi::{c_int, c_uint, c_void};
use std::fmt;

use crate::event::{EventKind, InputEvent};

pub type CharFn = unsafe extern "C" fn(window: *mut c_void, codepoint: c_uint);
pub type CharModsFn = unsafe extern "C" fn(window: *mut c_void, codepoint: c_uint, mods: c_int);
pub type CursorEnterFn = unsafe extern "C" fn(window: *mut c_void, entered: c_int);
pub type CursorPosFn = unsafe extern "C" fn(window: *mut c_void, xpos: f64, ypos: f64);
pub type FramebufferSizeFn = unsafe extern "C" fn(window: *mut c_void, width: c_int, height: c_int);
pub type KeyFn = unsafe extern "C" fn(
    window: *mut c_void,
    key: c_int,
    scancode: c_int,
    action: c_int,
    mods: c_int,
);
pub type MouseButtonFn =
    unsafe extern "C" fn(window: *mut c_void, button: c_int, action: c_int, mods: c_int);
pub type ScrollFn = unsafe extern "C" fn(window: *mut c_void, xoffset: f64, yoffset: f64);
pub type WindowSizeFn = unsafe extern "C" fn(window: *mut c_void, width: c_int, height: c_int);

/// Opaque handle of the window whose callbacks receive events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowTarget(pub usize);

impl WindowTarget {
    #[inline]
    pub fn as_ptr(self) -> *mut c_void {
        self.0 as *mut c_void
    }
}

#[derive(Clone, Copy)]
pub enum GlfwCallback {
    Char(CharFn),
    CharMods(CharModsFn),
    CursorEnter(CursorEnterFn),
    CursorPos(CursorPosFn),
    FramebufferSize(FramebufferSizeFn),
    Key(KeyFn),
    MouseButton(MouseButtonFn),
    Scroll(ScrollFn),
    WindowSize(WindowSizeFn),
}

impl GlfwCallback {
    pub fn kind(&self) -> EventKind {
        match self {
            GlfwCallback::Char(_) => EventKind::Char,
            GlfwCallback::CharMods(_) => EventKind::CharMods,
            GlfwCallback::CursorEnter(_) => EventKind::CursorEnter,
            GlfwCallback::CursorPos(_) => EventKind::CursorPos,
            GlfwCallback::FramebufferSize(_) => EventKind::FramebufferSize,
            GlfwCallback::Key(_) => EventKind::Key,
            GlfwCallback::MouseButton(_) => EventKind::MouseButton,
            GlfwCallback::Scroll(_) => EventKind::Scroll,
            GlfwCallback::WindowSize(_) => EventKind::WindowSize,
        }
    }

    /// Raw address, as handed back to the registering runtime.
    pub fn addr(&self) -> usize {
        match *self {
            GlfwCallback::Char(f) => f as usize,
            GlfwCallback::CharMods(f) => f as usize,
            GlfwCallback::CursorEnter(f) => f as usize,
            GlfwCallback::CursorPos(f) => f as usize,
            GlfwCallback::FramebufferSize(f) => f as usize,
            GlfwCallback::Key(f) => f as usize,
            GlfwCallback::MouseButton(f) => f as usize,
            GlfwCallback::Scroll(f) => f as usize,
            GlfwCallback::WindowSize(f) => f as usize,
        }
    }

    /// Reinterprets a raw address as the callback type of `kind`. Zero means "no callback".
    ///
    /// # Safety
    /// A non-zero `addr` must point to a C-ABI function with the GLFW signature for `kind`, valid
    /// for as long as it stays registered.
    pub unsafe fn from_raw(kind: EventKind, addr: usize) -> Option<Self> {
        if addr == 0 {
            return None;
        }

        // SAFETY: upheld by the caller; fn pointers and usize have the same size.
        let cb = unsafe {
            match kind {
                EventKind::Char => GlfwCallback::Char(std::mem::transmute::<usize, CharFn>(addr)),
                EventKind::CharMods => {
                    GlfwCallback::CharMods(std::mem::transmute::<usize, CharModsFn>(addr))
                }
                EventKind::CursorEnter => {
                    GlfwCallback::CursorEnter(std::mem::transmute::<usize, CursorEnterFn>(addr))
                }
                EventKind::CursorPos => {
                    GlfwCallback::CursorPos(std::mem::transmute::<usize, CursorPosFn>(addr))
                }
                EventKind::FramebufferSize => GlfwCallback::FramebufferSize(std::mem::transmute::<
                    usize,
                    FramebufferSizeFn,
                >(addr)),
                EventKind::Key => GlfwCallback::Key(std::mem::transmute::<usize, KeyFn>(addr)),
                EventKind::MouseButton => {
                    GlfwCallback::MouseButton(std::mem::transmute::<usize, MouseButtonFn>(addr))
                }
                EventKind::Scroll => {
                    GlfwCallback::Scroll(std::mem::transmute::<usize, ScrollFn>(addr))
                }
                EventKind::WindowSize => {
                    GlfwCallback::WindowSize(std::mem::transmute::<usize, WindowSizeFn>(addr))
                }
            }
        };
        Some(cb)
    }

    /// Calls the callback with `event`. Returns `false` when the event does not belong to this
    /// callback's kind.
    ///
    /// # Safety
    /// The stored pointer must still be valid, and `window` must be what the consumer expects.
    pub unsafe fn invoke(&self, window: WindowTarget, event: &InputEvent) -> bool {
        let w = window.as_ptr();

        // SAFETY: upheld by the caller.
        unsafe {
            match (*self, *event) {
                (GlfwCallback::Char(f), InputEvent::Char { codepoint }) => f(w, codepoint),
                (GlfwCallback::CharMods(f), InputEvent::CharMods { codepoint, mods }) => {
                    f(w, codepoint, mods)
                }
                (GlfwCallback::CursorEnter(f), InputEvent::CursorEnter { entered }) => {
                    f(w, entered as c_int)
                }
                (GlfwCallback::CursorPos(f), InputEvent::CursorPos { x, y }) => {
                    f(w, x as f64, y as f64)
                }
                (
                    GlfwCallback::FramebufferSize(f),
                    InputEvent::FramebufferSize { width, height },
                ) => f(w, width, height),
                (
                    GlfwCallback::Key(f),
                    InputEvent::Key {
                        key,
                        scancode,
                        action,
                        mods,
                    },
                ) => f(w, key, scancode, action, mods),
                (
                    GlfwCallback::MouseButton(f),
                    InputEvent::MouseButton {
                        button,
                        action,
                        mods,
                    },
                ) => f(w, button, action, mods),
                (GlfwCallback::Scroll(f), InputEvent::Scroll { xoffset, yoffset }) => {
                    f(w, xoffset, yoffset)
                }
                (GlfwCallback::WindowSize(f), InputEvent::WindowSize { width, height }) => {
                    f(w, width, height)
                }
                _ => return false,
            }
        }
        true
    }
}

impl PartialEq for GlfwCallback {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.addr() == other.addr()
    }
}

impl Eq for GlfwCallback {}

impl fmt::Debug for GlfwCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#x}", self.kind().name(), self.addr())
    }
}

/* =============================================================================================
   Registry
   ============================================================================================= */

/// At most one callback per event kind.
///
/// Writers are the consumer's setup phase; readers are the dispatcher. Readers copy the callback
/// out before invoking it, so no lock is held across a call into foreign code.
pub struct CallbackRegistry {
    slots: RwLock<[Option<GlfwCallback>; EventKind::COUNT]>,
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackRegistry {
    #[inline]
    pub fn new() -> Self {
        Self {
            slots: RwLock::new([None; EventKind::COUNT]),
        }
    }

    /// Installs `cb` into its kind's slot, returning the previous occupant.
    pub fn install(&self, cb: GlfwCallback) -> Option<GlfwCallback> {
        let kind = cb.kind();
        let prev = self.slots.write()[kind.index()].replace(cb);
        log::debug!(
            target: "inputbridge::callbacks",
            "slot.install kind={} cb={:?} prev={:?}",
            kind.name(),
            cb,
            prev
        );
        prev
    }

    pub fn clear(&self, kind: EventKind) -> Option<GlfwCallback> {
        let prev = self.slots.write()[kind.index()].take();
        log::debug!(
            target: "inputbridge::callbacks",
            "slot.clear kind={} prev={:?}",
            kind.name(),
            prev
        );
        prev
    }

    /// Replace-and-return on raw addresses; `0` clears the slot / means "none was set".
    ///
    /// # Safety
    /// See [`GlfwCallback::from_raw`].
    pub unsafe fn replace_raw(&self, kind: EventKind, addr: usize) -> usize {
        // SAFETY: forwarded to the caller.
        let prev = match unsafe { GlfwCallback::from_raw(kind, addr) } {
            Some(cb) => self.install(cb),
            None => self.clear(kind),
        };
        prev.map(|cb| cb.addr()).unwrap_or(0)
    }

    #[inline]
    pub fn get(&self, kind: EventKind) -> Option<GlfwCallback> {
        self.slots.read()[kind.index()]
    }

    #[inline]
    pub fn contains(&self, kind: EventKind) -> bool {
        self.get(kind).is_some()
    }
}
