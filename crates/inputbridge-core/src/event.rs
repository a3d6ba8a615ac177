//! Typed input events and their fixed-shape wire form.
//!
//! The embedded runtime's receiver takes `(kind, i1, i2, i3, i4)`. Every [`InputEvent`] maps onto
//! that shape through [`WirePacket`]; unused fields are zero.

/* =============================================================================================
   Event kinds
   ============================================================================================= */

/// One per GLFW callback the bridge can drive.
///
/// The discriminant doubles as the wire code understood by the receiver.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Char = 1000,
    CharMods = 1001,
    CursorEnter = 1002,
    CursorPos = 1003,
    FramebufferSize = 1004,
    Key = 1005,
    MouseButton = 1006,
    Scroll = 1007,
    WindowSize = 1008,
}

impl EventKind {
    pub const COUNT: usize = 9;

    pub const ALL: [EventKind; Self::COUNT] = [
        EventKind::Char,
        EventKind::CharMods,
        EventKind::CursorEnter,
        EventKind::CursorPos,
        EventKind::FramebufferSize,
        EventKind::Key,
        EventKind::MouseButton,
        EventKind::Scroll,
        EventKind::WindowSize,
    ];

    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    #[inline]
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.code() == code)
    }

    /// Dense index, used for slot tables.
    #[inline]
    pub const fn index(self) -> usize {
        (self as i32 - EventKind::Char as i32) as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            EventKind::Char => "Char",
            EventKind::CharMods => "CharMods",
            EventKind::CursorEnter => "CursorEnter",
            EventKind::CursorPos => "CursorPos",
            EventKind::FramebufferSize => "FramebufferSize",
            EventKind::Key => "Key",
            EventKind::MouseButton => "MouseButton",
            EventKind::Scroll => "Scroll",
            EventKind::WindowSize => "WindowSize",
        }
    }
}

/* =============================================================================================
   Typed events
   ============================================================================================= */

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Char {
        codepoint: u32,
    },
    CharMods {
        codepoint: u32,
        mods: i32,
    },
    CursorEnter {
        entered: bool,
    },
    /// Already grab-adjusted when produced by the bridge.
    CursorPos {
        x: i32,
        y: i32,
    },
    Key {
        key: i32,
        scancode: i32,
        action: i32,
        mods: i32,
    },
    MouseButton {
        button: i32,
        action: i32,
        mods: i32,
    },
    FramebufferSize {
        width: i32,
        height: i32,
    },
    WindowSize {
        width: i32,
        height: i32,
    },
    Scroll {
        xoffset: f64,
        yoffset: f64,
    },
}

impl InputEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            InputEvent::Char { .. } => EventKind::Char,
            InputEvent::CharMods { .. } => EventKind::CharMods,
            InputEvent::CursorEnter { .. } => EventKind::CursorEnter,
            InputEvent::CursorPos { .. } => EventKind::CursorPos,
            InputEvent::Key { .. } => EventKind::Key,
            InputEvent::MouseButton { .. } => EventKind::MouseButton,
            InputEvent::FramebufferSize { .. } => EventKind::FramebufferSize,
            InputEvent::WindowSize { .. } => EventKind::WindowSize,
            InputEvent::Scroll { .. } => EventKind::Scroll,
        }
    }

    /// Encodes into the receiver's 5-integer shape.
    ///
    /// Scroll offsets are truncated toward zero (saturating); fractional wheel steps are lost.
    pub fn to_wire(&self) -> WirePacket {
        let args = match *self {
            InputEvent::Char { codepoint } => [codepoint as i32, 0, 0, 0],
            InputEvent::CharMods { codepoint, mods } => [codepoint as i32, mods, 0, 0],
            InputEvent::CursorEnter { entered } => [entered as i32, 0, 0, 0],
            InputEvent::CursorPos { x, y } => [x, y, 0, 0],
            InputEvent::Key {
                key,
                scancode,
                action,
                mods,
            } => [key, scancode, action, mods],
            InputEvent::MouseButton {
                button,
                action,
                mods,
            } => [button, action, mods, 0],
            InputEvent::FramebufferSize { width, height }
            | InputEvent::WindowSize { width, height } => [width, height, 0, 0],
            InputEvent::Scroll { xoffset, yoffset } => [xoffset as i32, yoffset as i32, 0, 0],
        };

        WirePacket {
            kind: self.kind().code(),
            args,
        }
    }
}

/* =============================================================================================
   Wire packet
   ============================================================================================= */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WirePacket {
    pub kind: i32,
    pub args: [i32; 4],
}

impl WirePacket {
    /// Decodes the way the receiver does. `None` for unknown kinds.
    pub fn decode(&self) -> Option<InputEvent> {
        let [a, b, c, d] = self.args;
        let ev = match EventKind::from_code(self.kind)? {
            EventKind::Char => InputEvent::Char { codepoint: a as u32 },
            EventKind::CharMods => InputEvent::CharMods {
                codepoint: a as u32,
                mods: b,
            },
            EventKind::CursorEnter => InputEvent::CursorEnter { entered: a != 0 },
            EventKind::CursorPos => InputEvent::CursorPos { x: a, y: b },
            EventKind::Key => InputEvent::Key {
                key: a,
                scancode: b,
                action: c,
                mods: d,
            },
            EventKind::MouseButton => InputEvent::MouseButton {
                button: a,
                action: b,
                mods: c,
            },
            EventKind::FramebufferSize => InputEvent::FramebufferSize {
                width: a,
                height: b,
            },
            EventKind::WindowSize => InputEvent::WindowSize {
                width: a,
                height: b,
            },
            EventKind::Scroll => InputEvent::Scroll {
                xoffset: a as f64,
                yoffset: b as f64,
            },
        };
        Some(ev)
    }
}
