#![forbid(unsafe_op_in_unsafe_fn)]

//! Native input bridge between a host UI runtime and an embedded runtime consuming GLFW-style
//! callbacks.

pub mod attach;
pub mod callbacks;
pub mod clipboard;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod grab;
pub mod relay;

pub use crate::attach::{AttachmentManager, ExecutionContext, ManagedRuntime, RuntimeSide};
pub use crate::callbacks::{CallbackRegistry, GlfwCallback, WindowTarget};
pub use crate::clipboard::ClipboardStore;
pub use crate::config::{BridgeConfig, UiMethodNames};
pub use crate::dispatch::{Delivery, DispatchMode, InputBridge, InputReceiver, RESYNC_BUTTON};
pub use crate::error::{fatal, BridgeError, BridgeResult};
pub use crate::event::{EventKind, InputEvent, WirePacket};
pub use crate::grab::{GrabMode, GrabState};
pub use crate::relay::{UiCall, UiMethod, UiRelay, UiTarget};
