//! UI lifecycle relay.
//!
//! One-way control calls toward the host UI layer. Each target method is resolved on first use
//! and cached. Unlike input dispatch, a method that cannot be resolved is fatal: the relay
//! depends on a fixed host-side contract that has to exist at this point of the lifecycle.

use parking_lot::Mutex;

use crate::config::UiMethodNames;
use crate::error::{fatal, BridgeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiMethod {
    InstallRequested,
    LaunchSurface,
    Touch,
    Progress,
}

impl UiMethod {
    pub const COUNT: usize = 4;

    #[inline]
    const fn index(self) -> usize {
        match self {
            UiMethod::InstallRequested => 0,
            UiMethod::LaunchSurface => 1,
            UiMethod::Touch => 2,
            UiMethod::Progress => 3,
        }
    }

    /// JNI descriptor of the host-side static method.
    pub const fn signature(self) -> &'static str {
        match self {
            UiMethod::InstallRequested => "()V",
            UiMethod::LaunchSurface => "(II)V",
            UiMethod::Touch => "(III)V",
            UiMethod::Progress => "(FLjava/lang/String;)V",
        }
    }

    pub fn name(self, names: &UiMethodNames) -> &str {
        match self {
            UiMethod::InstallRequested => &names.install_requested,
            UiMethod::LaunchSurface => &names.launch_surface,
            UiMethod::Touch => &names.touch,
            UiMethod::Progress => &names.progress,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiCall<'a> {
    InstallRequested,
    LaunchSurface { width: i32, height: i32 },
    Touch { event: i32, x: i32, y: i32 },
    Progress { progress: f32, message: &'a str },
}

impl UiCall<'_> {
    pub fn method(&self) -> UiMethod {
        match self {
            UiCall::InstallRequested => UiMethod::InstallRequested,
            UiCall::LaunchSurface { .. } => UiMethod::LaunchSurface,
            UiCall::Touch { .. } => UiMethod::Touch,
            UiCall::Progress { .. } => UiMethod::Progress,
        }
    }
}

/// Host UI endpoint.
pub trait UiTarget: Send + Sync {
    type Handle: Clone + Send;

    /// Looks up the endpoint for `method`. Errors here are treated as fatal by the relay.
    fn resolve(&self, method: UiMethod) -> BridgeResult<Self::Handle>;

    fn call(&self, handle: &Self::Handle, call: &UiCall<'_>) -> BridgeResult<()>;
}

pub struct UiRelay<T: UiTarget> {
    target: T,
    handles: Mutex<[Option<T::Handle>; UiMethod::COUNT]>,
}

impl<T: UiTarget> UiRelay<T> {
    pub fn new(target: T) -> Self {
        Self {
            target,
            handles: Mutex::new(Default::default()),
        }
    }

    #[inline]
    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn notify_install_requested(&self) {
        self.forward(UiCall::InstallRequested);
    }

    pub fn notify_launch_surface(&self, width: i32, height: i32) {
        log::info!(
            target: "inputbridge::relay",
            "launch_surface width={} height={}",
            width,
            height
        );
        self.forward(UiCall::LaunchSurface { width, height });
    }

    pub fn notify_touch(&self, event: i32, x: i32, y: i32) {
        self.forward(UiCall::Touch { event, x, y });
    }

    pub fn report_progress(&self, progress: f32, message: &str) {
        self.forward(UiCall::Progress { progress, message });
    }

    fn handle(&self, method: UiMethod) -> T::Handle {
        if let Some(h) = &self.handles.lock()[method.index()] {
            return h.clone();
        }

        // Resolved unlocked; a racing first call may resolve twice, the first stored wins.
        let h = match self.target.resolve(method) {
            Ok(h) => h,
            Err(e) => fatal(&e),
        };
        log::debug!(target: "inputbridge::relay", "resolved {:?}", method);
        self.handles.lock()[method.index()]
            .get_or_insert(h)
            .clone()
    }

    fn forward(&self, call: UiCall<'_>) {
        let handle = self.handle(call.method());
        if let Err(e) = self.target.call(&handle, &call) {
            log::warn!(target: "inputbridge::relay", "{:?} failed: {}", call.method(), e);
        }
    }
}
