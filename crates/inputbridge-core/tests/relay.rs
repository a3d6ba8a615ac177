mod common;

use parking_lot::Mutex;

use common::init_logger;
use inputbridge_core::{
    BridgeError, BridgeResult, UiCall, UiMethod, UiMethodNames, UiRelay, UiTarget,
};

#[derive(Debug, Clone, PartialEq)]
enum Seen {
    Install,
    Launch(i32, i32),
    Touch(i32, i32, i32),
    Progress(f32, String),
}

#[derive(Default)]
struct RecordingUi {
    missing: Option<UiMethod>,
    failing: bool,
    resolved: Mutex<Vec<UiMethod>>,
    calls: Mutex<Vec<Seen>>,
}

impl UiTarget for RecordingUi {
    type Handle = String;

    fn resolve(&self, method: UiMethod) -> BridgeResult<String> {
        self.resolved.lock().push(method);
        let names = UiMethodNames::default();
        if self.missing == Some(method) {
            return Err(BridgeError::Unresolved {
                class: "net/kdt/pojavlaunch/uikit/UIKit".into(),
                method: method.name(&names).to_string(),
                signature: method.signature().to_string(),
            });
        }
        Ok(format!("{}{}", method.name(&names), method.signature()))
    }

    fn call(&self, handle: &String, call: &UiCall<'_>) -> BridgeResult<()> {
        assert!(handle.ends_with(call.method().signature()));
        if self.failing {
            return Err(BridgeError::Runtime("java.lang.IllegalStateException".into()));
        }
        let seen = match *call {
            UiCall::InstallRequested => Seen::Install,
            UiCall::LaunchSurface { width, height } => Seen::Launch(width, height),
            UiCall::Touch { event, x, y } => Seen::Touch(event, x, y),
            UiCall::Progress { progress, message } => Seen::Progress(progress, message.to_string()),
        };
        self.calls.lock().push(seen);
        Ok(())
    }
}

#[test]
fn calls_reach_target_in_order() {
    init_logger();
    let relay = UiRelay::new(RecordingUi::default());

    relay.notify_install_requested();
    relay.notify_launch_surface(1280, 720);
    relay.notify_touch(0, 15, 30);
    relay.report_progress(0.5, "Downloading assets");

    assert_eq!(
        relay.target().calls.lock().as_slice(),
        &[
            Seen::Install,
            Seen::Launch(1280, 720),
            Seen::Touch(0, 15, 30),
            Seen::Progress(0.5, "Downloading assets".to_string()),
        ]
    );
}

#[test]
fn methods_are_resolved_once() {
    init_logger();
    let relay = UiRelay::new(RecordingUi::default());

    for i in 0..5 {
        relay.notify_touch(1, i, i);
    }
    relay.notify_install_requested();
    relay.notify_install_requested();

    assert_eq!(
        relay.target().resolved.lock().as_slice(),
        &[UiMethod::Touch, UiMethod::InstallRequested]
    );
}

#[test]
fn call_failures_are_not_fatal() {
    init_logger();
    let relay = UiRelay::new(RecordingUi {
        failing: true,
        ..RecordingUi::default()
    });

    relay.report_progress(1.0, "done");
    relay.report_progress(1.0, "done");
    assert!(relay.target().calls.lock().is_empty());
}

#[test]
#[should_panic(expected = "unresolved")]
fn unresolved_method_is_fatal() {
    init_logger();
    let relay = UiRelay::new(RecordingUi {
        missing: Some(UiMethod::LaunchSurface),
        ..RecordingUi::default()
    });

    relay.notify_install_requested();
    relay.notify_launch_surface(1, 1);
}

#[test]
fn signatures_match_host_contract() {
    assert_eq!(UiMethod::InstallRequested.signature(), "()V");
    assert_eq!(UiMethod::LaunchSurface.signature(), "(II)V");
    assert_eq!(UiMethod::Touch.signature(), "(III)V");
    assert_eq!(UiMethod::Progress.signature(), "(FLjava/lang/String;)V");
}
