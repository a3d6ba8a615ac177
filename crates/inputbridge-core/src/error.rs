use thiserror::Error;

use crate::attach::RuntimeSide;

pub type BridgeResult<T> = Result<T, BridgeError>;

/// Bridge-wide error.
///
/// Input injection never surfaces these to the caller; they are logged and the event is dropped.
/// Lifecycle wiring maps `Unresolved` into a fatal assertion instead.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("{0} runtime is not available yet")]
    RuntimeUnavailable(RuntimeSide),

    #[error("current thread is not attached to the {0} runtime")]
    NotAttached(RuntimeSide),

    #[error("no input receiver installed")]
    NoReceiver,

    #[error("unresolved {class}.{method}{signature}")]
    Unresolved {
        class: String,
        method: String,
        signature: String,
    },

    #[error("runtime call failed: {0}")]
    Runtime(String),

    #[error("config error: {0}")]
    Config(String),
}

/// Lifecycle-tier failure: a contract mismatch with the host build, never a transient condition.
///
/// Panicking inside an `extern "system"` export aborts the process.
#[cold]
#[track_caller]
pub fn fatal(err: &BridgeError) -> ! {
    log::error!(target: "inputbridge", "fatal: {err}");
    panic!("inputbridge: {err}");
}
