use crate::attach::ExecutionContext;
use crate::error::BridgeResult;

/// Host-side clipboard storage. The bridge forwards `action` and `text` unchanged.
pub trait ClipboardStore: Send + Sync {
    fn access(
        &self,
        ctx: &ExecutionContext,
        action: i32,
        text: Option<&str>,
    ) -> BridgeResult<Option<String>>;
}
