use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use droid_use_ipc::CommandEnvelope;
use droid_use_ipc::CommandResult;

use crate::config::ServiceConfig;
use crate::dispatcher::CommandDispatcher;
use crate::executor::ActionExecutor;
use crate::platform::DeviceBridge;
use crate::platform::UiTree;
use crate::store::release_handles;
use crate::store::NodeSnapshotStore;

/// UI-change signals forwarded from the platform's event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    WindowStateChanged,
    WindowsChanged,
    ContentChanged,
}

/// One driving session: wires the engine together and owns the snapshot
/// store's lifecycle. The caller is expected to await each command's
/// result before sending the next; commands from the same session are
/// not raced against each other.
pub struct DeviceSession {
    dispatcher: CommandDispatcher,
    store: Arc<NodeSnapshotStore>,
}

impl DeviceSession {
    pub fn new(
        tree: Arc<dyn UiTree>,
        bridge: Arc<dyn DeviceBridge>,
        config: ServiceConfig,
    ) -> Self {
        let store = Arc::new(NodeSnapshotStore::new(config.snapshot_capacity));
        let executor = Arc::new(ActionExecutor::new(
            tree,
            bridge,
            Arc::clone(&store),
            config,
        ));
        Self {
            dispatcher: CommandDispatcher::new(executor),
            store,
        }
    }

    /// Processes one raw inbound message into exactly one reply.
    pub async fn handle(&self, raw: &Value) -> CommandResult {
        self.dispatcher.dispatch_value(raw).await
    }

    pub async fn handle_envelope(&self, envelope: CommandEnvelope) -> CommandResult {
        self.dispatcher.dispatch(envelope).await
    }

    /// Window-level changes invalidate every cached handle: the tree
    /// generation rolled over and none of them can be trusted. Content
    /// changes are left to per-entry validation.
    pub fn notify_ui_event(&self, event: UiEvent) {
        match event {
            UiEvent::WindowStateChanged | UiEvent::WindowsChanged => {
                debug!(?event, "clearing snapshot store");
                release_handles(self.store.clear());
            }
            UiEvent::ContentChanged => {}
        }
    }

    /// Drops all cached handles. Call when the hosting service is torn
    /// down.
    pub fn teardown(&self) {
        release_handles(self.store.clear());
    }

    pub fn snapshot_count(&self) -> usize {
        self.store.len()
    }
}
