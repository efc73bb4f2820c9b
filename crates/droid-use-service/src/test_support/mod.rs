//! Scriptable platform mocks for testing the engine without a device.
//!
//! `MockNode`/`MockTree` model a mutable accessibility tree whose nodes
//! can be invalidated mid-test; `MockBridge` records every device-level
//! call and returns configurable outcomes.

mod mock_bridge;
mod mock_node;

pub use mock_bridge::MockBridge;
pub use mock_node::MockNode;
pub use mock_node::MockTree;
pub use mock_node::ReleaseTracker;
