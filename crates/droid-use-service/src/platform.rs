//! Ports onto the platform accessibility runtime.
//!
//! The engine never touches the Android runtime directly: the hosting
//! accessibility service hands it implementations of these traits at
//! construction time. Tests substitute the scriptable mocks in
//! [`crate::test_support`].

use std::ops::Deref;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use droid_use_core::Rect;
use droid_use_core::Selector;
use droid_use_ipc::VolumeDirection;
use droid_use_ipc::VolumeStream;

/// The node behind a handle was recycled by the platform. Purely a
/// control-flow signal: callers skip or fall through, they never surface
/// this to the server directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("accessibility node is no longer valid")]
pub struct NodeGone;

/// Every read of a live node can observe it mid-recycle.
pub type NodeRead<T> = Result<T, NodeGone>;

/// Node-level operations that go through the platform's action API
/// rather than a screen gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeAction {
    SetText(String),
    Copy,
    Paste,
    SetSelection { start: usize, end: usize },
    LongClick,
    Click,
}

/// A live accessibility node. Valid only within the tree generation it
/// was obtained in; every read is fallible.
pub trait PlatformNode: Send + Sync {
    /// Re-reads the node's state from the platform. Returns false when
    /// the node no longer exists, in which case all further reads fail.
    fn refresh(&self) -> bool;

    fn window_id(&self) -> NodeRead<i32>;
    fn view_id(&self) -> NodeRead<Option<String>>;
    fn text(&self) -> NodeRead<Option<String>>;
    fn content_desc(&self) -> NodeRead<Option<String>>;
    fn class_name(&self) -> NodeRead<Option<String>>;
    fn bounds_in_screen(&self) -> NodeRead<Rect>;
    fn is_visible(&self) -> NodeRead<bool>;
    fn is_clickable(&self) -> NodeRead<bool>;
    fn is_long_clickable(&self) -> NodeRead<bool>;
    fn is_editable(&self) -> NodeRead<bool>;
    fn is_focusable(&self) -> NodeRead<bool>;

    fn child_count(&self) -> NodeRead<usize>;
    fn child(&self, index: usize) -> NodeRead<Option<NodeHandle>>;
    fn parent(&self) -> NodeRead<Option<NodeHandle>>;

    /// Produces an independently-owned copy of this handle. The copy must
    /// be released separately.
    fn duplicate(&self) -> NodeRead<NodeHandle>;

    /// Performs a node action; `Ok(false)` means the platform refused it.
    fn perform(&self, action: NodeAction) -> NodeRead<bool>;

    /// Returns the handle to the platform. Called exactly once, from
    /// [`NodeHandle`]'s drop.
    fn release(&self);
}

/// Owning wrapper around a platform node: releases the node on drop, on
/// every exit path. Functions either return a `NodeHandle` to pass
/// ownership up, or let it drop.
pub struct NodeHandle(Box<dyn PlatformNode>);

impl NodeHandle {
    pub fn new(node: Box<dyn PlatformNode>) -> Self {
        Self(node)
    }

    /// Projects the node into the serializable selector shape the server
    /// understands.
    pub fn project(&self) -> NodeRead<Selector> {
        Ok(Selector {
            view_id: self.0.view_id()?,
            text: self.0.text()?,
            content_desc: self.0.content_desc()?,
            class_name: self.0.class_name()?,
            window_id: self.0.window_id()?,
            bounds: Some(self.0.bounds_in_screen()?),
            is_clickable: self.0.is_clickable()?,
            is_editable: self.0.is_editable()?,
            is_long_clickable: self.0.is_long_clickable()?,
        })
    }
}

impl Deref for NodeHandle {
    type Target = dyn PlatformNode;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl Drop for NodeHandle {
    fn drop(&mut self) {
        self.0.release();
    }
}

impl std::fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.0.view_id(), self.0.class_name()) {
            (Ok(view_id), Ok(class_name)) => f
                .debug_struct("NodeHandle")
                .field("view_id", &view_id)
                .field("class_name", &class_name)
                .finish(),
            _ => f.write_str("NodeHandle(<stale>)"),
        }
    }
}

/// Read access to the live accessibility tree of the active window.
pub trait UiTree: Send + Sync {
    /// Root of the active window, or `None` when no window is available
    /// yet. Callers treat absence as "nothing to show", not as an error.
    fn active_root(&self) -> Option<NodeHandle>;

    /// Full display bounds in physical pixels.
    fn display_bounds(&self) -> Rect;
}

/// A screen gesture to be dispatched as if the user touched the display.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Tap {
        x: i32,
        y: i32,
    },
    Swipe {
        from: (i32, i32),
        to: (i32, i32),
        duration: Duration,
    },
}

/// Terminal state of a dispatched gesture. Implementations must resolve
/// the dispatch future with `Cancelled` when the underlying service is
/// torn down mid-gesture; a waiter is never left pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    Completed,
    Cancelled,
    NotDispatched,
}

/// Global navigation actions the platform can perform directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemAction {
    Back,
    Home,
    Recents,
    Notifications,
    QuickSettings,
    PowerDialog,
    AllApps,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("package '{0}' is not installed or has no launch intent")]
    PackageNotFound(String),
    #[error("activity '{activity}' not found in package '{package}'")]
    ActivityNotFound { package: String, activity: String },
    #[error("not permitted to launch '{0}'")]
    PermissionDenied(String),
}

/// Device-level operations outside the accessibility tree.
#[async_trait]
pub trait DeviceBridge: Send + Sync {
    /// Dispatches a gesture and suspends until the platform reports
    /// completion or cancellation.
    async fn dispatch_gesture(&self, gesture: Gesture) -> GestureOutcome;

    /// Returns whether the action was dispatched.
    fn perform_global(&self, action: SystemAction) -> bool;

    fn launch_app(&self, package: &str, activity: Option<&str>) -> Result<(), LaunchError>;

    /// Launchable packages on the device.
    fn installed_packages(&self) -> Vec<String>;

    /// Index range `(min, max)` of the given audio stream.
    fn volume_range(&self, stream: VolumeStream) -> (i32, i32);

    fn set_volume_index(&self, stream: VolumeStream, index: i32) -> bool;

    fn adjust_volume(&self, stream: VolumeStream, direction: VolumeDirection) -> bool;

    /// Draws transient bounding boxes over the given screen rectangles.
    /// Purely observational; never awaited by callers.
    fn show_overlay(&self, rects: Vec<Rect>, duration: Duration);
}
