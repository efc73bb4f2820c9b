use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::Weak;

use droid_use_common::mutex_lock_or_recover;
use droid_use_core::Rect;

use crate::platform::NodeAction;
use crate::platform::NodeGone;
use crate::platform::NodeHandle;
use crate::platform::NodeRead;
use crate::platform::PlatformNode;
use crate::platform::UiTree;

#[derive(Debug, Clone)]
struct NodeProps {
    view_id: Option<String>,
    text: Option<String>,
    content_desc: Option<String>,
    class_name: Option<String>,
    window_id: i32,
    bounds: Rect,
    visible: bool,
    clickable: bool,
    long_clickable: bool,
    editable: bool,
    focusable: bool,
}

impl NodeProps {
    fn new() -> Self {
        Self {
            view_id: None,
            text: None,
            content_desc: None,
            class_name: None,
            window_id: 0,
            bounds: Rect::new(0, 0, 100, 100),
            visible: true,
            clickable: false,
            long_clickable: false,
            editable: false,
            focusable: false,
        }
    }
}

struct NodeState {
    props: Mutex<NodeProps>,
    alive: AtomicBool,
    releases: Arc<AtomicUsize>,
    perform_ok: AtomicBool,
    performed: Mutex<Vec<NodeAction>>,
    children: Mutex<Vec<Arc<NodeState>>>,
    parent: Mutex<Weak<NodeState>>,
}

impl NodeState {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            props: Mutex::new(NodeProps::new()),
            alive: AtomicBool::new(true),
            releases: Arc::new(AtomicUsize::new(0)),
            perform_ok: AtomicBool::new(true),
            performed: Mutex::new(Vec::new()),
            children: Mutex::new(Vec::new()),
            parent: Mutex::new(Weak::new()),
        })
    }
}

/// Counts how many handles onto one mock node have been released.
pub struct ReleaseTracker(Arc<AtomicUsize>);

impl ReleaseTracker {
    pub fn released(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// A scriptable accessibility node. Cloning shares the underlying state,
/// so a test can keep a `MockNode` around to mutate or invalidate the
/// node while the engine holds handles onto it.
#[derive(Clone)]
pub struct MockNode {
    state: Arc<NodeState>,
}

impl Default for MockNode {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNode {
    pub fn new() -> Self {
        Self {
            state: NodeState::new(),
        }
    }

    // Builder-style setup, consumed by value so trees read declaratively.

    pub fn view_id(self, view_id: &str) -> Self {
        mutex_lock_or_recover(&self.state.props).view_id = Some(view_id.to_string());
        self
    }

    pub fn text(self, text: &str) -> Self {
        mutex_lock_or_recover(&self.state.props).text = Some(text.to_string());
        self
    }

    pub fn content_desc(self, desc: &str) -> Self {
        mutex_lock_or_recover(&self.state.props).content_desc = Some(desc.to_string());
        self
    }

    pub fn class_name(self, class_name: &str) -> Self {
        mutex_lock_or_recover(&self.state.props).class_name = Some(class_name.to_string());
        self
    }

    pub fn window(self, window_id: i32) -> Self {
        mutex_lock_or_recover(&self.state.props).window_id = window_id;
        self
    }

    pub fn bounds(self, bounds: Rect) -> Self {
        mutex_lock_or_recover(&self.state.props).bounds = bounds;
        self
    }

    pub fn clickable(self) -> Self {
        mutex_lock_or_recover(&self.state.props).clickable = true;
        self
    }

    pub fn long_clickable(self) -> Self {
        mutex_lock_or_recover(&self.state.props).long_clickable = true;
        self
    }

    pub fn editable(self) -> Self {
        mutex_lock_or_recover(&self.state.props).editable = true;
        self
    }

    pub fn focusable(self) -> Self {
        mutex_lock_or_recover(&self.state.props).focusable = true;
        self
    }

    pub fn invisible(self) -> Self {
        mutex_lock_or_recover(&self.state.props).visible = false;
        self
    }

    pub fn child(self, child: MockNode) -> Self {
        *mutex_lock_or_recover(&child.state.parent) = Arc::downgrade(&self.state);
        mutex_lock_or_recover(&self.state.children).push(Arc::clone(&child.state));
        self
    }

    // Mid-test mutation.

    /// Marks the node recycled: refresh fails and every read errors.
    pub fn invalidate(&self) {
        self.state.alive.store(false, Ordering::SeqCst);
    }

    pub fn set_bounds(&self, bounds: Rect) {
        mutex_lock_or_recover(&self.state.props).bounds = bounds;
    }

    pub fn set_text(&self, text: &str) {
        mutex_lock_or_recover(&self.state.props).text = Some(text.to_string());
    }

    pub fn set_perform_ok(&self, ok: bool) {
        self.state.perform_ok.store(ok, Ordering::SeqCst);
    }

    // Observation.

    pub fn release_tracker(&self) -> ReleaseTracker {
        ReleaseTracker(Arc::clone(&self.state.releases))
    }

    /// Node actions performed through any handle onto this node.
    pub fn performed(&self) -> Vec<NodeAction> {
        mutex_lock_or_recover(&self.state.performed).clone()
    }

    /// Produces an owned platform handle onto this node.
    pub fn into_handle(self) -> NodeHandle {
        NodeHandle::new(Box::new(MockNodeRef { state: self.state }))
    }

    fn handle(&self) -> NodeHandle {
        NodeHandle::new(Box::new(MockNodeRef {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockNodeRef {
    state: Arc<NodeState>,
}

impl MockNodeRef {
    fn read<T>(&self, f: impl FnOnce(&NodeProps) -> T) -> NodeRead<T> {
        if !self.state.alive.load(Ordering::SeqCst) {
            return Err(NodeGone);
        }
        Ok(f(&mutex_lock_or_recover(&self.state.props)))
    }
}

impl PlatformNode for MockNodeRef {
    fn refresh(&self) -> bool {
        self.state.alive.load(Ordering::SeqCst)
    }

    fn window_id(&self) -> NodeRead<i32> {
        self.read(|p| p.window_id)
    }

    fn view_id(&self) -> NodeRead<Option<String>> {
        self.read(|p| p.view_id.clone())
    }

    fn text(&self) -> NodeRead<Option<String>> {
        self.read(|p| p.text.clone())
    }

    fn content_desc(&self) -> NodeRead<Option<String>> {
        self.read(|p| p.content_desc.clone())
    }

    fn class_name(&self) -> NodeRead<Option<String>> {
        self.read(|p| p.class_name.clone())
    }

    fn bounds_in_screen(&self) -> NodeRead<Rect> {
        self.read(|p| p.bounds)
    }

    fn is_visible(&self) -> NodeRead<bool> {
        self.read(|p| p.visible)
    }

    fn is_clickable(&self) -> NodeRead<bool> {
        self.read(|p| p.clickable)
    }

    fn is_long_clickable(&self) -> NodeRead<bool> {
        self.read(|p| p.long_clickable)
    }

    fn is_editable(&self) -> NodeRead<bool> {
        self.read(|p| p.editable)
    }

    fn is_focusable(&self) -> NodeRead<bool> {
        self.read(|p| p.focusable)
    }

    fn child_count(&self) -> NodeRead<usize> {
        if !self.state.alive.load(Ordering::SeqCst) {
            return Err(NodeGone);
        }
        Ok(mutex_lock_or_recover(&self.state.children).len())
    }

    fn child(&self, index: usize) -> NodeRead<Option<NodeHandle>> {
        if !self.state.alive.load(Ordering::SeqCst) {
            return Err(NodeGone);
        }
        let child = mutex_lock_or_recover(&self.state.children)
            .get(index)
            .map(Arc::clone);
        Ok(child.map(|state| NodeHandle::new(Box::new(MockNodeRef { state }))))
    }

    fn parent(&self) -> NodeRead<Option<NodeHandle>> {
        if !self.state.alive.load(Ordering::SeqCst) {
            return Err(NodeGone);
        }
        let parent = mutex_lock_or_recover(&self.state.parent).upgrade();
        Ok(parent.map(|state| NodeHandle::new(Box::new(MockNodeRef { state }))))
    }

    fn duplicate(&self) -> NodeRead<NodeHandle> {
        if !self.state.alive.load(Ordering::SeqCst) {
            return Err(NodeGone);
        }
        Ok(NodeHandle::new(Box::new(MockNodeRef {
            state: Arc::clone(&self.state),
        })))
    }

    fn perform(&self, action: NodeAction) -> NodeRead<bool> {
        if !self.state.alive.load(Ordering::SeqCst) {
            return Err(NodeGone);
        }
        mutex_lock_or_recover(&self.state.performed).push(action);
        Ok(self.state.perform_ok.load(Ordering::SeqCst))
    }

    fn release(&self) {
        self.state.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// A scriptable window tree. Counts root accesses so tests can assert
/// that a cache hit skipped the tree walk.
pub struct MockTree {
    root: Mutex<Option<MockNode>>,
    display: Mutex<Rect>,
    root_walks: AtomicUsize,
}

impl MockTree {
    pub fn new(root: MockNode) -> Self {
        Self {
            root: Mutex::new(Some(root)),
            display: Mutex::new(Rect::new(0, 0, 1080, 1920)),
            root_walks: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self {
            root: Mutex::new(None),
            display: Mutex::new(Rect::new(0, 0, 1080, 1920)),
            root_walks: AtomicUsize::new(0),
        }
    }

    pub fn set_root(&self, root: MockNode) {
        *mutex_lock_or_recover(&self.root) = Some(root);
    }

    pub fn clear_root(&self) {
        *mutex_lock_or_recover(&self.root) = None;
    }

    pub fn set_display(&self, bounds: Rect) {
        *mutex_lock_or_recover(&self.display) = bounds;
    }

    /// How many times a root handle was produced.
    pub fn root_walks(&self) -> usize {
        self.root_walks.load(Ordering::SeqCst)
    }
}

impl UiTree for MockTree {
    fn active_root(&self) -> Option<NodeHandle> {
        let root = mutex_lock_or_recover(&self.root).clone()?;
        self.root_walks.fetch_add(1, Ordering::SeqCst);
        Some(root.handle())
    }

    fn display_bounds(&self) -> Rect {
        *mutex_lock_or_recover(&self.display)
    }
}
