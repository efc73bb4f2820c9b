use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use tracing::warn;

use droid_use_core::Rect;
use droid_use_core::Selector;
use droid_use_ipc::GlobalActionId;
use droid_use_ipc::SwipeDirection;
use droid_use_ipc::VolumeDirection;
use droid_use_ipc::VolumeStream;

use crate::config::ServiceConfig;
use crate::error::ActionError;
use crate::platform::DeviceBridge;
use crate::platform::Gesture;
use crate::platform::GestureOutcome;
use crate::platform::NodeAction;
use crate::platform::NodeHandle;
use crate::platform::SystemAction;
use crate::platform::UiTree;
use crate::query::NodeQueryEngine;
use crate::query::QueryKind;
use crate::resolver::Resolution;
use crate::resolver::SelectorResolver;
use crate::store::release_handles;
use crate::store::NodeSnapshotStore;

/// Labels the launcher affordance is known under across stock launchers.
const APP_DRAWER_LABELS: [&str; 3] = ["apps", "app drawer", "all apps"];

/// How far up the ancestor chain to look for a clickable container.
const MAX_ANCESTOR_CLIMB: usize = 16;

/// Performs resolved-node and device-global operations. Every method
/// returns a success message or an [`ActionError`]; nothing panics past
/// this boundary, and every resolved handle is released on every exit
/// path.
pub struct ActionExecutor {
    tree: Arc<dyn UiTree>,
    bridge: Arc<dyn DeviceBridge>,
    resolver: Arc<SelectorResolver>,
    query: Arc<NodeQueryEngine>,
    store: Arc<NodeSnapshotStore>,
    config: ServiceConfig,
}

impl ActionExecutor {
    pub fn new(
        tree: Arc<dyn UiTree>,
        bridge: Arc<dyn DeviceBridge>,
        store: Arc<NodeSnapshotStore>,
        config: ServiceConfig,
    ) -> Self {
        let resolver = Arc::new(SelectorResolver::new(
            Arc::clone(&tree),
            Arc::clone(&store),
        ));
        let query = Arc::new(NodeQueryEngine::new(Arc::clone(&tree)));
        Self {
            tree,
            bridge,
            resolver,
            query,
            store,
            config,
        }
    }

    /// Taps the element at its bounds center with a screen gesture, so
    /// custom-drawn views that ignore the semantic click action behave
    /// the same as framework widgets.
    pub async fn tap(&self, selector: &Selector) -> Result<String, ActionError> {
        let resolution = self.resolve_blocking(selector.clone()).await?;
        let bounds = resolution
            .handle
            .bounds_in_screen()
            .map_err(|_| ActionError::StaleNode { op: "tap" })?;
        let (x, y) = bounds.center();
        debug!(via = %resolution.via, x, y, "tap target resolved");
        drop(resolution);

        let screen = self.tree.display_bounds();
        if !screen.contains_point(x, y) {
            return Err(ActionError::TargetOffScreen { x, y });
        }

        match self.bridge.dispatch_gesture(Gesture::Tap { x, y }).await {
            GestureOutcome::Completed => {
                self.schedule_overlay();
                Ok(format!("Tapped element at ({}, {}).", x, y))
            }
            GestureOutcome::Cancelled => Err(ActionError::GestureCancelled { what: "tap" }),
            GestureOutcome::NotDispatched => Err(ActionError::DispatchFailed {
                what: "tap".to_string(),
            }),
        }
    }

    /// Sets the text of an editable element, then waits out the settle
    /// delay so the IME and any redraw land before the caller observes
    /// the screen again.
    pub async fn input(&self, selector: &Selector, text: &str) -> Result<String, ActionError> {
        let resolution = self.resolve_blocking(selector.clone()).await?;
        let editable = resolution
            .handle
            .is_editable()
            .map_err(|_| ActionError::StaleNode { op: "input" })?;
        if !editable {
            return Err(ActionError::NotEditable);
        }
        let accepted = resolution
            .handle
            .perform(NodeAction::SetText(text.to_string()))
            .map_err(|_| ActionError::StaleNode { op: "input" })?;
        drop(resolution);
        if !accepted {
            return Err(ActionError::NodeActionFailed { action: "set_text" });
        }

        tokio::time::sleep(self.config.input_settle).await;
        Ok(format!(
            "Typed {} characters into element.",
            text.chars().count()
        ))
    }

    pub async fn copy(&self, selector: &Selector) -> Result<String, ActionError> {
        let resolution = self.resolve_blocking(selector.clone()).await?;
        let accepted = resolution
            .handle
            .perform(NodeAction::Copy)
            .map_err(|_| ActionError::StaleNode { op: "copy" })?;
        if !accepted {
            return Err(ActionError::NodeActionFailed { action: "copy" });
        }
        Ok("Copied element text to clipboard.".to_string())
    }

    pub async fn paste(&self, selector: &Selector) -> Result<String, ActionError> {
        let resolution = self.resolve_blocking(selector.clone()).await?;
        let editable = resolution
            .handle
            .is_editable()
            .map_err(|_| ActionError::StaleNode { op: "paste" })?;
        if !editable {
            return Err(ActionError::NotEditable);
        }
        let accepted = resolution
            .handle
            .perform(NodeAction::Paste)
            .map_err(|_| ActionError::StaleNode { op: "paste" })?;
        if !accepted {
            return Err(ActionError::NodeActionFailed { action: "paste" });
        }
        Ok("Pasted clipboard content into element.".to_string())
    }

    /// Selects a character range; `start` defaults to 0, `end` to the
    /// element's current text length.
    pub async fn select_range(
        &self,
        selector: &Selector,
        start: Option<usize>,
        end: Option<usize>,
    ) -> Result<String, ActionError> {
        let resolution = self.resolve_blocking(selector.clone()).await?;
        let text_len = resolution
            .handle
            .text()
            .map_err(|_| ActionError::StaleNode { op: "select" })?
            .map(|t| t.chars().count())
            .unwrap_or(0);
        let start = start.unwrap_or(0);
        let end = end.unwrap_or(text_len);
        if start > end {
            return Err(ActionError::InvalidSelectionRange { start, end });
        }
        let accepted = resolution
            .handle
            .perform(NodeAction::SetSelection { start, end })
            .map_err(|_| ActionError::StaleNode { op: "select" })?;
        if !accepted {
            return Err(ActionError::NodeActionFailed {
                action: "set_selection",
            });
        }
        Ok(format!("Selected text range {}..{}.", start, end))
    }

    /// Long-clicks an element. Unlike tap, this requires the selector to
    /// have been captured as long-clickable; a best-effort attempt on a
    /// node that never advertised the capability helps nobody.
    pub async fn long_click(&self, selector: &Selector) -> Result<String, ActionError> {
        if !selector.is_long_clickable {
            return Err(ActionError::NotLongClickable);
        }
        let resolution = self.resolve_blocking(selector.clone()).await?;
        let accepted = resolution
            .handle
            .perform(NodeAction::LongClick)
            .map_err(|_| ActionError::StaleNode { op: "long_click" })?;
        if !accepted {
            return Err(ActionError::NodeActionFailed { action: "long_click" });
        }
        Ok("Long-clicked element.".to_string())
    }

    pub async fn global_action(&self, action_id: GlobalActionId) -> Result<String, ActionError> {
        let system_action = match action_id {
            GlobalActionId::Back => SystemAction::Back,
            GlobalActionId::Home => SystemAction::Home,
            GlobalActionId::Recents => SystemAction::Recents,
            GlobalActionId::Notifications => SystemAction::Notifications,
            GlobalActionId::QuickSettings => SystemAction::QuickSettings,
            GlobalActionId::PowerDialog => SystemAction::PowerDialog,
            GlobalActionId::OpenAppDrawer => return self.open_app_drawer().await,
        };
        if self.bridge.perform_global(system_action) {
            Ok(format!(
                "Performed global action '{}'.",
                global_action_name(action_id)
            ))
        } else {
            Err(ActionError::DispatchFailed {
                what: format!("global action '{}'", global_action_name(action_id)),
            })
        }
    }

    /// Opening the app drawer has no single platform call on every
    /// launcher; sub-strategies are tried in order until one dispatches.
    async fn open_app_drawer(&self) -> Result<String, ActionError> {
        if self.bridge.perform_global(SystemAction::AllApps) {
            return Ok("Opened the app drawer.".to_string());
        }

        for label in APP_DRAWER_LABELS {
            let matches = self
                .query_blocking(QueryKind::ByText(label.to_string()))
                .await?;
            for (_, handle) in matches {
                let Some((x, y)) = clickable_center(&handle) else {
                    continue;
                };
                drop(handle);
                if self.bridge.dispatch_gesture(Gesture::Tap { x, y }).await
                    == GestureOutcome::Completed
                {
                    return Ok("Opened the app drawer via the launcher icon.".to_string());
                }
            }
        }

        if self.bridge.perform_global(SystemAction::Home) {
            let screen = self.tree.display_bounds();
            let (from, to) = swipe_span(&screen, SwipeDirection::Up);
            let gesture = Gesture::Swipe {
                from,
                to,
                duration: self.config.gesture_duration,
            };
            if self.bridge.dispatch_gesture(gesture).await == GestureOutcome::Completed {
                return Ok("Opened the app drawer with home and swipe up.".to_string());
            }
        }

        Err(ActionError::DispatchFailed {
            what: "open app drawer".to_string(),
        })
    }

    pub async fn swipe(&self, direction: SwipeDirection) -> Result<String, ActionError> {
        let screen = self.tree.display_bounds();
        let (from, to) = swipe_span(&screen, direction);
        let gesture = Gesture::Swipe {
            from,
            to,
            duration: self.config.gesture_duration,
        };
        match self.bridge.dispatch_gesture(gesture).await {
            GestureOutcome::Completed => {
                self.schedule_overlay();
                Ok(format!("Swiped {}.", direction))
            }
            GestureOutcome::Cancelled => Err(ActionError::GestureCancelled { what: "swipe" }),
            GestureOutcome::NotDispatched => Err(ActionError::DispatchFailed {
                what: format!("swipe {}", direction),
            }),
        }
    }

    pub fn launch_app(
        &self,
        package: &str,
        activity: Option<&str>,
    ) -> Result<String, ActionError> {
        self.bridge.launch_app(package, activity)?;
        Ok(match activity {
            Some(activity) => format!("Launched {}/{}.", package, activity),
            None => format!("Launched {}.", package),
        })
    }

    /// Sets an absolute stream volume (percent, clamped to 0–100) or
    /// nudges it one step. Exactly one of the two modes must be given.
    pub fn set_volume(
        &self,
        stream: VolumeStream,
        level: Option<u8>,
        direction: Option<VolumeDirection>,
    ) -> Result<String, ActionError> {
        match (level, direction) {
            (Some(_), Some(_)) | (None, None) => Err(ActionError::VolumeParams),
            (Some(level), None) => {
                let level = level.min(100);
                let (min, max) = self.bridge.volume_range(stream);
                let span = (max - min).max(0) as f64;
                let index = min + (span * level as f64 / 100.0).round() as i32;
                if self.bridge.set_volume_index(stream, index) {
                    Ok(format!("Set {} volume to {}%.", stream, level))
                } else {
                    Err(ActionError::DispatchFailed {
                        what: format!("set {} volume", stream),
                    })
                }
            }
            (None, Some(direction)) => {
                if self.bridge.adjust_volume(stream, direction) {
                    Ok(format!("Adjusted {} volume {}.", stream, direction))
                } else {
                    Err(ActionError::DispatchFailed {
                        what: format!("adjust {} volume", stream),
                    })
                }
            }
        }
    }

    pub async fn wait(&self, duration_ms: u64) -> Result<String, ActionError> {
        tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        Ok(format!("Waited {} ms.", duration_ms))
    }

    /// Runs a node query on the blocking pool and opportunistically
    /// caches every returned handle under its projection's key.
    pub async fn query_nodes(&self, kind: QueryKind) -> Result<Vec<Selector>, ActionError> {
        let pairs = self.query_blocking(kind).await?;
        let mut projections = Vec::with_capacity(pairs.len());
        let mut evicted = Vec::new();
        for (projection, handle) in pairs {
            evicted.extend(self.store.insert(projection.key(), handle));
            projections.push(projection);
        }
        release_handles(evicted);
        Ok(projections)
    }

    pub fn list_packages(&self) -> Vec<String> {
        self.bridge.installed_packages()
    }

    async fn resolve_blocking(&self, selector: Selector) -> Result<Resolution, ActionError> {
        let resolver = Arc::clone(&self.resolver);
        tokio::task::spawn_blocking(move || resolver.resolve(&selector))
            .await
            .map_err(|join| ActionError::Background(join.to_string()))?
            .map_err(ActionError::from)
    }

    async fn query_blocking(
        &self,
        kind: QueryKind,
    ) -> Result<Vec<(Selector, NodeHandle)>, ActionError> {
        let query = Arc::clone(&self.query);
        tokio::task::spawn_blocking(move || query.query(&kind))
            .await
            .map_err(|join| ActionError::Background(join.to_string()))
    }

    /// Fire-and-forget: flash the currently-clickable bounds so a human
    /// watching the device can follow along. Never awaited and never
    /// affects the reported outcome.
    fn schedule_overlay(&self) {
        let query = Arc::clone(&self.query);
        let bridge = Arc::clone(&self.bridge);
        let duration = self.config.overlay_duration;
        tokio::spawn(async move {
            let pairs = tokio::task::spawn_blocking(move || query.query(&QueryKind::Clickable))
                .await
                .unwrap_or_default();
            let rects: Vec<Rect> = pairs
                .iter()
                .filter_map(|(projection, _)| projection.bounds)
                .collect();
            drop(pairs);
            if rects.is_empty() {
                return;
            }
            bridge.show_overlay(rects, duration);
        });
    }
}

fn global_action_name(action_id: GlobalActionId) -> &'static str {
    match action_id {
        GlobalActionId::Back => "back",
        GlobalActionId::Home => "home",
        GlobalActionId::Recents => "recents",
        GlobalActionId::Notifications => "notifications",
        GlobalActionId::QuickSettings => "quick_settings",
        GlobalActionId::PowerDialog => "power_dialog",
        GlobalActionId::OpenAppDrawer => "open_app_drawer",
    }
}

/// The node itself if clickable, else its nearest clickable ancestor.
fn clickable_center(handle: &NodeHandle) -> Option<(i32, i32)> {
    let mut current = handle.duplicate().ok()?;
    for _ in 0..MAX_ANCESTOR_CLIMB {
        if current.is_clickable().ok()? {
            return current.bounds_in_screen().ok().map(|b| b.center());
        }
        match current.parent().ok()? {
            Some(parent) => current = parent,
            None => return None,
        }
    }
    warn!("no clickable ancestor within climb limit");
    None
}

/// Start/end coordinates for a semantic swipe, kept inside a 15–30%
/// margin so the gesture clears the status and navigation bars.
fn swipe_span(screen: &Rect, direction: SwipeDirection) -> ((i32, i32), (i32, i32)) {
    let x_at = |f: f64| screen.left + (screen.width() as f64 * f).round() as i32;
    let y_at = |f: f64| screen.top + (screen.height() as f64 * f).round() as i32;
    match direction {
        SwipeDirection::Up => ((x_at(0.5), y_at(0.7)), (x_at(0.5), y_at(0.3))),
        SwipeDirection::Down => ((x_at(0.5), y_at(0.3)), (x_at(0.5), y_at(0.7))),
        SwipeDirection::Left => ((x_at(0.85), y_at(0.5)), (x_at(0.15), y_at(0.5))),
        SwipeDirection::Right => ((x_at(0.15), y_at(0.5)), (x_at(0.85), y_at(0.5))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockBridge;
    use crate::test_support::MockNode;
    use crate::test_support::MockTree;

    fn executor_with(
        tree: Arc<MockTree>,
        bridge: Arc<MockBridge>,
    ) -> (ActionExecutor, Arc<NodeSnapshotStore>) {
        let store = Arc::new(NodeSnapshotStore::new(8));
        let config = ServiceConfig::default()
            .with_input_settle(Duration::from_millis(1))
            .with_gesture_duration(Duration::from_millis(1));
        (
            ActionExecutor::new(tree, bridge, Arc::clone(&store), config),
            Arc::clone(&store),
        )
    }

    fn button_tree(bounds: Rect) -> Arc<MockTree> {
        let button = MockNode::new()
            .view_id("com.app:id/go")
            .class_name("android.widget.Button")
            .window(1)
            .bounds(bounds)
            .clickable();
        Arc::new(MockTree::new(MockNode::new().window(1).child(button)))
    }

    fn go_selector() -> Selector {
        Selector {
            view_id: Some("com.app:id/go".into()),
            window_id: 1,
            ..Selector::default()
        }
    }

    #[tokio::test]
    async fn test_tap_dispatches_gesture_at_center() {
        let tree = button_tree(Rect::new(100, 200, 300, 260));
        let bridge = Arc::new(MockBridge::new());
        let (executor, _) = executor_with(tree, Arc::clone(&bridge));

        let message = executor.tap(&go_selector()).await.unwrap();
        assert_eq!(message, "Tapped element at (200, 230).");
        assert_eq!(
            bridge.gestures(),
            vec![Gesture::Tap { x: 200, y: 230 }]
        );
    }

    #[tokio::test]
    async fn test_tap_off_screen_center_fails_without_dispatch() {
        // Display is 1080x1920; the node sits below the panel.
        let tree = button_tree(Rect::new(100, 2000, 300, 2100));
        let bridge = Arc::new(MockBridge::new());
        let (executor, _) = executor_with(tree, Arc::clone(&bridge));

        let err = executor.tap(&go_selector()).await.unwrap_err();
        assert!(matches!(err, ActionError::TargetOffScreen { .. }));
        assert!(bridge.gestures().is_empty());
    }

    #[tokio::test]
    async fn test_tap_cancelled_gesture_is_a_failure() {
        let tree = button_tree(Rect::new(0, 0, 100, 100));
        let bridge = Arc::new(MockBridge::new());
        bridge.script_gesture_outcome(GestureOutcome::Cancelled);
        let (executor, _) = executor_with(tree, Arc::clone(&bridge));

        let err = executor.tap(&go_selector()).await.unwrap_err();
        assert!(matches!(err, ActionError::GestureCancelled { .. }));
    }

    #[tokio::test]
    async fn test_input_requires_editable() {
        let tree = button_tree(Rect::new(0, 0, 100, 100));
        let bridge = Arc::new(MockBridge::new());
        let (executor, _) = executor_with(tree, bridge);

        let err = executor
            .input(&go_selector(), "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::NotEditable));
    }

    #[tokio::test]
    async fn test_input_sets_text_and_settles() {
        let field = MockNode::new()
            .view_id("com.app:id/query")
            .class_name("android.widget.EditText")
            .window(1)
            .bounds(Rect::new(0, 0, 400, 60))
            .editable();
        let tree = Arc::new(MockTree::new(MockNode::new().window(1).child(field.clone())));
        let bridge = Arc::new(MockBridge::new());
        let (executor, _) = executor_with(tree, bridge);

        let selector = Selector {
            view_id: Some("com.app:id/query".into()),
            window_id: 1,
            ..Selector::default()
        };
        let message = executor.input(&selector, "droid").await.unwrap();
        assert_eq!(message, "Typed 5 characters into element.");
        assert_eq!(
            field.performed(),
            vec![NodeAction::SetText("droid".into())]
        );
    }

    #[tokio::test]
    async fn test_long_click_requires_captured_flag() {
        let tree = button_tree(Rect::new(0, 0, 100, 100));
        let bridge = Arc::new(MockBridge::new());
        let (executor, _) = executor_with(Arc::clone(&tree), bridge);

        let err = executor.long_click(&go_selector()).await.unwrap_err();
        assert!(matches!(err, ActionError::NotLongClickable));
        // No resolution was attempted.
        assert_eq!(tree.root_walks(), 0);
    }

    #[tokio::test]
    async fn test_select_range_defaults_and_validation() {
        let field = MockNode::new()
            .view_id("com.app:id/query")
            .window(1)
            .text("hello world")
            .editable();
        let tree = Arc::new(MockTree::new(MockNode::new().window(1).child(field.clone())));
        let bridge = Arc::new(MockBridge::new());
        let (executor, _) = executor_with(tree, bridge);

        let selector = Selector {
            view_id: Some("com.app:id/query".into()),
            window_id: 1,
            ..Selector::default()
        };
        let message = executor
            .select_range(&selector, None, None)
            .await
            .unwrap();
        assert_eq!(message, "Selected text range 0..11.");
        assert_eq!(
            field.performed(),
            vec![NodeAction::SetSelection { start: 0, end: 11 }]
        );

        let err = executor
            .select_range(&selector, Some(8), Some(2))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ActionError::InvalidSelectionRange { start: 8, end: 2 }
        ));
    }

    #[tokio::test]
    async fn test_swipe_failure_message() {
        let tree = Arc::new(MockTree::empty());
        let bridge = Arc::new(MockBridge::new());
        bridge.script_gesture_outcome(GestureOutcome::NotDispatched);
        let (executor, _) = executor_with(tree, Arc::clone(&bridge));

        let err = executor.swipe(SwipeDirection::Up).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to dispatch swipe up.");
        assert!(bridge.overlay_count() == 0);
    }

    #[tokio::test]
    async fn test_swipe_spans_stay_inside_margins() {
        let screen = Rect::new(0, 0, 1000, 2000);
        for direction in [
            SwipeDirection::Up,
            SwipeDirection::Down,
            SwipeDirection::Left,
            SwipeDirection::Right,
        ] {
            let (from, to) = swipe_span(&screen, direction);
            for (x, y) in [from, to] {
                assert!(x >= 150 && x <= 850, "{:?}: x={}", direction, x);
                assert!(y >= 600 && y <= 1400 || x == 500, "{:?}: y={}", direction, y);
                assert!(screen.contains_point(x, y));
            }
        }
    }

    #[tokio::test]
    async fn test_set_volume_rejects_ambiguous_params() {
        let tree = Arc::new(MockTree::empty());
        let bridge = Arc::new(MockBridge::new());
        let (executor, _) = executor_with(tree, Arc::clone(&bridge));

        let both = executor.set_volume(
            VolumeStream::Music,
            Some(40),
            Some(VolumeDirection::Up),
        );
        assert!(matches!(both.unwrap_err(), ActionError::VolumeParams));

        let neither = executor.set_volume(VolumeStream::Music, None, None);
        assert!(matches!(neither.unwrap_err(), ActionError::VolumeParams));

        // No platform call was made either way.
        assert!(bridge.volume_sets().is_empty());
        assert!(bridge.volume_adjusts().is_empty());
    }

    #[tokio::test]
    async fn test_set_volume_percent_maps_to_index_range() {
        let tree = Arc::new(MockTree::empty());
        let bridge = Arc::new(MockBridge::new());
        bridge.set_volume_range(0, 15);
        let (executor, _) = executor_with(tree, Arc::clone(&bridge));

        executor
            .set_volume(VolumeStream::Music, Some(50), None)
            .unwrap();
        executor
            .set_volume(VolumeStream::Music, Some(200), None)
            .unwrap();
        assert_eq!(
            bridge.volume_sets(),
            vec![(VolumeStream::Music, 8), (VolumeStream::Music, 15)]
        );
    }

    #[tokio::test]
    async fn test_set_volume_direction() {
        let tree = Arc::new(MockTree::empty());
        let bridge = Arc::new(MockBridge::new());
        let (executor, _) = executor_with(tree, Arc::clone(&bridge));

        let message = executor
            .set_volume(VolumeStream::Ring, None, Some(VolumeDirection::Down))
            .unwrap();
        assert_eq!(message, "Adjusted ring volume down.");
        assert_eq!(
            bridge.volume_adjusts(),
            vec![(VolumeStream::Ring, VolumeDirection::Down)]
        );
    }

    #[tokio::test]
    async fn test_launch_app_error_messages_are_distinct() {
        use crate::platform::LaunchError;

        let tree = Arc::new(MockTree::empty());
        let bridge = Arc::new(MockBridge::new());
        let (executor, _) = executor_with(tree, Arc::clone(&bridge));

        bridge.set_launch_result(Err(LaunchError::PackageNotFound("com.missing".into())));
        let not_found = executor.launch_app("com.missing", None).unwrap_err();

        bridge.set_launch_result(Err(LaunchError::ActivityNotFound {
            package: "com.app".into(),
            activity: ".Hidden".into(),
        }));
        let no_activity = executor
            .launch_app("com.app", Some(".Hidden"))
            .unwrap_err();

        assert_ne!(not_found.to_string(), no_activity.to_string());
        assert_ne!(not_found.code(), no_activity.code());
    }

    #[tokio::test]
    async fn test_launch_app_success_message() {
        let tree = Arc::new(MockTree::empty());
        let bridge = Arc::new(MockBridge::new());
        let (executor, _) = executor_with(tree, Arc::clone(&bridge));

        assert_eq!(
            executor.launch_app("com.android.settings", None).unwrap(),
            "Launched com.android.settings."
        );
        assert_eq!(
            bridge.launches(),
            vec![("com.android.settings".to_string(), None)]
        );
    }

    #[tokio::test]
    async fn test_query_nodes_populates_cache() {
        let tree = button_tree(Rect::new(0, 0, 100, 100));
        let bridge = Arc::new(MockBridge::new());
        let (executor, store) = executor_with(tree, bridge);

        let nodes = executor.query_nodes(QueryKind::Clickable).await.unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.contains(&nodes[0].key()));
    }

    #[tokio::test]
    async fn test_tap_schedules_overlay() {
        let tree = button_tree(Rect::new(100, 200, 300, 260));
        let bridge = Arc::new(MockBridge::new());
        let (executor, _) = executor_with(tree, Arc::clone(&bridge));

        executor.tap(&go_selector()).await.unwrap();
        for _ in 0..100 {
            if bridge.overlay_count() > 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("overlay was never scheduled after a successful tap");
    }

    #[tokio::test]
    async fn test_open_app_drawer_prefers_direct_global() {
        let tree = Arc::new(MockTree::empty());
        let bridge = Arc::new(MockBridge::new());
        let (executor, _) = executor_with(tree, Arc::clone(&bridge));

        let message = executor
            .global_action(GlobalActionId::OpenAppDrawer)
            .await
            .unwrap();
        assert_eq!(message, "Opened the app drawer.");
        assert_eq!(bridge.globals(), vec![SystemAction::AllApps]);
    }

    #[tokio::test]
    async fn test_open_app_drawer_falls_back_to_labelled_icon() {
        let icon_label = MockNode::new().text("Apps").window(0);
        let icon = MockNode::new()
            .class_name("android.widget.FrameLayout")
            .window(0)
            .bounds(Rect::new(480, 1700, 600, 1820))
            .clickable()
            .child(icon_label);
        let tree = Arc::new(MockTree::new(MockNode::new().window(0).child(icon)));
        let bridge = Arc::new(MockBridge::new());
        bridge.set_global_result(SystemAction::AllApps, false);
        let (executor, _) = executor_with(tree, Arc::clone(&bridge));

        let message = executor
            .global_action(GlobalActionId::OpenAppDrawer)
            .await
            .unwrap();
        assert_eq!(message, "Opened the app drawer via the launcher icon.");
        // Tapped the clickable ancestor's center, not the bare label.
        assert_eq!(bridge.gestures(), vec![Gesture::Tap { x: 540, y: 1760 }]);
    }

    #[tokio::test]
    async fn test_open_app_drawer_last_resort_home_swipe() {
        let tree = Arc::new(MockTree::empty());
        let bridge = Arc::new(MockBridge::new());
        bridge.set_global_result(SystemAction::AllApps, false);
        let (executor, _) = executor_with(tree, Arc::clone(&bridge));

        let message = executor
            .global_action(GlobalActionId::OpenAppDrawer)
            .await
            .unwrap();
        assert_eq!(message, "Opened the app drawer with home and swipe up.");
        assert_eq!(
            bridge.globals(),
            vec![SystemAction::AllApps, SystemAction::Home]
        );
        assert!(matches!(
            bridge.gestures().as_slice(),
            [Gesture::Swipe { .. }]
        ));
    }

    #[tokio::test]
    async fn test_wait_sleeps_for_duration() {
        let tree = Arc::new(MockTree::empty());
        let bridge = Arc::new(MockBridge::new());
        let (executor, _) = executor_with(tree, bridge);

        let started = std::time::Instant::now();
        let message = executor.wait(50).await.unwrap();
        assert_eq!(message, "Waited 50 ms.");
        assert!(started.elapsed() >= Duration::from_millis(50));
    }
}
