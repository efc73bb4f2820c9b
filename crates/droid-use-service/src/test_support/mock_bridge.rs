use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use droid_use_common::mutex_lock_or_recover;
use droid_use_core::Rect;
use droid_use_ipc::VolumeDirection;
use droid_use_ipc::VolumeStream;

use crate::platform::DeviceBridge;
use crate::platform::Gesture;
use crate::platform::GestureOutcome;
use crate::platform::LaunchError;
use crate::platform::SystemAction;

/// Records every device-level call and answers with scripted outcomes.
/// Defaults are permissive: gestures complete, globals dispatch, launches
/// succeed.
pub struct MockBridge {
    gestures: Mutex<Vec<Gesture>>,
    gesture_outcome: Mutex<GestureOutcome>,
    globals: Mutex<Vec<SystemAction>>,
    global_results: Mutex<HashMap<SystemAction, bool>>,
    launches: Mutex<Vec<(String, Option<String>)>>,
    launch_result: Mutex<Result<(), LaunchError>>,
    packages: Mutex<Vec<String>>,
    volume_range: Mutex<(i32, i32)>,
    volume_sets: Mutex<Vec<(VolumeStream, i32)>>,
    volume_adjusts: Mutex<Vec<(VolumeStream, VolumeDirection)>>,
    overlays: Mutex<Vec<(usize, Duration)>>,
}

impl Default for MockBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBridge {
    pub fn new() -> Self {
        Self {
            gestures: Mutex::new(Vec::new()),
            gesture_outcome: Mutex::new(GestureOutcome::Completed),
            globals: Mutex::new(Vec::new()),
            global_results: Mutex::new(HashMap::new()),
            launches: Mutex::new(Vec::new()),
            launch_result: Mutex::new(Ok(())),
            packages: Mutex::new(Vec::new()),
            volume_range: Mutex::new((0, 15)),
            volume_sets: Mutex::new(Vec::new()),
            volume_adjusts: Mutex::new(Vec::new()),
            overlays: Mutex::new(Vec::new()),
        }
    }

    // Scripting.

    /// Outcome returned for every subsequent gesture dispatch.
    pub fn script_gesture_outcome(&self, outcome: GestureOutcome) {
        *mutex_lock_or_recover(&self.gesture_outcome) = outcome;
    }

    pub fn set_global_result(&self, action: SystemAction, dispatched: bool) {
        mutex_lock_or_recover(&self.global_results).insert(action, dispatched);
    }

    pub fn set_launch_result(&self, result: Result<(), LaunchError>) {
        *mutex_lock_or_recover(&self.launch_result) = result;
    }

    pub fn set_packages(&self, packages: Vec<String>) {
        *mutex_lock_or_recover(&self.packages) = packages;
    }

    pub fn set_volume_range(&self, min: i32, max: i32) {
        *mutex_lock_or_recover(&self.volume_range) = (min, max);
    }

    // Observation.

    pub fn gestures(&self) -> Vec<Gesture> {
        mutex_lock_or_recover(&self.gestures).clone()
    }

    pub fn globals(&self) -> Vec<SystemAction> {
        mutex_lock_or_recover(&self.globals).clone()
    }

    pub fn launches(&self) -> Vec<(String, Option<String>)> {
        mutex_lock_or_recover(&self.launches).clone()
    }

    pub fn volume_sets(&self) -> Vec<(VolumeStream, i32)> {
        mutex_lock_or_recover(&self.volume_sets).clone()
    }

    pub fn volume_adjusts(&self) -> Vec<(VolumeStream, VolumeDirection)> {
        mutex_lock_or_recover(&self.volume_adjusts).clone()
    }

    pub fn overlay_count(&self) -> usize {
        mutex_lock_or_recover(&self.overlays).len()
    }
}

#[async_trait]
impl DeviceBridge for MockBridge {
    async fn dispatch_gesture(&self, gesture: Gesture) -> GestureOutcome {
        mutex_lock_or_recover(&self.gestures).push(gesture);
        *mutex_lock_or_recover(&self.gesture_outcome)
    }

    fn perform_global(&self, action: SystemAction) -> bool {
        mutex_lock_or_recover(&self.globals).push(action);
        mutex_lock_or_recover(&self.global_results)
            .get(&action)
            .copied()
            .unwrap_or(true)
    }

    fn launch_app(&self, package: &str, activity: Option<&str>) -> Result<(), LaunchError> {
        mutex_lock_or_recover(&self.launches)
            .push((package.to_string(), activity.map(str::to_string)));
        mutex_lock_or_recover(&self.launch_result).clone()
    }

    fn installed_packages(&self) -> Vec<String> {
        mutex_lock_or_recover(&self.packages).clone()
    }

    fn volume_range(&self, _stream: VolumeStream) -> (i32, i32) {
        *mutex_lock_or_recover(&self.volume_range)
    }

    fn set_volume_index(&self, stream: VolumeStream, index: i32) -> bool {
        mutex_lock_or_recover(&self.volume_sets).push((stream, index));
        true
    }

    fn adjust_volume(&self, stream: VolumeStream, direction: VolumeDirection) -> bool {
        mutex_lock_or_recover(&self.volume_adjusts).push((stream, direction));
        true
    }

    fn show_overlay(&self, rects: Vec<Rect>, duration: Duration) {
        mutex_lock_or_recover(&self.overlays).push((rects.len(), duration));
    }
}
