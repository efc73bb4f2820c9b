use std::env;
use std::time::Duration;

use crate::store::DEFAULT_SNAPSHOT_CAPACITY;

const DEFAULT_INPUT_SETTLE_MS: u64 = 200;
const DEFAULT_GESTURE_DURATION_MS: u64 = 300;
const DEFAULT_OVERLAY_MS: u64 = 1200;

/// Engine tuning knobs. The settle delay absorbs IME and redraw latency
/// after text injection; the gesture duration matches what the platform
/// animates for a natural swipe.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub snapshot_capacity: usize,
    pub input_settle: Duration,
    pub gesture_duration: Duration,
    pub overlay_duration: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self {
            snapshot_capacity: env::var("DROID_USE_SNAPSHOT_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SNAPSHOT_CAPACITY),
            input_settle: Duration::from_millis(
                env::var("DROID_USE_INPUT_SETTLE_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_INPUT_SETTLE_MS),
            ),
            gesture_duration: Duration::from_millis(
                env::var("DROID_USE_GESTURE_DURATION_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_GESTURE_DURATION_MS),
            ),
            overlay_duration: Duration::from_millis(
                env::var("DROID_USE_OVERLAY_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_OVERLAY_MS),
            ),
        }
    }

    pub fn with_snapshot_capacity(mut self, capacity: usize) -> Self {
        self.snapshot_capacity = capacity;
        self
    }

    pub fn with_input_settle(mut self, settle: Duration) -> Self {
        self.input_settle = settle;
        self
    }

    pub fn with_gesture_duration(mut self, duration: Duration) -> Self {
        self.gesture_duration = duration;
        self
    }

    pub fn with_overlay_duration(mut self, duration: Duration) -> Self {
        self.overlay_duration = duration;
        self
    }
}
