//! Domain errors for resolution and action execution.
//!
//! These map to semantic error codes in `droid_use_ipc::error_codes` and
//! carry structured context so the remote agent can replan
//! programmatically instead of parsing prose.

use serde_json::json;
use serde_json::Value;
use thiserror::Error;

use droid_use_ipc::error_codes;
use droid_use_ipc::error_codes::ErrorCategory;

use crate::platform::LaunchError;

/// Terminal resolution failures. Transient conditions (stale cache entry,
/// absent root mid-strategy) drive fallthrough inside the resolver and
/// never appear here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("selector could not be resolved: no accessibility tree is available")]
    TreeUnavailable,
    #[error("selector could not be resolved: no candidate matched")]
    NoCandidate,
    #[error("selector could not be resolved: best candidate failed the {check} check")]
    CandidateRejected { check: &'static str },
}

impl ResolveError {
    pub fn code(&self) -> i32 {
        match self {
            ResolveError::TreeUnavailable => error_codes::TREE_UNAVAILABLE,
            ResolveError::NoCandidate => error_codes::SELECTOR_UNRESOLVED,
            ResolveError::CandidateRejected { .. } => error_codes::CANDIDATE_REJECTED,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        error_codes::category_for_code(self.code())
    }

    pub fn context(&self) -> Value {
        match self {
            ResolveError::TreeUnavailable => json!({}),
            ResolveError::NoCandidate => json!({}),
            ResolveError::CandidateRejected { check } => json!({ "failed_check": check }),
        }
    }

    pub fn suggestion(&self) -> String {
        match self {
            ResolveError::TreeUnavailable => {
                "No window content is available yet. Request a fresh node dump once the UI settles."
                    .to_string()
            }
            ResolveError::NoCandidate => {
                "The element may have left the screen. Request fresh nodes and rebuild the selector."
                    .to_string()
            }
            ResolveError::CandidateRejected { .. } => {
                "A similar element exists but its state changed. Re-observe before acting."
                    .to_string()
            }
        }
    }
}

/// Execution failures reported back to the server. Every variant renders
/// as a single human-readable message; none escapes the dispatcher as a
/// panic or a raw platform exception.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("tap target center ({x}, {y}) is outside the screen")]
    TargetOffScreen { x: i32, y: i32 },
    #[error("element is not editable")]
    NotEditable,
    #[error("selector was not captured as long-clickable")]
    NotLongClickable,
    #[error("invalid selection range: start {start} is past end {end}")]
    InvalidSelectionRange { start: usize, end: usize },
    #[error("exactly one of 'level' or 'direction' must be provided")]
    VolumeParams,
    #[error("Failed to dispatch {what}.")]
    DispatchFailed { what: String },
    #[error("{what} gesture was cancelled before completion")]
    GestureCancelled { what: &'static str },
    #[error("platform rejected the {action} action")]
    NodeActionFailed { action: &'static str },
    #[error("target node went stale during {op}")]
    StaleNode { op: &'static str },
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error("background task failed: {0}")]
    Background(String),
}

impl ActionError {
    pub fn code(&self) -> i32 {
        match self {
            ActionError::Resolve(e) => e.code(),
            ActionError::TargetOffScreen { .. } => error_codes::TARGET_OFF_SCREEN,
            ActionError::NotEditable => error_codes::NOT_EDITABLE,
            ActionError::NotLongClickable => error_codes::NOT_LONG_CLICKABLE,
            ActionError::InvalidSelectionRange { .. } | ActionError::VolumeParams => {
                error_codes::INVALID_PARAMS
            }
            ActionError::DispatchFailed { .. } | ActionError::NodeActionFailed { .. } => {
                error_codes::DISPATCH_FAILED
            }
            ActionError::GestureCancelled { .. } => error_codes::GESTURE_CANCELLED,
            ActionError::StaleNode { .. } => error_codes::NODE_STALE,
            ActionError::Launch(LaunchError::PackageNotFound(_)) => error_codes::PACKAGE_NOT_FOUND,
            ActionError::Launch(LaunchError::ActivityNotFound { .. }) => {
                error_codes::ACTIVITY_NOT_FOUND
            }
            ActionError::Launch(LaunchError::PermissionDenied(_)) => error_codes::LAUNCH_DENIED,
            ActionError::Background(_) => error_codes::GENERIC_ERROR,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        error_codes::category_for_code(self.code())
    }

    pub fn context(&self) -> Value {
        match self {
            ActionError::Resolve(e) => e.context(),
            ActionError::TargetOffScreen { x, y } => json!({ "x": x, "y": y }),
            ActionError::NotEditable | ActionError::NotLongClickable | ActionError::VolumeParams => {
                json!({})
            }
            ActionError::InvalidSelectionRange { start, end } => {
                json!({ "start": start, "end": end })
            }
            ActionError::DispatchFailed { what } => json!({ "what": what }),
            ActionError::GestureCancelled { what } => json!({ "what": what }),
            ActionError::NodeActionFailed { action } => json!({ "action": action }),
            ActionError::StaleNode { op } => json!({ "operation": op }),
            ActionError::Launch(LaunchError::PackageNotFound(package)) => {
                json!({ "package": package })
            }
            ActionError::Launch(LaunchError::ActivityNotFound { package, activity }) => {
                json!({ "package": package, "activity": activity })
            }
            ActionError::Launch(LaunchError::PermissionDenied(package)) => {
                json!({ "package": package })
            }
            ActionError::Background(reason) => json!({ "reason": reason }),
        }
    }

    pub fn suggestion(&self) -> String {
        match self {
            ActionError::Resolve(e) => e.suggestion(),
            ActionError::TargetOffScreen { .. } => {
                "The element is outside the visible display. Scroll it into view first.".to_string()
            }
            ActionError::NotEditable => {
                "Only editable fields accept text. Tap the field first or pick an input element."
                    .to_string()
            }
            ActionError::NotLongClickable => {
                "Capture the selector from a node reported as long-clickable.".to_string()
            }
            ActionError::InvalidSelectionRange { .. } | ActionError::VolumeParams => {
                "Check the action parameters against the protocol description.".to_string()
            }
            ActionError::DispatchFailed { .. } | ActionError::NodeActionFailed { .. } => {
                "The platform refused the operation. Re-observe the screen and retry once."
                    .to_string()
            }
            ActionError::GestureCancelled { .. } => {
                "The gesture was interrupted, likely by a screen change. Re-observe and retry."
                    .to_string()
            }
            ActionError::StaleNode { .. } => {
                "The UI changed mid-action. Request fresh nodes and retry.".to_string()
            }
            ActionError::Launch(LaunchError::PackageNotFound(_)) => {
                "Use 'request_list_packages' to see what is installed.".to_string()
            }
            ActionError::Launch(LaunchError::ActivityNotFound { .. }) => {
                "Omit 'activity' to use the package's default launch activity.".to_string()
            }
            ActionError::Launch(LaunchError::PermissionDenied(_)) => {
                "This package cannot be launched from the accessibility service.".to_string()
            }
            ActionError::Background(_) => "Internal engine error; retry the action.".to_string(),
        }
    }
}
