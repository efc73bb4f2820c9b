//! Semantic error codes carried in failure replies.
//!
//! Codes live in the -32000..-32099 band so the server can distinguish
//! engine failures from transport-level errors; the remote agent keys its
//! replanning on category and retryability rather than prose.

// Resolution errors
pub const SELECTOR_UNRESOLVED: i32 = -32001;
pub const CANDIDATE_REJECTED: i32 = -32002;
pub const TREE_UNAVAILABLE: i32 = -32003;

// Action preconditions
pub const TARGET_OFF_SCREEN: i32 = -32004;
pub const NOT_EDITABLE: i32 = -32005;
pub const NOT_LONG_CLICKABLE: i32 = -32006;
pub const INVALID_PARAMS: i32 = -32007;

// Dispatch errors
pub const DISPATCH_FAILED: i32 = -32008;
pub const GESTURE_CANCELLED: i32 = -32009;
pub const NODE_STALE: i32 = -32010;

// App launch errors
pub const PACKAGE_NOT_FOUND: i32 = -32011;
pub const ACTIVITY_NOT_FOUND: i32 = -32012;
pub const LAUNCH_DENIED: i32 = -32013;

// Legacy generic error (for backwards compatibility)
pub const GENERIC_ERROR: i32 = -32000;

/// Error category for programmatic handling by the remote agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Target not found (selector unresolved, package missing)
    NotFound,
    /// Invalid or contradictory parameters
    InvalidInput,
    /// Target found but not in an actionable state
    Precondition,
    /// Platform refused or abandoned the operation
    External,
    /// Internal engine error
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::InvalidInput => "invalid_input",
            ErrorCategory::Precondition => "precondition",
            ErrorCategory::External => "external",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ErrorCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_found" => Ok(ErrorCategory::NotFound),
            "invalid_input" => Ok(ErrorCategory::InvalidInput),
            "precondition" => Ok(ErrorCategory::Precondition),
            "external" => Ok(ErrorCategory::External),
            "internal" => Ok(ErrorCategory::Internal),
            _ => Err(()),
        }
    }
}

/// Whether a failed command may succeed if reissued against the next
/// screen state. The UI is asynchronous, so anything keyed to a stale
/// observation is worth one more look after a fresh capture.
pub fn is_retryable(code: i32) -> bool {
    matches!(
        code,
        SELECTOR_UNRESOLVED | CANDIDATE_REJECTED | TREE_UNAVAILABLE | NODE_STALE | GESTURE_CANCELLED
    )
}

/// Returns the error category for a given error code.
pub fn category_for_code(code: i32) -> ErrorCategory {
    match code {
        SELECTOR_UNRESOLVED | TREE_UNAVAILABLE | PACKAGE_NOT_FOUND | ACTIVITY_NOT_FOUND => {
            ErrorCategory::NotFound
        }
        INVALID_PARAMS => ErrorCategory::InvalidInput,
        CANDIDATE_REJECTED | TARGET_OFF_SCREEN | NOT_EDITABLE | NOT_LONG_CLICKABLE => {
            ErrorCategory::Precondition
        }
        DISPATCH_FAILED | GESTURE_CANCELLED | NODE_STALE | LAUNCH_DENIED => ErrorCategory::External,
        _ => ErrorCategory::Internal,
    }
}
