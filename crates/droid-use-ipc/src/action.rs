use serde::Deserialize;
use serde::Serialize;

use droid_use_core::Selector;

/// Every command the remote agent can send to the device, with its typed
/// parameter payload. Wire names follow the server's action vocabulary;
/// an unknown `action_type` fails deserialization and is reported as a
/// parameter error by the dispatcher rather than reaching execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action_type", content = "parameters", rename_all = "snake_case")]
pub enum Action {
    TapBySelector {
        selector: Selector,
    },
    InputBySelector {
        selector: Selector,
        text_to_type: String,
    },
    CopyBySelector {
        selector: Selector,
    },
    PasteBySelector {
        selector: Selector,
    },
    SelectBySelector {
        selector: Selector,
        #[serde(default)]
        start: Option<usize>,
        #[serde(default)]
        end: Option<usize>,
    },
    LongClickBySelector {
        selector: Selector,
    },
    PerformGlobalAction {
        action_id: GlobalActionId,
    },
    SwipeSemantic {
        direction: SwipeDirection,
    },
    LaunchApp {
        package_name: String,
        #[serde(default)]
        activity: Option<String>,
    },
    SetVolume {
        stream: VolumeStream,
        #[serde(default)]
        level: Option<u8>,
        #[serde(default)]
        direction: Option<VolumeDirection>,
    },
    Wait {
        duration_ms: u64,
    },
    RequestAllNodes,
    RequestInteractiveNodes,
    RequestClickableNodes,
    RequestNodesByText {
        text: String,
    },
    RequestListPackages,
}

impl Action {
    /// Wire name of the action, used in log lines and reply messages.
    pub fn name(&self) -> &'static str {
        match self {
            Action::TapBySelector { .. } => "tap_by_selector",
            Action::InputBySelector { .. } => "input_by_selector",
            Action::CopyBySelector { .. } => "copy_by_selector",
            Action::PasteBySelector { .. } => "paste_by_selector",
            Action::SelectBySelector { .. } => "select_by_selector",
            Action::LongClickBySelector { .. } => "long_click_by_selector",
            Action::PerformGlobalAction { .. } => "perform_global_action",
            Action::SwipeSemantic { .. } => "swipe_semantic",
            Action::LaunchApp { .. } => "launch_app",
            Action::SetVolume { .. } => "set_volume",
            Action::Wait { .. } => "wait",
            Action::RequestAllNodes => "request_all_nodes",
            Action::RequestInteractiveNodes => "request_interactive_nodes",
            Action::RequestClickableNodes => "request_clickable_nodes",
            Action::RequestNodesByText { .. } => "request_nodes_by_text",
            Action::RequestListPackages => "request_list_packages",
        }
    }
}

/// Symbolic global navigation actions. Aliases accept the legacy
/// platform-constant spelling the server historically sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalActionId {
    #[serde(alias = "GLOBAL_ACTION_BACK")]
    Back,
    #[serde(alias = "GLOBAL_ACTION_HOME")]
    Home,
    #[serde(alias = "GLOBAL_ACTION_RECENTS")]
    Recents,
    #[serde(alias = "GLOBAL_ACTION_NOTIFICATIONS")]
    Notifications,
    #[serde(alias = "GLOBAL_ACTION_QUICK_SETTINGS")]
    QuickSettings,
    #[serde(alias = "GLOBAL_ACTION_POWER_DIALOG")]
    PowerDialog,
    #[serde(alias = "GLOBAL_ACTION_OPEN_APP_DRAWER")]
    OpenAppDrawer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

impl std::fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SwipeDirection::Up => "up",
            SwipeDirection::Down => "down",
            SwipeDirection::Left => "left",
            SwipeDirection::Right => "right",
        };
        write!(f, "{}", s)
    }
}

/// Audio streams addressable by `set_volume`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeStream {
    Music,
    Ring,
    Alarm,
    Notification,
    System,
    VoiceCall,
}

impl std::fmt::Display for VolumeStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VolumeStream::Music => "music",
            VolumeStream::Ring => "ring",
            VolumeStream::Alarm => "alarm",
            VolumeStream::Notification => "notification",
            VolumeStream::System => "system",
            VolumeStream::VoiceCall => "voice_call",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeDirection {
    Up,
    Down,
}

impl std::fmt::Display for VolumeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                VolumeDirection::Up => "up",
                VolumeDirection::Down => "down",
            }
        )
    }
}
