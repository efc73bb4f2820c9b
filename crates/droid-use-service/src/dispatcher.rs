use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use tracing::warn;

use droid_use_core::Selector;
use droid_use_ipc::Action;
use droid_use_ipc::CommandEnvelope;
use droid_use_ipc::CommandResult;
use droid_use_ipc::ProtocolError;

use crate::error::ActionError;
use crate::executor::ActionExecutor;
use crate::query::QueryKind;

/// Routes each inbound command to the executor and converts whatever
/// happens into exactly one [`CommandResult`]. Errors never cross this
/// boundary: a malformed message, a failed resolution, and a platform
/// refusal all come back as `success: false` with a message.
pub struct CommandDispatcher {
    executor: Arc<ActionExecutor>,
}

enum Reply {
    Message(String),
    Nodes(Vec<Selector>),
    Packages(Vec<String>),
}

impl CommandDispatcher {
    pub fn new(executor: Arc<ActionExecutor>) -> Self {
        Self { executor }
    }

    /// Handles a raw message as it comes off the wire.
    pub async fn dispatch_value(&self, raw: &Value) -> CommandResult {
        match CommandEnvelope::parse(raw) {
            Ok(envelope) => self.dispatch(envelope).await,
            Err(ProtocolError::Malformed {
                correlation_id,
                detail,
            }) => {
                warn!(detail = %detail, "rejecting malformed command");
                CommandResult::failed(
                    correlation_id.unwrap_or_else(|| "unknown".to_string()),
                    format!("Invalid command: {}", detail),
                )
            }
        }
    }

    pub async fn dispatch(&self, envelope: CommandEnvelope) -> CommandResult {
        let CommandEnvelope {
            correlation_id,
            action,
        } = envelope;
        let name = action.name();
        debug!(action = name, correlation_id = %correlation_id, "dispatching");

        match self.run(action).await {
            Ok(Reply::Message(message)) => CommandResult::ok(correlation_id, message),
            Ok(Reply::Nodes(nodes)) => {
                CommandResult::ok(correlation_id, format!("Collected {} nodes.", nodes.len()))
                    .with_nodes(nodes)
            }
            Ok(Reply::Packages(packages)) => CommandResult::ok(
                correlation_id,
                format!("Listed {} packages.", packages.len()),
            )
            .with_packages(packages),
            Err(error) => {
                warn!(action = name, error = %error, code = error.code(), "action failed");
                CommandResult::failed(correlation_id, error.to_string())
            }
        }
    }

    async fn run(&self, action: Action) -> Result<Reply, ActionError> {
        let executor = &self.executor;
        let reply = match action {
            Action::TapBySelector { selector } => Reply::Message(executor.tap(&selector).await?),
            Action::InputBySelector {
                selector,
                text_to_type,
            } => Reply::Message(executor.input(&selector, &text_to_type).await?),
            Action::CopyBySelector { selector } => Reply::Message(executor.copy(&selector).await?),
            Action::PasteBySelector { selector } => {
                Reply::Message(executor.paste(&selector).await?)
            }
            Action::SelectBySelector {
                selector,
                start,
                end,
            } => Reply::Message(executor.select_range(&selector, start, end).await?),
            Action::LongClickBySelector { selector } => {
                Reply::Message(executor.long_click(&selector).await?)
            }
            Action::PerformGlobalAction { action_id } => {
                Reply::Message(executor.global_action(action_id).await?)
            }
            Action::SwipeSemantic { direction } => {
                Reply::Message(executor.swipe(direction).await?)
            }
            Action::LaunchApp {
                package_name,
                activity,
            } => Reply::Message(executor.launch_app(&package_name, activity.as_deref())?),
            Action::SetVolume {
                stream,
                level,
                direction,
            } => Reply::Message(executor.set_volume(stream, level, direction)?),
            Action::Wait { duration_ms } => Reply::Message(executor.wait(duration_ms).await?),
            Action::RequestAllNodes => {
                Reply::Nodes(executor.query_nodes(QueryKind::All).await?)
            }
            Action::RequestInteractiveNodes => {
                Reply::Nodes(executor.query_nodes(QueryKind::Interactive).await?)
            }
            Action::RequestClickableNodes => {
                Reply::Nodes(executor.query_nodes(QueryKind::Clickable).await?)
            }
            Action::RequestNodesByText { text } => {
                Reply::Nodes(executor.query_nodes(QueryKind::ByText(text)).await?)
            }
            Action::RequestListPackages => Reply::Packages(executor.list_packages()),
        };
        Ok(reply)
    }
}
