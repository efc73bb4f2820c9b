use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use droid_use_core::Selector;

use crate::action::Action;

/// One inbound command from the server. The `action_type`/`parameters`
/// pair is flattened into the envelope on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub correlation_id: String,
    #[serde(flatten)]
    pub action: Action,
}

impl CommandEnvelope {
    pub fn new(correlation_id: impl Into<String>, action: Action) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            action,
        }
    }

    /// Parses a raw message. On malformed input the error still carries
    /// the correlation id when one could be extracted, so the caller can
    /// route a failure reply.
    pub fn parse(raw: &Value) -> Result<Self, ProtocolError> {
        serde_json::from_value(raw.clone()).map_err(|source| ProtocolError::Malformed {
            correlation_id: correlation_id_of(raw),
            detail: source.to_string(),
        })
    }
}

/// Extracts the correlation id from a raw message, if present.
pub fn correlation_id_of(raw: &Value) -> Option<String> {
    raw.get("correlation_id")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Fresh correlation id for client-originated messages.
pub fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed command: {detail}")]
    Malformed {
        correlation_id: Option<String>,
        detail: String,
    },
}

/// The single reply every inbound command produces. `nodes` is populated
/// for node queries, `packages` for `request_list_packages`; both are
/// omitted from the wire otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    pub correlation_id: String,
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<Selector>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<String>>,
}

impl CommandResult {
    pub fn ok(correlation_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            success: true,
            message: message.into(),
            nodes: None,
            packages: None,
        }
    }

    pub fn failed(correlation_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            success: false,
            message: message.into(),
            nodes: None,
            packages: None,
        }
    }

    pub fn with_nodes(mut self, nodes: Vec<Selector>) -> Self {
        self.nodes = Some(nodes);
        self
    }

    pub fn with_packages(mut self, packages: Vec<String>) -> Self {
        self.packages = Some(packages);
        self
    }
}
