#![deny(clippy::all)]

mod action;
pub mod error_codes;
mod types;

pub use action::Action;
pub use action::GlobalActionId;
pub use action::SwipeDirection;
pub use action::VolumeDirection;
pub use action::VolumeStream;
pub use types::correlation_id_of;
pub use types::new_correlation_id;
pub use types::CommandEnvelope;
pub use types::CommandResult;
pub use types::ProtocolError;
