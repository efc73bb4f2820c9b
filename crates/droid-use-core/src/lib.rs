#![deny(clippy::all)]

mod rect;
mod scoring;
mod selector;

pub use rect::Rect;
pub use scoring::score_candidate;
pub use scoring::CandidateRank;
pub use scoring::SCORE_ACTIONABILITY;
pub use scoring::SCORE_CLASS_NAME;
pub use scoring::SCORE_CONTENT_DESC;
pub use scoring::SCORE_TEXT;
pub use scoring::SCORE_VIEW_ID;
pub use selector::Selector;
pub use selector::SelectorKey;
