use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

use serde::Deserialize;
use serde::Serialize;

use crate::rect::Rect;

/// Immutable description of a UI element as last observed, used to re-find
/// the element in a later accessibility-tree generation.
///
/// At least one of `view_id`, `text`, `content_desc` must be non-empty for
/// the selector to be matchable by attribute search; a selector carrying
/// only `class_name` and `bounds` can still be matched geometrically.
/// Field names mirror the wire protocol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default)]
    pub window_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
    #[serde(default)]
    pub is_clickable: bool,
    #[serde(default)]
    pub is_editable: bool,
    #[serde(default)]
    pub is_long_clickable: bool,
}

impl Selector {
    /// True when the selector carries at least one identifying attribute
    /// and can therefore be matched by attribute search. Selectors without
    /// identity are only eligible for bounds-fallback matching.
    pub fn has_identity(&self) -> bool {
        fn present(v: &Option<String>) -> bool {
            v.as_deref().is_some_and(|s| !s.is_empty())
        }
        present(&self.view_id) || present(&self.text) || present(&self.content_desc)
    }

    /// True when the selector carries what bounds-fallback matching needs.
    pub fn supports_bounds_fallback(&self) -> bool {
        self.bounds.is_some() && self.class_name.as_deref().is_some_and(|c| !c.is_empty())
    }

    /// Snapshot-store key for this selector: the window plus the view id
    /// when one is present, otherwise the window plus a structural hash of
    /// the remaining identifying attributes.
    pub fn key(&self) -> SelectorKey {
        match self.view_id.as_deref() {
            Some(id) if !id.is_empty() => SelectorKey::ViewId {
                window_id: self.window_id,
                view_id: id.to_string(),
            },
            _ => {
                let mut hasher = DefaultHasher::new();
                self.class_name.hash(&mut hasher);
                self.text.hash(&mut hasher);
                self.content_desc.hash(&mut hasher);
                SelectorKey::Structural {
                    window_id: self.window_id,
                    hash: hasher.finish(),
                }
            }
        }
    }
}

/// Composite key identifying a cached node snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectorKey {
    ViewId { window_id: i32, view_id: String },
    Structural { window_id: i32, hash: u64 },
}
