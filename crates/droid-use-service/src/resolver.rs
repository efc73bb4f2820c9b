use std::sync::Arc;

use tracing::debug;

use droid_use_core::score_candidate;
use droid_use_core::CandidateRank;
use droid_use_core::Selector;

use crate::error::ResolveError;
use crate::platform::NodeHandle;
use crate::platform::UiTree;
use crate::query::NodeQueryEngine;
use crate::store::release_handles;
use crate::store::NodeSnapshotStore;

/// Minimum bounds overlap for a cached handle to still count as the same
/// element. Stricter than the primary threshold: a cache hit skips the
/// tree walk entirely, so the geometric evidence must be strong.
const CACHE_MIN_IOU: f64 = 0.7;
/// Overlap required of a freshly-found primary candidate.
const PRIMARY_MIN_IOU: f64 = 0.5;
/// Overlap required of a bounds-fallback candidate, both for selection
/// and for validation.
const FALLBACK_MIN_IOU: f64 = 0.7;

/// Which strategy produced a resolution. Diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedVia {
    Cache,
    Primary,
    BoundsFallback,
}

impl std::fmt::Display for ResolvedVia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResolvedVia::Cache => "cache",
            ResolvedVia::Primary => "primary",
            ResolvedVia::BoundsFallback => "bounds_fallback",
        };
        write!(f, "{}", s)
    }
}

/// A successful resolution: an owned live handle the caller must release
/// (by dropping), plus the strategy that produced it.
#[derive(Debug)]
pub struct Resolution {
    pub handle: NodeHandle,
    pub via: ResolvedVia,
}

/// Why a candidate that was found could not be used.
#[derive(Debug, Clone, Copy)]
enum Rejection {
    Stale,
    WindowMismatch,
    MissingFlags,
    BoundsDrift,
}

impl Rejection {
    fn check(self) -> &'static str {
        match self {
            Rejection::Stale => "liveness",
            Rejection::WindowMismatch => "window",
            Rejection::MissingFlags => "actionability",
            Rejection::BoundsDrift => "bounds-overlap",
        }
    }
}

/// Turns a selector into exactly one live, actionable handle, or a
/// definitive failure. Strategies are tried in order: snapshot cache,
/// primary scored search, bounds fallback. Transient failures at each
/// step fall through to the next.
pub struct SelectorResolver {
    tree: Arc<dyn UiTree>,
    store: Arc<NodeSnapshotStore>,
    query: NodeQueryEngine,
}

impl SelectorResolver {
    pub fn new(tree: Arc<dyn UiTree>, store: Arc<NodeSnapshotStore>) -> Self {
        let query = NodeQueryEngine::new(Arc::clone(&tree));
        Self { tree, store, query }
    }

    pub fn resolve(&self, selector: &Selector) -> Result<Resolution, ResolveError> {
        if let Some(resolution) = self.try_cache(selector) {
            debug!(via = %resolution.via, "selector resolved");
            return Ok(resolution);
        }

        let mut candidates = self.query.query_all();
        if candidates.is_empty() {
            return Err(if self.tree.active_root().is_none() {
                ResolveError::TreeUnavailable
            } else {
                ResolveError::NoCandidate
            });
        }

        let mut rejection: Option<Rejection> = None;

        // Primary scored search. A selector with no identifying attribute
        // would tie every node of its class, so it goes straight to the
        // geometric fallback.
        if selector.has_identity() {
            if let Some(index) = best_primary_index(selector, &candidates) {
                let (_, handle) = candidates.swap_remove(index);
                match validate(selector, &handle, PRIMARY_MIN_IOU, false) {
                    Ok(()) => {
                        self.cache_winner(selector, &handle);
                        debug!(via = %ResolvedVia::Primary, "selector resolved");
                        return Ok(Resolution {
                            handle,
                            via: ResolvedVia::Primary,
                        });
                    }
                    Err(r) => {
                        debug!(check = r.check(), "primary candidate rejected");
                        rejection = Some(r);
                    }
                }
            }
        }

        // Bounds fallback: geometry plus element class stand in for the
        // missing (or non-matching) identity attributes.
        if selector.supports_bounds_fallback() {
            if let Some(index) = best_fallback_index(selector, &candidates) {
                let (_, handle) = candidates.swap_remove(index);
                match validate(selector, &handle, FALLBACK_MIN_IOU, false) {
                    Ok(()) => {
                        self.cache_winner(selector, &handle);
                        debug!(via = %ResolvedVia::BoundsFallback, "selector resolved");
                        return Ok(Resolution {
                            handle,
                            via: ResolvedVia::BoundsFallback,
                        });
                    }
                    Err(r) => {
                        debug!(check = r.check(), "fallback candidate rejected");
                        rejection = Some(r);
                    }
                }
            }
        }

        Err(match rejection {
            Some(r) => ResolveError::CandidateRejected { check: r.check() },
            None => ResolveError::NoCandidate,
        })
    }

    /// Cache strategy: take the entry out, validate it against the live
    /// tree, and on success hand the caller a fresh duplicate while the
    /// validated original returns to the store's MRU position.
    fn try_cache(&self, selector: &Selector) -> Option<Resolution> {
        let key = selector.key();
        let cached = self.store.take(&key)?;

        match validate(selector, &cached, CACHE_MIN_IOU, true) {
            Ok(()) => match cached.duplicate() {
                Ok(for_caller) => {
                    release_handles(self.store.insert(key, cached));
                    Some(Resolution {
                        handle: for_caller,
                        via: ResolvedVia::Cache,
                    })
                }
                Err(_) => {
                    release_handles(vec![cached]);
                    None
                }
            },
            Err(rejection) => {
                debug!(check = rejection.check(), "cache entry evicted");
                release_handles(vec![cached]);
                None
            }
        }
    }

    fn cache_winner(&self, selector: &Selector, winner: &NodeHandle) {
        if let Ok(copy) = winner.duplicate() {
            release_handles(self.store.insert(selector.key(), copy));
        }
    }
}

/// Checks a candidate against the selector's requirements. `require_window`
/// is set only for cached handles; fresh candidates were already
/// window-filtered during selection.
fn validate(
    selector: &Selector,
    handle: &NodeHandle,
    min_iou: f64,
    require_window: bool,
) -> Result<(), Rejection> {
    if !handle.refresh() {
        return Err(Rejection::Stale);
    }

    if require_window {
        let window_id = handle.window_id().map_err(|_| Rejection::Stale)?;
        if window_id != selector.window_id {
            return Err(Rejection::WindowMismatch);
        }
    }

    let clickable = handle.is_clickable().map_err(|_| Rejection::Stale)?;
    let editable = handle.is_editable().map_err(|_| Rejection::Stale)?;
    let long_clickable = handle.is_long_clickable().map_err(|_| Rejection::Stale)?;
    if (selector.is_clickable && !clickable)
        || (selector.is_editable && !editable)
        || (selector.is_long_clickable && !long_clickable)
    {
        return Err(Rejection::MissingFlags);
    }

    if let Some(expected) = selector.bounds {
        let live = handle.bounds_in_screen().map_err(|_| Rejection::Stale)?;
        if expected.iou(&live) < min_iou {
            return Err(Rejection::BoundsDrift);
        }
    }

    Ok(())
}

fn best_primary_index(selector: &Selector, candidates: &[(Selector, NodeHandle)]) -> Option<usize> {
    let mut best: Option<(usize, CandidateRank)> = None;
    for (index, (projection, _)) in candidates.iter().enumerate() {
        let Some(score) = score_candidate(selector, projection) else {
            continue;
        };
        let rank = CandidateRank::new(selector, projection, score);
        match &best {
            Some((_, incumbent)) if !rank.beats(incumbent) => {}
            _ => best = Some((index, rank)),
        }
    }
    best.map(|(index, _)| index)
}

fn best_fallback_index(selector: &Selector, candidates: &[(Selector, NodeHandle)]) -> Option<usize> {
    let expected_bounds = selector.bounds?;
    let expected_class = selector.class_name.as_deref()?;

    let mut best: Option<(usize, f64)> = None;
    for (index, (projection, _)) in candidates.iter().enumerate() {
        if projection.class_name.as_deref() != Some(expected_class) {
            continue;
        }
        let Some(bounds) = projection.bounds else {
            continue;
        };
        let iou = expected_bounds.iou(&bounds);
        if iou < FALLBACK_MIN_IOU {
            continue;
        }
        match best {
            Some((_, incumbent)) if iou <= incumbent => {}
            _ => best = Some((index, iou)),
        }
    }
    best.map(|(index, _)| index)
}
