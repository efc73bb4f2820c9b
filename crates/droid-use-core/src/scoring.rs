use std::cmp::Ordering;

use crate::selector::Selector;

pub const SCORE_VIEW_ID: u32 = 10;
pub const SCORE_CLASS_NAME: u32 = 5;
pub const SCORE_TEXT: u32 = 3;
pub const SCORE_CONTENT_DESC: u32 = 3;
pub const SCORE_ACTIONABILITY: u32 = 1;

/// Scores a live candidate (given as its selector projection) against a
/// target selector.
///
/// Returns `None` when the candidate is disqualified: its window differs
/// from the target's, or any attribute the target carries fails to match
/// exactly. Attributes absent from the target are never scored. The
/// actionability bonus applies only when every flag the target requires
/// holds on the candidate; missing flags are left to the caller's
/// validation step rather than disqualifying here.
pub fn score_candidate(target: &Selector, candidate: &Selector) -> Option<u32> {
    if candidate.window_id != target.window_id {
        return None;
    }

    let mut score = 0u32;

    if let Some(view_id) = non_empty(&target.view_id) {
        if candidate.view_id.as_deref() != Some(view_id) {
            return None;
        }
        score += SCORE_VIEW_ID;
    }
    if let Some(class_name) = non_empty(&target.class_name) {
        if candidate.class_name.as_deref() != Some(class_name) {
            return None;
        }
        score += SCORE_CLASS_NAME;
    }
    if let Some(text) = non_empty(&target.text) {
        if candidate.text.as_deref() != Some(text) {
            return None;
        }
        score += SCORE_TEXT;
    }
    if let Some(desc) = non_empty(&target.content_desc) {
        if candidate.content_desc.as_deref() != Some(desc) {
            return None;
        }
        score += SCORE_CONTENT_DESC;
    }

    if required_flags_hold(target, candidate) {
        score += SCORE_ACTIONABILITY;
    }

    Some(score)
}

/// True when every actionability flag set on the target also holds on the
/// candidate. A target with no flags requires nothing.
fn required_flags_hold(target: &Selector, candidate: &Selector) -> bool {
    (!target.is_clickable || candidate.is_clickable)
        && (!target.is_editable || candidate.is_editable)
        && (!target.is_long_clickable || candidate.is_long_clickable)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Ordering key for a scored candidate: score first, then smaller centroid
/// distance to the target's recorded bounds, then presence of a view id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateRank {
    pub score: u32,
    pub centroid_distance: f64,
    pub has_view_id: bool,
}

impl CandidateRank {
    pub fn new(target: &Selector, candidate: &Selector, score: u32) -> Self {
        let centroid_distance = match (&target.bounds, &candidate.bounds) {
            (Some(t), Some(c)) => t.center_distance(c),
            _ => f64::INFINITY,
        };
        Self {
            score,
            centroid_distance,
            has_view_id: non_empty(&candidate.view_id).is_some(),
        }
    }

    /// True when `self` should be preferred over `other`.
    pub fn beats(&self, other: &CandidateRank) -> bool {
        match self.score.cmp(&other.score) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => match self
                .centroid_distance
                .partial_cmp(&other.centroid_distance)
                .unwrap_or(Ordering::Equal)
            {
                Ordering::Less => true,
                Ordering::Greater => false,
                Ordering::Equal => self.has_view_id && !other.has_view_id,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rect::Rect;

    fn candidate(window_id: i32) -> Selector {
        Selector {
            view_id: Some("com.app:id/search".into()),
            text: Some("Search".into()),
            content_desc: Some("Search field".into()),
            class_name: Some("android.widget.EditText".into()),
            window_id,
            bounds: Some(Rect::new(0, 0, 100, 40)),
            is_clickable: true,
            is_editable: true,
            is_long_clickable: false,
        }
    }

    #[test]
    fn test_window_mismatch_disqualifies_regardless_of_attributes() {
        let target = Selector {
            view_id: Some("com.app:id/search".into()),
            window_id: 2,
            ..Selector::default()
        };
        assert_eq!(score_candidate(&target, &candidate(3)), None);
    }

    #[test]
    fn test_full_match_scores_all_components() {
        let target = candidate(1);
        let score = score_candidate(&target, &candidate(1)).unwrap();
        assert_eq!(
            score,
            SCORE_VIEW_ID
                + SCORE_CLASS_NAME
                + SCORE_TEXT
                + SCORE_CONTENT_DESC
                + SCORE_ACTIONABILITY
        );
    }

    #[test]
    fn test_present_attribute_mismatch_disqualifies() {
        let mut target = candidate(1);
        target.text = Some("Other".into());
        assert_eq!(score_candidate(&target, &candidate(1)), None);
    }

    #[test]
    fn test_absent_attributes_are_not_scored() {
        let target = Selector {
            text: Some("Search".into()),
            window_id: 1,
            ..Selector::default()
        };
        // Text match + actionability (nothing required, so it holds).
        assert_eq!(
            score_candidate(&target, &candidate(1)),
            Some(SCORE_TEXT + SCORE_ACTIONABILITY)
        );
    }

    #[test]
    fn test_candidate_missing_required_flag_loses_bonus_only() {
        let target = Selector {
            text: Some("Search".into()),
            window_id: 1,
            is_long_clickable: true,
            ..Selector::default()
        };
        // The candidate is not long-clickable: still matches on text, no bonus.
        assert_eq!(score_candidate(&target, &candidate(1)), Some(SCORE_TEXT));
    }

    #[test]
    fn test_text_match_is_exact_not_substring() {
        let target = Selector {
            text: Some("Sear".into()),
            window_id: 1,
            ..Selector::default()
        };
        assert_eq!(score_candidate(&target, &candidate(1)), None);
    }

    #[test]
    fn test_rank_prefers_higher_score() {
        let target = candidate(1);
        let a = CandidateRank::new(&target, &candidate(1), 10);
        let b = CandidateRank::new(&target, &candidate(1), 9);
        assert!(a.beats(&b));
        assert!(!b.beats(&a));
    }

    #[test]
    fn test_rank_tie_breaks_on_centroid_distance() {
        let target = Selector {
            bounds: Some(Rect::new(0, 0, 10, 10)),
            window_id: 1,
            ..Selector::default()
        };
        let near = Selector {
            bounds: Some(Rect::new(2, 2, 12, 12)),
            ..Selector::default()
        };
        let far = Selector {
            bounds: Some(Rect::new(500, 500, 510, 510)),
            ..Selector::default()
        };
        let a = CandidateRank::new(&target, &near, 5);
        let b = CandidateRank::new(&target, &far, 5);
        assert!(a.beats(&b));
    }

    #[test]
    fn test_rank_final_tie_break_prefers_view_id() {
        let target = Selector::default();
        let with_id = Selector {
            view_id: Some("com.app:id/x".into()),
            ..Selector::default()
        };
        let without_id = Selector::default();
        let a = CandidateRank::new(&target, &with_id, 5);
        let b = CandidateRank::new(&target, &without_id, 5);
        assert!(a.beats(&b));
        assert!(!b.beats(&a));
    }

    #[test]
    fn test_rank_missing_bounds_sorts_last_on_distance() {
        let target = Selector {
            bounds: Some(Rect::new(0, 0, 10, 10)),
            ..Selector::default()
        };
        let with_bounds = Selector {
            bounds: Some(Rect::new(100, 100, 110, 110)),
            ..Selector::default()
        };
        let without_bounds = Selector::default();
        let a = CandidateRank::new(&target, &with_bounds, 5);
        let b = CandidateRank::new(&target, &without_bounds, 5);
        assert!(a.beats(&b));
    }
}
