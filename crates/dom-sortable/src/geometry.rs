//! Insertion-point geometry.
//!
//! The drop position is decided from pointer geometry alone, so the math
//! lives here with no DOM types in sight.

/// Index of the row the dragged element should be inserted before.
///
/// `midpoints` holds the vertical midpoint of every row that is not the one
/// being dragged, in visual order. The chosen row is the one whose midpoint
/// the pointer has not yet passed, nearest to the pointer. `None` means the
/// pointer is below every row and the element goes to the end of the list.
pub fn insert_before_index(midpoints: &[f64], pointer_y: f64) -> Option<usize> {
    let mut closest: Option<(usize, f64)> = None;
    for (index, &midpoint) in midpoints.iter().enumerate() {
        let offset = pointer_y - midpoint;
        if offset < 0.0 && closest.is_none_or(|(_, best)| offset > best) {
            closest = Some((index, offset));
        }
    }
    closest.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_appends() {
        assert_eq!(insert_before_index(&[], 50.0), None);
    }

    #[test]
    fn pointer_below_all_rows_appends() {
        assert_eq!(insert_before_index(&[10.0, 30.0, 50.0], 120.0), None);
    }

    #[test]
    fn pointer_above_all_rows_inserts_first() {
        assert_eq!(insert_before_index(&[10.0, 30.0, 50.0], 2.0), Some(0));
    }

    #[test]
    fn pointer_between_rows_picks_the_next_one() {
        assert_eq!(insert_before_index(&[10.0, 30.0, 50.0], 20.0), Some(1));
        assert_eq!(insert_before_index(&[10.0, 30.0, 50.0], 42.0), Some(2));
    }

    #[test]
    fn pointer_exactly_on_a_midpoint_counts_as_passed() {
        assert_eq!(insert_before_index(&[10.0, 30.0], 10.0), Some(1));
    }

    #[test]
    fn nearest_unpassed_row_wins() {
        // rows far apart, pointer just above the third midpoint
        assert_eq!(insert_before_index(&[10.0, 200.0, 400.0], 395.0), Some(2));
    }
}
