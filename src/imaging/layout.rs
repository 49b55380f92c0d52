//! Grid layout selection.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! For `n` sub-images every row count `1..=n` yields one candidate
//! `(rows, ceil(n / rows))`. Candidates sharing a cell capacity collapse to the
//! squarest one, and the survivors are ranked by capacity (fewest empty cells
//! first). Squareness is compared on integer cross products, never on floats,
//! so `(2, 3)` and `(3, 2)` tie exactly and the wider grid wins.

use super::error::GridError;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A `rows × cols` grid arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layout {
    pub rows: u32,
    pub cols: u32,
}

impl Layout {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// Total number of cells.
    pub fn capacity(self) -> u64 {
        u64::from(self.rows) * u64::from(self.cols)
    }

    /// Cells left blank when `n` sub-images are placed.
    pub fn empty_cells(self, n: u32) -> u64 {
        self.capacity().saturating_sub(u64::from(n))
    }

    /// `cols / rows` as a float, for display.
    pub fn aspect_ratio(self) -> f64 {
        f64::from(self.cols) / f64::from(self.rows)
    }

    /// Grid cell `(row, col)` of sub-image `index` in row-major order.
    pub fn cell_of(self, index: u32) -> (u32, u32) {
        (index / self.cols, index % self.cols)
    }

    /// Compare squareness: `Less` means `self` is closer to 1:1.
    ///
    /// Ordering by `|ln(cols / rows)|` is the same as ordering by
    /// `max(rows, cols) / min(rows, cols)`, which cross-multiplies exactly.
    pub fn squareness_cmp(self, other: Layout) -> Ordering {
        let (self_long, self_short) = self.long_short();
        let (other_long, other_short) = other.long_short();
        (self_long * other_short).cmp(&(other_long * self_short))
    }

    /// Full ranking: capacity first, then squareness.
    pub fn rank_cmp(self, other: Layout) -> Ordering {
        self.capacity()
            .cmp(&other.capacity())
            .then_with(|| self.squareness_cmp(other))
    }

    fn long_short(self) -> (u64, u64) {
        let (rows, cols) = (u64::from(self.rows), u64::from(self.cols));
        (rows.max(cols), rows.min(cols))
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Rank every grid that can hold `n` sub-images.
///
/// One candidate per distinct capacity, ordered by ascending capacity and
/// then by closeness to square. When two candidates of the same capacity are
/// equally square, the one with fewer rows is kept.
///
/// # Examples
/// ```
/// # use shotkit::imaging::{compute_layouts, Layout};
/// let layouts = compute_layouts(6).unwrap();
/// assert_eq!(layouts[0], Layout::new(2, 3));
/// ```
pub fn compute_layouts(n: u32) -> Result<Vec<Layout>, GridError> {
    if n == 0 {
        return Err(GridError::InvalidInput(
            "sub-image count must be at least 1".into(),
        ));
    }

    let mut by_capacity: BTreeMap<u64, Layout> = BTreeMap::new();
    for rows in 1..=n {
        let candidate = Layout::new(rows, n.div_ceil(rows));
        by_capacity
            .entry(candidate.capacity())
            .and_modify(|kept| {
                if candidate.squareness_cmp(*kept) == Ordering::Less {
                    *kept = candidate;
                }
            })
            .or_insert(candidate);
    }

    let mut layouts: Vec<Layout> = by_capacity.into_values().collect();
    // BTreeMap already yields ascending capacity; the sort pins the full
    // ranking contract in one place.
    layouts.sort_by(|a, b| a.rank_cmp(*b));
    log::trace!("{n} sub-images: {} layout candidates", layouts.len());
    Ok(layouts)
}

/// The top-ranked layout for `n` sub-images.
pub fn select_best_layout(n: u32) -> Result<Layout, GridError> {
    compute_layouts(n)?
        .into_iter()
        .next()
        .ok_or_else(|| GridError::InvalidInput(format!("no layout for {n} sub-images")))
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // select_best_layout tests
    // =========================================================================

    #[test]
    fn single_image_is_one_by_one() {
        assert_eq!(select_best_layout(1).unwrap(), Layout::new(1, 1));
    }

    #[test]
    fn perfect_squares() {
        assert_eq!(select_best_layout(4).unwrap(), Layout::new(2, 2));
        assert_eq!(select_best_layout(9).unwrap(), Layout::new(3, 3));
        assert_eq!(select_best_layout(16).unwrap(), Layout::new(4, 4));
    }

    #[test]
    fn six_prefers_two_by_three() {
        // (1,6), (2,3), (3,2), (6,1) all hold exactly six cells
        assert_eq!(select_best_layout(6).unwrap(), Layout::new(2, 3));
    }

    #[test]
    fn eight_prefers_two_by_four() {
        assert_eq!(select_best_layout(8).unwrap(), Layout::new(2, 4));
    }

    #[test]
    fn twelve_prefers_three_by_four() {
        assert_eq!(select_best_layout(12).unwrap(), Layout::new(3, 4));
    }

    #[test]
    fn prime_count_has_no_empty_cells() {
        // Capacity wins over squareness: 7 fits exactly only in a single row
        assert_eq!(select_best_layout(7).unwrap(), Layout::new(1, 7));
    }

    #[test]
    fn zero_is_invalid_input() {
        assert!(matches!(
            select_best_layout(0),
            Err(GridError::InvalidInput(_))
        ));
        assert!(matches!(compute_layouts(0), Err(GridError::InvalidInput(_))));
    }

    #[test]
    fn best_layout_always_fits_with_minimal_capacity() {
        for n in 1..=200u32 {
            let best = select_best_layout(n).unwrap();
            assert!(best.capacity() >= u64::from(n), "n={n} best={best}");

            let minimal = (1..=n)
                .map(|rows| u64::from(rows) * u64::from(n.div_ceil(rows)))
                .min()
                .unwrap();
            assert_eq!(best.capacity(), minimal, "n={n}");
        }
    }

    #[test]
    fn selection_is_deterministic() {
        for n in [1, 5, 6, 10, 37, 100] {
            let first = select_best_layout(n).unwrap();
            for _ in 0..5 {
                assert_eq!(select_best_layout(n).unwrap(), first);
            }
        }
    }

    // =========================================================================
    // compute_layouts tests
    // =========================================================================

    #[test]
    fn layouts_are_unique_per_capacity_and_ascending() {
        let layouts = compute_layouts(10).unwrap();
        for pair in layouts.windows(2) {
            assert!(pair[0].capacity() < pair[1].capacity());
        }
    }

    #[test]
    fn layouts_for_six() {
        let layouts = compute_layouts(6).unwrap();
        // capacities: 6 (2x3), 8 (4x2), 10 (5x2)
        assert_eq!(
            layouts,
            vec![Layout::new(2, 3), Layout::new(4, 2), Layout::new(5, 2)]
        );
    }

    #[test]
    fn layouts_for_one() {
        assert_eq!(compute_layouts(1).unwrap(), vec![Layout::new(1, 1)]);
    }

    #[test]
    fn every_candidate_fits() {
        for layout in compute_layouts(23).unwrap() {
            assert!(layout.capacity() >= 23);
        }
    }

    // =========================================================================
    // Layout helpers
    // =========================================================================

    #[test]
    fn squareness_ties_between_transposes() {
        assert_eq!(
            Layout::new(2, 3).squareness_cmp(Layout::new(3, 2)),
            Ordering::Equal
        );
        assert_eq!(
            Layout::new(2, 2).squareness_cmp(Layout::new(1, 4)),
            Ordering::Less
        );
    }

    #[test]
    fn cell_of_is_row_major() {
        let layout = Layout::new(2, 3);
        assert_eq!(layout.cell_of(0), (0, 0));
        assert_eq!(layout.cell_of(2), (0, 2));
        assert_eq!(layout.cell_of(3), (1, 0));
        assert_eq!(layout.cell_of(5), (1, 2));
    }

    #[test]
    fn empty_cells_and_display() {
        let layout = Layout::new(3, 3);
        assert_eq!(layout.empty_cells(7), 2);
        assert_eq!(layout.to_string(), "3x3");
        assert!((Layout::new(2, 3).aspect_ratio() - 1.5).abs() < f64::EPSILON);
    }
}
