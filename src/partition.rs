//! Balanced assignment of I/O pin counts to the four chip edges.

use crate::error::RoutingError;

/// Number of pins assigned to each chip edge.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EdgeCounts {
    pub upper: usize,
    pub lower: usize,
    pub left: usize,
    pub right: usize,
}

impl EdgeCounts {
    pub fn total(&self) -> usize {
        self.upper + self.lower + self.left + self.right
    }
}

/// Which qubit rows are served from which edge group. The lower group takes
/// the lowest row indices, the upper group the highest, and the side group
/// the middle band; an odd remainder leaves the extra row in the upper group.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RowAssignment {
    pub upper: Vec<u32>,
    pub lower: Vec<u32>,
    pub sides: Vec<u32>,
}

fn check_grid(rows: u32, cols: u32) -> Result<(), RoutingError> {
    if rows == 0 || cols == 0 {
        return Err(RoutingError::InvalidGrid { rows, cols });
    }
    Ok(())
}

/// Control-off-chip partition: two pins per qubit row, distributed by a
/// closed-form split. Upper and lower counts are rounded down to even so
/// they can be mirror-paired during corner routing.
pub fn control_off_chip(rows: u32, cols: u32) -> Result<EdgeCounts, RoutingError> {
    check_grid(rows, cols)?;
    let total = 2 * rows as usize;
    let mut upper = total / 4;
    upper -= upper % 2;
    let lower = upper;
    let left = (total - upper - lower + 1) / 2;
    let right = left;
    Ok(EdgeCounts {
        upper,
        lower,
        left,
        right,
    })
}

/// Flipchip partition: every row demands `cols` control pins plus two
/// transmission pins. A brute-force search over the number of rows served
/// from the sides keeps the three group pin counts as balanced as possible;
/// ties go to the smallest side count.
pub fn flipchip(rows: u32, cols: u32) -> Result<(EdgeCounts, RowAssignment), RoutingError> {
    check_grid(rows, cols)?;
    let rows = rows as usize;
    let per_row = cols as usize + 2;

    let mut best_sides = 0;
    let mut best_spread = usize::MAX;
    for rows_to_sides in 0..=rows {
        let remaining = rows - rows_to_sides;
        let top = remaining - remaining / 2;
        let bottom = remaining / 2;
        let counts = [top * per_row, bottom * per_row, rows_to_sides * per_row];
        let largest = counts[0].max(counts[1]).max(counts[2]);
        let smallest = counts[0].min(counts[1]).min(counts[2]);
        let spread = largest - smallest;
        if spread < best_spread {
            best_spread = spread;
            best_sides = rows_to_sides;
        }
    }

    let sides = best_sides;
    let remaining = rows - sides;
    let top = remaining - remaining / 2;
    let bottom = remaining / 2;

    let upper = top * per_row;
    let lower = bottom * per_row;
    let left = (sides * per_row) / 2;
    let mut right = left;
    // Integer halving of an odd side group under-counts by one; compensate
    // on the right edge. Preserved behavior, see DESIGN.md.
    if upper + lower + left + right != rows * per_row {
        right += 1;
    }

    let assignment = RowAssignment {
        lower: (0..bottom as u32).collect(),
        sides: (bottom as u32..(bottom + sides) as u32).collect(),
        upper: ((bottom + sides) as u32..rows as u32).collect(),
    };

    Ok((
        EdgeCounts {
            upper,
            lower,
            left,
            right,
        },
        assignment,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_off_chip_splits_evenly() {
        let counts = control_off_chip(4, 4).unwrap();
        assert_eq!(counts.upper, 2);
        assert_eq!(counts.lower, 2);
        assert_eq!(counts.left, 2);
        assert_eq!(counts.right, 2);
        assert_eq!(counts.total(), 8);
    }

    #[test]
    fn control_off_chip_small_grid_routes_from_the_sides() {
        // floor(4/4) = 1 rounds down to 0 on the paired edges.
        let counts = control_off_chip(2, 2).unwrap();
        assert_eq!(counts.upper, 0);
        assert_eq!(counts.lower, 0);
        assert_eq!(counts.left, 2);
        assert_eq!(counts.right, 2);
    }

    #[test]
    fn control_off_chip_conserves_pin_count() {
        for (rows, cols) in [(2, 2), (4, 4), (3, 5), (8, 8)] {
            let counts = control_off_chip(rows, cols).unwrap();
            assert_eq!(counts.total(), 2 * rows as usize, "{rows}x{cols}");
        }
    }

    #[test]
    fn flipchip_conserves_pin_count() {
        for (rows, cols) in [(2, 2), (4, 4), (3, 5), (8, 8)] {
            let (counts, _) = flipchip(rows, cols).unwrap();
            let expected = 2 * rows as usize + (rows * cols) as usize;
            assert_eq!(counts.total(), expected, "{rows}x{cols}");
        }
    }

    #[test]
    fn flipchip_right_edge_compensation() {
        // 3x5: one row to each group gives 7 pins per group; halving the odd
        // side group loses one pin, which lands on the right edge.
        let (counts, assignment) = flipchip(3, 5).unwrap();
        assert_eq!(counts.upper, 7);
        assert_eq!(counts.lower, 7);
        assert_eq!(counts.left, 3);
        assert_eq!(counts.right, 4);
        assert_eq!(assignment.lower, vec![0]);
        assert_eq!(assignment.sides, vec![1]);
        assert_eq!(assignment.upper, vec![2]);
    }

    #[test]
    fn flipchip_prefers_smallest_side_count_on_ties() {
        // 8x8: side counts 2 and 3 tie on spread; the search keeps 2.
        let (counts, assignment) = flipchip(8, 8).unwrap();
        assert_eq!(assignment.sides.len(), 2);
        assert_eq!(counts.upper, 30);
        assert_eq!(counts.lower, 30);
        assert_eq!(counts.left, 10);
        assert_eq!(counts.right, 10);
    }

    #[test]
    fn zero_sized_grid_is_invalid() {
        assert!(matches!(
            control_off_chip(0, 4),
            Err(RoutingError::InvalidGrid { rows: 0, cols: 4 })
        ));
        assert!(matches!(
            flipchip(3, 0),
            Err(RoutingError::InvalidGrid { rows: 3, cols: 0 })
        ));
    }
}
