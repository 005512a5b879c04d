//! Minimum chip rectangle that fits every edge's pin run with the required
//! spacing around the qubit cluster.

use tracing::{debug, warn};

use crate::boundary::qubit_bounds;
use crate::entities::{GridPosition, Qubits, ReadoutLines};
use crate::error::RoutingError;
use crate::geometry::Point;
use crate::partition;
use crate::topology;

/// Separation kept between parallel traces.
pub const GAP: f64 = 100.0;
/// Clearance between a pin and the chip boundary.
pub const DISTANCE_TO_CHIP: f64 = 380.0;
/// Outer margin added around the pins boundary, 400 + `DISTANCE_TO_CHIP`.
pub const CHIP_MARGIN: f64 = 780.0;

/// Launch-pad dimensions used for pin spacing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PadGeometry {
    pub pad_width: f64,
    pub pad_gap: f64,
}

impl Default for PadGeometry {
    fn default() -> Self {
        PadGeometry {
            pad_width: 250.0,
            pad_gap: 120.0,
        }
    }
}

impl PadGeometry {
    /// Minimum center-to-center pitch between adjacent pads on an edge.
    pub fn pitch(&self) -> f64 {
        self.pad_gap * 2.0 + self.pad_width
    }
}

/// Computes the chip start/end corners from the qubit cluster, the readout
/// line extremes and the per-edge pin demand.
pub fn calc_chip_size(
    qubits: &Qubits,
    readout_lines: &ReadoutLines,
    pad: &PadGeometry,
) -> Result<(Point, Point), RoutingError> {
    let positions: Vec<GridPosition> = qubits.values().map(|q| q.grid_pos).collect();
    let (max_col, max_row) = topology::grid_bounds(&positions)?;
    let (rows, cols) = (max_row + 1, max_col + 1);

    let bounds = qubit_bounds(qubits)?;
    let (counts, _) = partition::flipchip(rows, cols)?;

    // Readout lines stick out vertically past the qubits; the vertical
    // extremes must cover them.
    let mut upper_extreme = bounds.y_upper;
    let mut lower_extreme = bounds.y_lower;
    for rdl in readout_lines.values() {
        upper_extreme = upper_extreme.max(rdl.end_pos.y);
        lower_extreme = lower_extreme.min(rdl.end_pos.y);
    }

    let extension = |count: usize| (count as f64 / 2.0).ceil() * GAP + DISTANCE_TO_CHIP;
    let mut upper_boundary = upper_extreme + extension(counts.upper);
    let mut lower_boundary = lower_extreme - extension(counts.lower);
    let mut left_boundary = bounds.x_left - extension(counts.left);
    let mut right_boundary = bounds.x_right + extension(counts.right);

    let run = |count: usize| pad.pitch() * count as f64;
    let side_run = run(counts.left).max(run(counts.right));
    let vertical_span = upper_boundary - lower_boundary;
    if vertical_span < side_run {
        let shortfall = side_run - vertical_span;
        warn!(shortfall, "overflow, adjusting chip size");
        upper_boundary += shortfall / 2.0;
        lower_boundary -= shortfall / 2.0;
    }

    // Single pass: the vertical fix above is not re-validated after this.
    let row_run = run(counts.upper).max(run(counts.lower));
    let horizontal_span = right_boundary - left_boundary;
    if horizontal_span < row_run {
        let shortfall = row_run - horizontal_span;
        warn!(shortfall, "overflow, adjusting chip size");
        right_boundary += shortfall / 2.0;
        left_boundary -= shortfall / 2.0;
    }

    let start_pos = Point::new(left_boundary - CHIP_MARGIN, lower_boundary - CHIP_MARGIN);
    let end_pos = Point::new(right_boundary + CHIP_MARGIN, upper_boundary + CHIP_MARGIN);
    debug!(?start_pos, ?end_pos, "computed chip size");
    Ok((start_pos, end_pos))
}
