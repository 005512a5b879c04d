//! Geometric extrema queries over qubit, readout-line and pin collections.

use crate::entities::{Pins, Qubit, Qubits, ReadoutLines};
use crate::error::RoutingError;
use crate::geometry::ChipEdge;

/// Extremes of the qubit GDS positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QubitBounds {
    pub x_left: f64,
    pub x_right: f64,
    pub y_upper: f64,
    pub y_lower: f64,
}

/// Min/max over each qubit's GDS position.
pub fn qubit_bounds(qubits: &Qubits) -> Result<QubitBounds, RoutingError> {
    let mut iter = qubits.values();
    let first = iter.next().ok_or(RoutingError::EmptyInput("qubit"))?;
    let mut bounds = QubitBounds {
        x_left: first.gds_pos.x,
        x_right: first.gds_pos.x,
        y_upper: first.gds_pos.y,
        y_lower: first.gds_pos.y,
    };
    for qubit in iter {
        bounds.x_left = bounds.x_left.min(qubit.gds_pos.x);
        bounds.x_right = bounds.x_right.max(qubit.gds_pos.x);
        bounds.y_lower = bounds.y_lower.min(qubit.gds_pos.y);
        bounds.y_upper = bounds.y_upper.max(qubit.gds_pos.y);
    }
    Ok(bounds)
}

/// Extreme coupling-pin x coordinates among qubits occupying `col`.
/// `None` when no qubit occupies that column.
pub fn outline_bounds(qubits: &Qubits, col: u32) -> Option<(f64, f64)> {
    let mut max_x: Option<f64> = None;
    let mut min_x: Option<f64> = None;
    for qubit in qubits.values().filter(|q| q.grid_pos.col == col) {
        for pin in qubit.coupling_pins.iter() {
            max_x = Some(max_x.map_or(pin.x, |m| m.max(pin.x)));
            min_x = Some(min_x.map_or(pin.x, |m| m.min(pin.x)));
        }
    }
    match (max_x, min_x) {
        (Some(max_x), Some(min_x)) => Some((max_x, min_x)),
        _ => None,
    }
}

/// The qubit a readout line belongs to. The generation stage names readout
/// lines after their qubit; when the suffix lookup fails we fall back to
/// positional order.
pub fn associated_qubit<'a>(
    rdl_name: &str,
    rdl_index: usize,
    qubits: &'a Qubits,
) -> Option<&'a Qubit> {
    let by_suffix = qubits
        .values()
        .filter(|q| rdl_name.ends_with(q.name.as_str()))
        .max_by_key(|q| q.name.len());
    by_suffix.or_else(|| qubits.values().nth(rdl_index))
}

/// End-position y extremes of the readout lines whose qubit sits in `row`.
/// `None` when no such line exists.
pub fn readout_row_bounds(
    row: u32,
    readout_lines: &ReadoutLines,
    qubits: &Qubits,
) -> Option<(f64, f64)> {
    let mut max_y: Option<f64> = None;
    let mut min_y: Option<f64> = None;
    for (index, rdl) in readout_lines.values().enumerate() {
        let Some(qubit) = associated_qubit(&rdl.name, index, qubits) else {
            continue;
        };
        if qubit.grid_pos.row != row {
            continue;
        }
        max_y = Some(max_y.map_or(rdl.end_pos.y, |m| m.max(rdl.end_pos.y)));
        min_y = Some(min_y.map_or(rdl.end_pos.y, |m| m.min(rdl.end_pos.y)));
    }
    match (max_y, min_y) {
        (Some(max_y), Some(min_y)) => Some((max_y, min_y)),
        _ => None,
    }
}

/// Clearance extremes of the readout lines whose qubit sits in `row`.
pub fn readout_row_space(
    row: u32,
    readout_lines: &ReadoutLines,
    qubits: &Qubits,
) -> Option<(f64, f64)> {
    let mut max_space: Option<f64> = None;
    let mut min_space: Option<f64> = None;
    for (index, rdl) in readout_lines.values().enumerate() {
        let Some(qubit) = associated_qubit(&rdl.name, index, qubits) else {
            continue;
        };
        if qubit.grid_pos.row != row {
            continue;
        }
        max_space = Some(max_space.map_or(rdl.space, |m| m.max(rdl.space)));
        min_space = Some(min_space.map_or(rdl.space, |m| m.min(rdl.space)));
    }
    match (max_space, min_space) {
        (Some(max_space), Some(min_space)) => Some((max_space, min_space)),
        _ => None,
    }
}

/// Coordinate extremes of the pins named `pin_{edge}_*`.
pub fn pin_bounds(
    edge: ChipEdge,
    pins: &Pins,
) -> Result<(f64, f64, f64, f64), RoutingError> {
    let prefix = format!("pin_{}_", edge.name());
    let mut found = false;
    let (mut max_x, mut min_x, mut max_y, mut min_y) = (f64::MIN, f64::MAX, f64::MIN, f64::MAX);
    for pin in pins.values().filter(|p| p.name.starts_with(&prefix)) {
        found = true;
        max_x = max_x.max(pin.pos.x);
        min_x = min_x.min(pin.pos.x);
        max_y = max_y.max(pin.pos.y);
        min_y = min_y.min(pin.pos.y);
    }
    if !found {
        return Err(RoutingError::NoPinsInDirection(edge));
    }
    Ok((max_x, min_x, max_y, min_y))
}
