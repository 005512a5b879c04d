//! Conversion between the name-keyed topology map and the ordered-list
//! representation the boundary and partition math work on.

use indexmap::IndexMap;

use crate::entities::{GridPosition, Qubits};
use crate::error::RoutingError;

/// Flattens a name-keyed position map into a list, preserving insertion
/// order. Downstream code only takes min/max over the result, so the order
/// is not semantically significant.
pub fn legacy_positions(topo: &IndexMap<String, GridPosition>) -> Vec<GridPosition> {
    topo.values().copied().collect()
}

/// Maximum column and row index observed across all positions.
pub fn grid_bounds(positions: &[GridPosition]) -> Result<(u32, u32), RoutingError> {
    if positions.is_empty() {
        return Err(RoutingError::EmptyTopology);
    }
    let max_col = positions.iter().map(|p| p.col).max().unwrap_or(0);
    let max_row = positions.iter().map(|p| p.row).max().unwrap_or(0);
    Ok((max_col, max_row))
}

/// Grid shape (rows, cols) of the lattice the qubits occupy.
pub fn grid_shape(qubits: &Qubits) -> Result<(u32, u32), RoutingError> {
    let positions: Vec<GridPosition> = qubits.values().map(|q| q.grid_pos).collect();
    let (max_col, max_row) = grid_bounds(&positions)?;
    Ok((max_row + 1, max_col + 1))
}
