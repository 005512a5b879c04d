use indexmap::IndexMap;

use crate::geometry::{outline_bounding_box, BoundingBox, Point, Rect};

/// Integer (column, row) slot in the logical topology lattice.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct GridPosition {
    pub col: u32,
    pub row: u32,
}

impl GridPosition {
    pub fn new(col: u32, row: u32) -> Self {
        GridPosition { col, row }
    }
}

/// Coupling-pin coordinates tagged by direction relative to the qubit body.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CouplingPins {
    pub top: Option<Point>,
    pub bottom: Option<Point>,
    pub left: Option<Point>,
    pub right: Option<Point>,
}

impl CouplingPins {
    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        [self.top, self.bottom, self.left, self.right]
            .into_iter()
            .flatten()
    }
}

/// A qubit as produced by the generation stage. Read-only input to routing.
#[derive(Clone, Debug, PartialEq)]
pub struct Qubit {
    pub name: String,
    pub grid_pos: GridPosition,
    pub gds_pos: Point,
    /// Ordered polygon vertices, closed implicitly.
    pub outline: Vec<Point>,
    /// Candidate termination points for a control line, in order.
    pub control_pins: Vec<Point>,
    pub coupling_pins: CouplingPins,
    pub qubit_type: String,
}

impl Qubit {
    pub fn height(&self) -> f64 {
        self.bounding_box().height()
    }
}

impl BoundingBox for Qubit {
    fn bounding_box(&self) -> Rect {
        outline_bounding_box(&self.outline)
            .unwrap_or(Rect::new(self.gds_pos, self.gds_pos))
    }
}

/// A readout line, associated with exactly one qubit.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadoutLine {
    pub name: String,
    pub end_pos: Point,
    /// Clearance kept between transmission lines and the readout resonator.
    pub space: f64,
}

/// Chip extent, either supplied by the caller or computed during routing.
#[derive(Clone, Debug, PartialEq)]
pub struct Chip {
    pub name: String,
    pub start_pos: Point,
    pub end_pos: Point,
}

impl Chip {
    pub fn rect(&self) -> Rect {
        Rect::new(self.start_pos, self.end_pos)
    }
}

/// A launch pad generated by pin placement.
#[derive(Clone, Debug, PartialEq)]
pub struct Pin {
    pub name: String,
    pub pos: Point,
    /// One of 0, 90, 180, 270 degrees.
    pub orientation: u16,
    /// Length of the initial straight lead before any corner.
    pub start_straight: f64,
    pub distance_to_qubits: f64,
    pub pin_type: String,
    pub chip: String,
}

/// A routed polyline. Control lines terminate on a qubit control pin;
/// transmission lines run between two pins.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutedLine {
    pub name: String,
    /// Ordered waypoints, at least two. Consecutive waypoints differ in at
    /// least one axis.
    pub pos: Vec<Point>,
    pub line_type: String,
    pub chip: String,
}

pub type Qubits = IndexMap<String, Qubit>;
pub type ReadoutLines = IndexMap<String, ReadoutLine>;
pub type Pins = IndexMap<String, Pin>;
pub type RoutedLines = IndexMap<String, RoutedLine>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qubit_height_from_outline() {
        let qubit = Qubit {
            name: "q0".into(),
            grid_pos: GridPosition::new(0, 0),
            gds_pos: Point::new(0.0, 0.0),
            outline: vec![
                Point::new(-250.0, -235.0),
                Point::new(250.0, -235.0),
                Point::new(250.0, 235.0),
                Point::new(-250.0, 235.0),
            ],
            control_pins: vec![Point::new(0.0, -235.0)],
            coupling_pins: CouplingPins::default(),
            qubit_type: "Transmon".into(),
        };
        assert_eq!(qubit.height(), 470.0);
    }

    #[test]
    fn coupling_pins_iter_skips_missing() {
        let pins = CouplingPins {
            top: Some(Point::new(0.0, 1.0)),
            bottom: None,
            left: None,
            right: Some(Point::new(1.0, 0.0)),
        };
        assert_eq!(pins.iter().count(), 2);
    }
}
