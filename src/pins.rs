//! Launch-pad placement along the four chip edges.

use tracing::debug;

use crate::boundary::{qubit_bounds, QubitBounds};
use crate::chip_size::{PadGeometry, DISTANCE_TO_CHIP};
use crate::entities::{Chip, Pin, Pins, Qubits};
use crate::error::RoutingError;
use crate::geometry::{ChipEdge, Point};
use crate::partition::EdgeCounts;

/// Straight lead length before the first corner, long enough to clear the pad.
pub const PIN_START_STRAIGHT: f64 = 300.0;
pub const PIN_TYPE: &str = "LaunchPad";

/// Role a pin plays when control and transmission lines share an edge.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PinRole {
    Plain,
    Control,
    Transmission,
}

impl PinRole {
    fn label(&self) -> Option<&'static str> {
        match self {
            PinRole::Plain => None,
            PinRole::Control => Some("control"),
            PinRole::Transmission => Some("transmission"),
        }
    }
}

/// Pin demand per edge, split into total and transmission share.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PinPlan {
    pub counts: EdgeCounts,
    pub transmission: EdgeCounts,
}

impl PinPlan {
    /// All pins plain, no role split (Control_off_chip).
    pub fn plain(counts: EdgeCounts) -> Self {
        PinPlan {
            counts,
            transmission: EdgeCounts::default(),
        }
    }

    pub fn count(&self, edge: ChipEdge) -> usize {
        match edge {
            ChipEdge::Upper => self.counts.upper,
            ChipEdge::Lower => self.counts.lower,
            ChipEdge::Left => self.counts.left,
            ChipEdge::Right => self.counts.right,
        }
    }

    pub fn transmission_count(&self, edge: ChipEdge) -> usize {
        match edge {
            ChipEdge::Upper => self.transmission.upper,
            ChipEdge::Lower => self.transmission.lower,
            ChipEdge::Left => self.transmission.left,
            ChipEdge::Right => self.transmission.right,
        }
    }
}

/// Role of each pin position along an edge: the transmission share sits on
/// the outermost positions, half at each end, control pins in the middle.
fn edge_roles(count: usize, transmission: usize, split: bool) -> Vec<PinRole> {
    if !split {
        return vec![PinRole::Plain; count];
    }
    let head = transmission / 2;
    let tail = transmission - head;
    (0..count)
        .map(|i| {
            if i < head || i >= count - tail {
                PinRole::Transmission
            } else {
                PinRole::Control
            }
        })
        .collect()
}

fn capacity_check(
    edge: ChipEdge,
    count: usize,
    chip: &Chip,
    pad: &PadGeometry,
) -> Result<(), RoutingError> {
    let available = if edge.is_horizontal() {
        chip.rect().width()
    } else {
        chip.rect().height()
    };
    let required = pad.pitch() * count as f64;
    if required > available {
        return Err(RoutingError::PinOverflow {
            edge,
            count,
            required,
            available,
        });
    }
    Ok(())
}

fn edge_pin_position(edge: ChipEdge, fraction: f64, bounds: &QubitBounds, chip: &Chip) -> Point {
    match edge {
        ChipEdge::Upper => Point::new(
            bounds.x_left + fraction * (bounds.x_right - bounds.x_left),
            chip.end_pos.y - DISTANCE_TO_CHIP,
        ),
        ChipEdge::Lower => Point::new(
            bounds.x_left + fraction * (bounds.x_right - bounds.x_left),
            chip.start_pos.y + DISTANCE_TO_CHIP,
        ),
        ChipEdge::Left => Point::new(
            chip.start_pos.x + DISTANCE_TO_CHIP,
            bounds.y_lower + fraction * (bounds.y_upper - bounds.y_lower),
        ),
        ChipEdge::Right => Point::new(
            chip.end_pos.x - DISTANCE_TO_CHIP,
            bounds.y_lower + fraction * (bounds.y_upper - bounds.y_lower),
        ),
    }
}

fn distance_to_qubits(edge: ChipEdge, pos: &Point, bounds: &QubitBounds) -> f64 {
    match edge {
        ChipEdge::Upper => pos.y - bounds.y_upper,
        ChipEdge::Lower => bounds.y_lower - pos.y,
        ChipEdge::Left => bounds.x_left - pos.x,
        ChipEdge::Right => pos.x - bounds.x_right,
    }
}

/// Places every edge's pins, evenly interpolated over the qubit-derived span
/// and offset from the chip boundary by `DISTANCE_TO_CHIP`. Capacity is
/// validated against the chip rectangle before anything is placed.
pub fn place_pins(
    qubits: &Qubits,
    chip: &Chip,
    pad: &PadGeometry,
    plan: &PinPlan,
    split_roles: bool,
) -> Result<Pins, RoutingError> {
    let bounds = qubit_bounds(qubits)?;

    for edge in ChipEdge::ALL {
        capacity_check(edge, plan.count(edge), chip, pad)?;
    }

    let mut pins = Pins::new();
    for edge in ChipEdge::ALL {
        let count = plan.count(edge);
        if count == 0 {
            continue;
        }
        let roles = edge_roles(count, plan.transmission_count(edge), split_roles);
        let mut role_index = [0usize; 3];
        for (i, role) in roles.iter().enumerate() {
            let fraction = (i + 1) as f64 / (count + 1) as f64;
            let pos = edge_pin_position(edge, fraction, &bounds, chip);
            let index = match role.label() {
                Some(label) => {
                    let slot = if *role == PinRole::Control { 1 } else { 2 };
                    let index = role_index[slot];
                    role_index[slot] += 1;
                    format!("{label}_{index}")
                }
                None => {
                    let index = role_index[0];
                    role_index[0] += 1;
                    format!("{index}")
                }
            };
            let name = format!("pin_{}_{}", edge.name(), index);
            pins.insert(
                name.clone(),
                Pin {
                    name,
                    pos,
                    orientation: edge.orientation(),
                    start_straight: PIN_START_STRAIGHT,
                    distance_to_qubits: distance_to_qubits(edge, &pos, &bounds),
                    pin_type: PIN_TYPE.to_string(),
                    chip: chip.name.clone(),
                },
            );
        }
    }
    debug!(total = pins.len(), "placed pins");
    Ok(pins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CouplingPins, GridPosition, Qubit};

    fn qubit(name: &str, col: u32, row: u32, x: f64, y: f64) -> Qubit {
        Qubit {
            name: name.to_string(),
            grid_pos: GridPosition::new(col, row),
            gds_pos: Point::new(x, y),
            outline: vec![
                Point::new(x - 250.0, y - 235.0),
                Point::new(x + 250.0, y - 235.0),
                Point::new(x + 250.0, y + 235.0),
                Point::new(x - 250.0, y + 235.0),
            ],
            control_pins: vec![Point::new(x, y - 235.0)],
            coupling_pins: CouplingPins::default(),
            qubit_type: "Transmon".to_string(),
        }
    }

    fn square_qubits() -> Qubits {
        let mut qubits = Qubits::new();
        for row in 0..4 {
            for col in 0..4 {
                let name = format!("q_{col}_{row}");
                qubits.insert(
                    name.clone(),
                    qubit(&name, col, row, col as f64 * 2000.0, row as f64 * 2000.0),
                );
            }
        }
        qubits
    }

    fn chip() -> Chip {
        Chip {
            name: "chip0".to_string(),
            start_pos: Point::new(-5000.0, -5000.0),
            end_pos: Point::new(11000.0, 11000.0),
        }
    }

    #[test]
    fn placement_is_idempotent() {
        let qubits = square_qubits();
        let chip = chip();
        let plan = PinPlan::plain(EdgeCounts {
            upper: 2,
            lower: 2,
            left: 2,
            right: 2,
        });
        let pad = PadGeometry::default();
        let first = place_pins(&qubits, &chip, &pad, &plan, false).unwrap();
        let second = place_pins(&qubits, &chip, &pad, &plan, false).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn pins_sit_inside_the_chip_at_fixed_clearance() {
        let qubits = square_qubits();
        let chip = chip();
        let plan = PinPlan::plain(EdgeCounts {
            upper: 2,
            lower: 0,
            left: 1,
            right: 0,
        });
        let pins = place_pins(&qubits, &chip, &PadGeometry::default(), &plan, false).unwrap();
        assert_eq!(pins.len(), 3);
        let upper = &pins["pin_upper_0"];
        assert_eq!(upper.pos.y, chip.end_pos.y - DISTANCE_TO_CHIP);
        assert_eq!(upper.orientation, 0);
        let left = &pins["pin_left_0"];
        assert_eq!(left.pos.x, chip.start_pos.x + DISTANCE_TO_CHIP);
        assert_eq!(left.orientation, 90);
    }

    #[test]
    fn role_split_places_transmission_on_the_outside() {
        let qubits = square_qubits();
        let chip = chip();
        let mut plan = PinPlan::plain(EdgeCounts {
            upper: 6,
            lower: 0,
            left: 0,
            right: 0,
        });
        plan.transmission.upper = 2;
        let pins = place_pins(&qubits, &chip, &PadGeometry::default(), &plan, true).unwrap();
        let names: Vec<&str> = pins.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec![
                "pin_upper_transmission_0",
                "pin_upper_control_0",
                "pin_upper_control_1",
                "pin_upper_control_2",
                "pin_upper_control_3",
                "pin_upper_transmission_1",
            ]
        );
    }

    #[test]
    fn overflow_is_rejected() {
        let qubits = square_qubits();
        let small_chip = Chip {
            name: "chip0".to_string(),
            start_pos: Point::new(-500.0, -500.0),
            end_pos: Point::new(500.0, 500.0),
        };
        let plan = PinPlan::plain(EdgeCounts {
            upper: 8,
            lower: 0,
            left: 0,
            right: 0,
        });
        let err = place_pins(&qubits, &small_chip, &PadGeometry::default(), &plan, false)
            .unwrap_err();
        assert!(matches!(
            err,
            RoutingError::PinOverflow {
                edge: ChipEdge::Upper,
                count: 8,
                ..
            }
        ));
    }
}
