//! End-to-end strategy runs over small qubit lattices.

use qchip_router::chip_size::PadGeometry;
use qchip_router::diagnostics::init_tracing;
use qchip_router::entities::{
    Chip, CouplingPins, GridPosition, Qubit, Qubits, ReadoutLine, ReadoutLines,
};
use qchip_router::error::RoutingError;
use qchip_router::geometry::Point;
use qchip_router::strategy::{route, route_by_name, RoutingRequest, Strategy};

const QUBIT_PITCH: f64 = 2000.0;
const QUBIT_WIDTH: f64 = 500.0;
const QUBIT_HEIGHT: f64 = 470.0;

fn grid_qubit(col: u32, row: u32, origin: Point) -> Qubit {
    let x = origin.x + col as f64 * QUBIT_PITCH;
    let y = origin.y + row as f64 * QUBIT_PITCH;
    let hw = QUBIT_WIDTH / 2.0;
    let hh = QUBIT_HEIGHT / 2.0;
    let name = format!("q_{col}_{row}");
    Qubit {
        name,
        grid_pos: GridPosition::new(col, row),
        gds_pos: Point::new(x, y),
        outline: vec![
            Point::new(x - hw, y - hh),
            Point::new(x + hw, y - hh),
            Point::new(x + hw, y + hh),
            Point::new(x - hw, y + hh),
        ],
        control_pins: vec![
            Point::new(x, y - hh),
            Point::new(x, y + hh),
            Point::new(x - hw, y),
            Point::new(x + hw, y),
        ],
        coupling_pins: CouplingPins::default(),
        qubit_type: "Transmon".to_string(),
    }
}

fn grid_qubits(rows: u32, cols: u32, origin: Point) -> Qubits {
    let mut qubits = Qubits::new();
    for row in 0..rows {
        for col in 0..cols {
            let qubit = grid_qubit(col, row, origin);
            qubits.insert(qubit.name.clone(), qubit);
        }
    }
    qubits
}

fn readout_lines_for(qubits: &Qubits) -> ReadoutLines {
    let mut lines = ReadoutLines::new();
    for qubit in qubits.values() {
        let name = format!("readout_line_{}", qubit.name);
        lines.insert(
            name.clone(),
            ReadoutLine {
                name,
                end_pos: Point::new(qubit.gds_pos.x, qubit.gds_pos.y + 400.0),
                space: 30.0,
            },
        );
    }
    lines
}

fn interior(points: &[Point]) -> &[Point] {
    if points.len() <= 2 {
        &[]
    } else {
        &points[1..points.len() - 1]
    }
}

fn orient(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(p: Point, a: Point, b: Point) -> bool {
    orient(a, b, p).abs() < 1e-6
        && p.x >= a.x.min(b.x) - 1e-6
        && p.x <= a.x.max(b.x) + 1e-6
        && p.y >= a.y.min(b.y) - 1e-6
        && p.y <= a.y.max(b.y) + 1e-6
}

fn segments_touch(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let d1 = orient(b1, b2, a1);
    let d2 = orient(b1, b2, a2);
    let d3 = orient(a1, a2, b1);
    let d4 = orient(a1, a2, b2);
    if d1 * d2 < 0.0 && d3 * d4 < 0.0 {
        return true;
    }
    on_segment(a1, b1, b2) || on_segment(a2, b1, b2) || on_segment(b1, a1, a2) || on_segment(b2, a1, a2)
}

#[test]
fn control_off_chip_on_a_given_chip() {
    init_tracing();
    // 4x4 lattice centered on the origin inside a fixed chip.
    let qubits = grid_qubits(4, 4, Point::new(-3000.0, -3000.0));
    let readout_lines = ReadoutLines::new();
    let chip = Chip {
        name: "chip0".to_string(),
        start_pos: Point::new(-5000.0, -5000.0),
        end_pos: Point::new(5000.0, 5000.0),
    };
    let request = RoutingRequest {
        qubits: &qubits,
        readout_lines: &readout_lines,
        chip: Some(&chip),
        pad: PadGeometry::default(),
        chip_name: "chip0".to_string(),
    };
    let output = route(Strategy::ControlOffChip, &request).unwrap();

    // total = 2 * rows = 8, split 2/2/2/2 across the edges.
    assert_eq!(output.pins.len(), 8);
    for edge in ["upper", "lower", "left", "right"] {
        let on_edge = output
            .pins
            .keys()
            .filter(|name| name.starts_with(&format!("pin_{edge}_")))
            .count();
        assert_eq!(on_edge, 2, "pin count on {edge}");
    }
    for pin in output.pins.values() {
        assert!(chip.rect().contains(&pin.pos));
    }

    assert_eq!(output.control_lines.len(), 8);
    assert!(output.transmission_lines.is_empty());
    assert!(output.chip.is_none());
    assert!(output.unrouted.is_empty());

    // Every line starts on its pin and ends on a qubit control pin.
    let control_pins: Vec<Point> = qubits
        .values()
        .flat_map(|q| q.control_pins.iter().copied())
        .collect();
    for line in output.control_lines.values() {
        let first = line.pos.first().unwrap();
        let last = line.pos.last().unwrap();
        assert!(output.pins.values().any(|p| p.pos == *first));
        assert!(control_pins.contains(last));
    }
}

#[test]
fn flipchip_computes_its_own_chip() {
    init_tracing();
    let qubits = grid_qubits(4, 4, Point::new(0.0, 0.0));
    let readout_lines = readout_lines_for(&qubits);
    let request = RoutingRequest {
        qubits: &qubits,
        readout_lines: &readout_lines,
        chip: None,
        pad: PadGeometry::default(),
        chip_name: "chip0".to_string(),
    };
    let output = route(Strategy::Flipchip, &request).unwrap();

    // rows * (cols + 2) pins, one control line per qubit.
    assert_eq!(output.pins.len(), 4 * 6);
    assert_eq!(output.control_lines.len(), 16);
    // Two upper loops, one lower loop, one side crossing.
    assert_eq!(output.transmission_lines.len(), 4);
    assert!(output.unrouted.is_empty());

    let chip = output.chip.expect("chip size is computed when none is given");
    let rect = chip.rect();
    for qubit in qubits.values() {
        assert!(rect.contains(&qubit.gds_pos));
    }
    for pin in output.pins.values() {
        assert!(rect.contains(&pin.pos));
    }

    // Control lines keep clear of each other: no interior waypoint of one
    // lies on any segment of another, and no two segments cross or overlap.
    let lines: Vec<_> = output.control_lines.values().collect();
    for (i, a) in lines.iter().enumerate() {
        for b in lines.iter().skip(i + 1) {
            for p in interior(&a.pos) {
                for seg in b.pos.windows(2) {
                    assert!(
                        !on_segment(*p, seg[0], seg[1]),
                        "{}'s waypoint {p:?} lies on {}'s segment {:?}-{:?}",
                        a.name,
                        b.name,
                        seg[0],
                        seg[1],
                    );
                }
            }
            for sa in a.pos.windows(2) {
                for sb in b.pos.windows(2) {
                    assert!(
                        !segments_touch(sa[0], sa[1], sb[0], sb[1]),
                        "{} segment {:?}-{:?} touches {} segment {:?}-{:?}",
                        a.name,
                        sa[0],
                        sa[1],
                        b.name,
                        sb[0],
                        sb[1],
                    );
                }
            }
        }
    }
}

#[test]
fn flipchip_runs_are_deterministic() {
    init_tracing();
    let qubits = grid_qubits(3, 3, Point::new(0.0, 0.0));
    let readout_lines = readout_lines_for(&qubits);
    let request = RoutingRequest {
        qubits: &qubits,
        readout_lines: &readout_lines,
        chip: None,
        pad: PadGeometry::default(),
        chip_name: "chip0".to_string(),
    };
    let first = route(Strategy::Flipchip, &request).unwrap();
    let second = route(Strategy::Flipchip, &request).unwrap();
    assert_eq!(format!("{first:?}"), format!("{second:?}"));
}

#[test]
fn flipchip_ibm_routes_the_lattice() {
    init_tracing();
    let qubits = grid_qubits(3, 3, Point::new(0.0, 0.0));
    let readout_lines = readout_lines_for(&qubits);
    let request = RoutingRequest {
        qubits: &qubits,
        readout_lines: &readout_lines,
        chip: None,
        pad: PadGeometry::default(),
        chip_name: "chip0".to_string(),
    };
    let output = route(Strategy::FlipchipIbm, &request).unwrap();

    // Every qubit is either routed or reported, never dropped.
    assert_eq!(output.control_lines.len() + output.unrouted.len(), 9);
    assert!(!output.control_lines.is_empty());
    for line in output.control_lines.values() {
        assert!(line.pos.len() >= 2);
        assert_eq!(line.line_type, "ControlLine");
    }

    let repeat = route(Strategy::FlipchipIbm, &request).unwrap();
    assert_eq!(format!("{output:?}"), format!("{repeat:?}"));
}

#[test]
fn flipchip_ibm_rejects_short_qubits() {
    init_tracing();
    let mut qubits = grid_qubits(2, 2, Point::new(0.0, 0.0));
    // Shrink one qubit below the height floor.
    if let Some(q) = qubits.get_mut("q_1_1") {
        let x = q.gds_pos.x;
        let y = q.gds_pos.y;
        q.outline = vec![
            Point::new(x - 250.0, y - 200.0),
            Point::new(x + 250.0, y - 200.0),
            Point::new(x + 250.0, y + 200.0),
            Point::new(x - 250.0, y + 200.0),
        ];
    }
    let readout_lines = readout_lines_for(&qubits);
    let request = RoutingRequest {
        qubits: &qubits,
        readout_lines: &readout_lines,
        chip: None,
        pad: PadGeometry::default(),
        chip_name: "chip0".to_string(),
    };
    match route(Strategy::FlipchipIbm, &request) {
        Err(RoutingError::InsufficientQubitHeight { qubit, height, .. }) => {
            assert_eq!(qubit, "q_1_1");
            assert_eq!(height, 400.0);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn unknown_strategy_name_is_rejected() {
    init_tracing();
    let qubits = grid_qubits(2, 2, Point::new(0.0, 0.0));
    let readout_lines = readout_lines_for(&qubits);
    let request = RoutingRequest {
        qubits: &qubits,
        readout_lines: &readout_lines,
        chip: None,
        pad: PadGeometry::default(),
        chip_name: "chip0".to_string(),
    };
    match route_by_name("NotARealStrategy", &request) {
        Err(RoutingError::UnknownStrategy(name)) => assert_eq!(name, "NotARealStrategy"),
        other => panic!("unexpected result: {other:?}"),
    }
}
