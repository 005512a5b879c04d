//! Strategy selection and orchestration: validates inputs per strategy,
//! resolves the chip rectangle, places pins and builds the routed lines.

use indexmap::IndexMap;
use itertools::Itertools;
use tracing::info;

use crate::boundary::{qubit_bounds, readout_row_bounds, readout_row_space, QubitBounds};
use crate::chip_size::{calc_chip_size, PadGeometry};
use crate::entities::{Chip, Pin, Pins, Qubit, Qubits, ReadoutLines, RoutedLine, RoutedLines};
use crate::error::RoutingError;
use crate::geometry::{ChipEdge, OrderedF64, Point};
use crate::partition::{self, EdgeCounts, RowAssignment};
use crate::pins::{place_pins, PinPlan};
use crate::routing::{
    route_edge_control_lines, search_disjoint_paths, transmission_across, transmission_loop,
    CornerTarget, PairId, RoutedPath, SearchPair, WaypointGraph,
};
use crate::topology;

/// Minimum qubit height accepted by Flipchip IBM routing.
pub const MIN_QUBIT_HEIGHT: f64 = 470.0;
/// Flipchip IBM expects one control-pin candidate per side.
pub const REQUIRED_CONTROL_PINS: usize = 4;

pub const CONTROL_LINE_TYPE: &str = "ControlLine";
pub const TRANSMISSION_LINE_TYPE: &str = "TransmissionLine";

/// The three routing strategies.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Strategy {
    ControlOffChip,
    Flipchip,
    FlipchipIbm,
}

impl Strategy {
    pub const NAMES: [&'static str; 3] = [
        "Control_off_chip_routing",
        "Flipchip_routing",
        "Flipchip_routing_IBM",
    ];

    pub fn from_name(name: &str) -> Result<Self, RoutingError> {
        match name {
            "Control_off_chip_routing" => Ok(Strategy::ControlOffChip),
            "Flipchip_routing" => Ok(Strategy::Flipchip),
            "Flipchip_routing_IBM" => Ok(Strategy::FlipchipIbm),
            other => Err(RoutingError::UnknownStrategy(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::ControlOffChip => Self::NAMES[0],
            Strategy::Flipchip => Self::NAMES[1],
            Strategy::FlipchipIbm => Self::NAMES[2],
        }
    }
}

/// Borrowed inputs of one routing call. The routing core never mutates the
/// caller's collections; all results come back as owned output.
#[derive(Clone, Debug)]
pub struct RoutingRequest<'a> {
    pub qubits: &'a Qubits,
    pub readout_lines: &'a ReadoutLines,
    pub chip: Option<&'a Chip>,
    pub pad: PadGeometry,
    pub chip_name: String,
}

/// Owned output of one routing call, to be merged into the caller's design
/// state. `chip` is set when the strategy computed the chip size itself.
#[derive(Clone, Debug, Default)]
pub struct RoutingOutput {
    pub pins: Pins,
    pub control_lines: RoutedLines,
    pub transmission_lines: RoutedLines,
    pub chip: Option<Chip>,
    pub unrouted: Vec<PairId>,
}

/// Routes with the given strategy. Pairs the graph search could not connect
/// are returned in `RoutingOutput::unrouted`.
pub fn route(strategy: Strategy, request: &RoutingRequest) -> Result<RoutingOutput, RoutingError> {
    info!(strategy = strategy.name(), chip = %request.chip_name, "routing");
    match strategy {
        Strategy::ControlOffChip => route_control_off_chip(request),
        Strategy::Flipchip => route_flipchip(request),
        Strategy::FlipchipIbm => route_flipchip_ibm(request),
    }
}

/// Routes by strategy name string.
pub fn route_by_name(name: &str, request: &RoutingRequest) -> Result<RoutingOutput, RoutingError> {
    route(Strategy::from_name(name)?, request)
}

/// Like [`route`], but treats any unrouted pair as an error.
pub fn route_strict(
    strategy: Strategy,
    request: &RoutingRequest,
) -> Result<RoutingOutput, RoutingError> {
    let output = route(strategy, request)?;
    if let Some(first) = output.unrouted.first() {
        return Err(RoutingError::PathNotFound {
            count: output.unrouted.len(),
            pin: first.pin.clone(),
            qubit: first.qubit.clone(),
        });
    }
    Ok(output)
}

fn qubits_in_row<'a>(qubits: &'a Qubits, row: u32) -> Vec<&'a Qubit> {
    qubits
        .values()
        .filter(|q| q.grid_pos.row == row)
        .sorted_by_key(|q| (q.grid_pos.col, q.name.clone()))
        .collect()
}

/// The control pin closest to the given edge, so leads terminate on the side
/// the line arrives from.
fn control_pin_toward(qubit: &Qubit, edge: ChipEdge) -> Result<Point, RoutingError> {
    qubit
        .control_pins
        .iter()
        .copied()
        .max_by_key(|p| match edge {
            ChipEdge::Upper => (OrderedF64(p.y), OrderedF64(-p.x)),
            ChipEdge::Lower => (OrderedF64(-p.y), OrderedF64(-p.x)),
            ChipEdge::Left => (OrderedF64(-p.x), OrderedF64(-p.y)),
            ChipEdge::Right => (OrderedF64(p.x), OrderedF64(-p.y)),
        })
        .ok_or_else(|| RoutingError::InsufficientControlPins(qubit.name.clone()))
}

/// Pins on one edge, optionally restricted to a role, in placement order
/// (ascending along the edge axis).
fn edge_pins<'a>(pins: &'a Pins, edge: ChipEdge, role: Option<&str>) -> Vec<&'a Pin> {
    let prefix = match role {
        Some(role) => format!("pin_{}_{}_", edge.name(), role),
        None => format!("pin_{}_", edge.name()),
    };
    pins.values()
        .filter(|p| p.name.starts_with(&prefix))
        .collect()
}

fn edge_slot(edge: ChipEdge) -> usize {
    match edge {
        ChipEdge::Upper => 0,
        ChipEdge::Lower => 1,
        ChipEdge::Left => 2,
        ChipEdge::Right => 3,
    }
}

/// Turns routed paths into named output lines, numbering per edge.
fn lines_from_paths(
    paths: &[RoutedPath],
    prefix: &str,
    line_type: &str,
    chip_name: &str,
) -> RoutedLines {
    let mut counters = [0usize; 4];
    let mut lines = RoutedLines::new();
    for path in paths {
        let slot = edge_slot(path.edge);
        let name = format!("{prefix}_{}_{}", path.edge.name(), counters[slot]);
        counters[slot] += 1;
        lines.insert(
            name.clone(),
            RoutedLine {
                name,
                pos: path.points.clone(),
                line_type: line_type.to_string(),
                chip: chip_name.to_string(),
            },
        );
    }
    lines
}

// --- Control_off_chip -----------------------------------------------------

fn route_control_off_chip(request: &RoutingRequest) -> Result<RoutingOutput, RoutingError> {
    let chip = request
        .chip
        .ok_or_else(|| RoutingError::MissingChip(request.chip_name.clone()))?;
    let (rows, cols) = topology::grid_shape(request.qubits)?;
    let counts = partition::control_off_chip(rows, cols)?;
    let pins = place_pins(request.qubits, chip, &request.pad, &PinPlan::plain(counts), false)?;
    let bounds = qubit_bounds(request.qubits)?;

    // Each row is fed from its two end qubits; the partition decides which
    // edge each feed enters from.
    let mut left_ends: Vec<&Qubit> = Vec::new();
    let mut right_ends: Vec<&Qubit> = Vec::new();
    for row in 0..rows {
        let row_qubits = qubits_in_row(request.qubits, row);
        if let (Some(&first), Some(&last)) = (row_qubits.first(), row_qubits.last()) {
            left_ends.push(first);
            right_ends.push(last);
        }
    }

    let take_lower = (counts.lower / 2).min(left_ends.len());
    let take_upper = (counts.upper / 2).min(left_ends.len() - take_lower);
    let mid = left_ends.len() - take_upper;

    let corner_target = |qubit: &Qubit, edge: ChipEdge| -> Result<CornerTarget, RoutingError> {
        Ok(CornerTarget {
            qubit: qubit.name.clone(),
            point: control_pin_toward(qubit, edge)?,
        })
    };

    let mut paths: Vec<RoutedPath> = Vec::new();
    for edge in ChipEdge::ALL {
        let targets: Vec<CornerTarget> = match edge {
            ChipEdge::Upper => left_ends[mid..]
                .iter()
                .chain(right_ends[mid..].iter())
                .map(|q| corner_target(q, edge))
                .collect::<Result<_, _>>()?,
            ChipEdge::Lower => left_ends[..take_lower]
                .iter()
                .chain(right_ends[..take_lower].iter())
                .map(|q| corner_target(q, edge))
                .collect::<Result<_, _>>()?,
            ChipEdge::Left => left_ends[take_lower..mid]
                .iter()
                .map(|q| corner_target(q, edge))
                .collect::<Result<_, _>>()?,
            ChipEdge::Right => right_ends[take_lower..mid]
                .iter()
                .map(|q| corner_target(q, edge))
                .collect::<Result<_, _>>()?,
        };
        let pins_on_edge = edge_pins(&pins, edge, None);
        paths.extend(route_edge_control_lines(edge, &pins_on_edge, &targets, &bounds));
    }

    Ok(RoutingOutput {
        control_lines: lines_from_paths(&paths, "control_lines", CONTROL_LINE_TYPE, &request.chip_name),
        pins,
        transmission_lines: RoutedLines::new(),
        chip: None,
        unrouted: Vec::new(),
    })
}

// --- Flipchip (shared scaffolding) ----------------------------------------

struct FlipchipContext {
    chip: Chip,
    computed_chip: bool,
    counts: EdgeCounts,
    assignment: RowAssignment,
    pins: Pins,
    bounds: QubitBounds,
}

fn prepare_flipchip(
    request: &RoutingRequest,
    qubits: &Qubits,
) -> Result<FlipchipContext, RoutingError> {
    let (rows, cols) = topology::grid_shape(qubits)?;
    let (counts, assignment) = partition::flipchip(rows, cols)?;

    // Every row carries transmission pins, so every row needs a readout line
    // to derive its corridor from.
    for row in 0..rows {
        if readout_row_bounds(row, request.readout_lines, qubits).is_none() {
            return Err(RoutingError::MissingReadoutLine(row));
        }
    }

    let (chip, computed_chip) = match request.chip {
        Some(chip) => (chip.clone(), false),
        None => {
            let (start_pos, end_pos) = calc_chip_size(qubits, request.readout_lines, &request.pad)?;
            (
                Chip {
                    name: request.chip_name.clone(),
                    start_pos,
                    end_pos,
                },
                true,
            )
        }
    };

    let plan = PinPlan {
        counts,
        transmission: EdgeCounts {
            upper: 2 * assignment.upper.len(),
            lower: 2 * assignment.lower.len(),
            left: assignment.sides.len(),
            right: assignment.sides.len(),
        },
    };
    let pins = place_pins(qubits, &chip, &request.pad, &plan, true)?;
    let bounds = qubit_bounds(qubits)?;

    Ok(FlipchipContext {
        chip,
        computed_chip,
        counts,
        assignment,
        pins,
        bounds,
    })
}

/// Corridor level a row's transmission line runs on, clear of the row's
/// readout resonators.
fn row_corridor(
    row: u32,
    request: &RoutingRequest,
    qubits: &Qubits,
    below: bool,
) -> Result<f64, RoutingError> {
    let (max_y, min_y) = readout_row_bounds(row, request.readout_lines, qubits)
        .ok_or(RoutingError::MissingReadoutLine(row))?;
    let (max_space, _) = readout_row_space(row, request.readout_lines, qubits).unwrap_or((0.0, 0.0));
    Ok(if below {
        min_y - max_space
    } else {
        max_y + max_space
    })
}

fn flipchip_transmission_paths(
    ctx: &FlipchipContext,
    request: &RoutingRequest,
    qubits: &Qubits,
) -> Result<Vec<RoutedPath>, RoutingError> {
    let mut paths = Vec::new();

    // Upper and lower groups loop both leads back to their own edge. The
    // outermost pin pair takes the corridor farthest from the edge so inner
    // pairs never cut across it.
    for (edge, rows) in [
        (ChipEdge::Upper, &ctx.assignment.upper),
        (ChipEdge::Lower, &ctx.assignment.lower),
    ] {
        let trans_pins = edge_pins(&ctx.pins, edge, Some("transmission"));
        let pair_count = trans_pins.len() / 2;
        if pair_count == 0 {
            continue;
        }
        let mut corridors: Vec<f64> = rows
            .iter()
            .map(|&row| row_corridor(row, request, qubits, edge == ChipEdge::Lower))
            .collect::<Result<_, _>>()?;
        corridors.sort_by(|a, b| a.total_cmp(b));
        if edge == ChipEdge::Lower {
            corridors.reverse();
        }
        for k in 0..pair_count {
            let first = trans_pins[k];
            let second = trans_pins[trans_pins.len() - 1 - k];
            paths.push(transmission_loop(edge, first, second, corridors[k]));
        }
    }

    // Side rows cross the whole chip, left pin to right pin.
    let left_pins = edge_pins(&ctx.pins, ChipEdge::Left, Some("transmission"));
    let right_pins = edge_pins(&ctx.pins, ChipEdge::Right, Some("transmission"));
    for (k, &row) in ctx.assignment.sides.iter().enumerate() {
        let (Some(left), Some(right)) = (left_pins.get(k), right_pins.get(k)) else {
            break;
        };
        let corridor = row_corridor(row, request, qubits, false)?;
        paths.push(transmission_across(left, right, corridor));
    }

    Ok(paths)
}

/// Allocates every qubit to the edge its control line is routed from, in a
/// deterministic order along that edge.
fn flipchip_control_allocation<'a>(
    ctx: &FlipchipContext,
    qubits: &'a Qubits,
) -> IndexMap<ChipEdge, Vec<&'a Qubit>> {
    let mut allocation: IndexMap<ChipEdge, Vec<&Qubit>> = IndexMap::new();

    let collect_rows = |rows: &[u32]| -> Vec<&Qubit> {
        rows.iter()
            .flat_map(|&row| qubits_in_row(qubits, row))
            .collect()
    };
    allocation.insert(ChipEdge::Upper, collect_rows(&ctx.assignment.upper));
    allocation.insert(ChipEdge::Lower, collect_rows(&ctx.assignment.lower));

    // Side-band qubits go left-to-right: the left edge takes its pin budget
    // worth of the leftmost columns, the right edge takes the rest.
    let side_qubits: Vec<&Qubit> = ctx
        .assignment
        .sides
        .iter()
        .flat_map(|&row| qubits_in_row(qubits, row))
        .sorted_by_key(|q| (q.grid_pos.col, q.grid_pos.row, q.name.clone()))
        .collect();
    let control_left = ctx.counts.left.saturating_sub(ctx.assignment.sides.len());
    let split = control_left.min(side_qubits.len());
    allocation.insert(ChipEdge::Left, side_qubits[..split].to_vec());
    allocation.insert(ChipEdge::Right, side_qubits[split..].to_vec());

    allocation
}

fn route_flipchip(request: &RoutingRequest) -> Result<RoutingOutput, RoutingError> {
    let qubits = request.qubits;
    let ctx = prepare_flipchip(request, qubits)?;

    let allocation = flipchip_control_allocation(&ctx, qubits);
    let mut control_paths: Vec<RoutedPath> = Vec::new();
    for (&edge, edge_qubits) in &allocation {
        let targets: Vec<CornerTarget> = edge_qubits
            .iter()
            .map(|q| {
                Ok(CornerTarget {
                    qubit: q.name.clone(),
                    point: control_pin_toward(q, edge)?,
                })
            })
            .collect::<Result<_, RoutingError>>()?;
        let pins_on_edge = edge_pins(&ctx.pins, edge, Some("control"));
        control_paths.extend(route_edge_control_lines(edge, &pins_on_edge, &targets, &ctx.bounds));
    }

    let transmission_paths = flipchip_transmission_paths(&ctx, request, qubits)?;

    Ok(RoutingOutput {
        control_lines: lines_from_paths(
            &control_paths,
            "control_lines",
            CONTROL_LINE_TYPE,
            &request.chip_name,
        ),
        transmission_lines: lines_from_paths(
            &transmission_paths,
            "transmission_lines",
            TRANSMISSION_LINE_TYPE,
            &request.chip_name,
        ),
        pins: ctx.pins,
        chip: ctx.computed_chip.then_some(ctx.chip),
        unrouted: Vec::new(),
    })
}

// --- Flipchip IBM ----------------------------------------------------------

/// Flipchip IBM preconditions: uniform qubit type, minimum height, at least
/// one control pin. Qubits with one to three control pins are padded to four
/// by repeating the last pin.
fn validate_ibm_qubits(qubits: &Qubits) -> Result<Qubits, RoutingError> {
    let first = qubits
        .values()
        .next()
        .ok_or(RoutingError::EmptyInput("qubit"))?;
    for qubit in qubits.values() {
        if qubit.qubit_type != first.qubit_type {
            return Err(RoutingError::InconsistentQubitType {
                first: first.name.clone(),
                first_type: first.qubit_type.clone(),
                qubit: qubit.name.clone(),
                qubit_type: qubit.qubit_type.clone(),
            });
        }
    }
    for qubit in qubits.values() {
        let height = qubit.height();
        if height < MIN_QUBIT_HEIGHT {
            return Err(RoutingError::InsufficientQubitHeight {
                qubit: qubit.name.clone(),
                height,
                minimum: MIN_QUBIT_HEIGHT,
            });
        }
        if qubit.control_pins.is_empty() {
            return Err(RoutingError::InsufficientControlPins(qubit.name.clone()));
        }
    }

    let mut padded = qubits.clone();
    for qubit in padded.values_mut() {
        if let Some(&last) = qubit.control_pins.last() {
            while qubit.control_pins.len() < REQUIRED_CONTROL_PINS {
                qubit.control_pins.push(last);
            }
        }
    }
    Ok(padded)
}

fn route_flipchip_ibm(request: &RoutingRequest) -> Result<RoutingOutput, RoutingError> {
    let padded = validate_ibm_qubits(request.qubits)?;
    let ctx = prepare_flipchip(request, &padded)?;
    let positions: Vec<_> = padded.values().map(|q| q.grid_pos).collect();
    let (max_col, max_row) = topology::grid_bounds(&positions)?;

    let allocation = flipchip_control_allocation(&ctx, &padded);

    // Pair every control pin with its rank-matched qubit, then visit rows
    // nearest-to-farthest per edge so early paths stay short and leave the
    // interior open.
    let mut all_control_pins: Vec<&Pin> = Vec::new();
    let mut search_pairs: Vec<(SearchPair, u32, u32)> = Vec::new();
    let mut targets: Vec<(String, Point)> = Vec::new();
    for (&edge, edge_qubits) in &allocation {
        let pins_on_edge = edge_pins(&ctx.pins, edge, Some("control"));
        let mut sorted_pins = pins_on_edge.clone();
        sorted_pins.sort_by_key(|p| {
            let c = if edge.is_horizontal() { p.pos.x } else { p.pos.y };
            (OrderedF64(c), p.name.clone())
        });
        let mut sorted_qubits = edge_qubits.clone();
        sorted_qubits.sort_by_key(|q| {
            let c = if edge.is_horizontal() {
                q.gds_pos.x
            } else {
                q.gds_pos.y
            };
            (OrderedF64(c), q.name.clone())
        });
        for (pin, qubit) in sorted_pins.iter().zip(sorted_qubits.iter()) {
            let point = control_pin_toward(qubit, edge)?;
            targets.push((qubit.name.clone(), point));
            all_control_pins.push(*pin);
            let edge_distance = match edge {
                ChipEdge::Upper => max_row - qubit.grid_pos.row,
                ChipEdge::Lower => qubit.grid_pos.row,
                ChipEdge::Left => qubit.grid_pos.col,
                ChipEdge::Right => max_col - qubit.grid_pos.col,
            };
            search_pairs.push((
                SearchPair {
                    id: PairId {
                        pin: pin.name.clone(),
                        qubit: qubit.name.clone(),
                    },
                    edge,
                    pin_pos: pin.pos,
                },
                edge_distance,
                qubit.grid_pos.col,
            ));
        }
    }
    search_pairs.sort_by_key(|(pair, edge_distance, col)| {
        (edge_slot(pair.edge), *edge_distance, *col, pair.id.pin.clone())
    });
    let ordered: Vec<SearchPair> = search_pairs.into_iter().map(|(pair, _, _)| pair).collect();

    let graph = WaypointGraph::build(&padded, &all_control_pins, &targets);
    let result = search_disjoint_paths(&graph, &ordered);

    let transmission_paths = flipchip_transmission_paths(&ctx, request, &padded)?;

    Ok(RoutingOutput {
        control_lines: lines_from_paths(
            &result.paths,
            "control_lines",
            CONTROL_LINE_TYPE,
            &request.chip_name,
        ),
        transmission_lines: lines_from_paths(
            &transmission_paths,
            "transmission_lines",
            TRANSMISSION_LINE_TYPE,
            &request.chip_name,
        ),
        pins: ctx.pins,
        chip: ctx.computed_chip.then_some(ctx.chip),
        unrouted: result.unrouted,
    })
}
