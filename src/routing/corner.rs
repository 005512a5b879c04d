//! Corner routing: straight segments joined at right-angle waypoints, with
//! per-line staggered corner levels so parallel traces keep a constant gap.

use std::cmp::Reverse;

use itertools::Itertools;

use crate::boundary::QubitBounds;
use crate::chip_size::GAP;
use crate::entities::Pin;
use crate::geometry::{ChipEdge, OrderedF64, Point};

use super::types::{dedup_consecutive, RoutedPath};

/// A control-line termination point on a named qubit.
#[derive(Clone, Debug, PartialEq)]
pub struct CornerTarget {
    pub qubit: String,
    pub point: Point,
}

fn axis_coord(edge: ChipEdge, point: &Point) -> f64 {
    if edge.is_horizontal() {
        point.x
    } else {
        point.y
    }
}

/// How far a point sits into the chip, measured from the given edge.
fn edge_depth(edge: ChipEdge, point: &Point) -> f64 {
    match edge {
        ChipEdge::Upper => -point.y,
        ChipEdge::Lower => point.y,
        ChipEdge::Left => point.x,
        ChipEdge::Right => -point.x,
    }
}

/// Corner levels by proximity rank to the edge center: rank 0 takes the
/// level closest to the qubit cluster, and mirror pairs (i, n-1-i) land on
/// adjacent levels so symmetric pairs route together.
fn corner_levels(n: usize) -> Vec<usize> {
    let center = (n as f64 - 1.0) / 2.0;
    let order: Vec<usize> = (0..n)
        .sorted_by_key(|&k| (OrderedF64((k as f64 - center).abs()), k))
        .collect();
    let mut levels = vec![0usize; n];
    for (level, &k) in order.iter().enumerate() {
        levels[k] = level;
    }
    levels
}

fn straight_exit(edge: ChipEdge, pin: &Pin) -> Point {
    match edge {
        ChipEdge::Upper => Point::new(pin.pos.x, pin.pos.y - pin.start_straight),
        ChipEdge::Lower => Point::new(pin.pos.x, pin.pos.y + pin.start_straight),
        ChipEdge::Left => Point::new(pin.pos.x + pin.start_straight, pin.pos.y),
        ChipEdge::Right => Point::new(pin.pos.x - pin.start_straight, pin.pos.y),
    }
}

/// Waypoints of one line: pin, straight exit, a run along the corridor at
/// this line's level, a drop along the approach lane, and a final step from
/// the lane onto the target. When the lane coincides with the target the
/// final step degenerates and is deduplicated away.
fn corner_waypoints(
    edge: ChipEdge,
    pin: &Pin,
    target: &Point,
    bounds: &QubitBounds,
    level: usize,
    lane: f64,
) -> Vec<Point> {
    let offset = (level + 1) as f64 * GAP;
    let exit = straight_exit(edge, pin);
    match edge {
        ChipEdge::Upper | ChipEdge::Lower => {
            let cy = if edge == ChipEdge::Upper {
                bounds.y_upper + offset
            } else {
                bounds.y_lower - offset
            };
            vec![
                pin.pos,
                exit,
                Point::new(pin.pos.x, cy),
                Point::new(lane, cy),
                Point::new(lane, target.y),
                *target,
            ]
        }
        ChipEdge::Left | ChipEdge::Right => {
            let cx = if edge == ChipEdge::Left {
                bounds.x_left - offset
            } else {
                bounds.x_right + offset
            };
            vec![
                pin.pos,
                exit,
                Point::new(cx, pin.pos.y),
                Point::new(cx, lane),
                Point::new(target.x, lane),
                *target,
            ]
        }
    }
}

/// Routes one edge's pins to their targets. Pins and targets are ranked
/// along the edge axis and matched rank-to-rank, which keeps the drops
/// order-preserving; staggered corner levels keep the parallel runs `GAP`
/// apart.
///
/// Targets sharing the edge-axis coordinate would stack their final
/// approaches on one line, so each such group fans out onto separate lanes:
/// the target nearest the edge keeps the straight approach, deeper targets
/// jog aside by one `GAP` per depth rank, away from the group's pins. Within
/// a group the deepest target also takes the pin nearest the group and the
/// highest corner level, so its wide swing clears the shallower corridors.
pub fn route_edge_control_lines(
    edge: ChipEdge,
    pins: &[&Pin],
    targets: &[CornerTarget],
    bounds: &QubitBounds,
) -> Vec<RoutedPath> {
    let mut sorted_pins: Vec<&Pin> = pins.to_vec();
    sorted_pins.sort_by_key(|p| (OrderedF64(axis_coord(edge, &p.pos)), p.name.clone()));
    let mut sorted_targets: Vec<&CornerTarget> = targets.iter().collect();
    sorted_targets.sort_by_key(|t| (OrderedF64(axis_coord(edge, &t.point)), t.qubit.clone()));

    let n = sorted_pins.len().min(sorted_targets.len());
    let levels = corner_levels(n);

    // Corridors must clear the target pins as well as the qubit bodies, or
    // an approach rising back out of the corridor band would cut across the
    // deeper lines' corridors.
    let mut adjusted = *bounds;
    for target in sorted_targets.iter().take(n) {
        match edge {
            ChipEdge::Upper => adjusted.y_upper = adjusted.y_upper.max(target.point.y),
            ChipEdge::Lower => adjusted.y_lower = adjusted.y_lower.min(target.point.y),
            ChipEdge::Left => adjusted.x_left = adjusted.x_left.min(target.point.x),
            ChipEdge::Right => adjusted.x_right = adjusted.x_right.max(target.point.x),
        }
    }

    // Per line: matched pin index, corner level and approach-lane jog.
    let mut plan: Vec<(usize, usize, f64)> = (0..n).map(|k| (k, levels[k], 0.0)).collect();
    let mut start = 0;
    while start < n {
        let coord = axis_coord(edge, &sorted_targets[start].point);
        let mut end = start + 1;
        while end < n && axis_coord(edge, &sorted_targets[end].point) == coord {
            end += 1;
        }
        let by_depth: Vec<usize> = (start..end)
            .sorted_by_key(|&k| {
                (
                    OrderedF64(edge_depth(edge, &sorted_targets[k].point)),
                    sorted_targets[k].qubit.clone(),
                )
            })
            .collect();
        let by_pin: Vec<usize> = (start..end)
            .sorted_by_key(|&k| {
                let distance = (axis_coord(edge, &sorted_pins[k].pos) - coord).abs();
                (Reverse(OrderedF64(distance)), sorted_pins[k].name.clone())
            })
            .collect();
        let group_levels: Vec<usize> = (start..end).map(|k| levels[k]).sorted().collect();
        let pin_mean = (start..end)
            .map(|k| axis_coord(edge, &sorted_pins[k].pos))
            .sum::<f64>()
            / (end - start) as f64;
        let side = if pin_mean > coord { -1.0 } else { 1.0 };
        for (rank, &k) in by_depth.iter().enumerate() {
            plan[k] = (by_pin[rank], group_levels[rank], side * rank as f64 * GAP);
        }
        start = end;
    }

    plan.iter()
        .enumerate()
        .map(|(k, &(pin_idx, level, jog))| {
            let pin = sorted_pins[pin_idx];
            let target = sorted_targets[k];
            let lane = axis_coord(edge, &target.point) + jog;
            let points = corner_waypoints(edge, pin, &target.point, &adjusted, level, lane);
            RoutedPath {
                pin: pin.name.clone(),
                target: target.qubit.clone(),
                edge,
                points: dedup_consecutive(points),
            }
        })
        .collect()
}

/// Transmission line between two pins on the same horizontal edge: both
/// leads drop to a shared corridor level near the row's readout lines.
pub fn transmission_loop(
    edge: ChipEdge,
    first: &Pin,
    second: &Pin,
    corridor: f64,
) -> RoutedPath {
    let exit_a = straight_exit(edge, first);
    let exit_b = straight_exit(edge, second);
    let points = vec![
        first.pos,
        exit_a,
        Point::new(first.pos.x, corridor),
        Point::new(second.pos.x, corridor),
        exit_b,
        second.pos,
    ];
    RoutedPath {
        pin: first.name.clone(),
        target: second.name.clone(),
        edge,
        points: dedup_consecutive(points),
    }
}

/// Transmission line crossing the chip from a left-edge pin to a right-edge
/// pin along a corridor level.
pub fn transmission_across(left: &Pin, right: &Pin, corridor: f64) -> RoutedPath {
    let exit_l = straight_exit(ChipEdge::Left, left);
    let exit_r = straight_exit(ChipEdge::Right, right);
    let points = vec![
        left.pos,
        exit_l,
        Point::new(exit_l.x, corridor),
        Point::new(exit_r.x, corridor),
        exit_r,
        right.pos,
    ];
    RoutedPath {
        pin: left.name.clone(),
        target: right.name.clone(),
        edge: ChipEdge::Left,
        points: dedup_consecutive(points),
    }
}
