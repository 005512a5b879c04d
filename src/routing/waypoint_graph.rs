//! Waypoint graph synthesis for graph-based routing: pin straight-exit
//! nodes, a coarse waypoint mesh sampled inside each qubit's free area, and
//! control-pin target nodes, linked into an implicit orthogonal mesh.

use hashbrown::HashMap;
use itertools::Itertools;
use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::entities::{Pin, Qubits};
use crate::geometry::{BoundingBox, OrderedF64, Point};

/// Sampling pitch of the interior waypoint mesh.
pub const WAYPOINT_PITCH: f64 = 100.0;
/// Radius kept clear around each coupling pin.
pub const COUPLING_EXCLUSION: f64 = 120.0;

const SAME_LINE_EPS: f64 = 1e-6;

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    PinExit(String),
    Waypoint,
    Target(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
    pub kind: NodeKind,
    pub pos: Point,
}

pub struct WaypointGraph {
    pub graph: StableUnGraph<GraphNode, f64>,
    pub exits: HashMap<String, NodeIndex>,
    pub targets: HashMap<String, NodeIndex>,
}

impl WaypointGraph {
    pub fn pos(&self, node: NodeIndex) -> Point {
        self.graph[node].pos
    }

    /// Builds the graph from the qubit collection, the pins to route from
    /// and the chosen control-pin target per qubit.
    pub fn build(qubits: &Qubits, pins: &[&Pin], targets: &[(String, Point)]) -> Self {
        let mut graph: StableUnGraph<GraphNode, f64> = StableUnGraph::default();

        // Interior waypoints, qubit by qubit in insertion order.
        let mut waypoints: Vec<NodeIndex> = Vec::new();
        for qubit in qubits.values() {
            let bbox = qubit.bounding_box();
            let mut y = bbox.start.y + WAYPOINT_PITCH / 2.0;
            while y <= bbox.end.y - WAYPOINT_PITCH / 2.0 + SAME_LINE_EPS {
                let mut x = bbox.start.x + WAYPOINT_PITCH / 2.0;
                while x <= bbox.end.x - WAYPOINT_PITCH / 2.0 + SAME_LINE_EPS {
                    let pos = Point::new(x, y);
                    let clear = qubit
                        .coupling_pins
                        .iter()
                        .all(|cp| cp.distance(&pos) >= COUPLING_EXCLUSION);
                    if clear {
                        waypoints.push(graph.add_node(GraphNode {
                            kind: NodeKind::Waypoint,
                            pos,
                        }));
                    }
                    x += WAYPOINT_PITCH;
                }
                y += WAYPOINT_PITCH;
            }
        }

        // Implicit orthogonal mesh: consecutive waypoints sharing an x or y
        // line get linked in sorted order.
        let mut by_x: HashMap<u64, Vec<NodeIndex>> = HashMap::new();
        let mut by_y: HashMap<u64, Vec<NodeIndex>> = HashMap::new();
        for &node in &waypoints {
            let pos = graph[node].pos;
            by_x.entry(pos.x.to_bits()).or_default().push(node);
            by_y.entry(pos.y.to_bits()).or_default().push(node);
        }
        // Line buckets come out of the hash map in arbitrary order; sort the
        // keys so edge insertion stays deterministic.
        let by_line = |lines: HashMap<u64, Vec<NodeIndex>>| {
            lines
                .into_iter()
                .sorted_by(|a, b| f64::from_bits(a.0).total_cmp(&f64::from_bits(b.0)))
        };
        for (_, mut nodes) in by_line(by_x) {
            nodes.sort_by_key(|&n| (OrderedF64(graph[n].pos.y), n.index()));
            for w in nodes.windows(2) {
                let weight = graph[w[0]].pos.distance(&graph[w[1]].pos);
                graph.add_edge(w[0], w[1], weight);
            }
        }
        for (_, mut nodes) in by_line(by_y) {
            nodes.sort_by_key(|&n| (OrderedF64(graph[n].pos.x), n.index()));
            for w in nodes.windows(2) {
                let weight = graph[w[0]].pos.distance(&graph[w[1]].pos);
                graph.add_edge(w[0], w[1], weight);
            }
        }

        // Spatial index over the waypoint mesh for nearest-neighbor hookups.
        let tree: RTree<GeomWithData<Point, usize>> = RTree::bulk_load(
            waypoints
                .iter()
                .map(|&n| GeomWithData::new(graph[n].pos, n.index()))
                .collect(),
        );

        // Each pin's straight-exit node attaches to its nearest still
        // unclaimed waypoint, so no two exits funnel into the same cell.
        let mut exits: HashMap<String, NodeIndex> = HashMap::new();
        let mut claimed: hashbrown::HashSet<usize> = hashbrown::HashSet::new();
        for pin in pins {
            let exit_pos = pin_exit(pin);
            let exit = graph.add_node(GraphNode {
                kind: NodeKind::PinExit(pin.name.clone()),
                pos: exit_pos,
            });
            exits.insert(pin.name.clone(), exit);
            let nearest = tree
                .nearest_neighbor_iter(&exit_pos)
                .find(|w| !claimed.contains(&w.data));
            if let Some(waypoint) = nearest {
                claimed.insert(waypoint.data);
                let node = NodeIndex::new(waypoint.data);
                let weight = exit_pos.distance(&graph[node].pos);
                graph.add_edge(exit, node, weight);
            }
        }

        // Each target attaches to its nearest waypoints on the same x line,
        // falling back to plain nearest when the line has no samples.
        let mut target_nodes: HashMap<String, NodeIndex> = HashMap::new();
        for (qubit, point) in targets {
            let target = graph.add_node(GraphNode {
                kind: NodeKind::Target(qubit.clone()),
                pos: *point,
            });
            target_nodes.insert(qubit.clone(), target);
            let mut same_x: Vec<NodeIndex> = waypoints
                .iter()
                .copied()
                .filter(|&n| (graph[n].pos.x - point.x).abs() <= SAME_LINE_EPS)
                .collect();
            same_x.sort_by_key(|&n| (OrderedF64((graph[n].pos.y - point.y).abs()), n.index()));
            if same_x.is_empty() {
                if let Some(waypoint) = tree.nearest_neighbor_iter(point).next() {
                    let node = NodeIndex::new(waypoint.data);
                    let weight = point.distance(&graph[node].pos);
                    graph.add_edge(target, node, weight);
                }
            } else {
                for &node in same_x.iter().take(2) {
                    let weight = point.distance(&graph[node].pos);
                    graph.add_edge(target, node, weight);
                }
            }
        }

        WaypointGraph {
            graph,
            exits,
            targets: target_nodes,
        }
    }
}

/// Straight-exit point of a pin, one lead length into the chip interior.
pub(crate) fn pin_exit(pin: &Pin) -> Point {
    match pin.orientation {
        0 => Point::new(pin.pos.x, pin.pos.y - pin.start_straight),
        180 => Point::new(pin.pos.x, pin.pos.y + pin.start_straight),
        90 => Point::new(pin.pos.x + pin.start_straight, pin.pos.y),
        _ => Point::new(pin.pos.x - pin.start_straight, pin.pos.y),
    }
}
