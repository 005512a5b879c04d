//! Disjoint shortest-path search over the waypoint graph: pairs are routed
//! one at a time, each search hiding the other pairs' endpoints and every
//! node consumed by an earlier path.

use hashbrown::HashSet;
use petgraph::algo::astar;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::NodeFiltered;
use tracing::{debug, warn};

use crate::geometry::{ChipEdge, Point};

use super::types::{dedup_consecutive, PairId, RouteResult, RoutedPath};
use super::waypoint_graph::WaypointGraph;

/// One pin/qubit connection request, with the pin's own position so the
/// resulting polyline can start at the pad rather than at its exit node.
#[derive(Clone, Debug)]
pub struct SearchPair {
    pub id: PairId,
    pub edge: ChipEdge,
    pub pin_pos: Point,
}

/// Routes every pair in the given visiting order. Pairs with no feasible
/// disjoint path are reported in `RouteResult::unrouted` instead of being
/// silently dropped.
pub fn search_disjoint_paths(graph: &WaypointGraph, pairs: &[SearchPair]) -> RouteResult {
    let mut endpoints: HashSet<NodeIndex> = HashSet::new();
    for pair in pairs {
        if let Some(&exit) = graph.exits.get(&pair.id.pin) {
            endpoints.insert(exit);
        }
        if let Some(&target) = graph.targets.get(&pair.id.qubit) {
            endpoints.insert(target);
        }
    }

    let mut consumed: HashSet<NodeIndex> = HashSet::new();
    let mut result = RouteResult::default();

    for pair in pairs {
        let (Some(&start), Some(&goal)) = (
            graph.exits.get(&pair.id.pin),
            graph.targets.get(&pair.id.qubit),
        ) else {
            warn!(pin = %pair.id.pin, qubit = %pair.id.qubit, "pair has no graph endpoints");
            result.unrouted.push(pair.id.clone());
            continue;
        };

        let goal_pos = graph.pos(goal);
        let filtered = NodeFiltered::from_fn(&graph.graph, |node| {
            if consumed.contains(&node) {
                return false;
            }
            // Other pairs' endpoints are hidden to discourage crossing.
            if endpoints.contains(&node) && node != start && node != goal {
                return false;
            }
            true
        });

        let found = astar(
            &filtered,
            start,
            |node| node == goal,
            |edge| *edge.weight(),
            |node| graph.pos(node).distance(&goal_pos),
        );

        match found {
            Some((cost, nodes)) => {
                debug!(pin = %pair.id.pin, qubit = %pair.id.qubit, cost, "routed pair");
                let mut points = Vec::with_capacity(nodes.len() + 1);
                points.push(pair.pin_pos);
                for &node in &nodes {
                    points.push(graph.pos(node));
                    consumed.insert(node);
                }
                result.paths.push(RoutedPath {
                    pin: pair.id.pin.clone(),
                    target: pair.id.qubit.clone(),
                    edge: pair.edge,
                    points: dedup_consecutive(points),
                });
            }
            None => {
                warn!(pin = %pair.id.pin, qubit = %pair.id.qubit, "no disjoint path found");
                result.unrouted.push(pair.id.clone());
            }
        }
    }

    result
}
