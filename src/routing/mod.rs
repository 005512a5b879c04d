mod astar;
mod corner;
mod types;
mod waypoint_graph;

pub use astar::{search_disjoint_paths, SearchPair};
pub use corner::{route_edge_control_lines, transmission_across, transmission_loop, CornerTarget};
pub use types::{PairId, RouteResult, RoutedPath};
pub use waypoint_graph::{GraphNode, NodeKind, WaypointGraph, COUPLING_EXCLUSION, WAYPOINT_PITCH};
