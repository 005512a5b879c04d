use crate::geometry::{ChipEdge, Point};

/// Identifies a pin/qubit connection requested from the path builder.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PairId {
    pub pin: String,
    pub qubit: String,
}

/// An ordered polyline from a pin to its target, tagged with the edge the
/// pin sits on.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutedPath {
    pub pin: String,
    pub target: String,
    pub edge: ChipEdge,
    pub points: Vec<Point>,
}

impl RoutedPath {
    /// Waypoints strictly between the two endpoints.
    pub fn interior(&self) -> &[Point] {
        if self.points.len() <= 2 {
            &[]
        } else {
            &self.points[1..self.points.len() - 1]
        }
    }
}

/// Result of one path-building pass. Pairs the search could not connect are
/// reported explicitly instead of being dropped as empty paths.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RouteResult {
    pub paths: Vec<RoutedPath>,
    pub unrouted: Vec<PairId>,
}

/// Drops consecutive duplicate waypoints so every remaining pair of
/// neighbors differs in at least one axis.
pub(crate) fn dedup_consecutive(points: Vec<Point>) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for point in points {
        if out.last() != Some(&point) {
            out.push(point);
        }
    }
    out
}
