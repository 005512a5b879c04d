//! Signal routing for superconducting quantum chip layouts.
//!
//! Takes a lattice of qubits (with their drawn geometry) plus readout lines
//! and produces launch pads on the chip boundary together with the control
//! and transmission lines connecting them to the qubits. Three strategies
//! are supported: off-chip control routing around the qubit cluster, and two
//! flip-chip variants, one corner-based and one running a disjoint-path
//! graph search through the interior.

pub mod boundary;
pub mod chip_size;
pub mod diagnostics;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod partition;
pub mod pins;
pub mod routing;
pub mod strategy;
pub mod topology;

pub use chip_size::{calc_chip_size, PadGeometry};
pub use entities::{
    Chip, CouplingPins, GridPosition, Pin, Pins, Qubit, Qubits, ReadoutLine, ReadoutLines,
    RoutedLine, RoutedLines,
};
pub use error::RoutingError;
pub use geometry::{ChipEdge, Point, Rect};
pub use strategy::{
    route, route_by_name, route_strict, RoutingOutput, RoutingRequest, Strategy,
};
