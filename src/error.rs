use thiserror::Error;

use crate::geometry::ChipEdge;

/// Errors raised by the routing core. All of these are input-validation or
/// infeasibility errors; none are transient.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("topology contains no qubit positions")]
    EmptyTopology,

    #[error("expected at least one {0}")]
    EmptyInput(&'static str),

    #[error("invalid qubit grid: {rows} rows x {cols} columns")]
    InvalidGrid { rows: u32, cols: u32 },

    #[error("chip `{0}` does not exist; generate the chip before routing")]
    MissingChip(String),

    #[error("row {0} has no readout line; generate readout lines before routing")]
    MissingReadoutLine(u32),

    #[error("no pins found on the {0} edge")]
    NoPinsInDirection(ChipEdge),

    #[error(
        "current chip size causes pin overflow: {count} pins on the {edge} edge \
         need a run of {required} but only {available} is available"
    )]
    PinOverflow {
        edge: ChipEdge,
        count: usize,
        required: f64,
        available: f64,
    },

    #[error(
        "qubit `{qubit}` has type `{qubit_type}` but `{first}` has type `{first_type}`; \
         Flipchip IBM routing requires a uniform qubit type"
    )]
    InconsistentQubitType {
        first: String,
        first_type: String,
        qubit: String,
        qubit_type: String,
    },

    #[error(
        "qubit `{qubit}` has height {height}, below the {minimum} minimum \
         required by Flipchip IBM routing"
    )]
    InsufficientQubitHeight {
        qubit: String,
        height: f64,
        minimum: f64,
    },

    #[error("qubit `{0}` has no control pins")]
    InsufficientControlPins(String),

    #[error(
        "unknown routing strategy `{0}`; valid strategies are \
         Control_off_chip_routing, Flipchip_routing, Flipchip_routing_IBM"
    )]
    UnknownStrategy(String),

    #[error("no disjoint path found for {count} pin/qubit pair(s), first `{pin}` -> `{qubit}`")]
    PathNotFound {
        count: usize,
        pin: String,
        qubit: String,
    },
}
