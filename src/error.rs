use std::net::SocketAddr;

use crate::WIDTH;

/// Reasons a move is rejected before it reaches the board
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("Invalid move, column {0} out of range. Columns must be between 0 and {max}", max = WIDTH - 1)]
    ColumnOutOfRange(usize),

    #[error("Invalid move, column {0} full")]
    ColumnFull(usize),

    #[error("could not parse '{0}' as a column number")]
    NotANumber(String),
}

/// Failures of the peer link
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("peer sent an unreadable move: {0:?}")]
    BadPayload(String),

    #[error("unexpected handshake from {from}: {payload:?}")]
    Handshake { from: SocketAddr, payload: String },

    #[error("peer link closed")]
    Closed,

    #[error("shutdown requested")]
    Cancelled,
}
