//! A game engine for the board game 'Connect 4'
//!
//! The engine holds the board, scans it for completed alignments, scores
//! positions with a window heuristic and picks machine moves with a
//! fixed-depth alpha-beta search.
//!
//! # Basic Usage
//!
//! ```
//! use connect4_engine::{board::{Board, Player}, searcher::Searcher};
//!
//!# use std::error::Error;
//!# fn main() -> Result<(), Box<dyn Error>> {
//! let mut board = Board::new();
//! for column in 0..3 {
//!     board.drop(column, Player::Two)?;
//! }
//! let mut searcher = Searcher::new(Player::Two);
//! let result = searcher.search(&board, 1);
//!
//! assert_eq!(result.column, Some(3));
//!# Ok(())
//!# }
//! ```

use static_assertions::*;
pub use anyhow;

pub mod board;

pub mod error;

pub mod game;

pub mod heuristic;

pub mod searcher;

pub mod transport;

pub mod win;

mod test;

pub use board::{Board, Cell, Player};
pub use error::{MoveError, TransportError};
pub use game::{Game, GameState};
pub use searcher::{SearchResult, Searcher};
pub use win::{Direction, Outcome};

/// The width of the game board in tiles
pub const WIDTH: usize = 7;

/// The height of the game board in tiles
pub const HEIGHT: usize = 6;

/// Length of a winning alignment
pub const RUN: usize = 4;

/// Default search depth of the machine player, in plies
pub const AI_DEPTH: u32 = 5;

/// Largest datagram accepted from the peer
pub const DATAGRAM_SIZE: usize = 2048;

// the window scans and the win scanner assume a 4-run fits both ways
const_assert!(WIDTH >= RUN && HEIGHT >= RUN);
