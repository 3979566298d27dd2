//! An agent to pick machine moves in Connect 4

use tracing::debug;

use crate::{board::*, heuristic, win};

/// Score of a position the machine player has won
pub const MAX_SCORE: i64 = 100_000_000_000_000;
/// Score of a position the opponent has won
pub const MIN_SCORE: i64 = -10_000_000_000_000;

/// The outcome of a search: the column to play, if any, and its score
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct SearchResult {
    /// `None` at terminal positions and at the depth horizon
    pub column: Option<usize>,
    pub score: i64,
}

impl SearchResult {
    fn leaf(score: i64) -> Self {
        Self {
            column: None,
            score,
        }
    }
}

/// A fixed-depth minimax agent with alpha-beta pruning
///
/// # Notes
/// The agent maximises for its own token and assumes the opponent minimises
/// the same score. Positions are only ever scored from the agent's side.
///
/// # Position Scoring
/// A won position scores [`MAX_SCORE`], a lost one [`MIN_SCORE`] and a
/// drawn one 0. At the depth horizon the board is scored with
/// [`heuristic::score`] for the agent's token.
///
/// # Move Ordering
/// Columns are tried in ascending order and the best score only moves on a
/// strict improvement, so ties go to the lowest column.
#[derive(Clone, Debug)]
pub struct Searcher {
    player: Player,
    pruning: bool,

    /// The number of nodes searched by this `Searcher` so far (for diagnostics only)
    pub node_count: usize,
}

impl Searcher {
    /// Creates a new `Searcher` playing `player`'s tokens
    pub fn new(player: Player) -> Self {
        Self {
            player,
            pruning: true,
            node_count: 0,
        }
    }

    /// Disables alpha-beta cut-offs, visiting the full tree
    pub fn without_pruning(mut self) -> Self {
        self.pruning = false;
        self
    }

    /// Searches `depth` plies ahead with the agent to move
    pub fn search(&mut self, board: &Board, depth: u32) -> SearchResult {
        let result = self.minimax(*board, depth, i64::MIN, i64::MAX, true);
        debug!(
            player = self.player.number(),
            depth,
            column = ?result.column,
            score = result.score,
            nodes = self.node_count,
            "search complete"
        );
        result
    }

    /// Picks the column the agent should play
    ///
    /// Falls back to the lowest open column when the search stops at the
    /// root without choosing, and returns `None` only if the board is full.
    pub fn choose_move(&mut self, board: &Board, depth: u32) -> Option<usize> {
        self.search(board, depth)
            .column
            .or_else(|| board.open_columns().next())
    }

    /// Performs game tree search
    ///
    /// Each child works on its own copy of the board, so siblings never see
    /// each other's moves.
    fn minimax(
        &mut self,
        board: Board,
        depth: u32,
        mut alpha: i64,
        mut beta: i64,
        maximizing: bool,
    ) -> SearchResult {
        self.node_count += 1;

        // terminal positions first, then the depth horizon
        if win::check(&board, self.player).is_win() {
            return SearchResult::leaf(MAX_SCORE);
        }
        if win::check(&board, self.player.opponent()).is_win() {
            return SearchResult::leaf(MIN_SCORE);
        }
        if board.is_full() {
            return SearchResult::leaf(0);
        }
        if depth == 0 {
            return SearchResult::leaf(heuristic::score(&board, self.player));
        }

        let mover = if maximizing {
            self.player
        } else {
            self.player.opponent()
        };
        let mut best = SearchResult {
            column: None,
            score: if maximizing { i64::MIN } else { i64::MAX },
        };

        for column in board.open_columns() {
            let mut next = board;
            next.drop(column, mover)
                .expect("open_columns yielded an unplayable column");
            let score = self
                .minimax(next, depth - 1, alpha, beta, !maximizing)
                .score;

            if maximizing {
                if score > best.score {
                    best = SearchResult {
                        column: Some(column),
                        score,
                    };
                }
                alpha = alpha.max(best.score);
            } else {
                if score < best.score {
                    best = SearchResult {
                        column: Some(column),
                        score,
                    };
                }
                beta = beta.min(best.score);
            }

            // the other player will never let the game reach this branch
            if self.pruning && alpha >= beta {
                break;
            }
        }

        best
    }
}
