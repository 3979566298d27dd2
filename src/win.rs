//! Detection of completed four-in-a-row alignments

use std::fmt;

use crate::{board::*, HEIGHT, RUN, WIDTH};

/// The scan direction that produced a win
///
/// Variants are declared in the order they are tried at each cell, which is
/// also the tie-break when one cell completes several alignments.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Direction {
    /// downwards from the starting cell
    Column,
    /// the three cells to the left in the same row
    RowLeft,
    /// the three cells to the right in the same row
    RowRight,
    /// down and to the left
    DiagBottomLeft,
    /// down and to the right
    DiagBottomRight,
}

impl Direction {
    pub const PRIORITY: [Direction; 5] = [
        Direction::Column,
        Direction::RowLeft,
        Direction::RowRight,
        Direction::DiagBottomLeft,
        Direction::DiagBottomRight,
    ];

    /// Row and column step taken per neighbour
    fn step(self) -> (isize, isize) {
        match self {
            Direction::Column => (1, 0),
            Direction::RowLeft => (0, -1),
            Direction::RowRight => (0, 1),
            Direction::DiagBottomLeft => (1, -1),
            Direction::DiagBottomRight => (1, 1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Column => "column",
            Direction::RowLeft => "rowLeft",
            Direction::RowRight => "rowRight",
            Direction::DiagBottomLeft => "bottomLeft",
            Direction::DiagBottomRight => "bottomRight",
        })
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Outcome {
    None,
    WinBy(Player, Direction),
}

impl Outcome {
    pub fn is_win(&self) -> bool {
        matches!(self, Outcome::WinBy(..))
    }
}

/// Scans the whole board for a four-in-a-row of `player`
///
/// Cells are visited top row first, left to right; the first cell where any
/// direction completes decides the result.
pub fn check(board: &Board, player: Player) -> Outcome {
    for row in 0..HEIGHT {
        for column in 0..WIDTH {
            if let Some(direction) = check_cell(board, row, column, player) {
                return Outcome::WinBy(player, direction);
            }
        }
    }
    Outcome::None
}

/// Alias of [`check`], the whole-board scan
pub fn check_board(board: &Board, player: Player) -> Outcome {
    check(board, player)
}

/// Returns the first direction, in priority order, in which the run starting at
/// (`row`, `column`) is four of `player`'s tokens
pub fn check_cell(board: &Board, row: usize, column: usize, player: Player) -> Option<Direction> {
    let start = board.is(row, column, player) as usize;

    Direction::PRIORITY.iter().copied().find(|&direction| {
        let (dy, dx) = direction.step();
        // the furthest neighbour must stay on the board
        let last_row = row as isize + dy * (RUN as isize - 1);
        let last_column = column as isize + dx * (RUN as isize - 1);
        if last_row < 0 || last_row >= HEIGHT as isize || last_column < 0 || last_column >= WIDTH as isize {
            return false;
        }

        let count = start
            + (1..RUN as isize)
                .filter(|&n| {
                    let r = (row as isize + dy * n) as usize;
                    let c = (column as isize + dx * n) as usize;
                    board.is(r, c, player)
                })
                .count();
        count == RUN
    })
}
