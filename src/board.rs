use std::fmt;

use crate::{error::MoveError, HEIGHT, WIDTH};

/// One of the two sides of a game
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// The player's number as shown to humans (1 or 2)
    pub fn number(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }

    pub fn token(self) -> char {
        match self {
            Player::One => 'X',
            Player::Two => 'O',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Cell {
    PlayerOne,
    PlayerTwo,
    Empty,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn player(&self) -> Option<Player> {
        match self {
            Cell::PlayerOne => Some(Player::One),
            Cell::PlayerTwo => Some(Player::Two),
            Cell::Empty => None,
        }
    }
}

impl From<Player> for Cell {
    fn from(player: Player) -> Self {
        match player {
            Player::One => Cell::PlayerOne,
            Player::Two => Cell::PlayerTwo,
        }
    }
}

/// A 7x6 Connect 4 grid
///
/// Row 0 is the top of the board and row `HEIGHT - 1` the bottom, so tokens
/// fall towards higher row indices. Cells can only be filled through
/// [`Board::drop`], which keeps every column packed from the bottom.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct Board {
    cells: [[Cell; WIDTH]; HEIGHT],
    // number of tokens in each column
    heights: [usize; WIDTH],
    num_moves: usize,
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; WIDTH]; HEIGHT],
            heights: [0; WIDTH],
            num_moves: 0,
        }
    }

    /// Builds a board by dropping alternating tokens, player one first
    ///
    /// Each character is a column digit, e.g. `"3344"`.
    pub fn from_moves<S: AsRef<str>>(moves: S) -> Result<Self, MoveError> {
        let mut board = Self::new();
        let mut player = Player::One;

        for column_char in moves.as_ref().chars() {
            match column_char.to_digit(10) {
                Some(column) => {
                    board.drop(column as usize, player)?;
                    player = player.opponent();
                }
                None => return Err(MoveError::NotANumber(column_char.to_string())),
            }
        }
        Ok(board)
    }

    /// Places `player`'s token in the lowest empty cell of `column`
    ///
    /// Returns the row the token landed in. The board is left untouched on error.
    pub fn drop(&mut self, column: usize, player: Player) -> Result<usize, MoveError> {
        if column >= WIDTH {
            return Err(MoveError::ColumnOutOfRange(column));
        }
        if !self.playable(column) {
            return Err(MoveError::ColumnFull(column));
        }

        let row = HEIGHT - 1 - self.heights[column];
        debug_assert!(self.cells[row][column].is_empty());
        self.cells[row][column] = player.into();
        self.heights[column] += 1;
        self.num_moves += 1;
        Ok(row)
    }

    /// Whether the top cell of `column` is still empty
    pub fn playable(&self, column: usize) -> bool {
        column < WIDTH && self.cells[0][column].is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.num_moves == WIDTH * HEIGHT
    }

    /// Columns that can still take a token, in ascending order
    pub fn open_columns(&self) -> impl Iterator<Item = usize> + '_ {
        (0..WIDTH).filter(move |&column| self.playable(column))
    }

    pub fn get(&self, row: usize, column: usize) -> Cell {
        self.cells[row][column]
    }

    pub fn is(&self, row: usize, column: usize, player: Player) -> bool {
        self.cells[row][column] == Cell::from(player)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell; WIDTH]> {
        self.cells.iter()
    }

    pub fn num_moves(&self) -> usize {
        self.num_moves
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Validates raw human input as a column number
///
/// Only plain digit strings are accepted; range and fullness are checked by
/// [`Board::drop`].
pub fn parse_column(input: &str) -> Result<usize, MoveError> {
    let input = input.trim();
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
        return Err(MoveError::NotANumber(input.to_string()));
    }
    input
        .parse::<usize>()
        .map_err(|_| MoveError::NotANumber(input.to_string()))
}
