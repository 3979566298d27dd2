//! Positional scoring of non-terminal boards

use crate::{board::*, HEIGHT, RUN, WIDTH};

pub const CENTER_WEIGHT: i64 = 3;
pub const FOUR_SCORE: i64 = 100;
pub const THREE_SCORE: i64 = 5;
pub const TWO_SCORE: i64 = 2;
pub const OPPONENT_THREE_PENALTY: i64 = -4;

/// Scores a single window of four cells for `player`
///
/// At most one of the four/three/two bonuses applies; the opponent's
/// open three is penalised independently.
pub fn window_score(window: &[Cell; RUN], player: Player) -> i64 {
    let own = Cell::from(player);
    let theirs = Cell::from(player.opponent());
    let count = |cell: Cell| window.iter().filter(|&&c| c == cell).count();

    let (mine, opponent, empty) = (count(own), count(theirs), count(Cell::Empty));

    let mut score = match (mine, empty) {
        (4, _) => FOUR_SCORE,
        (3, 1) => THREE_SCORE,
        (2, 2) => TWO_SCORE,
        _ => 0,
    };
    if opponent == 3 && empty == 1 {
        score += OPPONENT_THREE_PENALTY;
    }
    score
}

/// Scores the board from `player`'s point of view
///
/// Sums a bonus per token in the middle column with the score of every
/// horizontal, vertical and diagonal window.
pub fn score(board: &Board, player: Player) -> i64 {
    let center = (0..HEIGHT)
        .filter(|&row| board.is(row, WIDTH / 2, player))
        .count() as i64;
    let mut score = center * CENTER_WEIGHT;

    for window in windows(board) {
        score += window_score(&window, player);
    }
    score
}

/// Every run of four consecutive cells on the board
pub fn windows(board: &Board) -> impl Iterator<Item = [Cell; RUN]> + '_ {
    let window = move |row: usize, column: usize, dy: isize, dx: isize| {
        let mut cells = [Cell::Empty; RUN];
        for (i, cell) in cells.iter_mut().enumerate() {
            let r = (row as isize + dy * i as isize) as usize;
            let c = (column as isize + dx * i as isize) as usize;
            *cell = board.get(r, c);
        }
        cells
    };

    let horizontal = (0..HEIGHT)
        .flat_map(move |row| (0..=WIDTH - RUN).map(move |column| window(row, column, 0, 1)));
    let vertical = (0..WIDTH)
        .flat_map(move |column| (0..=HEIGHT - RUN).map(move |row| window(row, column, 1, 0)));
    // down-right from the top-left cell
    let falling = (0..=HEIGHT - RUN)
        .flat_map(move |row| (0..=WIDTH - RUN).map(move |column| window(row, column, 1, 1)));
    // up-right from the bottom-left cell
    let rising = (0..=HEIGHT - RUN).flat_map(move |row| {
        (0..=WIDTH - RUN).map(move |column| window(row + RUN - 1, column, -1, 1))
    });

    horizontal.chain(vertical).chain(falling).chain(rising)
}
