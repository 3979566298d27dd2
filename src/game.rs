use crate::{
    board::*,
    error::MoveError,
    searcher::Searcher,
    win::{self, Direction, Outcome},
};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum GameState {
    Playing,
    Won { player: Player, direction: Direction },
    Draw,
}

impl GameState {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameState::Playing)
    }
}

/// A single game: the board plus whose turn it is
#[derive(Clone, Debug)]
pub struct Game {
    pub board: Board,
    pub to_move: Player,
    pub state: GameState,
    // columns played so far, in order
    pub history: Vec<usize>,
}

impl Game {
    /// Starts a game on an empty board with `first` to move
    pub fn new(first: Player) -> Self {
        Self {
            board: Board::new(),
            to_move: first,
            state: GameState::Playing,
            history: Vec::new(),
        }
    }

    /// Plays `column` for the player to move and updates the game state
    ///
    /// Rejected moves leave the game unchanged, so the caller can ask again.
    pub fn play_checked(&mut self, column: usize) -> Result<GameState, MoveError> {
        if self.state.is_over() {
            return Ok(self.state);
        }
        self.board.drop(column, self.to_move)?;
        self.history.push(column);

        self.state = match win::check(&self.board, self.to_move) {
            Outcome::WinBy(player, direction) => GameState::Won { player, direction },
            Outcome::None if self.board.is_full() => GameState::Draw,
            Outcome::None => GameState::Playing,
        };
        self.to_move = self.to_move.opponent();

        Ok(self.state)
    }

    /// Parses human input and plays it
    pub fn play_input(&mut self, input: &str) -> Result<GameState, MoveError> {
        let column = parse_column(input)?;
        self.play_checked(column)
    }

    /// Plays a whole game between two machine players
    ///
    /// Player one searches `depth_one` plies and moves first, player two
    /// searches `depth_two`. Both searches are deterministic, so the same
    /// depths always produce the same game.
    pub fn self_play(depth_one: u32, depth_two: u32) -> Result<Self, MoveError> {
        let mut game = Self::new(Player::One);
        let mut one = Searcher::new(Player::One);
        let mut two = Searcher::new(Player::Two);

        while !game.state.is_over() {
            let (searcher, depth) = match game.to_move {
                Player::One => (&mut one, depth_one),
                Player::Two => (&mut two, depth_two),
            };
            let column = match searcher.choose_move(&game.board, depth) {
                Some(column) => column,
                None => break,
            };
            game.play_checked(column)?;
        }
        Ok(game)
    }
}
