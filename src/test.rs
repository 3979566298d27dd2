#[cfg(test)]
pub mod test {
    use anyhow::Result;
    use std::thread;
    use std::time::{Duration, Instant};

    use crate::{
        board::parse_column,
        heuristic::{self, window_score},
        searcher::{MAX_SCORE, MIN_SCORE},
        transport::{decode_move, local_pair, MoveChannel, Shutdown, UdpListener, UdpPeer},
        win::{self, Direction, Outcome},
        Board, Cell, Game, GameState, MoveError, Player, Searcher, TransportError, AI_DEPTH,
        HEIGHT, WIDTH,
    };

    /// Drops `player` into each column in turn
    fn drops(board: &mut Board, player: Player, columns: &[usize]) -> Result<()> {
        for &column in columns {
            board.drop(column, player)?;
        }
        Ok(())
    }

    /// Every run of four cells on the board, as (row, column) pairs
    fn all_runs() -> Vec<[(usize, usize); 4]> {
        let mut runs = Vec::new();
        for &(dy, dx) in [(0isize, 1isize), (1, 0), (1, 1), (1, -1)].iter() {
            for row in 0..HEIGHT as isize {
                for column in 0..WIDTH as isize {
                    let (last_row, last_column) = (row + 3 * dy, column + 3 * dx);
                    if last_row >= HEIGHT as isize || last_column < 0 || last_column >= WIDTH as isize {
                        continue;
                    }
                    let mut run = [(0, 0); 4];
                    for (i, cell) in run.iter_mut().enumerate() {
                        let i = i as isize;
                        *cell = ((row + i * dy) as usize, (column + i * dx) as usize);
                    }
                    runs.push(run);
                }
            }
        }
        runs
    }

    /// Fills `column` with `filler` up to `row`, then drops `player` into `row`
    fn place(board: &mut Board, row: usize, column: usize, player: Player, filler: Player) -> Result<()> {
        while (0..HEIGHT).rev().find(|&r| board.get(r, column).is_empty()) != Some(row) {
            board.drop(column, filler)?;
        }
        board.drop(column, player)?;
        Ok(())
    }

    fn cells(board: &Board) -> Vec<Cell> {
        board.rows().flat_map(|row| row.iter().copied()).collect()
    }

    #[test]
    pub fn drop_lands_on_lowest_empty_cell() -> Result<()> {
        let mut board = Board::new();
        assert_eq!(board.drop(3, Player::One)?, HEIGHT - 1);
        assert_eq!(board.drop(3, Player::Two)?, HEIGHT - 2);

        let before = cells(&board);
        let row = board.drop(5, Player::One)?;
        assert_eq!(row, HEIGHT - 1);
        assert_eq!(board.get(row, 5), Cell::PlayerOne);

        // exactly one cell changed
        let changed = before
            .iter()
            .zip(cells(&board).iter())
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(changed, 1);
        assert_eq!(board.num_moves(), 3);
        Ok(())
    }

    #[test]
    pub fn drop_rejects_full_and_out_of_range_columns() -> Result<()> {
        let mut board = Board::new();
        for i in 0..HEIGHT {
            let player = if i % 2 == 0 { Player::One } else { Player::Two };
            board.drop(0, player)?;
        }

        let before = board;
        assert_eq!(board.drop(0, Player::One), Err(MoveError::ColumnFull(0)));
        assert_eq!(
            board.drop(WIDTH, Player::One),
            Err(MoveError::ColumnOutOfRange(WIDTH))
        );
        assert_eq!(board, before);
        Ok(())
    }

    #[test]
    pub fn open_columns_are_ascending() -> Result<()> {
        let mut board = Board::from_moves("222222")?;
        assert_eq!(board.open_columns().collect::<Vec<_>>(), vec![0, 1, 3, 4, 5, 6]);
        assert!(!board.is_full());

        board = Board::from_moves(
            "000000111111222222333333444444555555666666",
        )?;
        assert!(board.is_full());
        assert_eq!(board.open_columns().count(), 0);
        Ok(())
    }

    #[test]
    pub fn parse_column_accepts_only_digits() {
        assert_eq!(parse_column("3"), Ok(3));
        assert_eq!(parse_column(" 4\n"), Ok(4));
        assert!(matches!(parse_column("-1"), Err(MoveError::NotANumber(_))));
        assert!(matches!(parse_column("abc"), Err(MoveError::NotANumber(_))));
        assert!(matches!(parse_column(""), Err(MoveError::NotANumber(_))));
        assert!(Board::from_moves("3a").is_err());
    }

    #[test]
    pub fn empty_board_has_no_winner() {
        let board = Board::new();
        assert_eq!(win::check(&board, Player::One), Outcome::None);
        assert_eq!(win::check(&board, Player::Two), Outcome::None);
    }

    #[test]
    pub fn detects_vertical_win() -> Result<()> {
        let mut board = Board::new();
        drops(&mut board, Player::One, &[2, 2, 2])?;
        assert_eq!(win::check(&board, Player::One), Outcome::None);

        drops(&mut board, Player::One, &[2])?;
        assert_eq!(
            win::check(&board, Player::One),
            Outcome::WinBy(Player::One, Direction::Column)
        );
        assert_eq!(win::check_board(&board, Player::Two), Outcome::None);
        Ok(())
    }

    #[test]
    pub fn detects_horizontal_win_anywhere_in_the_row() -> Result<()> {
        for start in 0..=WIDTH - 4 {
            let mut board = Board::new();
            let columns: Vec<usize> = (start..start + 4).collect();
            drops(&mut board, Player::Two, &columns)?;

            // the scan reaches the leftmost cell of the run first
            assert_eq!(
                win::check(&board, Player::Two),
                Outcome::WinBy(Player::Two, Direction::RowRight)
            );
        }

        // the run to the left of a cell is still reported
        let mut board = Board::new();
        drops(&mut board, Player::One, &[0, 1, 2, 3])?;
        assert_eq!(win::check_cell(&board, 5, 3, Player::One), Some(Direction::RowLeft));
        Ok(())
    }

    #[test]
    pub fn detects_diagonal_wins() -> Result<()> {
        // (2,0) (3,1) (4,2) (5,3)
        let mut board = Board::new();
        drops(&mut board, Player::Two, &[0, 0, 0, 1, 1, 2])?;
        drops(&mut board, Player::One, &[0, 1, 2, 3])?;
        assert_eq!(
            win::check(&board, Player::One),
            Outcome::WinBy(Player::One, Direction::DiagBottomRight)
        );

        // (2,6) (3,5) (4,4) (5,3)
        let mut board = Board::new();
        drops(&mut board, Player::Two, &[6, 6, 6, 5, 5, 4])?;
        drops(&mut board, Player::One, &[6, 5, 4, 3])?;
        assert_eq!(
            win::check(&board, Player::One),
            Outcome::WinBy(Player::One, Direction::DiagBottomLeft)
        );
        Ok(())
    }

    #[test]
    pub fn detects_every_run_on_the_board() -> Result<()> {
        let runs = all_runs();
        assert_eq!(runs.len(), 69);

        for run in runs.iter() {
            let mut cells = run.to_vec();
            // bottom cells first so each token can be supported
            cells.sort_by(|a, b| b.0.cmp(&a.0));

            let mut board = Board::new();
            for &(row, column) in cells[..3].iter() {
                place(&mut board, row, column, Player::One, Player::Two)?;
            }
            let (row, column) = cells[3];

            let mut blocked = board;
            place(&mut blocked, row, column, Player::Two, Player::Two)?;
            assert_eq!(win::check(&blocked, Player::One), Outcome::None, "{:?}", run);

            place(&mut board, row, column, Player::One, Player::Two)?;
            assert!(win::check(&board, Player::One).is_win(), "{:?}", run);
        }
        Ok(())
    }

    #[test]
    pub fn three_in_a_row_is_not_a_win() -> Result<()> {
        let mut board = Board::new();
        drops(&mut board, Player::One, &[1, 2, 3])?;
        drops(&mut board, Player::Two, &[4, 0])?;
        assert_eq!(win::check(&board, Player::One), Outcome::None);
        assert_eq!(win::check(&board, Player::Two), Outcome::None);
        Ok(())
    }

    #[test]
    pub fn column_wins_take_priority_at_the_same_cell() -> Result<()> {
        // (2,0) tops both a column and a down-right diagonal
        let mut board = Board::new();
        drops(&mut board, Player::One, &[0, 0, 0, 0])?;
        drops(&mut board, Player::Two, &[1, 1, 2])?;
        drops(&mut board, Player::One, &[1, 2, 3])?;

        assert_eq!(
            win::check_cell(&board, 2, 0, Player::One),
            Some(Direction::Column)
        );
        assert_eq!(
            win::check(&board, Player::One),
            Outcome::WinBy(Player::One, Direction::Column)
        );
        assert_eq!(Direction::Column.to_string(), "column");
        assert_eq!(Direction::DiagBottomRight.to_string(), "bottomRight");
        Ok(())
    }

    #[test]
    pub fn window_scores() {
        use Cell::*;
        let p = Player::Two;

        assert_eq!(window_score(&[PlayerTwo; 4], p), 100);
        assert_eq!(window_score(&[PlayerTwo, PlayerTwo, Empty, PlayerTwo], p), 5);
        assert_eq!(window_score(&[Empty, PlayerTwo, Empty, PlayerTwo], p), 2);
        assert_eq!(window_score(&[PlayerOne, PlayerOne, Empty, PlayerOne], p), -4);
        assert_eq!(window_score(&[PlayerTwo, PlayerOne, PlayerOne, PlayerOne], p), 0);
        assert_eq!(window_score(&[PlayerTwo, PlayerTwo, PlayerOne, Empty], p), 0);
        assert_eq!(window_score(&[Empty; 4], p), 0);
    }

    #[test]
    pub fn heuristic_scores_center_and_windows() -> Result<()> {
        assert_eq!(heuristic::windows(&Board::new()).count(), 69);
        assert_eq!(heuristic::score(&Board::new(), Player::Two), 0);

        let mut board = Board::new();
        drops(&mut board, Player::Two, &[3])?;
        assert_eq!(heuristic::score(&board, Player::Two), 3);
        assert_eq!(heuristic::score(&board, Player::One), 0);

        // three bottom-row windows now hold two tokens and two gaps
        drops(&mut board, Player::Two, &[4])?;
        assert_eq!(heuristic::score(&board, Player::Two), 3 + 3 * 2);
        Ok(())
    }

    #[test]
    pub fn heuristic_scores_diagonal_windows() -> Result<()> {
        // (5,0) (4,1) share only the rising window from the bottom-left corner
        let mut board = Board::new();
        drops(&mut board, Player::One, &[1])?;
        drops(&mut board, Player::Two, &[0, 1])?;
        assert_eq!(heuristic::score(&board, Player::Two), 2);
        assert_eq!(heuristic::score(&board, Player::One), 0);

        // (4,5) (5,6) share only the falling window ending in the bottom-right corner
        let mut board = Board::new();
        drops(&mut board, Player::One, &[5])?;
        drops(&mut board, Player::Two, &[6, 5])?;
        assert_eq!(heuristic::score(&board, Player::Two), 2);
        assert_eq!(heuristic::score(&board, Player::One), 0);
        Ok(())
    }

    #[test]
    pub fn heuristic_is_not_symmetric() -> Result<()> {
        let mut board = Board::new();
        drops(&mut board, Player::One, &[0, 1, 2])?;

        // one open three for player one, one open two
        assert_eq!(heuristic::score(&board, Player::One), 5 + 2);
        // player two only sees the threat
        assert_eq!(heuristic::score(&board, Player::Two), -4);
        Ok(())
    }

    #[test]
    pub fn search_completes_a_row() -> Result<()> {
        let mut board = Board::new();
        drops(&mut board, Player::Two, &[0, 1, 2])?;
        drops(&mut board, Player::One, &[0, 1])?;

        for depth in [1, 2, 3, AI_DEPTH] {
            let mut searcher = Searcher::new(Player::Two);
            let result = searcher.search(&board, depth);
            assert_eq!(result.column, Some(3), "depth {}", depth);
            assert_eq!(result.score, MAX_SCORE, "depth {}", depth);
        }
        Ok(())
    }

    #[test]
    pub fn search_blocks_a_column_threat() -> Result<()> {
        let mut board = Board::new();
        drops(&mut board, Player::One, &[0, 0, 0])?;
        drops(&mut board, Player::Two, &[6, 5])?;

        for depth in [2, 3, AI_DEPTH] {
            let mut searcher = Searcher::new(Player::Two);
            let result = searcher.search(&board, depth);
            assert_eq!(result.column, Some(0), "depth {}", depth);
            assert!(result.score > MIN_SCORE, "depth {}", depth);
        }
        Ok(())
    }

    #[test]
    pub fn search_at_depth_zero_returns_heuristic() -> Result<()> {
        let board = Board::from_moves("3342")?;
        let mut searcher = Searcher::new(Player::Two);

        let result = searcher.search(&board, 0);
        assert_eq!(result.score, heuristic::score(&board, Player::Two));
        assert_eq!(result.column, None);
        assert_eq!(searcher.choose_move(&board, 0), Some(0));
        Ok(())
    }

    #[test]
    pub fn search_reports_finished_positions() -> Result<()> {
        let mut board = Board::new();
        drops(&mut board, Player::One, &[4, 4, 4, 4])?;

        let mut searcher = Searcher::new(Player::Two);
        let result = searcher.search(&board, AI_DEPTH);
        assert_eq!(result, crate::SearchResult { column: None, score: MIN_SCORE });
        assert_eq!(searcher.node_count, 1);

        let mut searcher = Searcher::new(Player::One);
        assert_eq!(searcher.search(&board, AI_DEPTH).score, MAX_SCORE);
        Ok(())
    }

    #[test]
    pub fn pruning_never_changes_the_result() -> Result<()> {
        let positions = ["", "3", "3344", "332214", "0123456", "33332222"];

        for moves in positions.iter() {
            let board = Board::from_moves(moves)?;
            for &player in [Player::One, Player::Two].iter() {
                for depth in 1..=4 {
                    let mut pruned = Searcher::new(player);
                    let mut full = Searcher::new(player).without_pruning();

                    let a = pruned.search(&board, depth);
                    let b = full.search(&board, depth);
                    assert_eq!(a.score, b.score, "{:?} {:?} depth {}", moves, player, depth);
                    assert_eq!(a.column, b.column, "{:?} {:?} depth {}", moves, player, depth);
                    assert!(pruned.node_count <= full.node_count);
                }
            }
        }
        Ok(())
    }

    #[test]
    pub fn ties_go_to_the_lowest_column() {
        // only the center bonus separates the first moves
        let board = Board::new();
        let mut searcher = Searcher::new(Player::One).without_pruning();
        let result = searcher.search(&board, 1);
        assert_eq!(result.column, Some(WIDTH / 2));

        let mut board = Board::new();
        // with the center filled the board is mirror symmetric
        for i in 0..HEIGHT {
            let player = if i % 2 == 0 { Player::One } else { Player::Two };
            board.drop(WIDTH / 2, player).unwrap();
        }
        let mut searcher = Searcher::new(Player::One);
        let result = searcher.search(&board, 1);
        let column = result.column.unwrap();
        assert!(column < WIDTH / 2);
    }

    #[test]
    pub fn game_tracks_turns_and_wins() -> Result<()> {
        let mut game = Game::new(Player::One);
        assert_eq!(game.play_input("9"), Err(MoveError::ColumnOutOfRange(9)));
        assert_eq!(game.to_move, Player::One);

        for input in ["0", "1", "0", "1", "0", "1"].iter() {
            assert_eq!(game.play_input(input)?, GameState::Playing);
        }
        assert_eq!(
            game.play_input("0")?,
            GameState::Won {
                player: Player::One,
                direction: Direction::Column
            }
        );
        assert!(game.state.is_over());
        assert_eq!(game.history, vec![0, 1, 0, 1, 0, 1, 0]);

        // finished games ignore further moves
        assert_eq!(game.play_checked(2)?, game.state);
        assert_eq!(game.board.num_moves(), 7);
        Ok(())
    }

    #[test]
    pub fn self_play_is_deterministic() -> Result<()> {
        let first = Game::self_play(2, 3)?;
        let second = Game::self_play(2, 3)?;

        assert!(first.state.is_over());
        assert_eq!(first.history, second.history);
        assert_eq!(first.state, second.state);
        assert_eq!(first.board.num_moves(), first.history.len());
        Ok(())
    }

    #[test]
    pub fn decodes_move_payloads() {
        assert_eq!(decode_move(b"3").unwrap(), 3);
        assert_eq!(decode_move(b" 6\n").unwrap(), 6);
        assert!(matches!(decode_move(b"x"), Err(TransportError::BadPayload(_))));
        assert!(matches!(decode_move(b"-2"), Err(TransportError::BadPayload(_))));
    }

    #[test]
    pub fn local_link_carries_moves_both_ways() -> Result<()> {
        let (mut a, mut b) = local_pair(Shutdown::new());
        a.send_move(4)?;
        assert_eq!(b.receive_move()?, 4);
        b.send_move(0)?;
        assert_eq!(a.receive_move()?, 0);

        drop(a);
        assert!(matches!(b.receive_move(), Err(TransportError::Closed)));
        Ok(())
    }

    #[test]
    pub fn shutdown_cancels_a_blocked_receive() {
        let shutdown = Shutdown::new();
        let (_a, mut b) = local_pair(shutdown.clone());
        shutdown.request();
        assert!(matches!(b.receive_move(), Err(TransportError::Cancelled)));
    }

    #[test]
    pub fn udp_handshake_and_moves() -> Result<()> {
        let shutdown = Shutdown::new();
        let listener = UdpListener::bind("127.0.0.1:0", shutdown.clone())?;
        let host_addr = listener.local_addr()?;

        let mut guest = UdpPeer::connect("127.0.0.1:0", host_addr, shutdown.clone())?;
        let mut host = listener.accept()?;
        assert_eq!(host.peer_addr(), guest.local_addr()?);

        host.send_move(3)?;
        assert_eq!(guest.receive_move()?, 3);
        guest.send_move(6)?;
        assert_eq!(host.receive_move()?, 6);
        Ok(())
    }

    #[test]
    pub fn shutdown_interrupts_a_waiting_udp_peer() -> Result<()> {
        let shutdown = Shutdown::new();
        let listener = UdpListener::bind("127.0.0.1:0", shutdown.clone())?;
        let mut guest = UdpPeer::connect("127.0.0.1:0", listener.local_addr()?, shutdown.clone())?;
        let _host = listener.accept()?;

        // nothing is ever sent, so only the flag can end the wait
        let trigger = shutdown.clone();
        let interrupter = thread::spawn(move || {
            thread::sleep(Duration::from_millis(300));
            trigger.request();
        });
        let start = Instant::now();
        assert!(matches!(guest.receive_move(), Err(TransportError::Cancelled)));
        assert!(start.elapsed() >= Duration::from_millis(300));
        interrupter.join().expect("interrupter thread panicked");
        Ok(())
    }

    #[test]
    pub fn shutdown_interrupts_a_waiting_host() -> Result<()> {
        let shutdown = Shutdown::new();
        let listener = UdpListener::bind("127.0.0.1:0", shutdown.clone())?;

        let trigger = shutdown.clone();
        let interrupter = thread::spawn(move || {
            thread::sleep(Duration::from_millis(300));
            trigger.request();
        });
        assert!(matches!(listener.accept(), Err(TransportError::Cancelled)));
        interrupter.join().expect("interrupter thread panicked");
        Ok(())
    }

    #[test]
    pub fn error_messages() {
        assert_eq!(
            MoveError::ColumnOutOfRange(9).to_string(),
            "Invalid move, column 9 out of range. Columns must be between 0 and 6"
        );
        assert_eq!(MoveError::ColumnFull(2).to_string(), "Invalid move, column 2 full");
    }
}
