use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use std::io::{stdin, stdout, Write};
use std::net::{SocketAddr, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use connect4_engine::{
    transport::{MoveChannel, Shutdown, UdpListener, UdpPeer},
    Game, GameState, MoveError, Player, Searcher, TransportError,
};

use crate::display::display;

/// Prints `message` and reads one line, `None` on end of input or a quit request
fn prompt(message: &str) -> Result<Option<String>> {
    print!("{}", message);
    stdout().flush()?;

    let mut buffer = String::new();
    if stdin().read_line(&mut buffer)? == 0 {
        return Ok(None);
    }
    let answer = buffer.trim();
    if answer.eq_ignore_ascii_case("q") || answer.eq_ignore_ascii_case("quit") {
        return Ok(None);
    }
    Ok(Some(answer.to_string()))
}

/// Reads moves until one is accepted by the game
///
/// Returns the played column, or `None` if the player quit.
fn play_human_turn(game: &mut Game, message: &str) -> Result<Option<usize>> {
    loop {
        let input = match prompt(message)? {
            Some(input) => input,
            None => return Ok(None),
        };
        match game.play_input(&input) {
            Ok(_) => return Ok(game.history.last().copied()),
            Err(err) => println!("{}", err),
        }
    }
}

fn announce(state: GameState, name: impl Fn(Player) -> String) {
    match state {
        GameState::Won { player, direction } => {
            println!("{} wins because of {}", name(player), direction)
        }
        GameState::Draw => println!("Draw!"),
        GameState::Playing => {}
    }
}

/// Two humans sharing one terminal
pub fn local_versus() -> Result<()> {
    let mut game = Game::new(Player::One);

    while !game.state.is_over() {
        display(&game.board)?;
        println!("{}'s turn", game.to_move);

        if play_human_turn(&mut game, "Enter column number: ")?.is_none() {
            println!("Quitting.");
            return Ok(());
        }
    }

    display(&game.board)?;
    announce(game.state, |player| player.to_string());
    Ok(())
}

/// A human against the machine player
///
/// The human plays 'X' and the machine 'O'.
pub fn ai_versus(depth: u32, ai_first: bool) -> Result<()> {
    let human = Player::One;
    let ai = Player::Two;
    let mut game = Game::new(if ai_first { ai } else { human });
    let mut searcher = Searcher::new(ai);

    while !game.state.is_over() {
        display(&game.board)?;

        if game.to_move == human {
            println!("Player's turn");
            if play_human_turn(&mut game, "Enter column number: ")?.is_none() {
                println!("Quitting.");
                return Ok(());
            }
        } else {
            println!("Opponent's turn");
            searcher.node_count = 0;
            let column = searcher
                .choose_move(&game.board, depth)
                .context("no open column left for the AI")?;
            // re-check against the live board before committing
            if !game.board.playable(column) {
                bail!("AI picked unplayable column {}", column);
            }
            game.play_checked(column)?;
            println!("AI plays column {}", column);
        }
    }

    display(&game.board)?;
    announce(game.state, |player| {
        if player == ai {
            "CPU".to_string()
        } else {
            "Player".to_string()
        }
    });
    Ok(())
}

/// How this side joins an online game
pub enum Role {
    /// wait for the peer's handshake, then move first
    Host,
    /// greet the peer at the given port, then move second
    Connect { peer_port: u16 },
}

// how long a Ctrl-C waits for the game loop before forcing the exit
const EXIT_GRACE: Duration = Duration::from_secs(1);

/// Routes Ctrl-C to `shutdown`
///
/// A blocked receive notices the flag within one poll interval. A blocked
/// stdin read never does, so the process exits after a grace period.
fn install_interrupt_handler(shutdown: Shutdown) -> Result<()> {
    ctrlc::set_handler(move || {
        println!("Interrupt received, shutting down...");
        shutdown.request();
        thread::sleep(EXIT_GRACE);
        std::process::exit(130);
    })
    .context("failed to install the Ctrl-C handler")
}

/// A human against a remote human over UDP
pub fn online_versus(address: &str, port: u16, role: Role) -> Result<()> {
    let shutdown = Shutdown::new();
    install_interrupt_handler(shutdown.clone())?;

    let link = match role {
        Role::Host => {
            let listener = UdpListener::bind((address, port), shutdown.clone())?;
            println!("You are hosting on {}", listener.local_addr()?);
            listener.accept().map(|link| (link, Player::Two))
        }
        Role::Connect { peer_port } => {
            let peer = resolve(address, peer_port)?;
            let link = UdpPeer::connect((address, port), peer, shutdown.clone())?;
            println!("Connected to {}", link.peer_addr());
            Ok((link, Player::One))
        }
    };
    let (mut link, me) = match link {
        Ok(link) => link,
        Err(TransportError::Cancelled) => return Ok(()),
        Err(err) => return Err(err.into()),
    };

    // the host moves first
    let mut game = Game::new(Player::Two);
    display(&game.board)?;

    while !game.state.is_over() {
        if game.to_move == me {
            match play_human_turn(&mut game, "It's your turn; Enter column number: ")? {
                Some(_) if shutdown.is_requested() => return Ok(()),
                Some(column) => link.send_move(column)?,
                None => {
                    shutdown.request();
                    println!("Quitting.");
                    return Ok(());
                }
            }
        } else {
            println!("Opponent's turn, please wait");
            let column = match link.receive_move() {
                Ok(column) => column,
                // the socket closes when the link is dropped
                Err(TransportError::Cancelled) => return Ok(()),
                Err(err) => return Err(err.into()),
            };
            game.play_checked(column)
                .map_err(|err: MoveError| anyhow::anyhow!("peer sent an illegal move: {}", err))?;
        }
        display(&game.board)?;
    }

    announce(game.state, |player| player.to_string());
    Ok(())
}

fn resolve(address: &str, port: u16) -> Result<SocketAddr> {
    (address, port)
        .to_socket_addrs()?
        .next()
        .with_context(|| format!("could not resolve {}:{}", address, port))
}

/// Every pair of machine players with depths 1..=max_depth plays one game
pub fn duel(max_depth: u32) -> Result<()> {
    let pairs: Vec<(u32, u32)> = (1..=max_depth)
        .flat_map(|one| (1..=max_depth).map(move |two| (one, two)))
        .collect();

    let progress = ProgressBar::new(pairs.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("Playing games: {bar:40.cyan/blue} {pos}/{len} ~{eta} remaining")?
            .progress_chars("█▓▒░  "),
    );

    let results = pairs
        .par_iter()
        .map(|&(one, two)| -> Result<((u32, u32), Game), MoveError> {
            let game = Game::self_play(one, two)?;
            progress.inc(1);
            Ok(((one, two), game))
        })
        .collect::<Result<Vec<_>, MoveError>>()?;
    progress.finish();

    let mut wins = (0, 0, 0);
    for ((one, two), game) in results.iter() {
        let verdict = match game.state {
            GameState::Won { player, direction } => {
                if player == Player::One {
                    wins.0 += 1;
                } else {
                    wins.1 += 1;
                }
                format!("{} wins by {}", player, direction)
            }
            GameState::Draw => {
                wins.2 += 1;
                "draw".to_string()
            }
            GameState::Playing => "unfinished".to_string(),
        };
        println!(
            "depth {} (X) vs depth {} (O): {} after {} moves",
            one,
            two,
            verdict,
            game.history.len()
        );
    }
    println!(
        "Player 1 wins: {}, Player 2 wins: {}, draws: {}",
        wins.0, wins.1, wins.2
    );
    Ok(())
}
