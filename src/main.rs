use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use std::io::{stdin, stdout, Write};

use connect4_engine::AI_DEPTH;

mod display;
mod modes;

use modes::Role;

#[derive(Parser)]
#[command(name = "connect4")]
#[command(about = "Connect 4 against a friend, a remote peer or the computer")]
struct Cli {
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand)]
enum Mode {
    /// Play against the computer
    Ai {
        /// Search depth of the computer player, in plies
        #[arg(long, default_value_t = AI_DEPTH)]
        depth: u32,
        /// Let the computer move first
        #[arg(long)]
        ai_first: bool,
    },
    /// Two players on this terminal
    Local,
    /// Play against one peer over UDP
    Online {
        /// Local port to bind
        #[arg(long)]
        port: u16,
        /// Wait for the peer to connect
        #[arg(long, conflicts_with = "peer_port")]
        host: bool,
        /// Port the hosting peer listens on
        #[arg(long, required_unless_present = "host")]
        peer_port: Option<u16>,
        #[arg(long, default_value = "localhost")]
        address: String,
    },
    /// Computer against computer at every pair of depths
    Duel {
        #[arg(long, default_value_t = AI_DEPTH)]
        max_depth: u32,
    },
}

fn main() -> Result<()> {
    // logs go to stderr so they don't tear the board display
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mode = match cli.mode {
        Some(mode) => mode,
        None => match menu()? {
            Some(mode) => mode,
            None => {
                println!("Bad selection, exiting.");
                return Ok(());
            }
        },
    };

    match mode {
        Mode::Ai { depth, ai_first } => modes::ai_versus(depth, ai_first),
        Mode::Local => modes::local_versus(),
        Mode::Online {
            port,
            host,
            peer_port,
            address,
        } => {
            let role = match (host, peer_port) {
                (false, Some(peer_port)) => Role::Connect { peer_port },
                _ => Role::Host,
            };
            modes::online_versus(&address, port, role)
        }
        Mode::Duel { max_depth } => modes::duel(max_depth),
    }
}

fn read_line(message: &str) -> Result<String> {
    print!("{}", message);
    stdout().flush()?;
    let mut buffer = String::new();
    stdin().read_line(&mut buffer)?;
    Ok(buffer.trim().to_string())
}

/// The interactive mode selection used when no subcommand is given
fn menu() -> Result<Option<Mode>> {
    println!(
        "Welcome to Connect 4, please select your mode...\n\
         1) CPU Opponent\n\
         2) Local Multiplayer\n\
         3) Online multiplayer\n"
    );

    let mode = match read_line("Select the number: ")?.as_str() {
        "1" => Mode::Ai {
            depth: AI_DEPTH,
            ai_first: false,
        },
        "2" => Mode::Local,
        "3" => {
            let port = read_line("Please enter your desired port number: ")?.parse()?;

            println!("Are you hosting or are you connecting?");
            println!("1. Connecting");
            println!("2. Hosting");
            let peer_port = loop {
                match read_line("Select your answer (#): ")?.as_str() {
                    "1" => {
                        break Some(read_line("Please enter opponent's port number: ")?.parse()?)
                    }
                    "2" => break None,
                    _ => println!("Unknown answer given"),
                }
            };

            Mode::Online {
                port,
                host: peer_port.is_none(),
                peer_port,
                address: "localhost".to_string(),
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(mode))
}
