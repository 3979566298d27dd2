use anyhow::Result;
use crossterm::{
    style::{style, Attribute, Color, PrintStyledContent},
    QueueableCommand,
};

use std::io::{stdout, Write};

use connect4_engine::{Board, Cell, WIDTH};

/// Draws the board to stdout, top row first, with column numbers above
pub fn display(board: &Board) -> Result<()> {
    let mut stdout = stdout();

    let cols: String = (0..WIDTH).map(|x| format!(" {} ", x)).collect();
    stdout.queue(PrintStyledContent(style(cols + "\n")))?;

    for row in board.rows() {
        for cell in row.iter() {
            let token = format!(" {} ", cell.player().map_or('.', |player| player.token()));
            stdout.queue(PrintStyledContent(
                style(token)
                    .attribute(Attribute::Bold)
                    .on(Color::DarkBlue)
                    .with(match cell {
                        Cell::PlayerOne => Color::Red,
                        Cell::PlayerTwo => Color::Yellow,
                        Cell::Empty => Color::Blue,
                    }),
            ))?;
        }
        stdout.queue(PrintStyledContent(style("\n")))?;
    }
    stdout.flush()?;
    Ok(())
}
