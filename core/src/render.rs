//! Terminal output of the board.
//!
//! Shards draw their own rows, one shard at a time. Turn-taking is an explicit loop of
//! barriers: in round `t` only rank `t` draws, then everyone waits for everyone. With
//! every shard writing to the same terminal, this keeps rows from different shards
//! from interleaving.

use crate::board::Board;
use crate::distributed::{Channel, Collective, Rank};
use crate::error::Result;
use std::io::{self, Stdout, Write};

/// Moves the cursor to the upper-left corner.
pub const CURSOR_HOME: &str = "\x1b[H";
/// A live cell: two spaces in reverse video.
pub const LIVE_CELL: &str = "\x1b[7m  \x1b[m";
/// A dead cell: two plain spaces.
pub const DEAD_CELL: &str = "  ";
/// Moves the cursor to the start of the next line.
pub const NEXT_LINE: &str = "\x1b[E";

/// A sink for a shard's view of the board.
pub trait Renderer {
    /// Draws the interior rows of `board`, which belongs to shard `rank`.
    fn render(&mut self, rank: Rank, board: &Board) -> Result<()>;
}

/// Draws the board with ANSI escape codes.
pub struct TerminalRenderer<W: Write> {
    out: W,
}

impl TerminalRenderer<Stdout> {
    /// A renderer writing to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, rank: Rank, board: &Board) -> Result<()> {
        if rank == 0 {
            self.out.write_all(CURSOR_HOME.as_bytes())?;
        }
        for row in board.interior_rows() {
            for &alive in row {
                let cell = if alive { LIVE_CELL } else { DEAD_CELL };
                self.out.write_all(cell.as_bytes())?;
            }
            self.out.write_all(NEXT_LINE.as_bytes())?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Lets every shard render `board` in rank order.
///
/// Every shard of the group must call this for the same frame.
pub fn render_in_turn<C, R>(comm: &C, renderer: &mut R, board: &Board) -> Result<()>
where
    C: Channel<bool> + ?Sized,
    R: Renderer + ?Sized,
{
    for turn in 0..comm.world_size() {
        if turn == comm.rank() {
            renderer.render(turn, board)?;
        }
        comm.barrier()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributed::launch;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_terminal_output() {
        let mut board = Board::allocate(2, 2).unwrap();
        board.set_cell(0, 1, true).unwrap();

        let mut renderer = TerminalRenderer::new(Vec::new());
        renderer.render(0, &board).unwrap();
        let out = String::from_utf8(renderer.into_inner()).unwrap();

        let expected = format!(
            "{CURSOR_HOME}{DEAD_CELL}{LIVE_CELL}{NEXT_LINE}{DEAD_CELL}{DEAD_CELL}{NEXT_LINE}"
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn test_only_rank_zero_homes_cursor() {
        let board = Board::allocate(1, 1).unwrap();
        let mut renderer = TerminalRenderer::new(Vec::new());
        renderer.render(1, &board).unwrap();
        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(out, format!("{DEAD_CELL}{NEXT_LINE}"));
    }

    /// Records which shard drew, in the order the draws happened.
    struct Recorder(Arc<Mutex<Vec<Rank>>>);

    impl Renderer for Recorder {
        fn render(&mut self, rank: Rank, _board: &Board) -> Result<()> {
            self.0.lock().unwrap().push(rank);
            Ok(())
        }
    }

    #[test]
    fn test_turns_are_serialized() {
        let log = Arc::new(Mutex::new(Vec::new()));
        launch::<bool, _, _>(4, |comm| {
            let board = Board::allocate(1, 3)?;
            let mut recorder = Recorder(Arc::clone(&log));
            for _ in 0..3 {
                render_in_turn(&comm, &mut recorder, &board)?;
            }
            Ok(())
        })
        .unwrap();

        let log = log.lock().unwrap();
        assert_eq!(*log, vec![0, 1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3]);
    }
}
