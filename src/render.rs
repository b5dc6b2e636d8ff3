use std::io;
use std::sync::{Mutex, MutexGuard};

use log::warn;

use crate::board::{Board, Tile};
use crate::term::Terminal;
use crate::vector::Vec2;

pub const MSG_SCORE: usize = 0;
pub const MSG_HI_SCORE: usize = 1;
pub const MSG_STATUS: usize = 2;
pub const MSG_HELP: usize = 3;
const MSG_SLOTS: usize = 4;

/// Screen offset of map cell (0, 0), just inside the border.
const MAP_ORIGIN: Vec2 = Vec2::new(1, 1);

struct Output<T> {
    term: T,
    msg_len: [usize; MSG_SLOTS],
}

/// Incremental painter. Every operation takes the output lock for its whole
/// move-then-write sequence and flushes before releasing it.
pub struct Renderer<T: Terminal> {
    out: Mutex<Output<T>>,
    width: i32,
    height: i32,
}

impl<T: Terminal> Renderer<T> {
    pub fn new(term: T, width: i32, height: i32) -> Self {
        let out = Output { term, msg_len: [0; MSG_SLOTS] };
        Renderer { out: Mutex::new(out), width, height }
    }

    pub fn into_terminal(self) -> T {
        let out = match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        out.term
    }

    pub fn set_cursor_visible(&self, visible: bool) {
        self.paint(|out| out.term.set_cursor_visible(visible));
    }

    pub fn draw_border(&self) {
        let w = self.width.max(0) as usize;
        let h = self.height.max(0) as u16;
        let top = format!("╔{}╗", "═".repeat(w));
        let middle = format!("║{}║", " ".repeat(w));
        let bottom = format!("╚{}╝", "═".repeat(w));

        self.paint(|out| {
            print_at(&mut out.term, 0, 0, &top)?;
            for y in 1..=h {
                print_at(&mut out.term, 0, y, &middle)?;
            }
            print_at(&mut out.term, 0, h + 1, &bottom)
        });
    }

    pub fn draw_cell(&self, pos: Vec2, glyph: char) {
        let (x, y) = map_to_screen(pos);
        let mut buf = [0u8; 4];
        let text = glyph.encode_utf8(&mut buf);
        self.paint(|out| print_at(&mut out.term, x, y, text));
    }

    /// Writes `text` into a message slot, blanking whatever the slot held
    /// before. Returns the screen position right after the text.
    pub fn draw_message(&self, slot: usize, text: &str) -> (u16, u16) {
        let x = (self.width + 2) as u16;
        let y = slot as u16;
        let len = text.chars().count();

        self.paint(|out| {
            let old = out.msg_len[slot];
            if old > 0 {
                print_at(&mut out.term, x, y, &" ".repeat(old))?;
            }
            print_at(&mut out.term, x, y, text)?;
            out.msg_len[slot] = len;
            Ok(())
        });

        (x + len as u16, y)
    }

    pub fn draw_text(&self, at: (u16, u16), text: &str) {
        self.paint(|out| print_at(&mut out.term, at.0, at.1, text));
    }

    pub fn draw_score(&self, score: u32, hi_score: u32) {
        self.draw_message(MSG_SCORE, &format!("Score: {}", score));
        self.draw_message(MSG_HI_SCORE, &format!("Hi-Score: {}", hi_score));
    }

    pub fn clear_map(&self) {
        let blank = " ".repeat(self.width.max(0) as usize);
        self.paint(|out| {
            for y in 0..self.height {
                let (x, y) = map_to_screen(Vec2::new(0, y));
                print_at(&mut out.term, x, y, &blank)?;
            }
            Ok(())
        });
    }

    /// Redraws every cell in `tile` state with `glyph`, one write per
    /// horizontal run.
    pub fn replace_cells(&self, board: &Board, tile: Tile, glyph: char) {
        self.paint(|out| {
            for y in 0..board.height() {
                let mut run_start = 0;
                let mut run_len = 0;
                for x in 0..=board.width() {
                    if x < board.width() && board.tile(Vec2::new(x, y)) == Some(tile) {
                        if run_len == 0 {
                            run_start = x;
                        }
                        run_len += 1;
                    } else if run_len > 0 {
                        let (sx, sy) = map_to_screen(Vec2::new(run_start, y));
                        let run: String = std::iter::repeat(glyph).take(run_len).collect();
                        print_at(&mut out.term, sx, sy, &run)?;
                        run_len = 0;
                    }
                }
            }
            Ok(())
        });
    }

    ///////////////////////////////////////////////////////////////////////////

    fn lock(&self) -> MutexGuard<'_, Output<T>> {
        match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn paint<F>(&self, draw: F)
    where
        F: FnOnce(&mut Output<T>) -> io::Result<()>,
    {
        let mut out = self.lock();
        let res = draw(&mut out).and_then(|_| out.term.flush());
        if let Err(e) = res {
            warn!("terminal write failed: {}", e);
        }
    }
}

fn map_to_screen(pos: Vec2) -> (u16, u16) {
    let screen = pos + MAP_ORIGIN;
    (screen.x as u16, screen.y as u16)
}

fn print_at<T: Terminal>(term: &mut T, x: u16, y: u16, text: &str) -> io::Result<()> {
    term.move_to(x, y)?;
    term.write_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::snake::Direction::*;
    use crate::test_support::VirtualTerminal;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn renderer() -> (Renderer<VirtualTerminal>, VirtualTerminal) {
        let term = VirtualTerminal::new(40, 24);
        (Renderer::new(term.clone(), 20, 20), term)
    }

    #[test]
    fn border_is_idempotent() {
        let (r, term) = renderer();
        r.draw_border();
        let first = term.rows();
        r.draw_border();
        assert_eq!(term.rows(), first);

        assert_eq!(term.row(0).trim_end(), format!("╔{}╗", "═".repeat(20)));
        assert_eq!(term.row(1).trim_end(), "║                    ║");
        assert_eq!(term.row(21).trim_end(), format!("╚{}╝", "═".repeat(20)));
    }

    #[test]
    fn cells_are_offset_inside_the_border() {
        let (r, term) = renderer();
        r.draw_cell(Vec2::new(0, 0), '#');
        r.draw_cell(Vec2::new(19, 19), '@');
        assert_eq!(term.char_at(1, 1), '#');
        assert_eq!(term.char_at(20, 20), '@');
    }

    #[test]
    fn shorter_message_leaves_no_residue() {
        let (r, term) = renderer();
        let end = r.draw_message(MSG_STATUS, "Press any direction key to start...");
        assert_eq!(end, (22 + 35, 2));
        let end = r.draw_message(MSG_STATUS, "Hi");
        assert_eq!(end, (24, 2));
        assert_eq!(&term.row(2)[22..], "Hi");
    }

    #[test]
    fn score_lines() {
        let (r, term) = renderer();
        r.draw_score(12, 30);
        r.draw_score(0, 30);
        assert_eq!(&term.row(0)[22..], "Score: 0");
        assert_eq!(&term.row(1)[22..], "Hi-Score: 30");
    }

    #[test]
    fn replace_cells_coalesces_runs() {
        let settings = Settings::default();
        let mut board = Board::with_rng(&settings, StdRng::seed_from_u64(3));
        board.reset(Right).unwrap();
        board.place_apple(Vec2::new(0, 0));
        board.try_move(Right).unwrap();
        board.try_move(Right).unwrap();
        board.try_move(Down).unwrap();

        let (r, term) = renderer();
        let before = term.write_count();
        r.replace_cells(&board, Tile::Snake, 'X');

        // (11,10) (12,10) on one row and (12,11) below it, tail (10,10) gone
        assert_eq!(term.write_count() - before, 2);
        assert_eq!(&term.row(11)[12..14], "XX");
        assert_eq!(term.char_at(13, 12), 'X');
        assert_eq!(term.char_at(11, 11), ' ');
    }

    #[test]
    fn clear_map_blanks_only_the_interior() {
        let (r, term) = renderer();
        r.draw_border();
        r.draw_cell(Vec2::new(5, 5), '#');
        r.clear_map();
        assert_eq!(term.char_at(6, 6), ' ');
        assert_eq!(term.char_at(0, 6), '║');
        assert_eq!(term.char_at(21, 6), '║');
    }
}
