//! In-memory stand-ins for the terminal and the keyboard.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use crate::input::KeySource;
use crate::term::Terminal;

struct Screen {
    cells: Vec<Vec<char>>,
    cursor: (u16, u16),
    cursor_visible: bool,
    writes: usize,
}

/// Character grid recording everything written through [`Terminal`].
/// Clones share the same screen.
#[derive(Clone)]
pub struct VirtualTerminal {
    screen: Arc<Mutex<Screen>>,
}

impl VirtualTerminal {
    pub fn new(width: usize, height: usize) -> Self {
        let screen = Screen {
            cells: vec![vec![' '; width]; height],
            cursor: (0, 0),
            cursor_visible: true,
            writes: 0,
        };
        VirtualTerminal { screen: Arc::new(Mutex::new(screen)) }
    }

    pub fn char_at(&self, x: usize, y: usize) -> char {
        self.screen.lock().unwrap().cells[y][x]
    }

    /// Row `y` with trailing blanks removed.
    pub fn row(&self, y: usize) -> String {
        let s: String = self.screen.lock().unwrap().cells[y].iter().collect();
        s.trim_end().to_string()
    }

    pub fn rows(&self) -> Vec<String> {
        let height = self.screen.lock().unwrap().cells.len();
        (0..height).map(|y| self.row(y)).collect()
    }

    pub fn write_count(&self) -> usize {
        self.screen.lock().unwrap().writes
    }

    pub fn cursor_visible(&self) -> bool {
        self.screen.lock().unwrap().cursor_visible
    }
}

impl Terminal for VirtualTerminal {
    fn move_to(&mut self, x: u16, y: u16) -> io::Result<()> {
        self.screen.lock().unwrap().cursor = (x, y);
        Ok(())
    }

    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()> {
        self.screen.lock().unwrap().cursor_visible = visible;
        Ok(())
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        let mut screen = self.screen.lock().unwrap();
        screen.writes += 1;
        let (mut x, y) = screen.cursor;
        for ch in text.chars() {
            if let Some(cell) = screen.cells.get_mut(y as usize).and_then(|row| row.get_mut(x as usize)) {
                *cell = ch;
            }
            x += 1;
        }
        screen.cursor = (x, y);
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        let mut screen = self.screen.lock().unwrap();
        for row in screen.cells.iter_mut() {
            row.iter_mut().for_each(|c| *c = ' ');
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Replays a fixed code sequence, then reports end of input.
pub struct ScriptedKeys {
    codes: VecDeque<u8>,
}

impl ScriptedKeys {
    pub fn new(codes: &[u8]) -> Self {
        ScriptedKeys { codes: codes.iter().copied().collect() }
    }
}

impl KeySource for ScriptedKeys {
    fn read_code(&mut self) -> io::Result<u8> {
        self.codes
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more scripted keys"))
    }
}
