use std::io::{self, Stdout, Write, stdout};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use log::warn;

/// The primitives the renderer needs from a terminal.
pub trait Terminal: Send {
    fn move_to(&mut self, x: u16, y: u16) -> io::Result<()>;
    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()>;
    fn write_str(&mut self, text: &str) -> io::Result<()>;
    fn clear(&mut self) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
}

pub struct TermManager {
    stdout: Stdout,
}

impl TermManager {
    pub fn new() -> Self {
        TermManager { stdout: stdout() }
    }

    /// Enters the alternate screen in raw mode. On failure whatever was
    /// already switched on is undone before the error is returned.
    pub fn setup(&mut self) -> io::Result<()> {
        let res = self.enter();
        rollback_on_error(res, || self.restore())
    }

    pub fn restore(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()?;
        self.set_cursor_visible(true)?;
        execute!(self.stdout, cursor::EnableBlinking)?;
        execute!(self.stdout, LeaveAlternateScreen)
    }

    fn enter(&mut self) -> io::Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        self.set_cursor_visible(false)?;
        execute!(self.stdout, cursor::DisableBlinking)?;
        self.clear()
    }
}

/// Runs `rollback` when `res` is an error. The original error is kept; a
/// failing rollback is only logged.
fn rollback_on_error<F>(res: io::Result<()>, rollback: F) -> io::Result<()>
where
    F: FnOnce() -> io::Result<()>,
{
    if let Err(e) = res {
        if let Err(undo) = rollback() {
            warn!("restoring terminal after failed setup: {}", undo);
        }
        return Err(e);
    }
    Ok(())
}

impl Terminal for TermManager {
    fn move_to(&mut self, x: u16, y: u16) -> io::Result<()> {
        queue!(self.stdout, cursor::MoveTo(x, y))
    }

    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()> {
        if visible {
            execute!(self.stdout, cursor::Show)
        } else {
            execute!(self.stdout, cursor::Hide)
        }
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        queue!(self.stdout, style::Print(text))
    }

    fn clear(&mut self) -> io::Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn failed_setup_is_rolled_back() {
        let restored = Cell::new(false);
        let res = rollback_on_error(Err(io::Error::new(io::ErrorKind::Other, "no tty")), || {
            restored.set(true);
            Ok(())
        });
        assert_eq!(res.unwrap_err().to_string(), "no tty");
        assert!(restored.get());
    }

    #[test]
    fn failing_rollback_keeps_setup_error() {
        let res = rollback_on_error(Err(io::Error::new(io::ErrorKind::Other, "no tty")), || {
            Err(io::Error::new(io::ErrorKind::Other, "still no tty"))
        });
        assert_eq!(res.unwrap_err().to_string(), "no tty");
    }

    #[test]
    fn successful_setup_skips_rollback() {
        let restored = Cell::new(false);
        let res = rollback_on_error(Ok(()), || {
            restored.set(true);
            Ok(())
        });
        assert!(res.is_ok());
        assert!(!restored.get());
    }
}
