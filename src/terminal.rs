use std::{
    io::{self, stdout, Stdout, Write},
    ops::{Deref, DerefMut},
};

use crossterm::{
    cursor, execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};

use ratatui::{self, backend::CrosstermBackend};

type TerminalBackend<W> = ratatui::Terminal<CrosstermBackend<W>>;

/// Raw-mode, alternate-screen terminal. Restored on drop.
pub struct Terminal<W: Write> {
    inner: TerminalBackend<W>,
    active: bool,
}

impl Terminal<Stdout> {
    pub fn new() -> io::Result<Self> {
        enter()?;
        let backend = CrosstermBackend::new(stdout());
        let terminal = ratatui::Terminal::new(backend)?;

        Result::Ok(Self {
            inner: terminal,
            active: true,
        })
    }

    /// Hands the real terminal back, e.g. to an ssh child process.
    pub fn suspend(&mut self) -> io::Result<()> {
        if self.active {
            self.active = false;
            leave()?;
        }
        Result::Ok(())
    }

    pub fn resume(&mut self) -> io::Result<()> {
        if !self.active {
            enter()?;
            self.active = true;
            // the child drew over our screen
            self.inner.clear()?;
        }
        Result::Ok(())
    }
}

impl<W: Write> Deref for Terminal<W> {
    type Target = TerminalBackend<W>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<W: Write> DerefMut for Terminal<W> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<W: Write> Drop for Terminal<W> {
    fn drop(&mut self) {
        if self.active {
            let _ = leave();
        }
    }
}

fn enter() -> io::Result<()> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, Clear(ClearType::All))
}

fn leave() -> io::Result<()> {
    let mut stdout = stdout();
    execute!(stdout, LeaveAlternateScreen, cursor::Show)?;
    disable_raw_mode()
}
