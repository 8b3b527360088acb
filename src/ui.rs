use std::io::Stdout;

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::error::Result;
use crate::input::InputBuffer;
use crate::menu::{Menu, MenuOutcome};
use crate::select_box::SelectBox;
use crate::terminal::Terminal;

const PROMPT_SYMBOL: &str = "> ";

/// Everything the session needs from the user.
pub trait Ui {
    fn choose(&mut self, menu: &Menu) -> Result<MenuOutcome>;

    /// Asks for one line of text; `None` aborts the current action.
    fn prompt(&mut self, title: &str) -> Result<Option<String>>;

    fn confirm(&mut self, question: &str) -> Result<bool> {
        let menu = Menu::new(question, vec!["Yes".to_string(), "No".to_string()]);
        Ok(self.choose(&menu)? == MenuOutcome::Selected(0))
    }

    /// Shows a message and waits for acknowledgement.
    fn notify(&mut self, message: &str) -> Result<()>;

    /// Releases the terminal before a foreground child runs.
    fn suspend(&mut self) -> Result<()>;

    fn resume(&mut self) -> Result<()>;
}

pub struct TerminalUi {
    terminal: Terminal<Stdout>,
}

impl TerminalUi {
    pub fn new() -> Result<Self> {
        Ok(Self {
            terminal: Terminal::new()?,
        })
    }
}

impl Ui for TerminalUi {
    fn choose(&mut self, menu: &Menu) -> Result<MenuOutcome> {
        Ok(SelectBox::new(menu).select(&mut self.terminal)?)
    }

    fn prompt(&mut self, title: &str) -> Result<Option<String>> {
        let mut buffer = InputBuffer::new(PROMPT_SYMBOL.to_string());
        Ok(buffer.read_line(&mut self.terminal, title)?)
    }

    fn notify(&mut self, message: &str) -> Result<()> {
        self.terminal.draw(|f| {
            let text = Paragraph::new(message)
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL));
            let recs = Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).split(f.size());
            text.render(recs[0], f.buffer_mut());
            Paragraph::new(Line::from("(any key) continue"))
                .centered()
                .render(recs[1], f.buffer_mut());
        })?;

        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    break;
                }
            }
        }
        self.terminal.clear()?;
        Ok(())
    }

    fn suspend(&mut self) -> Result<()> {
        Ok(self.terminal.suspend()?)
    }

    fn resume(&mut self) -> Result<()> {
        Ok(self.terminal.resume()?)
    }
}
