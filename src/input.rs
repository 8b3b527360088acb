use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

use tui_input::{backend::crossterm::EventHandler, Input};

use crate::terminal::Terminal;

const INFO_TEXT: &str = "(Esc) cancel | (Enter) confirm";

/// A prompt symbol followed by an editable line.
pub(crate) struct InputBuffer {
    input: Input,
    prompt: String,
}

impl InputBuffer {
    pub fn new(prompt: String) -> Self {
        Self {
            input: Input::default(),
            prompt,
        }
    }

    pub(crate) fn value(&self) -> String {
        self.prompt.clone() + self.input.value()
    }

    pub(crate) fn visual_cursor(&self) -> usize {
        UnicodeWidthStr::width(self.prompt.as_str()) + self.input.visual_cursor()
    }

    pub(crate) fn handle_event(&mut self, event: Event) {
        self.input.handle_event(&event);
    }

    /// Reads one line. `None` when the user pressed Esc.
    pub(crate) fn read_line(
        &mut self,
        terminal: &mut Terminal<impl Write>,
        title: &str,
    ) -> io::Result<Option<String>> {
        loop {
            terminal.draw(|f| self.ui(f, title))?;
            let event = event::read()?;
            if let Event::Key(key) = event {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Enter => {
                        terminal.clear()?;
                        return Result::Ok(Some(self.input.value().trim().to_string()));
                    }
                    KeyCode::Esc => {
                        terminal.clear()?;
                        return Result::Ok(None);
                    }
                    _ => self.handle_event(event),
                }
            }
        }
    }

    fn ui(&self, f: &mut Frame, title: &str) {
        let recs = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.size());

        let input = Paragraph::new(
            Text::from(self.value()).style(Style::default().fg(Color::Cyan)),
        )
        .block(Block::default().borders(Borders::ALL).title(title));

        input.render(recs[0], f.buffer_mut());
        Paragraph::new(Line::from(INFO_TEXT))
            .centered()
            .render(recs[2], f.buffer_mut());

        f.set_cursor(
            recs[0].x + 1 + self.visual_cursor() as u16,
            recs[0].y + 1,
        );
    }
}
