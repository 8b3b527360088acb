use std::io::{self, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::menu::{Key, Menu, MenuOutcome, Navigator};
use crate::terminal::Terminal;

const INFO_TEXT: &str = "(Esc) quit | (↑) move up | (↓) move down | (Enter) select";
const INFO_TEXT_WITH_BACK: &str =
    "(Esc) quit | (↑) move up | (↓) move down | (Enter) select | (b) back";

pub fn key_of(key: &KeyEvent) -> Key {
    match key.code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Enter => Key::Confirm,
        KeyCode::Char('b' | 'B') => Key::Back,
        KeyCode::Esc => Key::Cancel,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Key::Cancel,
        _ => Key::Other,
    }
}

pub struct SelectBox<'a> {
    menu: &'a Menu,
    navigator: Navigator,
    state: ListState,
}

impl<'a> SelectBox<'a> {
    pub fn new(menu: &'a Menu) -> Self {
        Self {
            menu,
            navigator: Navigator::for_menu(menu),
            state: ListState::default().with_selected(Some(0)),
        }
    }

    pub fn select(&mut self, terminal: &mut Terminal<impl Write>) -> io::Result<MenuOutcome> {
        loop {
            self.draw(terminal)?;
            if let Event::Key(key) = event::read()? {
                // windows reports releases as well
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(outcome) = self.navigator.handle(key_of(&key)) {
                    terminal.clear()?;
                    return Result::Ok(outcome);
                }
                self.state.select(Some(self.navigator.current()));
            }
        }
    }

    pub fn draw(&mut self, terminal: &mut Terminal<impl Write>) -> io::Result<()> {
        terminal.draw(|frame| {
            self.ui(frame);
        })?;
        Result::Ok(())
    }

    fn ui(&mut self, f: &mut Frame) {
        let items: Vec<ListItem> = self
            .menu
            .labels
            .iter()
            .map(|label| ListItem::new(label.as_str()))
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(self.menu.title.as_str())
                    .title_style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ")
            .highlight_spacing(HighlightSpacing::Always);

        let info = if self.menu.allow_back {
            Paragraph::new(Line::from(INFO_TEXT_WITH_BACK)).centered()
        } else {
            Paragraph::new(Line::from(INFO_TEXT)).centered()
        };

        let recs = Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).split(f.size());

        StatefulWidget::render(list, recs[0], f.buffer_mut(), &mut self.state);
        info.render(recs[1], f.buffer_mut());
    }
}
