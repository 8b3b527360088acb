//! Single-choice list navigation, independent of any terminal.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Confirm,
    Back,
    Cancel,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    Selected(usize),
    Back,
    Cancelled,
}

/// A titled list of labels, as handed to [`crate::ui::Ui::choose`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub title: String,
    pub labels: Vec<String>,
    /// Whether `b` returns to a parent menu.
    pub allow_back: bool,
}

impl Menu {
    pub fn new(title: impl Into<String>, labels: Vec<String>) -> Self {
        Self {
            title: title.into(),
            labels,
            allow_back: false,
        }
    }

    pub fn with_back(mut self) -> Self {
        self.allow_back = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Navigator {
    len: usize,
    current: usize,
    allow_back: bool,
}

impl Navigator {
    pub fn new(len: usize, allow_back: bool) -> Self {
        Self {
            len,
            current: 0,
            allow_back,
        }
    }

    pub fn for_menu(menu: &Menu) -> Self {
        Self::new(menu.labels.len(), menu.allow_back)
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Applies one key. Returns the outcome once the menu is finished.
    pub fn handle(&mut self, key: Key) -> Option<MenuOutcome> {
        match key {
            Key::Up if self.len > 0 => {
                self.current = (self.current + self.len - 1) % self.len;
                None
            }
            Key::Down if self.len > 0 => {
                self.current = (self.current + 1) % self.len;
                None
            }
            Key::Confirm if self.len > 0 => Some(MenuOutcome::Selected(self.current)),
            Key::Back if self.allow_back => Some(MenuOutcome::Back),
            Key::Cancel => Some(MenuOutcome::Cancelled),
            _ => None,
        }
    }

    /// Feeds keys until one of them finishes the menu.
    pub fn run<I>(&mut self, keys: I) -> Option<MenuOutcome>
    where
        I: IntoIterator<Item = Key>,
    {
        keys.into_iter().find_map(|key| self.handle(key))
    }
}
