mod app;
mod cli;
mod error;
mod history;
mod input;
mod launcher;
mod logging;
mod menu;
mod registry;
mod select_box;
mod settings;
mod sshconfig;
mod store;
mod terminal;
mod ui;

pub use app::App;
pub use cli::{parse_timeout, Cli};
pub use error::{exit_codes, Error, Result};
pub use history::{diff_against_registry, scan, scan_files};
pub use launcher::{ConnectOutcome, Connector, Launcher, DEFAULT_TIMEOUT_SECS};
pub use logging::init_logging;
pub use menu::{Key, Menu, MenuOutcome, Navigator};
pub use registry::{validate, Registry};
pub use settings::{Settings, CRATE_NAME};
pub use sshconfig::*;
pub use store::RegistryStore;
pub use terminal::Terminal;
pub use ui::{TerminalUi, Ui};
