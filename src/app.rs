use crate::{
    error::{Error, Result},
    history,
    launcher::{ConnectOutcome, Connector},
    menu::{Menu, MenuOutcome},
    settings::Settings,
    sshconfig::{import_candidates, read_ssh_config},
    store::RegistryStore,
    ui::Ui,
};

const SCAN_HISTORY: &str = "Scan shell history";
const IMPORT_SSH_CONFIG: &str = "Import from ~/.ssh/config";
const UTILITY_MENU: &str = "Utility menu";
const CANCEL_AND_EXIT: &str = "Cancel and exit";

const ADD_SERVER: &str = "Add a server";
const DELETE_SERVER: &str = "Delete a server";
const BACK: &str = "Back";

enum TopLevel {
    Category(String),
    ScanHistory,
    ImportSshConfig,
    Utility,
    Exit,
}

/// The interactive session: categories → servers → ssh, plus utilities.
pub struct App<U, C> {
    store: RegistryStore,
    ui: U,
    connector: C,
    settings: Settings,
}

impl<U: Ui, C: Connector> App<U, C> {
    pub fn new(store: RegistryStore, ui: U, connector: C, settings: Settings) -> Self {
        App {
            store,
            ui,
            connector,
            settings,
        }
    }

    pub fn store(&self) -> &RegistryStore {
        &self.store
    }

    pub fn run(&mut self) -> Result<()> {
        loop {
            let step = match self.top_level()? {
                TopLevel::Category(category) => self.browse(&category),
                TopLevel::ScanHistory => self.scan_history(),
                TopLevel::ImportSshConfig => self.import_ssh_config(),
                TopLevel::Utility => self.utility(),
                TopLevel::Exit => {
                    tracing::info!("session finished");
                    return Ok(());
                }
            };
            if let Err(err) = step {
                self.report(err)?;
            }
        }
    }

    fn top_level(&mut self) -> Result<TopLevel> {
        let categories = self.store.list_categories();
        let mut labels = categories.clone();
        labels.extend(
            [SCAN_HISTORY, IMPORT_SSH_CONFIG, UTILITY_MENU, CANCEL_AND_EXIT].map(String::from),
        );

        let outcome = self.ui.choose(&Menu::new("Select a category", labels))?;
        Ok(match outcome {
            MenuOutcome::Selected(i) if i < categories.len() => {
                TopLevel::Category(categories[i].clone())
            }
            MenuOutcome::Selected(i) => match i - categories.len() {
                0 => TopLevel::ScanHistory,
                1 => TopLevel::ImportSshConfig,
                2 => TopLevel::Utility,
                _ => TopLevel::Exit,
            },
            MenuOutcome::Back | MenuOutcome::Cancelled => TopLevel::Exit,
        })
    }

    fn browse(&mut self, category: &str) -> Result<()> {
        let entries = self.store.list_entries(category)?;
        let labels = entries.iter().map(|(name, _)| name.clone()).collect();
        let menu = Menu::new(format!("{category}: select a server"), labels).with_back();

        if let MenuOutcome::Selected(i) = self.ui.choose(&menu)? {
            let (name, target) = &entries[i];
            tracing::info!(category, name = %name, "launching saved server");
            let outcome = self.launch(target)?;
            self.ui.notify(&describe(target, outcome))?;
        }
        Ok(())
    }

    fn utility(&mut self) -> Result<()> {
        let menu = Menu::new(
            "Utility menu",
            [ADD_SERVER, DELETE_SERVER, BACK].map(String::from).to_vec(),
        )
        .with_back();

        match self.ui.choose(&menu)? {
            MenuOutcome::Selected(0) => self.add_server(),
            MenuOutcome::Selected(1) => self.delete_server(),
            _ => Ok(()),
        }
    }

    fn add_server(&mut self) -> Result<()> {
        let Some(category) = self.ui.prompt("Category")? else {
            return Ok(());
        };
        let Some(name) = self.ui.prompt("Server name")? else {
            return Ok(());
        };
        let Some(target) = self.ui.prompt("Connection string (user@host)")? else {
            return Ok(());
        };

        self.store.add_entry(&category, &name, &target)?;
        self.ui
            .notify(&format!("Saved {name} ({target}) under {category}."))
    }

    fn delete_server(&mut self) -> Result<()> {
        let entries = self.store.registry().flatten();
        if entries.is_empty() {
            return self.ui.notify("There are no saved servers.");
        }

        let labels = entries
            .iter()
            .map(|(category, name, target)| format!("{category} / {name} ({target})"))
            .collect();
        let menu = Menu::new("Delete which server?", labels).with_back();

        if let MenuOutcome::Selected(i) = self.ui.choose(&menu)? {
            let (category, name, _) = &entries[i];
            self.store.delete_entry(category, name)?;
            self.ui.notify(&format!("Deleted {name} from {category}."))?;
        }
        Ok(())
    }

    fn scan_history(&mut self) -> Result<()> {
        let found = history::scan_files(&self.settings.history_files);
        let candidates = history::diff_against_registry(&found, self.store.registry());
        tracing::info!(found = found.len(), new = candidates.len(), "history scanned");

        if candidates.is_empty() {
            return self.ui.notify("No new connections found in shell history.");
        }

        for target in candidates {
            if !self.ui.confirm(&format!("Try {target}?"))? {
                continue;
            }
            let outcome = self.launch(&target)?;
            if let ConnectOutcome::Failure(_) = outcome {
                self.ui.notify(&describe(&target, outcome))?;
                continue;
            }
            if self.ui.confirm(&format!("Save {target}?"))? {
                if let Err(err) = self.save_candidate(&target, None) {
                    self.report(err)?;
                }
            }
        }
        Ok(())
    }

    fn import_ssh_config(&mut self) -> Result<()> {
        let Some(path) = self.settings.ssh_config.clone() else {
            return self.ui.notify("No home directory, nothing to import.");
        };
        let items = match read_ssh_config(&path) {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "cannot read ssh config");
                return self
                    .ui
                    .notify(&format!("Cannot read {}: {err}", path.display()));
            }
        };

        let candidates = import_candidates(items, self.store.registry());
        if candidates.is_empty() {
            return self.ui.notify("No new hosts found in ssh config.");
        }

        for item in candidates {
            let target = item.connection_string();
            if self.ui.confirm(&format!("Import {} ({target})?", item.host))? {
                if let Err(err) = self.save_candidate(&target, Some(&item.host)) {
                    self.report(err)?;
                }
            }
        }
        Ok(())
    }

    /// Asks where to file a discovered connection string and saves it.
    fn save_candidate(&mut self, target: &str, suggested_name: Option<&str>) -> Result<()> {
        let Some(category) = self.ui.prompt(&format!("Category for {target}"))? else {
            return Ok(());
        };
        let title = match suggested_name {
            Some(name) => format!("Server name (empty keeps {name})"),
            None => "Server name".to_string(),
        };
        let Some(mut name) = self.ui.prompt(&title)? else {
            return Ok(());
        };
        if name.is_empty() {
            if let Some(suggested) = suggested_name {
                name = suggested.to_string();
            }
        }

        self.store.add_entry(&category, &name, target)?;
        self.ui
            .notify(&format!("Saved {name} ({target}) under {category}."))
    }

    fn launch(&mut self, target: &str) -> Result<ConnectOutcome> {
        self.ui.suspend()?;
        let outcome = self.connector.connect(target, self.settings.timeout_secs);
        self.ui.resume()?;
        outcome
    }

    /// Shows a recoverable error to the user; fatal ones end the session.
    fn report(&mut self, err: Error) -> Result<()> {
        if err.is_fatal() {
            return Err(err);
        }
        tracing::warn!(error = %err, "action failed");
        self.ui.notify(&format!("Error: {err}"))
    }
}

fn describe(target: &str, outcome: ConnectOutcome) -> String {
    match outcome.into_result(target) {
        Ok(()) => format!("Connection to {target} closed."),
        Err(err) => {
            tracing::warn!(error = %err, "connection failed");
            format!("{err}. Not retrying.")
        }
    }
}
