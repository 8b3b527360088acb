//! Process-wide settings, resolved once at startup and passed down explicitly.

use std::{env, path::PathBuf};

use crate::launcher::DEFAULT_TIMEOUT_SECS;

pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
pub const CONFIG_DIR_ENV: &str = "SSHELF_CONFIG_DIR";
pub const SSH_PROGRAM_ENV: &str = "SSHELF_SSH";

const REGISTRY_FILE: &str = "servers.json";
const LOG_FILE: &str = "sshelf.log";

#[derive(Debug, Clone)]
pub struct Settings {
    pub config_dir: PathBuf,
    pub timeout_secs: u64,
    pub ssh_program: String,
    pub history_files: Vec<PathBuf>,
    pub ssh_config: Option<PathBuf>,
}

impl Settings {
    /// Reads the environment. `history` overrides the default history files when non-empty.
    pub fn resolve(timeout_secs: u64, history: Vec<PathBuf>) -> anyhow::Result<Self> {
        let config_dir = match env::var_os(CONFIG_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::config_dir()
                .ok_or_else(|| anyhow::anyhow!("cannot determine the user configuration directory"))?
                .join(CRATE_NAME),
        };

        let history_files = if history.is_empty() {
            default_history_files(env::var_os("HISTFILE").map(PathBuf::from), dirs::home_dir())
        } else {
            history
        };

        Ok(Self {
            config_dir,
            timeout_secs,
            ssh_program: env::var(SSH_PROGRAM_ENV).unwrap_or_else(|_| "ssh".to_string()),
            history_files,
            ssh_config: dirs::home_dir().map(|home| home.join(".ssh").join("config")),
        })
    }

    pub fn registry_path(&self) -> PathBuf {
        self.config_dir.join(REGISTRY_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.config_dir.join(LOG_FILE)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from(CRATE_NAME),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            ssh_program: "ssh".to_string(),
            history_files: Vec::new(),
            ssh_config: None,
        }
    }
}

fn default_history_files(histfile: Option<PathBuf>, home: Option<PathBuf>) -> Vec<PathBuf> {
    if let Some(histfile) = histfile.filter(|p| !p.as_os_str().is_empty()) {
        return vec![histfile];
    }
    home.map(|home| {
        [".bash_history", ".zsh_history"]
            .iter()
            .map(|name| home.join(name))
            .filter(|path| path.exists())
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn histfile_wins() {
        let files = default_history_files(Some(PathBuf::from("/tmp/h")), Some(PathBuf::from("/home/x")));
        assert_eq!(files, vec![PathBuf::from("/tmp/h")]);
    }

    #[test]
    fn only_existing_home_histories() {
        let home = tempfile::TempDir::new().unwrap();
        fs::write(home.path().join(".zsh_history"), "ssh a@b\n").unwrap();

        let files = default_history_files(None, Some(home.path().to_path_buf()));
        assert_eq!(files, vec![home.path().join(".zsh_history")]);
    }

    #[test]
    fn file_layout() {
        let settings = Settings {
            config_dir: PathBuf::from("/cfg/sshelf"),
            ..Settings::default()
        };
        assert_eq!(settings.registry_path(), PathBuf::from("/cfg/sshelf/servers.json"));
        assert_eq!(settings.log_path(), PathBuf::from("/cfg/sshelf/sshelf.log"));
    }
}
