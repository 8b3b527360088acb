use std::path::PathBuf;

use clap::Parser;

use crate::launcher::DEFAULT_TIMEOUT_SECS;

/// Store, organize and launch SSH connection shortcuts.
#[derive(Debug, Parser)]
#[command(name = "sshelf", version, about)]
pub struct Cli {
    /// Prompt for a connect timeout for this session and exit
    #[arg(long)]
    pub set_timeout: bool,

    /// Seconds before an outbound SSH attempt is given up
    #[arg(long, env = "SSH_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Shell history file to scan (repeatable; defaults to $HISTFILE or ~/.bash_history and ~/.zsh_history)
    #[arg(long = "history", value_name = "PATH")]
    pub history: Vec<PathBuf>,
}

/// Parses a timeout answer from `--set-timeout`.
pub fn parse_timeout(answer: &str) -> Result<u64, String> {
    match answer.trim().parse::<u64>() {
        Ok(0) => Err("timeout must be at least 1 second".to_string()),
        Ok(secs) => Ok(secs),
        Err(_) => Err(format!("'{}' is not a number of seconds", answer.trim())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["sshelf"]).unwrap();
        assert!(!cli.set_timeout);
        assert!(cli.history.is_empty());
    }

    #[test]
    fn flags() {
        let cli = Cli::try_parse_from([
            "sshelf",
            "--timeout",
            "12",
            "--history",
            "/tmp/a",
            "--history",
            "/tmp/b",
        ])
        .unwrap();
        assert_eq!(cli.timeout, 12);
        assert_eq!(cli.history.len(), 2);
        assert!(Cli::try_parse_from(["sshelf", "--timeout", "0"]).is_err());
    }

    #[test]
    fn timeout_answers() {
        assert_eq!(parse_timeout(" 9\n"), Ok(9));
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("soon").is_err());
    }
}
