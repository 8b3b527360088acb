//! Mines shell history for `user@host` connection strings.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use indexmap::IndexSet;
use regex::Regex;

use crate::registry::Registry;

// ssh(1) short options that consume an argument
const FLAGS_WITH_ARGUMENT: &str = "bcDEeFIiJLlmOopQRSWw";

fn user_at_host() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._-]+@[A-Za-z0-9._-]+$")
            .unwrap_or_else(|e| unreachable!("invalid user@host pattern: {e}"))
    })
}

/// The destination of an `ssh ...` command line, when it is a `user@host`.
fn ssh_destination(command: &str) -> Option<&str> {
    let mut tokens = command.split_whitespace();
    if tokens.next()? != "ssh" {
        return None;
    }

    let mut options_done = false;
    while let Some(token) = tokens.next() {
        if options_done || !token.starts_with('-') || token == "-" {
            return user_at_host().is_match(token).then_some(token);
        }
        if token == "--" {
            options_done = true;
            continue;
        }
        // bundled flags: `-4vp 22` or `-p22`
        let flags = &token[1..];
        if let Some(at) = flags.find(|c| FLAGS_WITH_ARGUMENT.contains(c)) {
            if at + 1 == flags.len() {
                tokens.next()?;
            }
        }
    }
    None
}

// zsh EXTENDED_HISTORY lines look like `: 1700000000:0;ssh alice@host`
fn strip_zsh_prefix(line: &str) -> &str {
    if let Some(rest) = line.strip_prefix(": ") {
        if let Some((stamp, command)) = rest.split_once(';') {
            if stamp.chars().all(|c| c.is_ascii_digit() || c == ':') {
                return command;
            }
        }
    }
    line
}

/// Extracts connection strings from history lines, deduplicated in first-seen order.
pub fn scan<'a, I>(lines: I) -> IndexSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .filter_map(|line| ssh_destination(strip_zsh_prefix(line)).map(str::to_string))
        .collect()
}

/// Drops candidates that are already some entry's connection string.
pub fn diff_against_registry(candidates: &IndexSet<String>, registry: &Registry) -> Vec<String> {
    candidates
        .iter()
        .filter(|target| !registry.contains_target(target))
        .cloned()
        .collect()
}

/// Scans every readable file in `sources`; unreadable ones are logged and skipped.
pub fn scan_files(sources: &[PathBuf]) -> IndexSet<String> {
    let mut found = IndexSet::new();
    for source in sources {
        match read_lossy(source) {
            Ok(text) => {
                let before = found.len();
                found.extend(scan(text.lines()));
                tracing::debug!(
                    path = %source.display(),
                    new = found.len() - before,
                    "scanned history"
                );
            }
            Err(e) => tracing::warn!(path = %source.display(), error = %e, "skipping history file"),
        }
    }
    found
}

fn read_lossy(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
