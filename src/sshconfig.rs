use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use ssh2_config::{ParseRule, SshConfig};

use crate::registry::{validate, Registry};

/// A `Host` block of ~/.ssh/config that can be saved as an entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SshConfigItem {
    pub host: String,
    pub user: String,
    pub hostname: String,
}

impl SshConfigItem {
    pub fn connection_string(&self) -> String {
        format!("{}@{}", self.user, self.hostname)
    }
}

pub fn read_ssh_config(path: &Path) -> anyhow::Result<Vec<SshConfigItem>> {
    let mut reader = BufReader::new(File::open(path)?);
    parse_ssh_config(&mut reader, &whoami::username())
}

pub fn parse_ssh_config(
    reader: &mut impl BufRead,
    default_user: &str,
) -> anyhow::Result<Vec<SshConfigItem>> {
    let config = SshConfig::default().parse(reader, ParseRule::ALLOW_UNKNOWN_FIELDS)?;

    let mut items = Vec::new();
    for host in config.get_hosts() {
        // if hostname is not set, we can't connect to it
        let Some(hostname) = host.params.host_name.clone() else {
            continue;
        };
        // if user is not set, we use the current user
        let user = host
            .params
            .user
            .clone()
            .unwrap_or_else(|| default_user.to_string());

        for alias in host.pattern.iter().filter(|clause| !clause.negated) {
            if alias.pattern.contains(['*', '?']) {
                continue;
            }
            items.push(SshConfigItem {
                host: alias.pattern.clone(),
                user: user.clone(),
                hostname: hostname.clone(),
            });
        }
    }

    Ok(items)
}

/// Items whose connection string is valid and not yet in the registry.
pub fn import_candidates(items: Vec<SshConfigItem>, registry: &Registry) -> Vec<SshConfigItem> {
    let mut seen = Vec::new();
    items
        .into_iter()
        .filter(|item| {
            let target = item.connection_string();
            let fresh = validate("connection string", &target).is_ok()
                && !registry.contains_target(&target)
                && !seen.contains(&target);
            seen.push(target);
            fresh
        })
        .collect()
}
