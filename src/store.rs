use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Local;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::registry::Registry;

const BACKUP_TIMESTAMP: &str = "%Y%m%d%H%M%S";

/// The persisted registry.
///
/// Every mutation backs up the current file, writes the new state to a
/// temporary sibling and renames it over the original. The in-memory copy is
/// only replaced once that write succeeded.
#[derive(Debug)]
pub struct RegistryStore {
    path: PathBuf,
    registry: Registry,
}

impl RegistryStore {
    /// Loads the registry at `path`, creating an empty one when it is missing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = PathBuf::from(path.as_ref());
        let registry = if path.exists() {
            load(&path)?
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::persistence(parent, e))?;
            }
            let registry = Registry::new();
            save(&path, &registry)?;
            tracing::info!(path = %path.display(), "created empty registry");
            registry
        };

        Ok(Self { path, registry })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn list_categories(&self) -> Vec<String> {
        self.registry.categories()
    }

    pub fn list_entries(&self, category: &str) -> Result<Vec<(String, String)>> {
        self.registry.entries(category)
    }

    pub fn add_entry(&mut self, category: &str, name: &str, target: &str) -> Result<()> {
        let mut next = self.registry.clone();
        next.insert(category, name, target)?;
        self.commit(next)?;
        tracing::info!(category, name, connection = target, "added server");
        Ok(())
    }

    pub fn delete_entry(&mut self, category: &str, name: &str) -> Result<()> {
        let mut next = self.registry.clone();
        let target = next.remove(category, name)?;
        self.commit(next)?;
        tracing::info!(category, name, connection = %target, "deleted server");
        Ok(())
    }

    /// Copies the persisted file to `<file>.bak.<YYYYMMDDHHMMSS>`, adding a
    /// `-N` suffix when that second already has a backup.
    ///
    /// Returns the backup path, or `None` when there was nothing to copy.
    pub fn backup(&self) -> Result<Option<PathBuf>> {
        if !self.path.exists() {
            tracing::warn!(path = %self.path.display(), "nothing to back up, registry file is missing");
            return Ok(None);
        }

        let stamp = Local::now().format(BACKUP_TIMESTAMP).to_string();
        let mut backup = backup_path(&self.path, &stamp);
        let mut n = 1;
        while backup.exists() {
            backup = backup_path(&self.path, &format!("{stamp}-{n}"));
            n += 1;
        }
        fs::copy(&self.path, &backup).map_err(|e| Error::persistence(&backup, e))?;
        tracing::debug!(path = %backup.display(), "registry backed up");
        Ok(Some(backup))
    }

    fn commit(&mut self, next: Registry) -> Result<()> {
        self.backup()?;
        save(&self.path, &next)?;
        self.registry = next;
        Ok(())
    }
}

fn backup_path(path: &Path, timestamp: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".bak.{timestamp}"));
    path.with_file_name(name)
}

fn load(path: &Path) -> Result<Registry> {
    let corrupt = |reason: String| Error::ConfigCorrupt {
        path: path.to_path_buf(),
        reason,
    };

    let data = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let registry: Registry = serde_json::from_str(&data).map_err(|e| corrupt(e.to_string()))?;
    registry.check().map_err(corrupt)?;
    Ok(registry)
}

pub(crate) fn save(path: &Path, registry: &Registry) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut data = serde_json::to_string_pretty(registry)
        .map_err(|e| Error::persistence(path, std::io::Error::other(e)))?;
    data.push('\n');

    let mut file = NamedTempFile::new_in(dir).map_err(|e| Error::persistence(dir, e))?;
    file.write_all(data.as_bytes())
        .and_then(|_| file.as_file().sync_all())
        .map_err(|e| Error::persistence(file.path(), e))?;
    file.persist(path)
        .map_err(|e| Error::persistence(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> RegistryStore {
        RegistryStore::open(dir.path().join("sshelf").join("servers.json")).unwrap()
    }

    fn backups(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.to_string_lossy().contains(".bak."))
            .collect()
    }

    #[test]
    fn missing_file_is_created_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.path().exists());
        assert!(store.list_categories().is_empty());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "{\n  \"servers\": {}\n}\n");
    }

    #[test]
    fn end_to_end() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.add_entry("Work", "db1", "alice@db.internal").unwrap();
        assert_eq!(store.list_categories(), vec!["Work".to_string()]);
        assert_eq!(
            store.list_entries("Work").unwrap(),
            vec![("db1".to_string(), "alice@db.internal".to_string())]
        );

        // survives a reload
        let reopened = RegistryStore::open(store.path()).unwrap();
        assert_eq!(reopened.registry(), store.registry());

        store.delete_entry("Work", "db1").unwrap();
        assert!(store.list_categories().is_empty());
        assert!(RegistryStore::open(store.path()).unwrap().registry().is_empty());
    }

    #[test]
    fn corrupt_file_is_reported_and_left_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("servers.json");
        fs::write(&path, "servers = nope").unwrap();

        let err = RegistryStore::open(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigCorrupt { .. }));
        assert!(err.is_fatal());
        assert_eq!(fs::read_to_string(&path).unwrap(), "servers = nope");
    }

    #[test]
    fn invalid_names_on_disk_are_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("servers.json");
        fs::write(&path, r#"{"servers": {"Work": {"": "alice@host"}}}"#).unwrap();
        assert!(matches!(
            RegistryStore::open(&path),
            Err(Error::ConfigCorrupt { .. })
        ));
    }

    #[test]
    fn save_of_untouched_load_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add_entry("Work", "db1", "alice@db1").unwrap();
        store.add_entry("Home", "nas", "bob@nas.local").unwrap();
        let before = fs::read(store.path()).unwrap();

        let reopened = RegistryStore::open(store.path()).unwrap();
        save(reopened.path(), reopened.registry()).unwrap();
        assert_eq!(fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn unknown_top_level_keys_are_preserved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("servers.json");
        fs::write(
            &path,
            r#"{"servers": {"Work": {"db1": "alice@db1"}}, "theme": {"accent": "green"}}"#,
        )
        .unwrap();

        let mut store = RegistryStore::open(&path).unwrap();
        store.add_entry("Work", "db2", "alice@db2").unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["theme"]["accent"], "green");
        assert_eq!(written["servers"]["Work"]["db2"], "alice@db2");
    }

    #[test]
    fn mutations_back_up_first() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let original = fs::read_to_string(store.path()).unwrap();

        store.add_entry("Work", "db1", "alice@db1").unwrap();

        let backups = backups(store.path().parent().unwrap());
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(&backups[0]).unwrap(), original);
        let name = backups[0].file_name().unwrap().to_string_lossy().to_string();
        let stamp = name.strip_prefix("servers.json.bak.").unwrap();
        assert_eq!(stamp.len(), 14);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn backup_without_file_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::remove_file(store.path()).unwrap();
        assert!(store.backup().unwrap().is_none());
    }

    #[test]
    fn failed_mutation_leaves_state_intact() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add_entry("Work", "db1", "alice@db1").unwrap();
        let before = store.registry().clone();

        assert!(matches!(
            store.add_entry("Work", "db1", "other@db1"),
            Err(Error::DuplicateEntry { .. })
        ));
        assert!(matches!(
            store.delete_entry("Work", "missing"),
            Err(Error::NotFound(_))
        ));
        assert_eq!(store.registry(), &before);
    }

    #[test]
    fn write_failure_keeps_memory_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add_entry("Work", "db1", "alice@db1").unwrap();
        let before = store.registry().clone();

        // a directory in place of the file fails the copy and the rename, even for root
        fs::remove_file(store.path()).unwrap();
        fs::create_dir(store.path()).unwrap();

        assert!(matches!(
            store.add_entry("Work", "db2", "alice@db2"),
            Err(Error::Persistence { .. })
        ));
        assert!(matches!(
            store.delete_entry("Work", "db1"),
            Err(Error::Persistence { .. })
        ));
        assert_eq!(store.registry(), &before);
    }

    #[test]
    fn unreadable_file_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("servers.json");
        fs::create_dir(&path).unwrap();

        let err = RegistryStore::open(&path).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
        assert!(err.is_fatal());
        assert!(!err.to_string().contains("corrupt"));
    }

    #[test]
    fn backups_in_the_same_second_get_distinct_names() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let first = store.backup().unwrap().unwrap();
        let second = store.backup().unwrap().unwrap();
        let third = store.backup().unwrap().unwrap();

        assert_ne!(first, second);
        assert_ne!(second, third);
        assert_eq!(backups(store.path().parent().unwrap()).len(), 3);
    }

    #[test]
    fn backup_name() {
        assert_eq!(
            backup_path(Path::new("/cfg/servers.json"), "20261019120000"),
            PathBuf::from("/cfg/servers.json.bak.20261019120000")
        );
    }
}
