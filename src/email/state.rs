use crate::error::SyncResult;
use itertools::Itertools;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// Durable set of already-notified identity keys.
///
/// The file is a JSON array of strings, kept sorted so diffs stay stable. An
/// absent file is the empty set; an unreadable or corrupt file is also the
/// empty set, with a warning, since re-sending beats silently losing state.
#[derive(Debug)]
pub struct SentKeyStore {
    path: PathBuf,
}

impl SentKeyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> HashSet<String> {
        if !self.path.exists() {
            return HashSet::new();
        }

        let parsed = fs::read_to_string(&self.path)
            .map_err(|err| err.to_string())
            .and_then(|raw| {
                serde_json::from_str::<Vec<String>>(&raw).map_err(|err| err.to_string())
            });

        match parsed {
            Ok(keys) => keys.into_iter().collect(),
            Err(err) => {
                warn!("Failed to read {}: {}", self.path.display(), err);
                HashSet::new()
            }
        }
    }

    /// Writes the full set to a sibling temp file, then renames it over the
    /// real path so a crash can never leave a truncated state file.
    pub fn persist(&self, keys: &HashSet<String>) -> SyncResult<()> {
        let ordered: Vec<&String> = keys.iter().sorted().collect();
        let tmp_path = PathBuf::from(format!("{}.tmp", self.path.display()));

        fs::write(&tmp_path, serde_json::to_string_pretty(&ordered)?)?;
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }
}
