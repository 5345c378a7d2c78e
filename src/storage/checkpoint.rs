//! Checkpoint persistence for long harvests
//!
//! Two kinds of files live under the checkpoint directory:
//!
//! - `<session>_state.json`: the resumable [`HarvestState`] (seen keys,
//!   offsets, counters).
//! - `checkpoint_<session>_<n>.json`: sequence-numbered partial snapshots
//!   written mid-harvest so an aborted run still leaves data behind.
//!
//! All writes go through a temp file and rename so a crash never leaves a
//! half-written checkpoint.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::{HarvestState, HarvestedRecord};
use crate::utils::sanitize_filename;

/// Envelope around a partial snapshot
#[derive(Debug, Serialize, Deserialize)]
pub struct PartialSnapshot {
    pub session: String,
    pub sequence: usize,
    pub saved_at: chrono::DateTime<Utc>,
    pub count: usize,
    pub records: Vec<HarvestedRecord>,
}

/// Manages checkpoint files for harvest sessions
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the resumable state file for a session
    pub fn state_path(&self, session: &str) -> PathBuf {
        self.dir
            .join(format!("{}_state.json", sanitize_filename(session)))
    }

    /// Load session state, defaulting to empty on missing or corrupt files
    pub fn load_state(&self, session: &str) -> HarvestState {
        HarvestState::load(&self.state_path(session))
    }

    /// Persist session state atomically
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the write or rename fails.
    pub fn save_state(&self, session: &str, state: &HarvestState) -> io::Result<()> {
        state.save(&self.state_path(session))
    }

    /// Remove the state file for a finished session
    pub fn clear_state(&self, session: &str) -> io::Result<()> {
        let path = self.state_path(session);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Write a sequence-numbered partial snapshot
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the write or rename fails.
    pub fn save_partial(
        &self,
        session: &str,
        sequence: usize,
        records: &[HarvestedRecord],
    ) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let snapshot = PartialSnapshot {
            session: session.to_string(),
            sequence,
            saved_at: Utc::now(),
            count: records.len(),
            records: records.to_vec(),
        };

        let path = self.partial_path(session, sequence);
        let temp = path.with_extension("tmp");
        let content = serde_json::to_string_pretty(&snapshot).map_err(io::Error::other)?;
        fs::write(&temp, content)?;
        fs::rename(&temp, &path)?;

        Ok(path)
    }

    /// Load one partial snapshot
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the file is missing or not valid JSON.
    pub fn load_partial(&self, session: &str, sequence: usize) -> io::Result<PartialSnapshot> {
        let content = fs::read_to_string(self.partial_path(session, sequence))?;
        serde_json::from_str(&content).map_err(io::Error::other)
    }

    /// List the sequence numbers of existing partials for a session
    pub fn list_partials(&self, session: &str) -> Vec<usize> {
        let prefix = format!("checkpoint_{}_", sanitize_filename(session));
        let mut sequences: Vec<usize> = fs::read_dir(&self.dir)
            .into_iter()
            .flatten()
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                name.strip_prefix(&prefix)?
                    .strip_suffix(".json")?
                    .parse()
                    .ok()
            })
            .collect();
        sequences.sort_unstable();
        sequences
    }

    /// Delete every partial for a finished session
    pub fn clear_partials(&self, session: &str) -> io::Result<()> {
        for sequence in self.list_partials(session) {
            fs::remove_file(self.partial_path(session, sequence))?;
        }
        Ok(())
    }

    fn partial_path(&self, session: &str, sequence: usize) -> PathBuf {
        self.dir.join(format!(
            "checkpoint_{}_{sequence}.json",
            sanitize_filename(session)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(username: &str) -> HarvestedRecord {
        HarvestedRecord {
            username: username.to_string(),
            profile_url: format!("https://devpost.com/{username}"),
            ..Default::default()
        }
    }

    #[test]
    fn test_partial_roundtrip() {
        let dir = TempDir::new().unwrap();
        let manager = CheckpointManager::new(dir.path());

        let records = vec![record("alice"), record("bob")];
        let path = manager.save_partial("hackmit", 1, &records).unwrap();
        assert!(path.exists());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("checkpoint_hackmit_"));

        let snapshot = manager.load_partial("hackmit", 1).unwrap();
        assert_eq!(snapshot.sequence, 1);
        assert_eq!(snapshot.count, 2);
        assert_eq!(snapshot.records[0].username, "alice");
    }

    #[test]
    fn test_list_and_clear_partials() {
        let dir = TempDir::new().unwrap();
        let manager = CheckpointManager::new(dir.path());

        manager.save_partial("run", 1, &[record("a")]).unwrap();
        manager.save_partial("run", 3, &[record("b")]).unwrap();
        manager.save_partial("run", 2, &[record("c")]).unwrap();
        manager.save_partial("other", 1, &[record("d")]).unwrap();

        assert_eq!(manager.list_partials("run"), vec![1, 2, 3]);

        manager.clear_partials("run").unwrap();
        assert!(manager.list_partials("run").is_empty());
        assert_eq!(manager.list_partials("other"), vec![1]);
    }

    #[test]
    fn test_state_roundtrip() {
        let dir = TempDir::new().unwrap();
        let manager = CheckpointManager::new(dir.path());

        let mut state = HarvestState::new();
        state.mark_seen("https://devpost.com/alice");
        state.last_offset = 500;
        manager.save_state("hackmit", &state).unwrap();

        let loaded = manager.load_state("hackmit");
        assert!(loaded.is_seen("https://devpost.com/alice"));
        assert_eq!(loaded.last_offset, 500);

        manager.clear_state("hackmit").unwrap();
        let empty = manager.load_state("hackmit");
        assert!(empty.seen_keys.is_empty());
    }

    #[test]
    fn test_session_names_are_sanitized() {
        let dir = TempDir::new().unwrap();
        let manager = CheckpointManager::new(dir.path());

        let path = manager
            .save_partial("hack/mit:2026", 1, &[record("a")])
            .unwrap();
        assert!(!path.file_name().unwrap().to_string_lossy().contains('/'));
    }
}
