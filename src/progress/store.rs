use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::document::ProgressDocument;
use super::game_state::GameState;

/// Everything persisted for one player: both modes and the player identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveFile {
    pub progress: ProgressDocument,
    pub game: GameState,
    pub player_id: Option<String>,
}

/// JSON save file on disk. Each save replaces the whole document.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ProgressStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Never fails: a missing or corrupt file yields a fresh document.
    pub fn load(&self) -> SaveFile {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return SaveFile::default(),
            Err(e) => {
                log::warn!("failed to read {}: {}", self.path.display(), e);
                return SaveFile::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(save) => save,
            Err(e) => {
                log::warn!(
                    "ignoring unreadable save {}: {}",
                    self.path.display(),
                    e
                );
                SaveFile::default()
            }
        }
    }

    pub fn save(&self, save: &mut SaveFile) -> Result<()> {
        let now = Utc::now();
        save.progress.last_updated = Some(now);
        save.game.last_save = Some(now);
        self.write_json(save, &self.path)
    }

    /// Deletes the save file and hands back a fresh document.
    pub fn reset(&self) -> Result<SaveFile> {
        match fs::remove_file(&self.path) {
            Ok(()) => log::info!("progress reset"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("removing {}", self.path.display()))
            }
        }
        Ok(SaveFile::default())
    }

    pub fn export_to(&self, save: &SaveFile, dest: &Path) -> Result<()> {
        self.write_json(save, dest)
    }

    /// Replaces the stored document with a backup. The store is left
    /// untouched if `json` does not parse.
    pub fn import_from_str(&self, json: &str) -> Result<SaveFile> {
        let mut save: SaveFile = serde_json::from_str(json).context("invalid progress backup")?;
        self.save(&mut save)?;
        Ok(save)
    }

    fn write_json(&self, save: &SaveFile, dest: &Path) -> Result<()> {
        let dir = match dest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

        // Write beside the target, then rename over it.
        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("creating temp file in {}", dir.display()))?;
        serde_json::to_writer_pretty(&mut tmp, save)?;
        tmp.write_all(b"\n")?;
        tmp.flush()?;
        tmp.persist(dest)
            .map_err(|e| e.error)
            .with_context(|| format!("writing {}", dest.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::document::{Mode, QuestResults};
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = ProgressStore::new(dir.path().join("save.json"));
        let save = store.load();
        assert_eq!(save, SaveFile::default());
        assert_eq!(save.progress.current_level, 1);
    }

    #[test]
    fn corrupt_file_fails_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("save.json");
        fs::write(&path, "{ not json").unwrap();
        let store = ProgressStore::new(&path);
        assert_eq!(store.load(), SaveFile::default());
    }

    #[test]
    fn save_then_load_keeps_progress() {
        let dir = tempdir().unwrap();
        let store = ProgressStore::new(dir.path().join("nested").join("save.json"));

        let mut save = SaveFile::default();
        save.progress.complete_quest("vars-quiz", 100, QuestResults::new());
        save.progress.last_mode = Mode::Full;
        save.game.complete_quest("quest-variables");
        save.player_id = Some("player-42".into());
        store.save(&mut save).unwrap();

        let loaded = store.load();
        assert!(loaded.progress.is_completed("vars-quiz"));
        assert_eq!(loaded.progress.last_mode, Mode::Full);
        assert!(loaded.game.is_quest_completed("quest-variables"));
        assert_eq!(loaded.player_id.as_deref(), Some("player-42"));
        assert!(loaded.progress.last_updated.is_some());
    }

    #[test]
    fn last_write_wins() {
        let dir = tempdir().unwrap();
        let store = ProgressStore::new(dir.path().join("save.json"));

        let mut first = store.load();
        let mut second = store.load();
        first.progress.complete_quest("a", 100, QuestResults::new());
        second.progress.complete_quest("b", 100, QuestResults::new());
        store.save(&mut first).unwrap();
        store.save(&mut second).unwrap();

        let loaded = store.load();
        assert!(!loaded.progress.is_completed("a"));
        assert!(loaded.progress.is_completed("b"));
    }

    #[test]
    fn reset_removes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("save.json");
        let store = ProgressStore::new(&path);
        let mut save = SaveFile::default();
        store.save(&mut save).unwrap();
        assert!(path.exists());

        let fresh = store.reset().unwrap();
        assert!(!path.exists());
        assert_eq!(fresh, SaveFile::default());
        // Resetting twice is fine
        store.reset().unwrap();
    }

    #[test]
    fn bad_import_leaves_store_untouched() {
        let dir = tempdir().unwrap();
        let store = ProgressStore::new(dir.path().join("save.json"));
        let mut save = SaveFile::default();
        save.progress.complete_quest("vars-quiz", 100, QuestResults::new());
        store.save(&mut save).unwrap();

        assert!(store.import_from_str("[1, 2").is_err());
        assert!(store.load().progress.is_completed("vars-quiz"));
    }

    #[test]
    fn export_and_import_round_trip() {
        let dir = tempdir().unwrap();
        let store = ProgressStore::new(dir.path().join("save.json"));
        let mut save = SaveFile::default();
        save.progress.complete_quest("functions-quiz", 50, QuestResults::new());
        store.save(&mut save).unwrap();

        let backup = dir.path().join("backup.json");
        store.export_to(&save, &backup).unwrap();
        store.reset().unwrap();

        let json = fs::read_to_string(&backup).unwrap();
        let restored = store.import_from_str(&json).unwrap();
        assert_eq!(restored.progress.score("functions-quiz"), 50);
        assert!(store.load().progress.is_completed("functions-quiz"));
    }
}
