use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub health: u32,
    pub xp: u32,
    pub level: u32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        PlayerStats {
            health: 100,
            xp: 0,
            level: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedQuest {
    pub id: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveQuest {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub progress: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub volume: f32,
    pub difficulty: String,
    pub language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            volume: 1.0,
            difficulty: "normal".to_string(),
            language: "en".to_string(),
        }
    }
}

/// Game-mode state: the world-side view of quests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameState {
    pub current_level: u32,
    pub player_position: Position,
    pub player_stats: PlayerStats,
    pub completed_quests: Vec<CompletedQuest>,
    pub active_quests: Vec<ActiveQuest>,
    pub inventory: Vec<InventoryItem>,
    pub unlocked_achievements: Vec<String>,
    pub settings: Settings,
    pub last_save: Option<DateTime<Utc>>,
}

impl Default for GameState {
    fn default() -> Self {
        GameState {
            current_level: 1,
            player_position: Position::default(),
            player_stats: PlayerStats::default(),
            completed_quests: Vec::new(),
            active_quests: Vec::new(),
            inventory: Vec::new(),
            unlocked_achievements: Vec::new(),
            settings: Settings::default(),
            last_save: None,
        }
    }
}

impl GameState {
    /// Returns false if the quest is already active.
    pub fn start_quest(&mut self, id: &str, title: &str) -> bool {
        if self.is_quest_active(id) {
            return false;
        }
        self.active_quests.push(ActiveQuest {
            id: id.to_string(),
            title: title.to_string(),
            started_at: Utc::now(),
            progress: 0,
        });
        log::info!("quest started: {}", id);
        true
    }

    /// Moves the quest out of the active list into the completed list.
    /// Returns false if it was already completed.
    pub fn complete_quest(&mut self, id: &str) -> bool {
        self.active_quests.retain(|q| q.id != id);
        if self.is_quest_completed(id) {
            return false;
        }
        self.completed_quests.push(CompletedQuest {
            id: id.to_string(),
            completed_at: Utc::now(),
        });
        log::info!("quest completed: {}", id);
        true
    }

    pub fn is_quest_active(&self, id: &str) -> bool {
        self.active_quests.iter().any(|q| q.id == id)
    }

    pub fn is_quest_completed(&self, id: &str) -> bool {
        self.completed_quests.iter().any(|q| q.id == id)
    }

    pub fn completed_ids(&self) -> HashSet<String> {
        self.completed_quests.iter().map(|q| q.id.clone()).collect()
    }

    pub fn active_ids(&self) -> HashSet<String> {
        self.active_quests.iter().map(|q| q.id.clone()).collect()
    }

    /// Adds experience and levels the player up every 100 xp.
    pub fn award_xp(&mut self, amount: u32) {
        self.player_stats.xp += amount;
        self.player_stats.level = 1 + self.player_stats.xp / 100;
    }
}
