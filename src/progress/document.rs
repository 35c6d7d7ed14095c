use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-question correctness for one quest, keyed by question id.
pub type QuestResults = BTreeMap<String, bool>;

/// The UI mode the player was last in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    #[default]
    Menu,
    Full,
    UiOnly,
}

/// Focus-mode completion state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressDocument {
    pub current_level: u32,
    pub current_quest_index: usize,
    pub completed_levels: BTreeMap<u32, bool>,
    pub completed_quests: BTreeMap<String, bool>,
    pub quest_scores: BTreeMap<String, u8>,
    pub quest_results: BTreeMap<String, QuestResults>,
    pub total_quests_completed: usize,
    /// Mean of all quest scores.
    pub total_score: u32,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_mode: Mode,
}

impl Default for ProgressDocument {
    fn default() -> Self {
        ProgressDocument {
            current_level: 1,
            current_quest_index: 0,
            completed_levels: BTreeMap::new(),
            completed_quests: BTreeMap::new(),
            quest_scores: BTreeMap::new(),
            quest_results: BTreeMap::new(),
            total_quests_completed: 0,
            total_score: 0,
            last_updated: None,
            last_mode: Mode::Menu,
        }
    }
}

impl ProgressDocument {
    pub fn is_completed(&self, quest_id: &str) -> bool {
        self.completed_quests.get(quest_id).copied().unwrap_or(false)
    }

    /// True once any answer for `quest_id` has been recorded.
    pub fn has_attempt(&self, quest_id: &str) -> bool {
        self.quest_results.contains_key(quest_id)
    }

    pub fn score(&self, quest_id: &str) -> u8 {
        self.quest_scores.get(quest_id).copied().unwrap_or(0)
    }

    pub fn results(&self, quest_id: &str) -> Option<&QuestResults> {
        self.quest_results.get(quest_id)
    }

    pub fn record_result(&mut self, quest_id: &str, qid: &str, correct: bool) {
        self.quest_results
            .entry(quest_id.to_string())
            .or_default()
            .insert(qid.to_string(), correct);
    }

    pub fn complete_quest(&mut self, quest_id: &str, score: u8, results: QuestResults) {
        log::info!("marking '{}' complete with score {}", quest_id, score);

        self.completed_quests.insert(quest_id.to_string(), true);
        self.quest_scores.insert(quest_id.to_string(), score.min(100));
        self.quest_results.insert(quest_id.to_string(), results);
        self.total_quests_completed = self.completed_quests.len();

        let scores: Vec<u32> = self.quest_scores.values().map(|s| u32::from(*s)).collect();
        self.total_score = if scores.is_empty() {
            0
        } else {
            (scores.iter().sum::<u32>() as f64 / scores.len() as f64).round() as u32
        };
    }

    pub fn complete_level(&mut self, level: u32) {
        log::info!("level {} complete", level);
        self.completed_levels.insert(level, true);
    }

    pub fn is_level_completed(&self, level: u32) -> bool {
        self.completed_levels.get(&level).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completing_quests_tracks_totals() {
        let mut doc = ProgressDocument::default();
        doc.complete_quest("intro-variables", 100, QuestResults::new());
        doc.complete_quest("vars-quiz", 50, QuestResults::new());

        assert!(doc.is_completed("vars-quiz"));
        assert_eq!(doc.total_quests_completed, 2);
        assert_eq!(doc.total_score, 75);
        assert_eq!(doc.score("vars-quiz"), 50);
        assert_eq!(doc.score("unknown"), 0);
    }

    #[test]
    fn recording_a_result_marks_an_attempt() {
        let mut doc = ProgressDocument::default();
        assert!(!doc.has_attempt("vars-quiz"));
        doc.record_result("vars-quiz", "var1", false);
        assert!(doc.has_attempt("vars-quiz"));
        assert!(!doc.is_completed("vars-quiz"));
        assert_eq!(doc.results("vars-quiz").unwrap().get("var1"), Some(&false));
    }

    #[test]
    fn completing_a_level_keeps_position() {
        let mut doc = ProgressDocument::default();
        doc.current_quest_index = 7;
        doc.complete_level(1);
        assert!(doc.is_level_completed(1));
        assert!(!doc.is_level_completed(2));
        assert_eq!(doc.current_level, 1);
        assert_eq!(doc.current_quest_index, 7);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let mut doc = ProgressDocument::default();
        doc.last_mode = Mode::UiOnly;
        doc.complete_quest("vars-quiz", 100, QuestResults::new());
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["lastMode"], "ui-only");
        assert_eq!(json["currentLevel"], 1);
        assert_eq!(json["completedQuests"]["vars-quiz"], true);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let doc: ProgressDocument =
            serde_json::from_str(r#"{"completedQuests": {"vars-quiz": true}}"#).unwrap();
        assert_eq!(doc.current_level, 1);
        assert_eq!(doc.last_mode, Mode::Menu);
        assert!(doc.is_completed("vars-quiz"));
    }
}
