use std::collections::HashMap;

use crate::progress::{Mode, ProgressDocument, SaveFile};
use crate::quest::{Catalog, QuestId, Segment};
use crate::unlock;

/// Several segments (a topic and its quiz) may share one quest.
#[derive(Debug, Clone, Default)]
pub struct QuestLinks {
    to_quest: HashMap<String, QuestId>,
    to_segments: HashMap<QuestId, Vec<String>>,
}

impl QuestLinks {
    pub fn from_pairs<I, S, Q>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Q)>,
        S: Into<String>,
        Q: Into<QuestId>,
    {
        let mut links = QuestLinks::default();
        for (seg, quest) in pairs {
            links.insert(seg.into(), quest.into());
        }
        links
    }

    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self::from_pairs(
            catalog
                .all_segments()
                .filter_map(|s| s.quest.clone().map(|q| (s.seg_name.clone(), q))),
        )
    }

    fn insert(&mut self, seg: String, quest: QuestId) {
        if let Some(previous) = self.to_quest.insert(seg.clone(), quest.clone()) {
            if let Some(segs) = self.to_segments.get_mut(&previous) {
                segs.retain(|s| s != &seg);
            }
        }
        self.to_segments.entry(quest).or_default().push(seg);
    }

    pub fn quest_for(&self, seg_name: &str) -> Option<&str> {
        self.to_quest.get(seg_name).map(String::as_str)
    }

    pub fn segments_for(&self, quest: &str) -> &[String] {
        self.to_segments
            .get(quest)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.to_quest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_quest.is_empty()
    }
}

/// Mirrors a focus-mode completion into the game state. Without a link the
/// completion stays local.
pub fn sync_focus_completion(seg_name: &str, links: &QuestLinks, save: &mut SaveFile) -> Option<QuestId> {
    match links.quest_for(seg_name) {
        Some(quest) => {
            if save.game.complete_quest(quest) {
                log::info!("'{}' completed game quest '{}'", seg_name, quest);
            }
            Some(quest.to_string())
        }
        None => {
            log::warn!("no game quest linked to '{}', keeping completion local", seg_name);
            None
        }
    }
}

pub fn sync_game_completion(
    quest: &str,
    score: u8,
    links: &QuestLinks,
    save: &mut SaveFile,
) -> Vec<String> {
    let segments = links.segments_for(quest);
    if segments.is_empty() {
        log::warn!("no segments linked to quest '{}', keeping completion local", quest);
        return Vec::new();
    }

    for seg in segments {
        let results = save.progress.results(seg).cloned().unwrap_or_default();
        save.progress.complete_quest(seg, score, results);
    }
    segments.to_vec()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeTransition {
    pub level: u32,
    pub level_completed: bool,
    pub message: String,
}

pub fn sync_on_mode_enter(
    target: Mode,
    progress: &mut ProgressDocument,
    level_segments: &[Segment],
) -> ModeTransition {
    let level = progress.current_level.max(1);
    let level_completed = unlock::is_level_completed(level_segments, progress);
    progress.last_mode = target;
    log::info!("entering {:?} mode at level {}", target, level);

    let message = if level_completed {
        format!(
            "Welcome back! Level {} is complete. Starting Level {}!",
            level,
            level + 1
        )
    } else {
        match target {
            Mode::UiOnly => format!("Resuming Level {} lessons...", level),
            Mode::Full | Mode::Menu => format!("Continuing Level {}...", level),
        }
    };

    ModeTransition {
        level: if level_completed { level + 1 } else { level },
        level_completed,
        message,
    }
}

pub fn starting_mode(progress: &ProgressDocument) -> Mode {
    progress.last_mode
}
