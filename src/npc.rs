use std::collections::{BTreeMap, HashSet};

use crate::quest::{Catalog, NpcConfig};

/// An NPC is available once each prerequisite is completed or in progress.
pub fn is_available(
    npc: &NpcConfig,
    completed: &HashSet<String>,
    in_progress: &HashSet<String>,
) -> bool {
    npc.prerequisites
        .iter()
        .all(|quest| completed.contains(quest) || in_progress.contains(quest))
}

/// NPCs for `level`, falling back to level 1 for unknown levels.
pub fn npcs_for_level(catalog: &Catalog, level: u32) -> &[NpcConfig] {
    match catalog.level(level) {
        Some(l) => &l.npcs,
        None => {
            log::warn!("invalid level {}, using level 1 npcs", level);
            catalog.level(1).map(|l| l.npcs.as_slice()).unwrap_or(&[])
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityChange {
    pub npc_id: String,
    pub visible: bool,
}

/// Remembers which NPCs are shown so a refresh reports only the flips.
#[derive(Debug, Clone, Default)]
pub struct NpcRoster {
    visible: BTreeMap<String, bool>,
}

impl NpcRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh(
        &mut self,
        npcs: &[NpcConfig],
        completed: &HashSet<String>,
        in_progress: &HashSet<String>,
    ) -> Vec<VisibilityChange> {
        let mut changes = Vec::new();
        for npc in npcs {
            let now = is_available(npc, completed, in_progress);
            let was = self.visible.insert(npc.id.clone(), now).unwrap_or(false);
            if now != was {
                log::debug!("npc '{}' visible={}", npc.id, now);
                changes.push(VisibilityChange {
                    npc_id: npc.id.clone(),
                    visible: now,
                });
            }
        }
        changes
    }

    pub fn is_visible(&self, npc_id: &str) -> bool {
        self.visible.get(npc_id).copied().unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.visible.clear();
    }
}
