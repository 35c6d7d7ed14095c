//! One player's run: the catalog, the save file, and the event bus that tells
//! the front end what changed.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::events::{EventBus, GameEvent};
use crate::npc::{self, NpcRoster, VisibilityChange};
use crate::progress::{GameState, Mode, ProgressDocument, ProgressStore, QuestResults, SaveFile};
use crate::quest::{grader, Answer, Catalog, NpcConfig, Segment};
use crate::sync::{self, ModeTransition, QuestLinks};
use crate::unlock;

pub struct Session {
    store: ProgressStore,
    catalog: Catalog,
    links: QuestLinks,
    events: EventBus,
    save: SaveFile,
    /// Per level, every segment that has ever been unlocked this session.
    unlocked: BTreeMap<u32, Vec<bool>>,
    roster: NpcRoster,
    paused: bool,
}

impl Session {
    pub fn open(store: ProgressStore, catalog: Catalog) -> Self {
        let save = store.load();
        let links = QuestLinks::from_catalog(&catalog);
        log::info!(
            "session opened at level {} with {} linked segments",
            save.progress.current_level,
            links.len()
        );

        let mut session = Session {
            store,
            catalog,
            links,
            events: EventBus::new(),
            save,
            unlocked: BTreeMap::new(),
            roster: NpcRoster::new(),
            paused: false,
        };
        session.refresh_unlocks();
        session
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn links(&self) -> &QuestLinks {
        &self.links
    }

    pub fn save_file(&self) -> &SaveFile {
        &self.save
    }

    pub fn progress(&self) -> &ProgressDocument {
        &self.save.progress
    }

    pub fn game(&self) -> &GameState {
        &self.save.game
    }

    pub fn level(&self) -> u32 {
        self.save.progress.current_level.max(1)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    // Focus mode

    pub fn segments(&self) -> &[Segment] {
        self.catalog.segments(self.level())
    }

    pub fn current_index(&self) -> usize {
        self.save.progress.current_quest_index
    }

    pub fn current_segment(&self) -> Option<&Segment> {
        self.segments().get(self.current_index())
    }

    /// Recomputes unlocks for the current level. A segment that was open
    /// once stays open until `reset` or an import.
    pub fn refresh_unlocks(&mut self) -> &[bool] {
        let level = self.level();
        let fresh = unlock::compute_unlocked(
            self.catalog.segments(level),
            &self.save.progress,
            &self.links,
        );
        let sticky = self.unlocked.entry(level).or_default();
        sticky.resize(fresh.len(), false);
        for (open, now) in sticky.iter_mut().zip(fresh) {
            *open |= now;
        }
        sticky
    }

    pub fn is_unlocked(&self, index: usize) -> bool {
        self.unlocked
            .get(&self.level())
            .and_then(|u| u.get(index))
            .copied()
            .unwrap_or(false)
    }

    pub fn select_segment(&mut self, index: usize) -> bool {
        self.refresh_unlocks();
        if index >= self.segments().len() || !self.is_unlocked(index) {
            log::debug!("segment {} is locked", index);
            return false;
        }
        self.save.progress.current_quest_index = index;
        true
    }

    /// Grades one answer for the current quiz and stores the outcome.
    /// Resubmitting overwrites the earlier result.
    pub fn submit_answer(&mut self, qid: &str, answer: &Answer) -> Result<bool> {
        let seg = self.current_segment().context("no segment selected")?;
        let quiz = seg
            .as_quiz()
            .with_context(|| format!("'{}' is not a quiz", seg.seg_name))?;
        let correct = quiz
            .grade(qid, answer)
            .with_context(|| format!("'{}' has no question '{}'", seg.seg_name, qid))?;
        let seg_name = seg.seg_name.clone();

        self.save.progress.record_result(&seg_name, qid, correct);
        self.refresh_unlocks();
        self.persist()?;
        Ok(correct)
    }

    /// Completes the current quiz with whatever it scored.
    pub fn finish_quiz(&mut self) -> Result<u8> {
        let seg = self.current_segment().context("no segment selected")?;
        let quiz = seg
            .as_quiz()
            .with_context(|| format!("'{}' is not a quiz", seg.seg_name))?;
        let seg_name = seg.seg_name.clone();
        let total = quiz.len();

        let recorded = self.save.progress.results(&seg_name);
        let results: QuestResults = quiz
            .qids()
            .into_iter()
            .filter_map(|qid| {
                recorded
                    .and_then(|r| r.get(qid))
                    .map(|ok| (qid.to_string(), *ok))
            })
            .collect();
        if results.len() < total {
            bail!("Answer all questions first");
        }

        let score = grader::score(&results, total);
        self.save
            .progress
            .complete_quest(&seg_name, score, results.clone());
        sync::sync_focus_completion(&seg_name, &self.links, &mut self.save);
        self.events.emit(&GameEvent::QuestCompleted {
            quest_id: seg_name,
            score,
            results,
        });

        self.check_level_completion();
        self.refresh_unlocks();
        self.persist()?;
        Ok(score)
    }

    pub fn block_reason(&self) -> Option<String> {
        self.current_segment()
            .and_then(|seg| unlock::advance_block_reason(seg, &self.save.progress))
    }

    /// Moves past the current segment if it allows it. Topics complete on
    /// the way out; an unfinished quiz is finished first.
    pub fn advance(&mut self) -> Result<bool> {
        let seg = self.current_segment().context("no segment selected")?;
        if !unlock::can_advance(seg, &self.save.progress) {
            return Ok(false);
        }
        let seg_name = seg.seg_name.clone();
        let is_quiz = seg.is_quiz();

        if !self.save.progress.is_completed(&seg_name) {
            if is_quiz {
                self.finish_quiz()?;
            } else {
                self.save
                    .progress
                    .complete_quest(&seg_name, 100, QuestResults::new());
                sync::sync_focus_completion(&seg_name, &self.links, &mut self.save);
                self.events.emit(&GameEvent::QuestCompleted {
                    quest_id: seg_name,
                    score: 100,
                    results: QuestResults::new(),
                });
                self.check_level_completion();
            }
        }

        let next = self.current_index() + 1;
        self.refresh_unlocks();
        if self.is_unlocked(next) {
            self.save.progress.current_quest_index = next;
        }
        self.persist()?;
        Ok(true)
    }

    /// Jumps to the next open, unfinished segment if the current one is done.
    pub fn auto_advance(&mut self) -> usize {
        let unlocked = self.refresh_unlocks().to_vec();
        let next = unlock::next_segment(
            self.segments(),
            &self.save.progress,
            &self.links,
            &unlocked,
            self.current_index(),
        );
        self.save.progress.current_quest_index = next;
        next
    }

    pub fn completion_percentage(&self) -> u8 {
        unlock::completion_percentage(self.segments(), &self.save.progress)
    }

    /// Records a finished level. The player stays on it, so trailing
    /// segments remain playable until the next transition.
    fn check_level_completion(&mut self) -> bool {
        let level = self.level();
        if self.save.progress.is_level_completed(level)
            || !unlock::is_level_completed(self.catalog.segments(level), &self.save.progress)
        {
            return false;
        }
        self.save.progress.complete_level(level);
        self.events.emit(&GameEvent::LevelCompleted { level });
        true
    }

    // Game mode

    pub fn npcs(&self) -> &[NpcConfig] {
        npc::npcs_for_level(&self.catalog, self.level())
    }

    fn quest_sets(&self) -> (HashSet<String>, HashSet<String>) {
        let mut completed = self.save.game.completed_ids();
        completed.extend(
            self.save
                .progress
                .completed_quests
                .iter()
                .filter(|(_, done)| **done)
                .map(|(id, _)| id.clone()),
        );

        let mut in_progress = self.save.game.active_ids();
        in_progress.extend(
            self.save
                .progress
                .quest_results
                .keys()
                .filter_map(|seg| self.links.quest_for(seg))
                .map(str::to_string),
        );
        (completed, in_progress)
    }

    pub fn is_npc_available(&self, npc: &NpcConfig) -> bool {
        let (completed, in_progress) = self.quest_sets();
        npc::is_available(npc, &completed, &in_progress)
    }

    pub fn available_npcs(&self) -> Vec<&NpcConfig> {
        let (completed, in_progress) = self.quest_sets();
        self.npcs()
            .iter()
            .filter(|n| npc::is_available(n, &completed, &in_progress))
            .collect()
    }

    pub fn refresh_npcs(&mut self) -> Vec<VisibilityChange> {
        let (completed, in_progress) = self.quest_sets();
        let npcs = npc::npcs_for_level(&self.catalog, self.level());
        self.roster.refresh(npcs, &completed, &in_progress)
    }

    /// Opens an NPC's dialog and starts its quest. Returns false when the
    /// NPC is still gated.
    pub fn talk_to(&mut self, npc_id: &str) -> Result<bool> {
        let npc = self
            .npcs()
            .iter()
            .find(|n| n.id == npc_id)
            .cloned()
            .with_context(|| format!("no npc '{}' on level {}", npc_id, self.level()))?;
        if !self.is_npc_available(&npc) {
            log::debug!("npc '{}' is not available yet", npc_id);
            return Ok(false);
        }

        self.events.emit(&GameEvent::ShowDialog {
            npc_id: npc.id.clone(),
            name: npc.name.clone(),
            text: npc.dialog_text.clone(),
        });
        let title = self
            .catalog
            .game_quest(&npc.quest_id)
            .map(|q| q.title.clone())
            .unwrap_or_else(|| npc.quest_id.clone());
        if !self.save.game.is_quest_completed(&npc.quest_id) {
            self.save.game.start_quest(&npc.quest_id, &title);
        }
        self.events.emit(&GameEvent::ShowQuest {
            quest_id: npc.quest_id,
        });
        self.persist()?;
        Ok(true)
    }

    /// The lesson and quiz for a game quest, falling back to the focus-mode
    /// segments linked to it.
    pub fn quest_segments(&self, quest: &str) -> Vec<&Segment> {
        if let Some(gq) = self.catalog.game_quest(quest) {
            return vec![&gq.lesson, &gq.quiz];
        }
        let linked = self.links.segments_for(quest);
        self.catalog
            .all_segments()
            .filter(|s| linked.contains(&s.seg_name))
            .collect()
    }

    pub fn complete_game_quest(
        &mut self,
        quest: &str,
        score: u8,
        results: QuestResults,
    ) -> Result<Vec<String>> {
        let score = score.min(100);
        // Replays keep their score but earn no more xp.
        if self.save.game.complete_quest(quest) {
            self.save.game.award_xp(u32::from(score));
        }
        self.save
            .progress
            .complete_quest(quest, score, results.clone());
        let marked = sync::sync_game_completion(quest, score, &self.links, &mut self.save);

        self.events.emit(&GameEvent::QuestCompleted {
            quest_id: quest.to_string(),
            score,
            results,
        });
        self.check_level_completion();
        self.refresh_unlocks();
        self.persist()?;
        Ok(marked)
    }

    /// The level after the current one, wrapping to the first.
    pub fn next_level(&self) -> u32 {
        let level = self.level();
        self.catalog
            .levels
            .range(level + 1..)
            .next()
            .or_else(|| self.catalog.levels.iter().next())
            .map(|(id, _)| *id)
            .unwrap_or(1)
    }

    pub fn transition_to_level(&mut self, target: u32) -> Result<()> {
        let current = self.level();
        self.events
            .emit(&GameEvent::LevelTransitionReady { level: current });

        let target = target.max(1);
        self.save.progress.current_level = target;
        self.save.progress.current_quest_index = 0;
        self.save.game.current_level = target;
        self.roster.clear();
        log::info!("moving from level {} to level {}", current, target);

        self.events.emit(&GameEvent::TransitionToLevel {
            target_level: target,
        });
        self.refresh_unlocks();
        self.persist()
    }

    // Shared

    pub fn enter_mode(&mut self, mode: Mode) -> Result<ModeTransition> {
        let level = self.level();
        let mut transition = sync::sync_on_mode_enter(
            mode,
            &mut self.save.progress,
            self.catalog.segments(level),
        );
        if transition.level_completed {
            let target = self.next_level();
            self.transition_to_level(target)?;
            transition.level = target;
        }
        if mode == Mode::Full {
            self.refresh_npcs();
        } else {
            self.auto_advance();
        }
        self.persist()?;
        Ok(transition)
    }

    pub fn pause(&mut self) -> bool {
        if self.paused {
            return false;
        }
        self.paused = true;
        self.events.emit(&GameEvent::GamePaused);
        self.events.emit(&GameEvent::InputDisabled);
        true
    }

    pub fn resume(&mut self) -> bool {
        if !self.paused {
            return false;
        }
        self.paused = false;
        self.events.emit(&GameEvent::GameResumed);
        self.events.emit(&GameEvent::InputEnabled);
        true
    }

    /// Wipes all progress, including unlocks kept for this session.
    pub fn reset(&mut self) -> Result<()> {
        self.save = self.store.reset()?;
        self.unlocked.clear();
        self.roster.clear();
        self.refresh_unlocks();
        self.events.emit(&GameEvent::ProgressUpdated);
        Ok(())
    }

    /// Re-reads the save file, e.g. after another process wrote it.
    pub fn reload(&mut self) {
        self.save = self.store.load();
        self.refresh_unlocks();
        self.events.emit(&GameEvent::ProgressUpdated);
    }

    pub fn export_progress(&self, dest: &Path) -> Result<()> {
        self.store.export_to(&self.save, dest)?;
        log::info!("progress exported to {}", dest.display());
        Ok(())
    }

    /// Loads a backup written by `export_progress`. Unlocks kept for this
    /// session are dropped along with the old progress.
    pub fn import_progress(&mut self, src: &Path) -> Result<()> {
        let json = std::fs::read_to_string(src)
            .with_context(|| format!("reading backup {}", src.display()))?;
        self.save = self.store.import_from_str(&json)?;
        self.unlocked.clear();
        self.roster.clear();
        self.refresh_unlocks();
        self.events.emit(&GameEvent::ProgressUpdated);
        Ok(())
    }

    fn persist(&mut self) -> Result<()> {
        self.store.save(&mut self.save)?;
        self.events.emit(&GameEvent::ProgressUpdated);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::quest::types::{ChoiceQuestion, IdentificationQuestion, Quiz};
    use crate::quest::Level;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::{tempdir, TempDir};

    fn npc(id: &str, quest: &str, order: u32, prereqs: &[&str]) -> NpcConfig {
        NpcConfig {
            id: id.into(),
            name: id.into(),
            sprite_key: "npc_girl".into(),
            dialog_text: format!("I am {}", id),
            quest_id: quest.into(),
            quest_order: order,
            prerequisites: prereqs.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn catalog() -> Catalog {
        let ident = Quiz::Identification(
            ["q1", "q2"]
                .iter()
                .map(|qid| IdentificationQuestion {
                    qid: qid.to_string(),
                    prompt: "Keyword for a block-scoped variable?".into(),
                    acceptable_answers: vec!["let".into()],
                    explanation: None,
                })
                .collect(),
        );
        let choice = Quiz::Multichoice(vec![ChoiceQuestion {
            qid: "m1".into(),
            prompt: "Which keyword declares a function?".into(),
            choices: vec!["var".into(), "function".into()],
            answer_index: 1,
            answer_display: None,
            explanation: None,
        }]);

        Catalog::from_levels(vec![
            Level {
                id: 1,
                segments: vec![
                    Segment::topic("intro-a", "Variables", "...").with_quest("quest-a"),
                    Segment::quiz("quiz-a", "Variables quiz", ident).with_quest("quest-a"),
                    Segment::topic("intro-b", "Functions", "...").with_quest("quest-b"),
                    Segment::quiz("quiz-b", "Functions quiz", choice).with_quest("quest-b"),
                ],
                npcs: vec![
                    npc("mentor", "quest-a", 1, &[]),
                    npc("scholar", "quest-b", 2, &["quest-a"]),
                ],
            },
            Level {
                id: 2,
                segments: vec![],
                npcs: vec![npc("guide", "quest-c", 1, &["quest-b"])],
            },
        ])
    }

    fn session() -> (TempDir, Session) {
        let dir = tempdir().unwrap();
        let store = ProgressStore::new(dir.path().join("save.json"));
        (dir, Session::open(store, catalog()))
    }

    fn capture(session: &mut Session, kinds: &[EventKind]) -> Rc<RefCell<Vec<GameEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        for kind in kinds {
            let sink = Rc::clone(&seen);
            session
                .events_mut()
                .subscribe(*kind, move |e| sink.borrow_mut().push(e.clone()));
        }
        seen
    }

    fn text(s: &str) -> Answer {
        Answer::Text(s.into())
    }

    #[test]
    fn fresh_session_opens_first_segment_only() {
        let (_dir, mut session) = session();
        assert_eq!(session.refresh_unlocks(), &[true, false, false, false]);
        assert!(!session.select_segment(1));
        assert!(!session.select_segment(99));
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn advancing_a_topic_completes_it() {
        let (_dir, mut session) = session();
        assert!(session.advance().unwrap());
        assert!(session.progress().is_completed("intro-a"));
        assert_eq!(session.progress().score("intro-a"), 100);
        assert_eq!(session.current_index(), 1);
        // Topic completion mirrors into game mode
        assert!(session.game().is_quest_completed("quest-a"));
    }

    #[test]
    fn quiz_flow_records_results_and_syncs() {
        let (_dir, mut session) = session();
        let seen = capture(&mut session, &[EventKind::QuestCompleted]);
        session.advance().unwrap();

        assert!(session.submit_answer("q1", &text("let")).unwrap());
        assert!(session.finish_quiz().is_err());
        assert!(!session.submit_answer("q2", &text("const")).unwrap());
        assert!(!session.advance().unwrap());
        assert_eq!(
            session.block_reason().as_deref(),
            Some("Fix 1 incorrect answer to proceed")
        );

        assert!(session.submit_answer("q2", &text("LET")).unwrap());
        assert!(session.advance().unwrap());
        assert!(session.progress().is_completed("quiz-a"));
        assert_eq!(session.progress().score("quiz-a"), 100);
        assert_eq!(session.current_index(), 2);

        let events = seen.borrow();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[1],
            GameEvent::QuestCompleted { quest_id, score: 100, .. } if quest_id == "quiz-a"
        ));
    }

    #[test]
    fn unknown_question_is_an_error() {
        let (_dir, mut session) = session();
        assert!(session.submit_answer("q1", &text("let")).is_err());
        session.advance().unwrap();
        assert!(session.submit_answer("nope", &text("let")).is_err());
    }

    #[test]
    fn game_completion_marks_linked_segments() {
        let (_dir, mut session) = session();
        let seen = capture(&mut session, &[EventKind::QuestCompleted]);
        let marked = session
            .complete_game_quest("quest-b", 90, QuestResults::new())
            .unwrap();
        assert_eq!(marked, vec!["intro-b".to_string(), "quiz-b".to_string()]);
        assert!(session.progress().is_completed("quiz-b"));
        assert!(session.game().is_quest_completed("quest-b"));
        assert_eq!(session.game().player_stats.xp, 90);
        assert_eq!(session.refresh_unlocks(), &[true, false, true, true]);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn replaying_a_quest_awards_xp_once() {
        let (_dir, mut session) = session();
        assert!(session.talk_to("mentor").unwrap());
        session
            .complete_game_quest("quest-a", 100, QuestResults::new())
            .unwrap();
        for _ in 0..4 {
            assert!(session.talk_to("mentor").unwrap());
            session
                .complete_game_quest("quest-a", 100, QuestResults::new())
                .unwrap();
        }
        assert_eq!(session.game().player_stats.xp, 100);
        assert_eq!(session.game().completed_quests.len(), 1);
    }

    #[test]
    fn npc_gate_follows_progress() {
        let (_dir, mut session) = session();
        let seen = capture(&mut session, &[EventKind::ShowDialog, EventKind::ShowQuest]);

        assert!(!session.talk_to("scholar").unwrap());
        assert!(session.talk_to("nobody").is_err());
        assert!(seen.borrow().is_empty());

        assert!(session.talk_to("mentor").unwrap());
        assert!(session.game().is_quest_active("quest-a"));
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(
            seen.borrow()[1],
            GameEvent::ShowQuest {
                quest_id: "quest-a".into()
            }
        );

        // An active prerequisite is enough
        assert!(session.talk_to("scholar").unwrap());
    }

    #[test]
    fn roster_reports_newly_visible_npcs() {
        let (_dir, mut session) = session();
        let first = session.refresh_npcs();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].npc_id, "mentor");

        session.talk_to("mentor").unwrap();
        let second = session.refresh_npcs();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].npc_id, "scholar");
        assert_eq!(session.available_npcs().len(), 2);
    }

    #[test]
    fn quest_segments_fall_back_to_links() {
        let (_dir, session) = session();
        let names: Vec<_> = session
            .quest_segments("quest-a")
            .iter()
            .map(|s| s.seg_name.as_str())
            .collect();
        assert_eq!(names, vec!["intro-a", "quiz-a"]);
        assert!(session.quest_segments("quest-z").is_empty());
    }

    #[test]
    fn finishing_every_quiz_completes_the_level() {
        let (_dir, mut session) = session();
        let seen = capture(&mut session, &[EventKind::LevelCompleted]);
        session
            .complete_game_quest("quest-a", 100, QuestResults::new())
            .unwrap();
        assert!(seen.borrow().is_empty());
        session
            .complete_game_quest("quest-b", 100, QuestResults::new())
            .unwrap();

        assert_eq!(*seen.borrow(), vec![GameEvent::LevelCompleted { level: 1 }]);
        assert!(session.progress().is_level_completed(1));
        assert_eq!(session.level(), 1);

        let t = session.enter_mode(Mode::Full).unwrap();
        assert!(t.level_completed);
        assert_eq!(t.level, 2);
        assert_eq!(session.level(), 2);
        assert_eq!(session.game().current_level, 2);
    }

    #[test]
    fn transition_emits_ready_then_transition() {
        let (_dir, mut session) = session();
        let seen = capture(
            &mut session,
            &[EventKind::LevelTransitionReady, EventKind::TransitionToLevel],
        );
        assert_eq!(session.next_level(), 2);
        session.transition_to_level(2).unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![
                GameEvent::LevelTransitionReady { level: 1 },
                GameEvent::TransitionToLevel { target_level: 2 },
            ]
        );
        assert_eq!(session.level(), 2);
        assert_eq!(session.next_level(), 1);
    }

    #[test]
    fn pause_and_resume_toggle_input() {
        let (_dir, mut session) = session();
        let seen = capture(
            &mut session,
            &[
                EventKind::GamePaused,
                EventKind::GameResumed,
                EventKind::InputDisabled,
                EventKind::InputEnabled,
            ],
        );
        assert!(session.pause());
        assert!(!session.pause());
        assert!(session.resume());
        assert_eq!(
            *seen.borrow(),
            vec![
                GameEvent::GamePaused,
                GameEvent::InputDisabled,
                GameEvent::GameResumed,
                GameEvent::InputEnabled,
            ]
        );
    }

    #[test]
    fn unlocks_survive_a_reload_but_not_a_reset() {
        let (dir, mut session) = session();
        session.advance().unwrap();
        assert!(session.is_unlocked(1));

        std::fs::remove_file(dir.path().join("save.json")).unwrap();
        session.reload();
        assert!(!session.progress().is_completed("intro-a"));
        assert!(session.is_unlocked(1));

        session.reset().unwrap();
        assert!(!session.is_unlocked(1));
    }

    #[test]
    fn progress_persists_across_sessions() {
        let (dir, mut session) = session();
        session.advance().unwrap();
        drop(session);

        let reopened = Session::open(ProgressStore::new(dir.path().join("save.json")), catalog());
        assert!(reopened.progress().is_completed("intro-a"));
        assert_eq!(reopened.current_index(), 1);
        assert!(reopened.is_unlocked(1));
    }

    #[test]
    fn entering_lessons_reports_level() {
        let (_dir, mut session) = session();
        let t = session.enter_mode(Mode::UiOnly).unwrap();
        assert_eq!(t.message, "Resuming Level 1 lessons...");
        assert_eq!(session.progress().last_mode, Mode::UiOnly);
    }
}
