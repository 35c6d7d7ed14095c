use std::collections::HashSet;
use std::fmt;

use super::types::{Catalog, PartQuestion, Quiz, Segment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub severity: Severity,
    pub message: String,
}

impl ValidationError {
    fn error(msg: impl Into<String>) -> Self {
        ValidationError {
            severity: Severity::Error,
            message: msg.into(),
        }
    }

    fn warning(msg: impl Into<String>) -> Self {
        ValidationError {
            severity: Severity::Warning,
            message: msg.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Error => write!(f, "error: {}", self.message),
            Severity::Warning => write!(f, "warning: {}", self.message),
        }
    }
}

pub fn validate_catalog(catalog: &Catalog) -> Vec<ValidationError> {
    let mut errors: Vec<ValidationError> = Vec::new();

    // Every quest some NPC hands out, across all levels
    let npc_quests: HashSet<&str> = catalog.all_npcs().map(|n| n.quest_id.as_str()).collect();

    for (level_id, level) in &catalog.levels {
        let mut seg_names = HashSet::new();
        for seg in &level.segments {
            if !seg_names.insert(seg.seg_name.as_str()) {
                errors.push(ValidationError::error(format!(
                    "level {} has duplicate segment '{}'",
                    level_id, seg.seg_name
                )));
            }
            validate_segment(seg, &mut errors);

            if let Some(quest) = &seg.quest {
                if !npc_quests.contains(quest.as_str()) {
                    errors.push(ValidationError::warning(format!(
                        "segment '{}' links to quest '{}' that no npc hands out",
                        seg.seg_name, quest
                    )));
                }
            }
        }

        let mut npc_ids = HashSet::new();
        for npc in &level.npcs {
            if !npc_ids.insert(npc.id.as_str()) {
                errors.push(ValidationError::error(format!(
                    "level {} has duplicate npc '{}'",
                    level_id, npc.id
                )));
            }
            for prereq in &npc.prerequisites {
                if prereq == &npc.quest_id {
                    errors.push(ValidationError::error(format!(
                        "npc '{}' lists its own quest '{}' as a prerequisite",
                        npc.id, prereq
                    )));
                } else if !npc_quests.contains(prereq.as_str()) {
                    errors.push(ValidationError::warning(format!(
                        "npc '{}' requires quest '{}' that no npc hands out",
                        npc.id, prereq
                    )));
                }
            }
        }
    }

    for (id, quest) in &catalog.game_quests {
        if !npc_quests.contains(id.as_str()) {
            errors.push(ValidationError::warning(format!(
                "game quest '{}' is not handed out by any npc",
                id
            )));
        }
        validate_segment(&quest.lesson, &mut errors);
        validate_segment(&quest.quiz, &mut errors);
    }

    errors
}

fn validate_segment(seg: &Segment, errors: &mut Vec<ValidationError>) {
    let Some(quiz) = seg.as_quiz() else {
        return;
    };

    if quiz.is_empty() {
        errors.push(ValidationError::error(format!(
            "quiz '{}' has no questions",
            seg.seg_name
        )));
    }

    let mut qids = HashSet::new();
    for qid in quiz.qids() {
        if !qids.insert(qid) {
            errors.push(ValidationError::error(format!(
                "quiz '{}' has duplicate question '{}'",
                seg.seg_name, qid
            )));
        }
    }

    match quiz {
        Quiz::Multichoice(qs) => {
            for q in qs {
                if q.answer_index >= q.choices.len() {
                    errors.push(ValidationError::error(format!(
                        "question '{}' in '{}' answers choice {} of {}",
                        q.qid,
                        seg.seg_name,
                        q.answer_index,
                        q.choices.len()
                    )));
                }
            }
        }
        Quiz::Identification(qs) => {
            for q in qs {
                if q.acceptable_answers.iter().all(|a| a.trim().is_empty()) {
                    errors.push(ValidationError::error(format!(
                        "question '{}' in '{}' has no acceptable answers",
                        q.qid, seg.seg_name
                    )));
                } else if q.acceptable_answers.iter().any(|a| a.trim().is_empty()) {
                    // An empty substring matches every submission
                    errors.push(ValidationError::error(format!(
                        "question '{}' in '{}' has an empty acceptable answer",
                        q.qid, seg.seg_name
                    )));
                }
            }
        }
        Quiz::FillBlanks(qs) => {
            for q in qs {
                if q.expected_answers.is_empty() {
                    errors.push(ValidationError::error(format!(
                        "question '{}' in '{}' has no expected answers",
                        q.qid, seg.seg_name
                    )));
                } else if q.blanks > 1 && q.expected_answers.len() != q.blanks {
                    errors.push(ValidationError::error(format!(
                        "question '{}' in '{}' has {} blanks but {} answers",
                        q.qid,
                        seg.seg_name,
                        q.blanks,
                        q.expected_answers.len()
                    )));
                }
            }
        }
        Quiz::Multipart(qs) => {
            for q in qs {
                match q {
                    PartQuestion::MultipleChoice { id, options, .. } => {
                        if !options.iter().any(|o| o.is_correct) {
                            errors.push(ValidationError::error(format!(
                                "question '{}' in '{}' has no correct option",
                                id, seg.seg_name
                            )));
                        }
                    }
                    PartQuestion::FillInBlanks { id, answers, .. } => {
                        if answers.is_empty() {
                            errors.push(ValidationError::error(format!(
                                "question '{}' in '{}' has no answers",
                                id, seg.seg_name
                            )));
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::types::{ChoiceQuestion, IdentificationQuestion, Level, NpcConfig};

    fn npc(id: &str, quest: &str, prereqs: &[&str]) -> NpcConfig {
        NpcConfig {
            id: id.into(),
            name: id.into(),
            sprite_key: "animal_bull".into(),
            dialog_text: "hi".into(),
            quest_id: quest.into(),
            quest_order: 1,
            prerequisites: prereqs.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn flags_out_of_range_answer_and_duplicate_qids() {
        let q = ChoiceQuestion {
            qid: "q1".into(),
            prompt: "?".into(),
            choices: vec!["a".into()],
            answer_index: 3,
            answer_display: None,
            explanation: None,
        };
        let seg = Segment::quiz("quiz", "Quiz", Quiz::Multichoice(vec![q.clone(), q]));
        let catalog = Catalog::from_levels(vec![Level {
            id: 1,
            segments: vec![seg],
            npcs: vec![],
        }]);

        let errors = validate_catalog(&catalog);
        assert!(errors.iter().any(|e| e.message.contains("duplicate question 'q1'")));
        assert!(errors.iter().any(|e| e.message.contains("answers choice 3 of 1")));
        assert!(errors.iter().all(|e| e.is_error()));
    }

    #[test]
    fn flags_empty_identification_answer() {
        let q = IdentificationQuestion {
            qid: "id1".into(),
            prompt: "?".into(),
            acceptable_answers: vec!["for".into(), " ".into()],
            explanation: None,
        };
        let seg = Segment::quiz("ids", "Ids", Quiz::Identification(vec![q]));
        let catalog = Catalog::from_levels(vec![Level {
            id: 1,
            segments: vec![seg],
            npcs: vec![],
        }]);
        assert!(validate_catalog(&catalog)
            .iter()
            .any(|e| e.message.contains("empty acceptable answer")));
    }

    #[test]
    fn warns_on_dangling_links() {
        let seg = Segment::topic("intro", "Intro", "text").with_quest("quest-nowhere");
        let catalog = Catalog::from_levels(vec![Level {
            id: 1,
            segments: vec![seg],
            npcs: vec![npc("npc-a", "quest-a", &["quest-missing"])],
        }]);

        let errors = validate_catalog(&catalog);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| !e.is_error()));
    }

    #[test]
    fn shipped_content_has_no_errors() {
        let dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("content");
        let catalog = crate::quest::load_catalog(&dir).unwrap();
        let errors: Vec<_> = validate_catalog(&catalog)
            .into_iter()
            .filter(|e| e.is_error())
            .collect();
        assert!(errors.is_empty(), "{:?}", errors);
    }
}
