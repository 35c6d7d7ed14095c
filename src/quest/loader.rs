use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use super::types::{
    Catalog, ChoiceQuestion, FillBlanksQuestion, GameQuest, IdentificationQuestion, Level,
    NpcConfig, PartOption, PartQuestion, Quiz, Segment, SegmentKind,
};

const BLANK_MARKER: &str = "[BLANK]";

////////////////////
/// TOML STRUCTS ///
////////////////////

#[derive(Deserialize)]
struct SegmentFile {
    seg_name: String,
    #[serde(rename = "type")]
    kind: String,
    title: String,
    #[serde(default)]
    quest: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    questions: Vec<QuestionConfig>,
}

#[derive(Deserialize)]
struct QuestionConfig {
    // Catalog quizzes use `qid`, multipart quests use `id`.
    #[serde(default)]
    qid: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type", default)]
    part_type: Option<String>,

    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    sentence: Option<String>,

    #[serde(default)]
    choices: Vec<String>,
    #[serde(default)]
    answer: Option<usize>,
    #[serde(default)]
    answer_display: Option<String>,
    #[serde(default)]
    answers: Vec<String>,
    #[serde(default)]
    blanks: Option<usize>,
    #[serde(default)]
    options: Vec<PartOption>,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Deserialize)]
struct NpcFile {
    #[serde(default)]
    npc: Vec<NpcConfig>, // [[npc]] blocks
}

#[derive(Deserialize)]
struct GameQuestFile {
    id: String,
    title: String,
    lesson: SegmentFile,
    quiz: SegmentFile,
}

pub fn parse_segment(src: &str) -> Result<Segment> {
    let file: SegmentFile = toml::from_str(src)?;
    segment_from_file(file)
}

pub fn load_segment(path: &Path) -> Result<Segment> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading segment {}", path.display()))?;
    parse_segment(&content).with_context(|| format!("parsing segment {}", path.display()))
}

pub fn load_npcs(path: &Path) -> Result<Vec<NpcConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading npcs {}", path.display()))?;
    let file: NpcFile =
        toml::from_str(&content).with_context(|| format!("parsing npcs {}", path.display()))?;
    Ok(file.npc)
}

pub fn load_game_quest(path: &Path) -> Result<GameQuest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading quest {}", path.display()))?;
    let file: GameQuestFile =
        toml::from_str(&content).with_context(|| format!("parsing quest {}", path.display()))?;

    let lesson = segment_from_file(file.lesson)?.with_quest(&file.id);
    let quiz = segment_from_file(file.quiz)?.with_quest(&file.id);
    if !lesson.is_quiz() && quiz.is_quiz() {
        Ok(GameQuest {
            id: file.id,
            title: file.title,
            lesson,
            quiz,
        })
    } else {
        bail!(
            "quest '{}' needs a topic lesson and a quiz, got {} and {}",
            file.id,
            lesson.type_tag(),
            quiz.type_tag()
        )
    }
}

/// Loads `seg_*.toml` (ordered by file name) and an optional `npcs.toml`.
pub fn load_level(level_dir: &Path, id: u32) -> Result<Level> {
    let mut segments = Vec::new();
    for path in sorted_matches(&level_dir.join("seg_*.toml"))? {
        segments.push(load_segment(&path)?);
    }

    let npc_path = level_dir.join("npcs.toml");
    let npcs = if npc_path.exists() {
        let mut npcs = load_npcs(&npc_path)?;
        npcs.sort_by_key(|n| n.quest_order);
        npcs
    } else {
        Vec::new()
    };

    Ok(Level { id, segments, npcs })
}

/// Loads `levels/level_NN/` directories and `quests/*.toml` under `content_dir`.
pub fn load_catalog(content_dir: &Path) -> Result<Catalog> {
    let mut catalog = Catalog::default();

    for dir in sorted_matches(&content_dir.join("levels").join("level_*"))? {
        if !dir.is_dir() {
            continue;
        }
        let id = level_id_from_dir(&dir)?;
        let level = load_level(&dir, id)?;
        log::debug!(
            "loaded level {} ({} segments, {} npcs)",
            id,
            level.segments.len(),
            level.npcs.len()
        );
        catalog.levels.insert(id, level);
    }

    for path in sorted_matches(&content_dir.join("quests").join("*.toml"))? {
        let quest = load_game_quest(&path)?;
        catalog.game_quests.insert(quest.id.clone(), quest);
    }

    if catalog.levels.is_empty() {
        bail!("no levels found under {}", content_dir.display());
    }
    Ok(catalog)
}

fn sorted_matches(pattern: &Path) -> Result<Vec<std::path::PathBuf>> {
    let pattern = pattern.to_string_lossy();
    let mut paths: Vec<_> = glob::glob(&pattern)
        .with_context(|| format!("bad content pattern {}", pattern))?
        .filter_map(|entry| entry.ok())
        .collect();

    // Sort by filename so seg_01, seg_02, seg_03 are in order
    paths.sort();
    Ok(paths)
}

fn level_id_from_dir(dir: &Path) -> Result<u32> {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.strip_prefix("level_")
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| anyhow!("level directory '{}' is not named level_NN", name))
}

fn segment_from_file(file: SegmentFile) -> Result<Segment> {
    let kind = match file.kind.as_str() {
        "topic" => SegmentKind::Topic {
            content: file.content.unwrap_or_default(),
        },
        "quiz-multichoice" => SegmentKind::Quiz(Quiz::Multichoice(
            file.questions
                .into_iter()
                .map(choice_question)
                .collect::<Result<_>>()?,
        )),
        "quiz-identification" => SegmentKind::Quiz(Quiz::Identification(
            file.questions
                .into_iter()
                .map(identification_question)
                .collect::<Result<_>>()?,
        )),
        "quiz-fillblanks" => SegmentKind::Quiz(Quiz::FillBlanks(
            file.questions
                .into_iter()
                .map(fill_blanks_question)
                .collect::<Result<_>>()?,
        )),
        "quiz-multipart" => SegmentKind::Quiz(Quiz::Multipart(
            file.questions
                .into_iter()
                .map(part_question)
                .collect::<Result<_>>()?,
        )),
        other => bail!("segment '{}' has unknown type '{}'", file.seg_name, other),
    };

    Ok(Segment {
        seg_name: file.seg_name,
        title: file.title,
        quest: file.quest,
        kind,
    })
}

fn required_qid(q: &QuestionConfig) -> Result<String> {
    q.qid
        .clone()
        .or_else(|| q.id.clone())
        .ok_or_else(|| anyhow!("question is missing qid"))
}

fn required_text(q: &QuestionConfig, qid: &str) -> Result<String> {
    q.question
        .clone()
        .or_else(|| q.text.clone())
        .or_else(|| q.prompt.clone())
        .ok_or_else(|| anyhow!("question '{}' has no text", qid))
}

fn choice_question(q: QuestionConfig) -> Result<ChoiceQuestion> {
    let qid = required_qid(&q)?;
    let prompt = required_text(&q, &qid)?;
    let answer_index = q
        .answer
        .ok_or_else(|| anyhow!("question '{}' has no answer index", qid))?;
    Ok(ChoiceQuestion {
        qid,
        prompt,
        choices: q.choices,
        answer_index,
        answer_display: q.answer_display,
        explanation: q.explanation,
    })
}

fn identification_question(q: QuestionConfig) -> Result<IdentificationQuestion> {
    let qid = required_qid(&q)?;
    let prompt = required_text(&q, &qid)?;
    Ok(IdentificationQuestion {
        qid,
        prompt,
        acceptable_answers: q.answers,
        explanation: q.explanation,
    })
}

fn fill_blanks_question(q: QuestionConfig) -> Result<FillBlanksQuestion> {
    let qid = required_qid(&q)?;
    let prompt = required_text(&q, &qid)?;
    let marked = prompt.matches(BLANK_MARKER).count();
    let blanks = q.blanks.unwrap_or(marked).max(1);
    Ok(FillBlanksQuestion {
        qid,
        prompt,
        expected_answers: q.answers,
        blanks,
        explanation: q.explanation,
    })
}

fn part_question(q: QuestionConfig) -> Result<PartQuestion> {
    let id = required_qid(&q)?;
    match q.part_type.as_deref() {
        Some("multipleChoice") => Ok(PartQuestion::MultipleChoice {
            text: required_text(&q, &id)?,
            id,
            options: q.options,
            explanation: q.explanation,
        }),
        Some("fillInBlanks") => Ok(PartQuestion::FillInBlanks {
            prompt: q.prompt.unwrap_or_else(|| "Fill in the blank:".to_string()),
            sentence: q
                .sentence
                .ok_or_else(|| anyhow!("question '{}' has no sentence", id))?,
            id,
            answers: q.answers,
            explanation: q.explanation,
        }),
        other => bail!("question '{}' has unknown part type {:?}", id, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::grader::Answer;
    use std::path::PathBuf;

    fn content_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("content")
    }

    #[test]
    fn parses_multichoice_segment() {
        let seg = parse_segment(
            r#"
seg_name = "vars-quiz"
type = "quiz-multichoice"
title = "Variables Quiz"
quest = "quest-variables"

[[questions]]
qid = "var1"
question = "What is a variable?"
choices = ["A container for storing data", "A comment"]
answer = 0
"#,
        )
        .unwrap();

        assert_eq!(seg.seg_name, "vars-quiz");
        assert_eq!(seg.quest.as_deref(), Some("quest-variables"));
        assert_eq!(seg.type_tag(), "quiz-multichoice");
        let quiz = seg.as_quiz().unwrap();
        assert_eq!(quiz.qids(), vec!["var1"]);
        assert_eq!(quiz.grade("var1", &Answer::Choice(0)), Some(true));
    }

    #[test]
    fn counts_blank_markers() {
        let seg = parse_segment(
            r#"
seg_name = "decl-blanks"
type = "quiz-fillblanks"
title = "Declarations"

[[questions]]
qid = "b1"
question = "[BLANK] x = 1; [BLANK] y = 2;"
answers = ["let", "const"]
"#,
        )
        .unwrap();
        match seg.as_quiz().unwrap() {
            Quiz::FillBlanks(qs) => assert_eq!(qs[0].blanks, 2),
            other => panic!("unexpected quiz {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_segment_type() {
        let err = parse_segment(
            r#"
seg_name = "odd"
type = "quiz-essay"
title = "Essay"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("quiz-essay"));
    }

    #[test]
    fn rejects_multichoice_without_answer() {
        let result = parse_segment(
            r#"
seg_name = "broken"
type = "quiz-multichoice"
title = "Broken"

[[questions]]
qid = "q"
question = "?"
choices = ["a"]
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn loads_level_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("seg_02.toml"),
            "seg_name = \"second\"\ntype = \"topic\"\ntitle = \"Two\"\ncontent = \"b\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("seg_01.toml"),
            "seg_name = \"first\"\ntype = \"topic\"\ntitle = \"One\"\ncontent = \"a\"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let level = load_level(dir.path(), 4).unwrap();
        let names: Vec<_> = level.segments.iter().map(|s| s.seg_name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert!(level.npcs.is_empty());
    }

    #[test]
    fn loads_shipped_content() {
        let catalog = load_catalog(&content_dir()).unwrap();
        let level1 = catalog.level(1).unwrap();
        assert_eq!(level1.segments.len(), 15);
        assert_eq!(level1.segments[0].seg_name, "intro-variables");
        assert_eq!(level1.npcs.len(), 6);
        assert_eq!(catalog.level(2).unwrap().npcs.len(), 9);
        assert_eq!(catalog.level(3).unwrap().npcs.len(), 9);
        assert!(catalog.game_quest("quest-variables").is_some());
        assert!(catalog.game_quest("quest-functions").is_some());
    }
}
