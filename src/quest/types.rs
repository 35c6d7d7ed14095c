use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

pub type QuestId = String;

#[derive(Debug, Clone)]
pub struct Segment {
    pub seg_name: String,
    pub title: String,
    pub quest: Option<QuestId>, // game-mode quest this segment teaches
    pub kind: SegmentKind,
}

#[derive(Debug, Clone)]
pub enum SegmentKind {
    Topic { content: String },
    Quiz(Quiz),
}

/// A quiz is homogeneous: every question shares the quiz kind.
#[derive(Debug, Clone)]
pub enum Quiz {
    Multichoice(Vec<ChoiceQuestion>),
    Identification(Vec<IdentificationQuestion>),
    FillBlanks(Vec<FillBlanksQuestion>),
    Multipart(Vec<PartQuestion>),
}

#[derive(Debug, Clone)]
pub struct ChoiceQuestion {
    pub qid: String,
    pub prompt: String,
    pub choices: Vec<String>,
    pub answer_index: usize,
    pub answer_display: Option<String>,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IdentificationQuestion {
    pub qid: String,
    pub prompt: String,
    pub acceptable_answers: Vec<String>,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FillBlanksQuestion {
    pub qid: String,
    pub prompt: String,
    pub expected_answers: Vec<String>,
    pub blanks: usize,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone)]
pub enum PartQuestion {
    MultipleChoice {
        id: String,
        text: String,
        options: Vec<PartOption>,
        explanation: Option<String>,
    },
    FillInBlanks {
        id: String,
        prompt: String,
        sentence: String,
        answers: Vec<String>,
        explanation: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartOption {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Copy)]
pub enum QuestionRef<'a> {
    Choice(&'a ChoiceQuestion),
    Identification(&'a IdentificationQuestion),
    FillBlanks(&'a FillBlanksQuestion),
    Part(&'a PartQuestion),
}

#[derive(Debug, Clone, Deserialize)]
pub struct NpcConfig {
    pub id: String,
    pub name: String,
    pub sprite_key: String,
    pub dialog_text: String,
    pub quest_id: QuestId,
    pub quest_order: u32,
    #[serde(default)]
    pub prerequisites: Vec<QuestId>,
}

#[derive(Debug, Clone, Default)]
pub struct Level {
    pub id: u32,
    pub segments: Vec<Segment>,
    pub npcs: Vec<NpcConfig>,
}

#[derive(Debug, Clone)]
pub struct GameQuest {
    pub id: QuestId,
    pub title: String,
    pub lesson: Segment,
    pub quiz: Segment,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub levels: BTreeMap<u32, Level>,
    pub game_quests: HashMap<QuestId, GameQuest>,
}

impl Segment {
    pub fn topic(seg_name: &str, title: &str, content: &str) -> Self {
        Segment {
            seg_name: seg_name.to_string(),
            title: title.to_string(),
            quest: None,
            kind: SegmentKind::Topic {
                content: content.to_string(),
            },
        }
    }

    pub fn quiz(seg_name: &str, title: &str, quiz: Quiz) -> Self {
        Segment {
            seg_name: seg_name.to_string(),
            title: title.to_string(),
            quest: None,
            kind: SegmentKind::Quiz(quiz),
        }
    }

    pub fn with_quest(mut self, quest: &str) -> Self {
        self.quest = Some(quest.to_string());
        self
    }

    pub fn is_quiz(&self) -> bool {
        matches!(self.kind, SegmentKind::Quiz(_))
    }

    pub fn as_quiz(&self) -> Option<&Quiz> {
        match &self.kind {
            SegmentKind::Quiz(quiz) => Some(quiz),
            SegmentKind::Topic { .. } => None,
        }
    }

    pub fn type_tag(&self) -> &'static str {
        match &self.kind {
            SegmentKind::Topic { .. } => "topic",
            SegmentKind::Quiz(Quiz::Multichoice(_)) => "quiz-multichoice",
            SegmentKind::Quiz(Quiz::Identification(_)) => "quiz-identification",
            SegmentKind::Quiz(Quiz::FillBlanks(_)) => "quiz-fillblanks",
            SegmentKind::Quiz(Quiz::Multipart(_)) => "quiz-multipart",
        }
    }
}

impl Quiz {
    pub fn len(&self) -> usize {
        match self {
            Quiz::Multichoice(qs) => qs.len(),
            Quiz::Identification(qs) => qs.len(),
            Quiz::FillBlanks(qs) => qs.len(),
            Quiz::Multipart(qs) => qs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn question(&self, index: usize) -> Option<QuestionRef<'_>> {
        match self {
            Quiz::Multichoice(qs) => qs.get(index).map(QuestionRef::Choice),
            Quiz::Identification(qs) => qs.get(index).map(QuestionRef::Identification),
            Quiz::FillBlanks(qs) => qs.get(index).map(QuestionRef::FillBlanks),
            Quiz::Multipart(qs) => qs.get(index).map(QuestionRef::Part),
        }
    }

    pub fn questions(&self) -> impl Iterator<Item = QuestionRef<'_>> {
        (0..self.len()).filter_map(move |i| self.question(i))
    }

    pub fn find(&self, qid: &str) -> Option<QuestionRef<'_>> {
        self.questions().find(|q| q.qid() == qid)
    }

    pub fn qids(&self) -> Vec<&str> {
        self.questions().map(|q| q.qid()).collect()
    }
}

impl PartQuestion {
    pub fn id(&self) -> &str {
        match self {
            PartQuestion::MultipleChoice { id, .. } | PartQuestion::FillInBlanks { id, .. } => id,
        }
    }
}

impl<'a> QuestionRef<'a> {
    pub fn qid(&self) -> &'a str {
        match self {
            QuestionRef::Choice(q) => &q.qid,
            QuestionRef::Identification(q) => &q.qid,
            QuestionRef::FillBlanks(q) => &q.qid,
            QuestionRef::Part(q) => q.id(),
        }
    }

    pub fn prompt(&self) -> String {
        match self {
            QuestionRef::Choice(q) => q.prompt.clone(),
            QuestionRef::Identification(q) => q.prompt.clone(),
            QuestionRef::FillBlanks(q) => q.prompt.clone(),
            QuestionRef::Part(PartQuestion::MultipleChoice { text, .. }) => text.clone(),
            QuestionRef::Part(PartQuestion::FillInBlanks {
                prompt, sentence, ..
            }) => format!("{}\n\n{}", prompt, sentence),
        }
    }

    pub fn choices(&self) -> Option<Vec<&'a str>> {
        match self {
            QuestionRef::Choice(q) => Some(q.choices.iter().map(String::as_str).collect()),
            QuestionRef::Part(PartQuestion::MultipleChoice { options, .. }) => {
                Some(options.iter().map(|o| o.text.as_str()).collect())
            }
            _ => None,
        }
    }

    /// Human-readable expected answer, shown after a wrong submission.
    pub fn expected_display(&self) -> String {
        match self {
            QuestionRef::Choice(q) => q
                .answer_display
                .clone()
                .or_else(|| q.choices.get(q.answer_index).cloned())
                .unwrap_or_default(),
            QuestionRef::Identification(q) => q.acceptable_answers.join(" / "),
            QuestionRef::FillBlanks(q) => {
                if q.blanks == 1 {
                    q.expected_answers.join(" / ")
                } else {
                    q.expected_answers.join(", ")
                }
            }
            QuestionRef::Part(PartQuestion::MultipleChoice { options, .. }) => options
                .iter()
                .filter(|o| o.is_correct)
                .map(|o| o.text.as_str())
                .collect::<Vec<_>>()
                .join(" / "),
            QuestionRef::Part(PartQuestion::FillInBlanks { answers, .. }) => {
                answers.first().cloned().unwrap_or_default()
            }
        }
    }

    pub fn explanation(&self) -> Option<&'a str> {
        match self {
            QuestionRef::Choice(q) => q.explanation.as_deref(),
            QuestionRef::Identification(q) => q.explanation.as_deref(),
            QuestionRef::FillBlanks(q) => q.explanation.as_deref(),
            QuestionRef::Part(PartQuestion::MultipleChoice { explanation, .. })
            | QuestionRef::Part(PartQuestion::FillInBlanks { explanation, .. }) => {
                explanation.as_deref()
            }
        }
    }

    pub fn blank_count(&self) -> usize {
        match self {
            QuestionRef::FillBlanks(q) => q.blanks,
            _ => 1,
        }
    }
}

impl Catalog {
    pub fn from_levels(levels: Vec<Level>) -> Self {
        Catalog {
            levels: levels.into_iter().map(|l| (l.id, l)).collect(),
            game_quests: HashMap::new(),
        }
    }

    pub fn level(&self, id: u32) -> Option<&Level> {
        self.levels.get(&id)
    }

    pub fn segments(&self, level: u32) -> &[Segment] {
        self.levels
            .get(&level)
            .map(|l| l.segments.as_slice())
            .unwrap_or(&[])
    }

    pub fn game_quest(&self, id: &str) -> Option<&GameQuest> {
        self.game_quests.get(id)
    }

    pub fn all_segments(&self) -> impl Iterator<Item = &Segment> {
        self.levels.values().flat_map(|l| l.segments.iter())
    }

    pub fn all_npcs(&self) -> impl Iterator<Item = &NpcConfig> {
        self.levels.values().flat_map(|l| l.npcs.iter())
    }
}
