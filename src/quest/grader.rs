use std::collections::BTreeMap;

use super::types::{
    ChoiceQuestion, FillBlanksQuestion, IdentificationQuestion, PartQuestion, QuestionRef, Quiz,
};

/// What the player submitted for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Index into the question's choices or options.
    Choice(usize),
    /// Option id of a multipart multiple-choice question.
    OptionId(String),
    Text(String),
    Blanks(Vec<String>),
}

/// Trim, lowercase and collapse internal whitespace to single spaces.
pub fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl ChoiceQuestion {
    pub fn grade(&self, answer: &Answer) -> bool {
        matches!(answer, Answer::Choice(i) if *i == self.answer_index)
    }
}

impl IdentificationQuestion {
    pub fn grade(&self, answer: &Answer) -> bool {
        let Answer::Text(text) = answer else {
            return false;
        };
        let submitted = text.to_lowercase();
        self.acceptable_answers
            .iter()
            .any(|accepted| submitted.contains(&accepted.to_lowercase()))
    }
}

impl FillBlanksQuestion {
    pub fn grade(&self, answer: &Answer) -> bool {
        let submitted: Vec<String> = match answer {
            Answer::Text(text) => vec![normalize(text)],
            Answer::Blanks(blanks) => blanks.iter().map(|b| normalize(b)).collect(),
            _ => return false,
        };
        let expected: Vec<String> = self.expected_answers.iter().map(|a| normalize(a)).collect();

        if self.blanks == 1 && expected.len() > 1 {
            // One blank, several acceptable spellings.
            submitted.len() == 1 && expected.contains(&submitted[0])
        } else {
            submitted == expected
        }
    }
}

impl PartQuestion {
    pub fn grade(&self, answer: &Answer) -> bool {
        match self {
            PartQuestion::MultipleChoice { options, .. } => {
                let selected = match answer {
                    Answer::OptionId(id) => options.iter().find(|o| &o.id == id),
                    Answer::Choice(i) => options.get(*i),
                    _ => None,
                };
                selected.is_some_and(|o| o.is_correct)
            }
            PartQuestion::FillInBlanks { answers, .. } => {
                let submitted = match answer {
                    Answer::Text(text) => text.as_str(),
                    Answer::Blanks(blanks) if blanks.len() == 1 => blanks[0].as_str(),
                    _ => return false,
                };
                answers
                    .first()
                    .is_some_and(|expected| {
                        submitted.trim().to_lowercase() == expected.trim().to_lowercase()
                    })
            }
        }
    }
}

impl QuestionRef<'_> {
    pub fn grade(&self, answer: &Answer) -> bool {
        match self {
            QuestionRef::Choice(q) => q.grade(answer),
            QuestionRef::Identification(q) => q.grade(answer),
            QuestionRef::FillBlanks(q) => q.grade(answer),
            QuestionRef::Part(q) => q.grade(answer),
        }
    }
}

impl Quiz {
    /// Grades one question by id; `None` when the quiz has no such question.
    pub fn grade(&self, qid: &str, answer: &Answer) -> Option<bool> {
        self.find(qid).map(|q| q.grade(answer))
    }
}

/// Percentage of correct results over `total` questions, rounded.
pub fn score(results: &BTreeMap<String, bool>, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let correct = results.values().filter(|ok| **ok).count();
    ((correct as f64 / total as f64) * 100.0).round() as u8
}
