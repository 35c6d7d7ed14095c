use crate::progress::ProgressDocument;
use crate::quest::{Segment, SegmentKind};
use crate::sync::QuestLinks;

/// The first segment is always open. A later one opens once its predecessor
/// is completed, it has a recorded answer, or its linked quest is completed.
pub fn compute_unlocked(
    segments: &[Segment],
    progress: &ProgressDocument,
    links: &QuestLinks,
) -> Vec<bool> {
    let mut unlocked = Vec::with_capacity(segments.len());
    for (i, seg) in segments.iter().enumerate() {
        if i == 0 {
            unlocked.push(true);
            continue;
        }
        let prev_completed = progress.is_completed(&segments[i - 1].seg_name);
        let in_progress = progress.has_attempt(&seg.seg_name);
        let game_completed = links
            .quest_for(&seg.seg_name)
            .is_some_and(|quest| progress.is_completed(quest));

        log::debug!(
            "unlock {} '{}': prev_completed={} in_progress={} game_completed={}",
            i,
            seg.seg_name,
            prev_completed,
            in_progress,
            game_completed
        );
        unlocked.push(prev_completed || in_progress || game_completed);
    }
    unlocked
}

pub fn can_advance(segment: &Segment, progress: &ProgressDocument) -> bool {
    advance_block_reason(segment, progress).is_none()
}

pub fn advance_block_reason(segment: &Segment, progress: &ProgressDocument) -> Option<String> {
    let SegmentKind::Quiz(quiz) = &segment.kind else {
        return None;
    };
    let results = progress.results(&segment.seg_name);
    let qids = quiz.qids();

    let all_submitted = qids
        .iter()
        .all(|qid| results.is_some_and(|r| r.contains_key(*qid)));
    if !all_submitted {
        return Some("Answer all questions first".to_string());
    }

    let incorrect = qids
        .iter()
        .filter(|qid| results.and_then(|r| r.get(**qid)) == Some(&false))
        .count();
    match incorrect {
        0 => None,
        1 => Some("Fix 1 incorrect answer to proceed".to_string()),
        n => Some(format!("Fix {} incorrect answers to proceed", n)),
    }
}

/// Where focus mode should move after progress changes. Stays put unless the
/// current segment is done, then picks the next open, unfinished segment.
pub fn next_segment(
    segments: &[Segment],
    progress: &ProgressDocument,
    links: &QuestLinks,
    unlocked: &[bool],
    current: usize,
) -> usize {
    let Some(seg) = segments.get(current) else {
        return current;
    };

    let mut done = progress.is_completed(&seg.seg_name);
    if !done && !seg.is_quiz() {
        // A topic counts as done once the quiz right after it is.
        done = segments.get(current + 1).is_some_and(|next| {
            next.is_quiz()
                && (progress.is_completed(&next.seg_name)
                    || links
                        .quest_for(&next.seg_name)
                        .is_some_and(|q| progress.is_completed(q)))
        });
    }
    if !done {
        return current;
    }

    (current + 1..segments.len())
        .find(|&i| {
            unlocked.get(i).copied().unwrap_or(false)
                && !progress.is_completed(&segments[i].seg_name)
        })
        .unwrap_or(current)
}

pub fn is_level_completed(segments: &[Segment], progress: &ProgressDocument) -> bool {
    let mut quizzes = segments.iter().filter(|s| s.is_quiz()).peekable();
    quizzes.peek().is_some() && quizzes.all(|s| progress.is_completed(&s.seg_name))
}

pub fn completion_percentage(segments: &[Segment], progress: &ProgressDocument) -> u8 {
    let quizzes: Vec<_> = segments.iter().filter(|s| s.is_quiz()).collect();
    if quizzes.is_empty() {
        return 0;
    }
    let done = quizzes
        .iter()
        .filter(|s| progress.is_completed(&s.seg_name))
        .count();
    ((done as f64 / quizzes.len() as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::QuestResults;
    use crate::quest::types::{IdentificationQuestion, Quiz};

    fn quiz(name: &str, qids: &[&str]) -> Segment {
        Segment::quiz(
            name,
            name,
            Quiz::Identification(
                qids.iter()
                    .map(|q| IdentificationQuestion {
                        qid: q.to_string(),
                        prompt: "?".into(),
                        acceptable_answers: vec!["yes".into()],
                        explanation: None,
                    })
                    .collect(),
            ),
        )
    }

    fn catalog() -> Vec<Segment> {
        vec![
            Segment::topic("intro-variables", "Variables", "..."),
            quiz("vars-quiz", &["var1", "var2"]),
            Segment::topic("functions-intro", "Functions", "..."),
            quiz("functions-quiz", &["func1"]),
        ]
    }

    fn links() -> QuestLinks {
        QuestLinks::from_pairs([
            ("intro-variables", "quest-variables"),
            ("vars-quiz", "quest-variables"),
            ("functions-intro", "quest-functions"),
            ("functions-quiz", "quest-functions"),
        ])
    }

    #[test]
    fn fresh_progress_opens_only_the_first() {
        let unlocked = compute_unlocked(&catalog(), &ProgressDocument::default(), &links());
        assert_eq!(unlocked, vec![true, false, false, false]);
    }

    #[test]
    fn first_is_open_even_for_empty_links() {
        let unlocked =
            compute_unlocked(&catalog(), &ProgressDocument::default(), &QuestLinks::default());
        assert!(unlocked[0]);
        assert!(compute_unlocked(&[], &ProgressDocument::default(), &links()).is_empty());
    }

    #[test]
    fn completed_predecessor_opens_next() {
        let mut progress = ProgressDocument::default();
        progress.complete_quest("intro-variables", 100, QuestResults::new());
        let unlocked = compute_unlocked(&catalog(), &progress, &links());
        assert_eq!(unlocked, vec![true, true, false, false]);
    }

    #[test]
    fn attempt_keeps_segment_open() {
        let mut progress = ProgressDocument::default();
        progress.record_result("functions-quiz", "func1", false);
        let unlocked = compute_unlocked(&catalog(), &progress, &links());
        assert!(unlocked[3]);
        assert!(!unlocked[2]);
    }

    #[test]
    fn game_completion_opens_linked_segments() {
        let mut progress = ProgressDocument::default();
        progress.complete_quest("quest-functions", 100, QuestResults::new());
        let unlocked = compute_unlocked(&catalog(), &progress, &links());
        assert_eq!(unlocked, vec![true, false, true, true]);
    }

    #[test]
    fn topics_always_advance() {
        let seg = Segment::topic("intro", "Intro", "");
        assert!(can_advance(&seg, &ProgressDocument::default()));
    }

    #[test]
    fn quiz_blocks_until_all_correct() {
        let seg = quiz("vars-quiz", &["var1", "var2"]);
        let mut progress = ProgressDocument::default();
        assert!(!can_advance(&seg, &progress));

        progress.record_result("vars-quiz", "var1", true);
        assert_eq!(
            advance_block_reason(&seg, &progress).as_deref(),
            Some("Answer all questions first")
        );

        progress.record_result("vars-quiz", "var2", false);
        assert!(!can_advance(&seg, &progress));
        assert_eq!(
            advance_block_reason(&seg, &progress).as_deref(),
            Some("Fix 1 incorrect answer to proceed")
        );

        progress.record_result("vars-quiz", "var2", true);
        assert!(can_advance(&seg, &progress));
    }

    #[test]
    fn next_segment_stays_on_unfinished() {
        let segments = catalog();
        let progress = ProgressDocument::default();
        let unlocked = compute_unlocked(&segments, &progress, &links());
        assert_eq!(next_segment(&segments, &progress, &links(), &unlocked, 0), 0);
    }

    #[test]
    fn next_segment_skips_finished_topic_pair() {
        let segments = catalog();
        let mut progress = ProgressDocument::default();
        progress.complete_quest("vars-quiz", 100, QuestResults::new());
        let unlocked = compute_unlocked(&segments, &progress, &links());
        // The topic is done because its quiz is, and the quiz is completed,
        // so the next open unfinished segment is the functions topic.
        assert_eq!(next_segment(&segments, &progress, &links(), &unlocked, 0), 2);
    }

    #[test]
    fn level_completion_counts_quizzes_only() {
        let segments = catalog();
        let mut progress = ProgressDocument::default();
        assert_eq!(completion_percentage(&segments, &progress), 0);
        progress.complete_quest("vars-quiz", 100, QuestResults::new());
        assert_eq!(completion_percentage(&segments, &progress), 50);
        assert!(!is_level_completed(&segments, &progress));
        progress.complete_quest("functions-quiz", 100, QuestResults::new());
        assert!(is_level_completed(&segments, &progress));
        assert!(!is_level_completed(&[], &progress));
    }
}
