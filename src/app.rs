use std::cell::RefCell;
use std::rc::Rc;

use ratatui::{
    style::{Color, Modifier, Style},
    widgets::{Block, Borders},
};
use tui_textarea::TextArea;

use coderquest::progress::{Mode, QuestResults};
use coderquest::quest::{grader, normalize, Answer, QuestionRef, Segment};
use coderquest::sync;
use coderquest::{EventKind, GameEvent, Session};

pub enum Screen {
    TitleScreen,
    Lessons,
    QuestBoard,
    Dialog,
    GameQuiz,
    LevelComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    Lessons,
    QuestBoard,
    Reset,
    Quit,
}

impl MenuOption {
    pub const ALL: [MenuOption; 4] = [
        MenuOption::Lessons,
        MenuOption::QuestBoard,
        MenuOption::Reset,
        MenuOption::Quit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuOption::Lessons => "  LESSONS  ",
            MenuOption::QuestBoard => "  QUEST BOARD  ",
            MenuOption::Reset => "  RESET PROGRESS  ",
            MenuOption::Quit => "  QUIT  ",
        }
    }

    fn next(&self) -> Self {
        match self {
            MenuOption::Lessons => MenuOption::QuestBoard,
            MenuOption::QuestBoard => MenuOption::Reset,
            MenuOption::Reset => MenuOption::Quit,
            MenuOption::Quit => MenuOption::Lessons,
        }
    }

    fn prev(&self) -> Self {
        match self {
            MenuOption::Lessons => MenuOption::Quit,
            MenuOption::QuestBoard => MenuOption::Lessons,
            MenuOption::Reset => MenuOption::QuestBoard,
            MenuOption::Quit => MenuOption::Reset,
        }
    }
}

/// A game-mode quest being played from an NPC.
pub struct QuestRun {
    pub quest_id: String,
    pub title: String,
    pub segments: Vec<Segment>,
    pub step: usize,
    pub question_index: usize,
    pub results: QuestResults,
}

impl QuestRun {
    pub fn segment(&self) -> Option<&Segment> {
        self.segments.get(self.step)
    }

    fn total_questions(&self) -> usize {
        self.segments
            .iter()
            .filter_map(|s| s.as_quiz())
            .map(|q| q.len())
            .sum()
    }
}

/// Owned copy of what a submission needs, so the session can be mutated.
struct Submission {
    qid: String,
    answer: Answer,
    expected: String,
    explanation: Option<String>,
    total: usize,
}

pub struct App<'a> {
    pub session: Session,
    pub screen: Screen,
    pub menu_selection: MenuOption,
    pub answer_box: TextArea<'a>,
    pub question_index: usize,
    pub message: String,
    pub message_style: Style,
    pub message_scroll: u16,
    pub command_mode: bool,
    pub command_buffer: String,
    pub board_selection: usize,
    pub dialog: Option<(String, String)>,
    pub quest_run: Option<QuestRun>,
    pub should_quit: bool,
    confirm_reset: bool,
    inbox: Rc<RefCell<Vec<GameEvent>>>,
}

impl<'a> App<'a> {
    pub fn new(mut session: Session) -> Self {
        let inbox = Rc::new(RefCell::new(Vec::new()));
        for kind in [
            EventKind::ShowDialog,
            EventKind::ShowQuest,
            EventKind::QuestCompleted,
            EventKind::LevelCompleted,
            EventKind::TransitionToLevel,
        ] {
            let sink = Rc::clone(&inbox);
            session
                .events_mut()
                .subscribe(kind, move |e| sink.borrow_mut().push(e.clone()));
        }

        let menu_selection = match sync::starting_mode(session.progress()) {
            Mode::Full => MenuOption::QuestBoard,
            Mode::UiOnly | Mode::Menu => MenuOption::Lessons,
        };

        App {
            session,
            screen: Screen::TitleScreen,
            menu_selection,
            answer_box: answer_box(),
            question_index: 0,
            message: String::from("Pick a lesson or visit the quest board."),
            message_style: Style::default().fg(Color::Yellow),
            message_scroll: 0,
            command_mode: false,
            command_buffer: String::new(),
            board_selection: 0,
            dialog: None,
            quest_run: None,
            should_quit: false,
            confirm_reset: false,
            inbox,
        }
    }

    fn set_message(&mut self, text: impl Into<String>, style: Style) {
        self.message = text.into();
        self.message_style = style;
        self.message_scroll = 0;
    }

    fn system_error(&mut self, e: anyhow::Error) {
        log::error!("{:#}", e);
        self.set_message(
            format!("System error: {:#}", e),
            Style::default().fg(Color::Magenta),
        );
    }

    pub fn clear_answer(&mut self) {
        self.answer_box = answer_box();
    }

    // Title screen

    pub fn menu_down(&mut self) {
        self.menu_selection = self.menu_selection.next();
        self.confirm_reset = false;
    }

    pub fn menu_up(&mut self) {
        self.menu_selection = self.menu_selection.prev();
        self.confirm_reset = false;
    }

    pub fn menu_confirm(&mut self) {
        match self.menu_selection {
            MenuOption::Lessons => self.start_lessons(),
            MenuOption::QuestBoard => self.start_board(),
            MenuOption::Reset => self.reset_progress(),
            MenuOption::Quit => self.should_quit = true,
        }
    }

    pub fn open_menu(&mut self) {
        if matches!(self.screen, Screen::QuestBoard | Screen::Dialog | Screen::GameQuiz) {
            self.session.pause();
        }
        self.screen = Screen::TitleScreen;
        self.confirm_reset = false;
    }

    /// ENTER on the level-complete screen. Lessons stay on the finished
    /// level so its remaining topics can be read; the board moves on.
    pub fn continue_after_level(&mut self) {
        let level = self.session.level();
        if self.session.progress().last_mode == Mode::UiOnly {
            self.screen = Screen::Lessons;
            self.on_segment_changed();
            self.set_message(
                format!(
                    "Level {} is done! Finish the remaining lessons, then type :level to move on.",
                    level
                ),
                Style::default().fg(Color::Cyan),
            );
            return;
        }
        let target = self.session.next_level();
        match self.session.transition_to_level(target) {
            Ok(()) => {
                self.screen = Screen::QuestBoard;
                self.session.refresh_npcs();
                self.drain_events();
            }
            Err(e) => self.system_error(e),
        }
    }

    pub fn start_lessons(&mut self) {
        match self.session.enter_mode(Mode::UiOnly) {
            Ok(t) => {
                self.screen = Screen::Lessons;
                self.on_segment_changed();
                self.set_message(t.message, Style::default().fg(Color::Yellow));
            }
            Err(e) => self.system_error(e),
        }
    }

    pub fn start_board(&mut self) {
        match self.session.enter_mode(Mode::Full) {
            Ok(t) => {
                self.session.resume();
                self.screen = Screen::QuestBoard;
                self.board_selection = 0;
                self.set_message(t.message, Style::default().fg(Color::Yellow));
            }
            Err(e) => self.system_error(e),
        }
    }

    fn reset_progress(&mut self) {
        if !self.confirm_reset {
            self.confirm_reset = true;
            self.set_message(
                "Press ENTER again to erase all progress.",
                Style::default().fg(Color::Red),
            );
            return;
        }
        self.confirm_reset = false;
        match self.session.reset() {
            Ok(()) => {
                self.quest_run = None;
                self.question_index = 0;
                self.set_message("Progress erased. A fresh start!", Style::default().fg(Color::Cyan));
            }
            Err(e) => self.system_error(e),
        }
    }

    // Lessons

    fn on_segment_changed(&mut self) {
        self.question_index = self
            .session
            .current_segment()
            .map(|seg| first_open_question(seg, &self.session))
            .unwrap_or(0);
        self.clear_answer();
    }

    pub fn select_segment(&mut self, index: usize) {
        if self.session.select_segment(index) {
            self.on_segment_changed();
            let title = self
                .session
                .current_segment()
                .map(|s| s.title.clone())
                .unwrap_or_default();
            self.set_message(title, Style::default().fg(Color::White));
        } else {
            self.set_message(
                "That lesson is still locked. Finish the one before it.",
                Style::default().fg(Color::DarkGray),
            );
        }
    }

    pub fn next_segment(&mut self) {
        let is_topic = self
            .session
            .current_segment()
            .is_some_and(|s| !s.is_quiz());
        if is_topic {
            self.advance();
        } else {
            self.select_segment(self.session.current_index() + 1);
        }
    }

    pub fn prev_segment(&mut self) {
        if let Some(prev) = self.session.current_index().checked_sub(1) {
            self.select_segment(prev);
        }
    }

    fn advance(&mut self) {
        match self.session.advance() {
            Ok(true) => {
                self.on_segment_changed();
                self.drain_events();
            }
            Ok(false) => {
                let reason = self
                    .session
                    .block_reason()
                    .unwrap_or_else(|| "You can't move on yet.".to_string());
                self.set_message(reason, Style::default().fg(Color::Red));
            }
            Err(e) => self.system_error(e),
        }
    }

    fn lesson_submission(&self) -> Option<Submission> {
        let quiz = self.session.current_segment()?.as_quiz()?;
        let question = quiz.question(self.question_index)?;
        let input = self.answer_box.lines().join(" ");
        Some(Submission {
            qid: question.qid().to_string(),
            answer: parse_answer(&question, &input),
            expected: question.expected_display(),
            explanation: question.explanation().map(str::to_string),
            total: quiz.len(),
        })
    }

    /// ENTER in lesson mode: finish reading a topic or answer a question.
    pub fn submit(&mut self) {
        let Some(seg) = self.session.current_segment() else {
            self.set_message(
                "No lessons on this level yet. Visit the quest board!",
                Style::default().fg(Color::DarkGray),
            );
            return;
        };
        if !seg.is_quiz() {
            self.advance();
            return;
        }
        if self.answer_box.lines().join("").trim().is_empty() {
            self.set_message("Type an answer first.", Style::default().fg(Color::DarkGray));
            return;
        }
        let Some(sub) = self.lesson_submission() else {
            return;
        };

        let correct = match self.session.submit_answer(&sub.qid, &sub.answer) {
            Ok(correct) => correct,
            Err(e) => return self.system_error(e),
        };
        self.clear_answer();
        self.set_message(
            feedback(correct, &sub.expected, sub.explanation.as_deref()),
            feedback_style(correct),
        );

        if self.question_index + 1 < sub.total {
            self.question_index += 1;
            return;
        }
        self.wrap_up_quiz();
    }

    fn wrap_up_quiz(&mut self) {
        if let Some(seg) = self.session.current_segment() {
            self.question_index = first_open_question(seg, &self.session);
        }
        if self.session.block_reason().as_deref() == Some("Answer all questions first") {
            return;
        }

        let score = match self.session.finish_quiz() {
            Ok(score) => score,
            Err(e) => return self.system_error(e),
        };
        match self.session.block_reason() {
            None => {
                self.advance();
                if matches!(self.screen, Screen::Lessons) {
                    self.set_message(
                        format!("*** QUIZ CLEARED! ***  Score: {}%", score),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    );
                }
            }
            Some(reason) => {
                self.set_message(
                    format!("Score: {}%. {}", score, reason),
                    Style::default().fg(Color::Red),
                );
            }
        }
    }

    // Quest board

    pub fn board_down(&mut self) {
        let count = self.session.npcs().len();
        if count > 0 {
            self.board_selection = (self.board_selection + 1) % count;
        }
    }

    pub fn board_up(&mut self) {
        let count = self.session.npcs().len();
        if count > 0 {
            self.board_selection = (self.board_selection + count - 1) % count;
        }
    }

    pub fn talk(&mut self) {
        let Some(npc_id) = self
            .session
            .npcs()
            .get(self.board_selection)
            .map(|n| n.id.clone())
        else {
            return;
        };
        match self.session.talk_to(&npc_id) {
            Ok(true) => self.drain_events(),
            Ok(false) => self.set_message(
                "They aren't ready to talk to you yet. Finish the quests before theirs.",
                Style::default().fg(Color::DarkGray),
            ),
            Err(e) => self.system_error(e),
        }
    }

    pub fn close_dialog(&mut self) {
        self.dialog = None;
        let has_lessons = self
            .quest_run
            .as_ref()
            .is_some_and(|run| !run.segments.is_empty());
        if has_lessons {
            self.screen = Screen::GameQuiz;
            self.clear_answer();
        } else {
            self.quest_run = None;
            self.screen = Screen::QuestBoard;
            self.set_message(
                "The lessons for this quest are still being written.",
                Style::default().fg(Color::DarkGray),
            );
        }
    }

    fn quest_submission(&self) -> Option<Submission> {
        let run = self.quest_run.as_ref()?;
        let quiz = run.segment()?.as_quiz()?;
        let question = quiz.question(run.question_index)?;
        let input = self.answer_box.lines().join(" ");
        Some(Submission {
            qid: question.qid().to_string(),
            answer: parse_answer(&question, &input),
            expected: question.expected_display(),
            explanation: question.explanation().map(str::to_string),
            total: quiz.len(),
        })
    }

    /// ENTER while playing an NPC's quest.
    pub fn quest_enter(&mut self) {
        let Some(run) = self.quest_run.as_ref() else {
            self.screen = Screen::QuestBoard;
            return;
        };
        let on_quiz = run.segment().is_some_and(|s| s.is_quiz());

        if on_quiz {
            if self.answer_box.lines().join("").trim().is_empty() {
                self.set_message("Type an answer first.", Style::default().fg(Color::DarkGray));
                return;
            }
            let Some(sub) = self.quest_submission() else {
                return;
            };
            let correct = self
                .quest_run
                .as_ref()
                .and_then(|run| run.segment())
                .and_then(|s| s.as_quiz())
                .and_then(|quiz| quiz.grade(&sub.qid, &sub.answer))
                .unwrap_or(false);
            self.clear_answer();
            self.set_message(
                feedback(correct, &sub.expected, sub.explanation.as_deref()),
                feedback_style(correct),
            );

            let Some(run) = self.quest_run.as_mut() else {
                return;
            };
            run.results.insert(sub.qid, correct);
            run.question_index += 1;
            if run.question_index < sub.total {
                return;
            }
            run.question_index = 0;
            run.step += 1;
        } else if let Some(run) = self.quest_run.as_mut() {
            run.step += 1;
        }

        let finished = self
            .quest_run
            .as_ref()
            .is_some_and(|run| run.step >= run.segments.len());
        if finished {
            self.finish_quest_run();
        }
    }

    fn finish_quest_run(&mut self) {
        let Some(run) = self.quest_run.take() else {
            return;
        };
        let total = run.total_questions();
        let score = if total == 0 {
            100
        } else {
            grader::score(&run.results, total)
        };
        self.screen = Screen::QuestBoard;
        let xp_before = self.session.game().player_stats.xp;
        match self
            .session
            .complete_game_quest(&run.quest_id, score, run.results)
        {
            Ok(_) => {
                let gained = self.session.game().player_stats.xp - xp_before;
                self.set_message(
                    format!(
                        "*** QUEST COMPLETE! ***  {}  Score: {}%  +{} xp",
                        run.title, score, gained
                    ),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                );
                let changes = self.session.refresh_npcs();
                let newly: Vec<_> = changes
                    .iter()
                    .filter(|c| c.visible)
                    .map(|c| c.npc_id.as_str())
                    .collect();
                if !newly.is_empty() {
                    self.message
                        .push_str(&format!("\n\nNew visitors: {}", newly.join(", ")));
                }
                self.drain_events();
            }
            Err(e) => self.system_error(e),
        }
    }

    // Events

    fn drain_events(&mut self) {
        let events: Vec<GameEvent> = self.inbox.borrow_mut().drain(..).collect();
        for event in events {
            match event {
                GameEvent::ShowDialog { name, text, .. } => {
                    self.dialog = Some((name, text));
                    self.screen = Screen::Dialog;
                }
                GameEvent::ShowQuest { quest_id } => {
                    let title = self
                        .session
                        .catalog()
                        .game_quest(&quest_id)
                        .map(|q| q.title.clone())
                        .unwrap_or_else(|| quest_id.clone());
                    let segments = self
                        .session
                        .quest_segments(&quest_id)
                        .into_iter()
                        .cloned()
                        .collect();
                    self.quest_run = Some(QuestRun {
                        quest_id,
                        title,
                        segments,
                        step: 0,
                        question_index: 0,
                        results: QuestResults::new(),
                    });
                }
                GameEvent::LevelCompleted { level } => {
                    self.screen = Screen::LevelComplete;
                    self.set_message(
                        level_complete_summary(&self.session, level),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    );
                }
                GameEvent::TransitionToLevel { target_level } => {
                    self.board_selection = 0;
                    self.set_message(
                        format!("Welcome to Level {}!", target_level),
                        Style::default().fg(Color::Yellow),
                    );
                }
                GameEvent::QuestCompleted { quest_id, score, .. } => {
                    log::debug!("ui saw completion of '{}' ({}%)", quest_id, score);
                }
                _ => {}
            }
        }
    }

    // Commands

    pub fn run_command(&mut self) {
        let buffer = std::mem::take(&mut self.command_buffer);
        self.command_mode = false;
        let mut parts = buffer.split_whitespace();
        let Some(cmd) = parts.next() else {
            return;
        };

        match cmd {
            "q" | "quit" => self.should_quit = true,
            "w" => self.set_message(
                "Progress is saved after every answer.",
                Style::default().fg(Color::Yellow),
            ),
            "menu" => self.open_menu(),
            "lessons" => self.start_lessons(),
            "board" => self.start_board(),
            "next" | "n" => self.next_segment(),
            "prev" | "p" => self.prev_segment(),
            "go" => match parts.next().and_then(|n| n.parse::<usize>().ok()) {
                Some(n) if n >= 1 => self.select_segment(n - 1),
                _ => self.set_message("Usage: :go N", Style::default().fg(Color::Red)),
            },
            "retry" => {
                self.question_index = 0;
                self.clear_answer();
                self.set_message("Back to the first question.", Style::default().fg(Color::Cyan));
            }
            "level" => {
                let target = self.session.next_level();
                match self.session.transition_to_level(target) {
                    Ok(()) => {
                        self.on_segment_changed();
                        self.drain_events();
                    }
                    Err(e) => self.system_error(e),
                }
            }
            "reload" => {
                self.session.reload();
                self.on_segment_changed();
                self.set_message("Progress reloaded.", Style::default().fg(Color::Cyan));
            }
            "export" | "import" => {
                let Some(path) = parts.next().map(std::path::PathBuf::from) else {
                    self.set_message(
                        format!("Usage: :{} FILE", cmd),
                        Style::default().fg(Color::Red),
                    );
                    return;
                };
                let result = if cmd == "export" {
                    self.session.export_progress(&path)
                } else {
                    self.session.import_progress(&path)
                };
                match result {
                    Ok(()) => {
                        if cmd == "import" {
                            self.on_segment_changed();
                        }
                        self.set_message(
                            format!("Progress {}ed: {}", cmd, path.display()),
                            Style::default().fg(Color::Cyan),
                        );
                    }
                    Err(e) => self.system_error(e),
                }
            }
            "help" => self.set_message(
                "Commands: :q (quit), :menu, :lessons, :board, :next, :prev, :go N, \
                 :retry, :level (next level), :reload, :export FILE, :import FILE",
                Style::default().fg(Color::Cyan),
            ),
            other => self.set_message(
                format!("Unknown command: {}", other),
                Style::default().fg(Color::Red),
            ),
        }
    }
}

fn answer_box<'a>() -> TextArea<'a> {
    let mut editor = TextArea::default();
    editor.set_block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Your Answer [ENTER: Submit | :help] "),
    );
    editor.set_placeholder_text("type here, or a choice number");
    editor.set_cursor_line_style(Style::default());
    editor
}

fn feedback(correct: bool, expected: &str, explanation: Option<&str>) -> String {
    let mut text = if correct {
        "Correct!".to_string()
    } else {
        format!("Not quite. Expected: {}", expected)
    };
    if let Some(why) = explanation {
        text.push_str("\n\n");
        text.push_str(why);
    }
    text
}

fn feedback_style(correct: bool) -> Style {
    if correct {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    }
}

/// First question with no answer or a wrong one.
fn first_open_question(seg: &Segment, session: &Session) -> usize {
    let Some(quiz) = seg.as_quiz() else {
        return 0;
    };
    let results = session.progress().results(&seg.seg_name);
    quiz.qids()
        .iter()
        .position(|qid| results.and_then(|r| r.get(*qid)) != Some(&true))
        .unwrap_or(0)
}

/// Turns typed input into an answer for `question`. Choice questions take a
/// 1-based number or the choice text; multi-blank questions take a
/// comma-separated list.
pub fn parse_answer(question: &QuestionRef<'_>, input: &str) -> Answer {
    let input = input.trim();
    if let Some(choices) = question.choices() {
        if let Ok(n) = input.parse::<usize>() {
            if n >= 1 {
                return Answer::Choice(n - 1);
            }
        }
        let typed = normalize(input);
        if let Some(i) = choices.iter().position(|c| normalize(c) == typed) {
            return Answer::Choice(i);
        }
        return Answer::Text(input.to_string());
    }
    if question.blank_count() > 1 {
        return Answer::Blanks(input.split(',').map(|b| b.trim().to_string()).collect());
    }
    Answer::Text(input.to_string())
}

fn level_complete_summary(session: &Session, level: u32) -> String {
    let progress = session.progress();
    format!(
        "=== LEVEL {} COMPLETE! ===\n\n\
        ╔══════════════════════════╗\n\
        ║  LEVEL STATS             ║\n\
        ╠══════════════════════════╣\n\
        ║  Quests completed: {:>4}  ║\n\
        ║  Average score:    {:>4}  ║\n\
        ║  Player xp:        {:>4}  ║\n\
        ╚══════════════════════════╝\n\n\
        Press ENTER to continue...",
        level,
        progress.total_quests_completed,
        progress.total_score,
        session.game().player_stats.xp,
    )
}
