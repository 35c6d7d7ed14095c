use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use coderquest::quest::{QuestionRef, Segment, SegmentKind};

use crate::app::{App, MenuOption, Screen};

pub fn draw_ui(f: &mut Frame, app: &App) {
    if matches!(app.screen, Screen::TitleScreen) {
        draw_title_screen(f, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(10),
        ])
        .split(f.area());

    draw_status(f, app, chunks[0]);

    match app.screen {
        Screen::Lessons => draw_lessons(f, app, chunks[1]),
        Screen::QuestBoard => draw_board(f, app, chunks[1]),
        Screen::Dialog => draw_dialog(f, app, chunks[1]),
        Screen::GameQuiz => draw_game_quiz(f, app, chunks[1]),
        Screen::LevelComplete | Screen::TitleScreen => {}
    }

    draw_messages(f, app, chunks[2]);
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let session = &app.session;
    let mode = match app.screen {
        Screen::Lessons => " LESSONS ",
        _ => " QUEST BOARD ",
    };
    let mut spans = vec![
        Span::styled(
            " CODER QUEST ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ),
        Span::raw("  "),
        Span::styled(mode, Style::default().fg(Color::White).bg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled(
            format!(" Level {} ", session.level()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" Done: {}% ", session.completion_percentage()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" XP: {} ", session.game().player_stats.xp),
            Style::default().fg(Color::Yellow),
        ),
    ];
    if session.is_paused() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            " PAUSED ",
            Style::default().fg(Color::White).bg(Color::Red),
        ));
    }
    let status = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(status, area);
}

fn draw_lessons(f: &mut Frame, app: &App, area: Rect) {
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(area);

    // Segment list
    let session = &app.session;
    let lines: Vec<Line> = session
        .segments()
        .iter()
        .enumerate()
        .map(|(i, seg)| {
            let marker = if session.progress().is_completed(&seg.seg_name) {
                "[x]"
            } else if session.is_unlocked(i) {
                "[ ]"
            } else {
                "[#]"
            };
            let style = if i == session.current_index() {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else if session.is_unlocked(i) {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Line::from(Span::styled(
                format!("{} {:>2}. {}", marker, i + 1, seg.title),
                style,
            ))
        })
        .collect();
    let list = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Lessons "))
        .wrap(Wrap { trim: true });
    f.render_widget(list, main_chunks[0]);

    match session.current_segment() {
        Some(seg) => draw_segment(f, app, seg, app.question_index, main_chunks[1]),
        None => {
            let empty = Paragraph::new("No lessons on this level yet. Visit the quest board!")
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(empty, main_chunks[1]);
        }
    }
}

fn draw_segment(f: &mut Frame, app: &App, seg: &Segment, question_index: usize, area: Rect) {
    match &seg.kind {
        SegmentKind::Topic { content } => {
            let body = Paragraph::new(format!("{}\n\n[ Press ENTER to continue ]", content.trim()))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(format!(" {} ", seg.title)),
                )
                .wrap(Wrap { trim: false })
                .style(Style::default().fg(Color::White));
            f.render_widget(body, area);
        }
        SegmentKind::Quiz(quiz) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(5), Constraint::Length(3)])
                .split(area);

            let title = format!(
                " {} - Question {}/{} ",
                seg.title,
                (question_index + 1).min(quiz.len()),
                quiz.len()
            );
            let text = quiz
                .question(question_index)
                .map(|q| question_text(&q))
                .unwrap_or_default();
            let question = Paragraph::new(text)
                .block(Block::default().borders(Borders::ALL).title(title))
                .wrap(Wrap { trim: false })
                .style(Style::default().fg(Color::White));
            f.render_widget(question, chunks[0]);
            f.render_widget(&app.answer_box, chunks[1]);
        }
    }
}

fn question_text(q: &QuestionRef<'_>) -> String {
    let mut text = q.prompt();
    if let Some(choices) = q.choices() {
        text.push('\n');
        for (i, choice) in choices.iter().enumerate() {
            text.push_str(&format!("\n  {}. {}", i + 1, choice));
        }
    } else if q.blank_count() > 1 {
        text.push_str(&format!(
            "\n\n({} blanks, separate answers with commas)",
            q.blank_count()
        ));
    }
    text
}

fn draw_board(f: &mut Frame, app: &App, area: Rect) {
    let session = &app.session;
    let lines: Vec<Line> = session
        .npcs()
        .iter()
        .enumerate()
        .map(|(i, npc)| {
            let available = session.is_npc_available(npc);
            let status = if session.game().is_quest_completed(&npc.quest_id) {
                "done"
            } else if session.game().is_quest_active(&npc.quest_id) {
                "active"
            } else if available {
                "new"
            } else {
                "locked"
            };
            let style = if i == app.board_selection {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else if available {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Line::from(Span::styled(
                format!(" {:<22} {:<28} [{}]", npc.name, npc.quest_id, status),
                style,
            ))
        })
        .collect();

    let board = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Quest Board [↑/↓ select | ENTER talk | ESC menu] "),
    );
    f.render_widget(board, area);
}

fn draw_dialog(f: &mut Frame, app: &App, area: Rect) {
    let (name, text) = app
        .dialog
        .as_ref()
        .map(|(n, t)| (n.as_str(), t.as_str()))
        .unwrap_or(("", ""));
    let dialog = Paragraph::new(format!("{}\n\n[ Press ENTER to accept the quest ]", text))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", name)),
        )
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White));
    f.render_widget(dialog, area);
}

fn draw_game_quiz(f: &mut Frame, app: &App, area: Rect) {
    let Some(run) = app.quest_run.as_ref() else {
        return;
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(5)])
        .split(area);

    let header = Paragraph::new(format!(
        " {}  ({}/{})",
        run.title,
        (run.step + 1).min(run.segments.len()),
        run.segments.len()
    ))
    .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, chunks[0]);

    if let Some(seg) = run.segment() {
        draw_segment(f, app, seg, run.question_index, chunks[1]);
    }
}

fn draw_messages(f: &mut Frame, app: &App, area: Rect) {
    let message_content = if app.command_mode {
        format!(":{}", app.command_buffer)
    } else {
        app.message.clone()
    };
    let (message_style, message_title) = if app.command_mode {
        (Style::default().fg(Color::White).bg(Color::DarkGray), " Command ")
    } else {
        match app.screen {
            Screen::LevelComplete => (
                Style::default().fg(Color::Black).bg(Color::Yellow),
                " LEVEL COMPLETE! ",
            ),
            _ => (app.message_style, " Mentor Notes "),
        }
    };
    let scroll_indicator = if app.message.lines().count() > 8 {
        let scroll_keys = if cfg!(target_os = "macos") {
            "Fn+Up/Down"
        } else {
            "PgUp/PgDn"
        };
        format!("{} [{} to scroll]", message_title, scroll_keys)
    } else {
        message_title.to_string()
    };
    let message = Paragraph::new(message_content)
        .block(Block::default().borders(Borders::ALL).title(scroll_indicator))
        .wrap(Wrap { trim: false })
        .style(message_style)
        .scroll((app.message_scroll, 0));
    f.render_widget(message, area);
}

fn draw_title_screen(f: &mut Frame, app: &App) {
    let area = f.area();

    let title_art = r#"
    ╔═══════════════════════════════════════════════════════════╗
    ║                                                           ║
    ║      ██████╗ ██████╗ ██████╗ ███████╗██████╗              ║
    ║     ██╔════╝██╔═══██╗██╔══██╗██╔════╝██╔══██╗             ║
    ║     ██║     ██║   ██║██║  ██║█████╗  ██████╔╝             ║
    ║     ██║     ██║   ██║██║  ██║██╔══╝  ██╔══██╗             ║
    ║     ╚██████╗╚██████╔╝██████╔╝███████╗██║  ██║             ║
    ║      ╚═════╝ ╚═════╝ ╚═════╝ ╚══════╝╚═╝  ╚═╝             ║
    ║                                                           ║
    ║            ██████╗ ██╗   ██╗███████╗███████╗████████╗     ║
    ║           ██╔═══██╗██║   ██║██╔════╝██╔════╝╚══██╔══╝     ║
    ║           ██║   ██║██║   ██║█████╗  ███████╗   ██║        ║
    ║           ██║▄▄ ██║██║   ██║██╔══╝  ╚════██║   ██║        ║
    ║           ╚██████╔╝╚██████╔╝███████╗███████║   ██║        ║
    ║            ╚══▀▀═╝  ╚═════╝ ╚══════╝╚══════╝   ╚═╝        ║
    ║                                                           ║
    ║              "Learn to code, one quest at a time"         ║
    ║                                                           ║
    ╚═══════════════════════════════════════════════════════════╝
"#;

    let mut constraints = vec![Constraint::Length(22)];
    constraints.extend(MenuOption::ALL.iter().map(|_| Constraint::Length(2)));
    constraints.push(Constraint::Length(2));
    constraints.push(Constraint::Min(1));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let title = Paragraph::new(title_art)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    for (i, option) in MenuOption::ALL.iter().enumerate() {
        let style = if *option == app.menu_selection {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let item = Paragraph::new(option.label())
            .style(style)
            .alignment(Alignment::Center);
        f.render_widget(item, chunks[i + 1]);
    }

    let n = MenuOption::ALL.len();
    let note = Paragraph::new(app.message.as_str())
        .style(app.message_style)
        .alignment(Alignment::Center);
    f.render_widget(note, chunks[n + 1]);

    let help = Paragraph::new("↑/↓ to select  •  ENTER to confirm  •  q to quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[n + 2]);
}
