mod app;
mod ui;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::io;

use coderquest::config::{config_path_from_env, load_config, Config};
use coderquest::progress::ProgressStore;
use coderquest::quest::{load_catalog, validate_catalog};
use coderquest::Session;

use app::{App, Screen};
use ui::draw_ui;

fn init_logging(cfg: &Config) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cfg.log_file)
        .with_context(|| format!("opening log file {}", cfg.log_file.display()))?;

    // The TUI owns the terminal, so logs go to a file.
    env_logger::Builder::new()
        .parse_filters(&cfg.log_level)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cfg = load_config(config_path_from_env().as_deref())?;
    init_logging(&cfg)?;

    let catalog = load_catalog(&cfg.content_dir)?;
    let problems = validate_catalog(&catalog);
    for p in problems.iter().filter(|p| !p.is_error()) {
        log::warn!("{}", p);
    }
    let errors: Vec<_> = problems.iter().filter(|p| p.is_error()).collect();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{}", e);
        }
        anyhow::bail!(
            "{} problem(s) in content under {}",
            errors.len(),
            cfg.content_dir.display()
        );
    }

    let session = Session::open(ProgressStore::new(&cfg.save_path), catalog);
    log::info!("save file: {}", cfg.save_path.display());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session);
    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    result?;

    let progress = app.session.progress();
    println!(
        "\nSee you next time! {} quests done, average score {}%.\n",
        progress.total_quests_completed, progress.total_score
    );
    Ok(())
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| draw_ui(f, app))?;
        if app.should_quit {
            return Ok(());
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.screen {
            Screen::TitleScreen => {
                match key.code {
                    KeyCode::Up | KeyCode::Char('k') => app.menu_up(),
                    KeyCode::Down | KeyCode::Char('j') => app.menu_down(),
                    KeyCode::Enter => app.menu_confirm(),
                    KeyCode::Char('q') => return Ok(()),
                    _ => {}
                }
                continue;
            }
            Screen::LevelComplete => {
                match key.code {
                    KeyCode::Enter => app.continue_after_level(),
                    KeyCode::Esc => app.open_menu(),
                    _ => {}
                }
                continue;
            }
            Screen::Dialog => {
                match key.code {
                    KeyCode::Enter => app.close_dialog(),
                    KeyCode::Esc => app.open_menu(),
                    _ => {}
                }
                continue;
            }
            Screen::QuestBoard if !app.command_mode => {
                match key.code {
                    KeyCode::Up | KeyCode::Char('k') => app.board_up(),
                    KeyCode::Down | KeyCode::Char('j') => app.board_down(),
                    KeyCode::Enter => app.talk(),
                    KeyCode::Esc => app.open_menu(),
                    KeyCode::Char(':') => {
                        app.command_mode = true;
                        app.command_buffer.clear();
                    }
                    _ => {}
                }
                continue;
            }
            Screen::QuestBoard | Screen::Lessons | Screen::GameQuiz => {}
        }

        // Command mode handling (vim-style :q)
        if app.command_mode {
            match key.code {
                KeyCode::Esc => {
                    app.command_mode = false;
                    app.command_buffer.clear();
                }
                KeyCode::Enter => app.run_command(),
                KeyCode::Backspace => {
                    app.command_buffer.pop();
                    if app.command_buffer.is_empty() {
                        app.command_mode = false;
                    }
                }
                KeyCode::Char(c) => app.command_buffer.push(c),
                _ => {}
            }
            continue;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Char(':'), KeyModifiers::NONE) => {
                app.command_mode = true;
                app.command_buffer.clear();
            }
            (KeyCode::Esc, _) => app.open_menu(),
            (KeyCode::PageDown, _) => {
                let lines = app.message.lines().count() as u16;
                if app.message_scroll < lines.saturating_sub(5) {
                    app.message_scroll += 3;
                }
            }
            (KeyCode::PageUp, _) => {
                app.message_scroll = app.message_scroll.saturating_sub(3);
            }
            (KeyCode::Char('n'), KeyModifiers::CONTROL) if matches!(app.screen, Screen::Lessons) => {
                app.next_segment();
            }
            (KeyCode::Char('p'), KeyModifiers::CONTROL) if matches!(app.screen, Screen::Lessons) => {
                app.prev_segment();
            }
            (KeyCode::Enter, _) => match app.screen {
                Screen::GameQuiz => app.quest_enter(),
                _ => app.submit(),
            },
            _ => {
                app.answer_box.input(key);
            }
        }
    }
}
