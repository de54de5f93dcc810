use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};
use tracing::info;

use learnloop::app::{App, AppScreen, select_provider};
use learnloop::config::Config;
use learnloop::event::{AppEvent, EventHandler};
use learnloop::logging;
use learnloop::session::cycle::{LearningSession, ModeController};
use learnloop::session::reflection::MIN_REFLECTION_CHARS;
use learnloop::session::state::Mode;
use learnloop::ui::components::completion::Completion;
use learnloop::ui::components::explanation_slide::ExplanationSlide;
use learnloop::ui::components::home::Home;
use learnloop::ui::components::progress_bar::ProgressBar;
use learnloop::ui::components::question_card::{QuestionCard, answer_hint};
use learnloop::ui::layout::{SessionLayout, centered_rect, pack_hint_lines};
use learnloop::ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "learnloop",
    version,
    about = "Terminal tutor: diagnose, explain, practice, verify, reflect"
)]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Start a session on this topic immediately")]
    topic: Option<String>,

    #[arg(long, help = "Use bundled sample content instead of the API")]
    offline: bool,

    #[arg(short, long, help = "Override the configured model")]
    model: Option<String>,

    #[arg(long, help = "Write the default config file and exit")]
    init_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().context("failed to read config")?;
    if cli.init_config {
        let path = config.save()?;
        println!("wrote {}", path.display());
        return Ok(());
    }
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(theme_name) = cli.theme {
        if Theme::load(&theme_name).is_some() {
            config.theme = theme_name;
        } else {
            eprintln!(
                "unknown theme '{theme_name}', available: {}",
                Theme::available_themes().join(", ")
            );
        }
    }

    if let Err(err) = logging::init(&config.log_level) {
        eprintln!("logging disabled: {err:#}");
    }

    let events = EventHandler::new(Duration::from_millis(100));
    let (provider, notice) = select_provider(&config, cli.offline);

    let mut app = App::new(config, provider, events.sender());
    info!(provider = app.provider_name(), model = %app.config.model, "starting");
    app.notice = notice;
    if let Some(topic) = cli.topic {
        app.start_session(&topic);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Content(reply) => app.on_content(reply),
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
        }
        // Deadlines are checked on every event, not only on ticks.
        app.on_tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

/// `1`-`9` or `a`-`i` select option 0-8.
fn option_index(code: KeyCode) -> Option<usize> {
    match code {
        KeyCode::Char(ch @ '1'..='9') => Some(ch as usize - '1' as usize),
        KeyCode::Char(ch @ 'a'..='i') => Some(ch as usize - 'a' as usize),
        _ => None,
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Home => handle_home_key(app, key),
        AppScreen::Session => handle_session_key(app, key),
    }
}

fn handle_home_key(app: &mut App, key: KeyEvent) {
    use learnloop::ui::line_input::InputResult;

    match app.topic_input.handle(key) {
        InputResult::Cancel => app.should_quit = true,
        InputResult::Submit => {
            let query = app.topic_input.value().to_string();
            if app.start_session(&query) {
                app.topic_input.clear();
            }
        }
        InputResult::Continue => {}
    }
}

fn handle_session_key(app: &mut App, key: KeyEvent) {
    let Some(session) = app.session.as_ref() else {
        app.exit_session();
        return;
    };
    let mode = session.mode();
    let failed = session.controller().load_error().is_some();

    if mode == Mode::Reflection {
        app.reflection_key(key);
        return;
    }
    if key.code == KeyCode::Esc {
        app.exit_session();
        return;
    }
    if failed {
        if key.code == KeyCode::Char('r') {
            app.retry();
        }
        return;
    }

    match mode {
        Mode::Diagnostic | Mode::Verification => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => app.proceed(),
            code => {
                if let Some(index) = option_index(code) {
                    app.answer(index);
                }
            }
        },
        Mode::Practice => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => app.proceed(),
            KeyCode::Char('v') => app.request_verification(),
            code => {
                if let Some(index) = option_index(code) {
                    app.answer(index);
                }
            }
        },
        Mode::Explanation => match key.code {
            KeyCode::Left | KeyCode::Char('h') => app.previous_slide(),
            KeyCode::Right | KeyCode::Char('l') => app.next_slide(),
            KeyCode::Enter => app.finish_explanation(),
            _ => {}
        },
        Mode::Complete => match key.code {
            KeyCode::Enter | KeyCode::Char('q') => app.exit_session(),
            _ => {}
        },
        Mode::Reflection => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match (&app.screen, app.session.as_ref()) {
        (AppScreen::Session, Some(session)) => render_session(frame, app, session),
        _ => render_home(frame, app),
    }
}

fn render_home(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let home = Home::new(&app.topic_input, app.provider_name(), app.theme)
        .notice(app.notice.as_deref());
    frame.render_widget(home, centered_rect(60, 50, layout[0]));

    let footer = Paragraph::new(Line::from(Span::styled(
        " [Enter] Start  [Esc] Quit ",
        Style::default().fg(colors.text_muted()),
    )));
    frame.render_widget(footer, layout[1]);
}

fn render_session(frame: &mut ratatui::Frame, app: &App, session: &LearningSession) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let layout = SessionLayout::new(area);
    let state = session.state();

    let header_info = format!(
        " {} | {} | Accuracy {}% ({} answered)",
        state.mode().label(),
        state.mastery().label(),
        state.practice_accuracy(),
        state.questions_answered(),
    );
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {} ", session.topic().query),
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            header_info,
            Style::default()
                .fg(colors.text_muted())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout.header);

    frame.render_widget(ProgressBar::new(state.mode(), app.theme), layout.progress);

    let hints = if session.is_loading() {
        render_loading(frame, app, session, layout.main);
        vec!["[Esc] Exit".to_string()]
    } else if let Some(err) = session.controller().load_error() {
        render_failure(frame, app, &err.to_string(), layout.main);
        vec!["[r] Retry".to_string(), "[Esc] Exit".to_string()]
    } else {
        render_mode(frame, app, session, layout.main)
    };

    let width = layout.footer.width as usize;
    let mut footer_lines: Vec<Line> = Vec::new();
    if let Some(notice) = &app.notice {
        footer_lines.push(Line::from(Span::styled(
            format!("  {notice}"),
            Style::default().fg(colors.warning()),
        )));
    }
    let hints: Vec<&str> = hints.iter().map(String::as_str).collect();
    footer_lines.extend(pack_hint_lines(&hints, width).into_iter().map(|line| {
        Line::from(Span::styled(line, Style::default().fg(colors.text_muted())))
    }));
    frame.render_widget(Paragraph::new(footer_lines), layout.footer);
}

fn render_loading(frame: &mut ratatui::Frame, app: &App, session: &LearningSession, area: Rect) {
    let colors = &app.theme.colors;
    let mode = session.mode();
    let what = match session.controller() {
        ModeController::Diagnostic(_) => "Preparing diagnostic questions...".to_string(),
        ModeController::Explanation(_) => "Writing the explanation...".to_string(),
        ModeController::Practice(practice) => match practice.requested {
            Some(difficulty) => format!("Generating a {} practice question...", difficulty.as_str()),
            None => "Generating a practice question...".to_string(),
        },
        _ => "Building a case study...".to_string(),
    };
    let block = Block::bordered()
        .title(format!(" {} ", mode.label()))
        .border_style(Style::default().fg(colors.border()));
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(what, Style::default().fg(colors.text_muted()))),
    ])
    .alignment(Alignment::Center)
    .block(block);
    frame.render_widget(text, area);
}

fn render_failure(frame: &mut ratatui::Frame, app: &App, message: &str, area: Rect) {
    let colors = &app.theme.colors;
    let block = Block::bordered()
        .title(" Content unavailable ")
        .border_style(Style::default().fg(colors.error()));
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(colors.error()))),
        Line::from(""),
        Line::from(Span::styled(
            "Press [r] to try again.",
            Style::default().fg(colors.text_muted()),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(block);
    frame.render_widget(text, area);
}

/// Render the active controller and return its footer hints.
fn render_mode(
    frame: &mut ratatui::Frame,
    app: &App,
    session: &LearningSession,
    area: Rect,
) -> Vec<String> {
    let colors = &app.theme.colors;
    let exit = || "[Esc] Exit".to_string();

    match session.controller() {
        ModeController::Diagnostic(diag) => {
            if let Some(question) = diag.current() {
                let title = format!(
                    "Diagnostic \u{b7} Question {} of {}",
                    diag.index + 1,
                    diag.total()
                );
                frame.render_widget(
                    QuestionCard::new(title, question, &diag.interaction, app.theme),
                    area,
                );
            }
            if diag.interaction.is_answered() {
                vec!["[Enter] Next".to_string(), exit()]
            } else {
                let options = diag.current().map_or(0, |q| q.options.len());
                vec![answer_hint(options), exit()]
            }
        }
        ModeController::Explanation(expl) => {
            if let (Some(content), Some(section)) = (expl.content.ready(), expl.current()) {
                frame.render_widget(
                    ExplanationSlide::new(
                        &content.title,
                        section,
                        (expl.index, expl.section_count()),
                        app.theme,
                    ),
                    area,
                );
            }
            let mut hints = Vec::new();
            if !expl.is_first() {
                hints.push("[\u{2190}/h] Previous".to_string());
            }
            if expl.can_finish() {
                hints.push("[Enter] Start practice".to_string());
            } else {
                hints.push("[\u{2192}/l] Next".to_string());
            }
            hints.push(exit());
            hints
        }
        ModeController::Practice(practice) => {
            if let (Some(item), Some(question)) = (practice.item.ready(), practice.current()) {
                let title = format!("Practice \u{b7} {}", item.difficulty.as_str());
                frame.render_widget(
                    QuestionCard::new(title, question, &practice.interaction, app.theme),
                    area,
                );
            }
            let verify = if session.verification_unlocked() {
                "[v] Verify mastery"
            } else {
                "[v] Verify (locked)"
            };
            if practice.interaction.is_answered() {
                vec!["[Enter] Next question".to_string(), verify.to_string(), exit()]
            } else {
                let options = practice.current().map_or(0, |q| q.options.len());
                vec![answer_hint(options), verify.to_string(), exit()]
            }
        }
        ModeController::Verification(verif) => {
            let Some(scenario) = verif.scenario.ready() else {
                return vec![exit()];
            };
            let sections = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(6), Constraint::Length(2)])
                .split(area);

            if let Some(question) = verif.current() {
                let title = format!(
                    "Verification \u{b7} Step {} of {} \u{b7} {}",
                    verif.index + 1,
                    verif.step_count(),
                    verif.step_label()
                );
                frame.render_widget(
                    QuestionCard::new(title, question, &verif.interaction, app.theme)
                        .preface(&scenario.scenario),
                    sections[0],
                );
            }

            if verif.failed() {
                let secs = session
                    .restart_remaining(Instant::now())
                    .map_or(0, |d| d.as_millis().div_ceil(1000));
                let status = Paragraph::new(Line::from(Span::styled(
                    format!("  Mastery check failed. Returning to practice in {secs}s..."),
                    Style::default()
                        .fg(colors.error())
                        .add_modifier(Modifier::BOLD),
                )));
                frame.render_widget(status, sections[1]);
                vec![exit()]
            } else if verif.can_proceed() {
                vec!["[Enter] Next step".to_string(), exit()]
            } else {
                let options = verif.current().map_or(0, |q| q.options.len());
                vec![answer_hint(options), exit()]
            }
        }
        ModeController::Reflection(reflection) => {
            render_reflection(frame, app, reflection.char_count(), area);
            if reflection.can_commit() {
                vec!["[Enter] Complete".to_string(), exit()]
            } else {
                vec![format!("Write at least {MIN_REFLECTION_CHARS} characters"), exit()]
            }
        }
        ModeController::Complete => {
            frame.render_widget(
                Completion::new(
                    &session.topic().query,
                    session.state(),
                    session.history(),
                    app.theme,
                ),
                area,
            );
            vec!["[Enter/q] Home".to_string()]
        }
    }
}

fn render_reflection(frame: &mut ratatui::Frame, app: &App, char_count: usize, area: Rect) {
    let colors = &app.theme.colors;

    let block = Block::bordered()
        .title(" Reflection ")
        .border_style(Style::default().fg(colors.border_focused()));

    let (before, cursor, after) = app.reflection_input.render_parts();
    let cursor_str = cursor.map(String::from).unwrap_or_else(|| " ".to_string());
    let count_color = if char_count >= MIN_REFLECTION_CHARS {
        colors.success()
    } else {
        colors.text_muted()
    };

    let lines = vec![
        Line::from(Span::styled(
            "In your own words: what is the single most important idea, and where would you apply it?",
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(before, Style::default().fg(colors.fg())),
            Span::styled(cursor_str, Style::default().fg(colors.bg()).bg(colors.accent())),
            Span::styled(after, Style::default().fg(colors.fg())),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!("{char_count}/{MIN_REFLECTION_CHARS} characters"),
            Style::default().fg(count_color),
        )),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}
