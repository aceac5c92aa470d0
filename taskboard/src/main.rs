//! `Taskboard` — terminal Kanban board client.
//!
//! Without `--project` it prints the project overview; with one it opens
//! the board view. Configuration via CLI flags, environment variables, or
//! config file (`~/.config/taskboard/config.toml`).
//!
//! ```bash
//! # Offline demo board
//! cargo run --bin taskboard -- --offline
//!
//! # Sign in and list projects
//! cargo run --bin taskboard -- --email me@example.com --password secret
//!
//! # Open a project
//! TASKBOARD_PROJECT=65f0c0ffee cargo run --bin taskboard
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use taskboard::api::BoardApi;
use taskboard::api::http::HttpApi;
use taskboard::api::memory::MemoryApi;
use taskboard::app::{App, AppCommand};
use taskboard::board::ProjectBoard;
use taskboard::config::{CliArgs, ClientConfig};
use taskboard::notice::{self, Notice};
use taskboard::projects;
use taskboard::session::{Answer, FileTokenStore, StaticToken, TokenProvider};
use taskboard::ui;
use taskboard_proto::auth::Credentials;
use taskboard_proto::id::ProjectId;

/// Project opened by `--offline` when none is given.
const DEMO_PROJECT: &str = "demo";

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        // A file the user named must be usable.
        Err(e) if cli.config.is_some() => return Err(io::Error::other(e)),
        Err(e) => {
            eprintln!("Warning: ignoring config file: {e}");
            ClientConfig::from_cli(&cli)
        }
    };

    // Logs go to a file; the terminal belongs to the TUI.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(api_url = %config.api_url, offline = cli.offline, "taskboard starting");

    if cli.offline {
        let project = config
            .project
            .clone()
            .unwrap_or_else(|| DEMO_PROJECT.to_string());
        return run(Arc::new(MemoryApi::demo()), &config, Some(project)).await;
    }

    let api = HttpApi::new(&config.api_url, config.request_timeout, token_provider(&config))
        .map_err(io::Error::other)?;

    if let (Some(email), Some(password)) = (cli.email.clone(), cli.password.clone()) {
        let user = api
            .login(&Credentials { email, password })
            .await
            .map_err(|e| io::Error::other(format!("login failed: {}", e.user_message("Login failed"))))?;
        tracing::info!(user = %user.id, "signed in");
    }

    let project = config.project.clone();
    run(Arc::new(api), &config, project).await
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskboard.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Token from the command line, else the persisted token file.
fn token_provider(config: &ClientConfig) -> Arc<dyn TokenProvider> {
    if let Some(token) = &config.token {
        return Arc::new(StaticToken::new(Some(token.clone())));
    }
    let Some(path) = FileTokenStore::default_path() else {
        return Arc::new(StaticToken::default());
    };
    match FileTokenStore::open(&path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!(error = %e, "token file unreadable, starting signed out");
            Arc::new(StaticToken::default())
        }
    }
}

async fn run<A: BoardApi + 'static>(
    api: Arc<A>,
    config: &ClientConfig,
    project: Option<String>,
) -> io::Result<()> {
    let Some(project) = project else {
        return print_overview(api).await;
    };

    let (notices, mut notice_rx) = notice::channel(config.notice_buffer);
    let board = Arc::new(ProjectBoard::new(
        api,
        ProjectId::new(project),
        config.refetch_quiet,
        notices,
    ));
    // A failed load is reported as a notice; the view opens empty.
    let _ = board.load().await;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_board(&mut terminal, &board, &mut notice_rx, config);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("taskboard exiting");
    result
}

async fn print_overview<A: BoardApi + 'static>(api: Arc<A>) -> io::Result<()> {
    let overviews = projects::load_with_stats(api)
        .await
        .map_err(|e| io::Error::other(e.user_message("Failed to load projects")))?;
    if overviews.is_empty() {
        println!("No projects yet.");
        return Ok(());
    }
    for overview in overviews {
        let stats = overview.stats;
        println!(
            "{:<26} {:<32} {} boards, {}/{} tasks done",
            overview.project.id, overview.project.name, stats.boards, stats.completed, stats.tasks
        );
    }
    println!("\nOpen one with --project <id>.");
    Ok(())
}

/// Board view loop: draw, drain notices, handle keys.
fn run_board<A: BoardApi + 'static>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    board: &Arc<ProjectBoard<A>>,
    notice_rx: &mut mpsc::Receiver<Notice>,
    config: &ClientConfig,
) -> io::Result<()> {
    let mut app = App::new();

    loop {
        while let Ok(notice) = notice_rx.try_recv() {
            app.push_notice(notice);
        }
        app.apply_snapshot(board.snapshot());

        terminal.draw(|frame| ui::draw(frame, &app))?;

        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(command) = app.handle_key_event(key) {
                dispatch(board, command);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Hands a view command to the board core.
fn dispatch<A: BoardApi + 'static>(board: &Arc<ProjectBoard<A>>, command: AppCommand) {
    match command {
        AppCommand::DragEnd { active, over } => {
            let outcome = board.reconciler().on_drag_end(&active, &over);
            if let Some(reason) = outcome.ignored() {
                tracing::debug!(?reason, active, over, "drop ignored");
            }
        }
        AppCommand::Refresh => {
            let board = Arc::clone(board);
            tokio::spawn(async move { board.refresh().await });
        }
        AppCommand::DeleteTask(task) => {
            let board = Arc::clone(board);
            tokio::spawn(async move {
                let _ = board.session().delete_task(&task, &Answer(true)).await;
            });
        }
        AppCommand::DeleteBoard(id) => {
            let board = Arc::clone(board);
            tokio::spawn(async move {
                let _ = board.session().delete_board(&id, &Answer(true)).await;
            });
        }
    }
}
