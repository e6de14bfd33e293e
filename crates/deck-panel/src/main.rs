mod app;
mod transport;
mod ui;

use std::{
    env,
    fs::OpenOptions,
    io,
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};

use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use url::Url;

use deck_storage::TranscriptStore;

use app::App;

const DEFAULT_AGENT_URL: &str = "ws://127.0.0.1:8000/ws";
const DEFAULT_DB_PATH: &str = ".deck/transcript.db";

#[derive(Parser, Debug)]
#[command(name = "deck-panel")]
struct Args {
    #[arg(long, default_value = "")]
    url: String,
    #[arg(long, default_value = "")]
    db: String,
    #[arg(long, default_value_t = 3000)]
    reconnect_ms: u64,
    #[arg(long, default_value = "")]
    log_dir: String,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_dir);

    let url = resolve_agent_url(&args.url);
    let db_path = resolve_db_path(&args.db);
    let store = TranscriptStore::open(&db_path)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))?;

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (link_tx, mut link_rx) = mpsc::unbounded_channel();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.spawn(transport::run(
        url,
        Duration::from_millis(args.reconnect_ms),
        link_tx,
        command_rx,
    ));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store, command_tx);
    let tick = Duration::from_millis(100);

    while !app.should_exit {
        while let Ok(link_event) = link_rx.try_recv() {
            app.handle_link(link_event);
        }
        terminal.draw(|frame| ui::draw(frame, &app))?;
        if event::poll(tick)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    runtime.shutdown_background();
    Ok(())
}

fn resolve_agent_url(flag: &str) -> Url {
    if !flag.trim().is_empty() {
        return Url::parse(flag).expect("invalid agent url");
    }
    if let Ok(value) = env::var("DECK_AGENT_URL") {
        if !value.trim().is_empty() {
            return Url::parse(&value).expect("invalid agent url");
        }
    }
    Url::parse(DEFAULT_AGENT_URL).expect("invalid agent url")
}

fn resolve_db_path(flag: &str) -> PathBuf {
    let path = if !flag.trim().is_empty() {
        PathBuf::from(flag)
    } else if let Ok(value) = env::var("DECK_DB") {
        if !value.trim().is_empty() {
            PathBuf::from(value)
        } else {
            PathBuf::from(DEFAULT_DB_PATH)
        }
    } else {
        PathBuf::from(DEFAULT_DB_PATH)
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    path
}

fn resolve_log_dir(flag: &str) -> Option<PathBuf> {
    if !flag.trim().is_empty() {
        return Some(PathBuf::from(flag));
    }
    if let Ok(value) = env::var("DECK_LOG_DIR") {
        if !value.trim().is_empty() {
            return Some(PathBuf::from(value));
        }
    }
    None
}

/// File-only logging: stdout belongs to the terminal UI. Disabled unless a
/// log dir is configured.
fn init_logging(log_dir: &str) {
    let Some(dir) = resolve_log_dir(log_dir) else {
        return;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("deck-panel.log"))
    else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
