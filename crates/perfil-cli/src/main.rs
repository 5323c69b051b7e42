//! `perfil` — terminal editor for your own profile on the attendance service.
//!
//! # Usage
//!
//! ```text
//! perfil --url http://localhost:8080 --user ana --password secret
//! perfil --config ~/.config/perfil/config.toml
//! PERFIL_TOKEN=eyJ... perfil
//! ```
//!
//! Diagnostics go to the log file (`--log-file`, default `perfil.log`), never
//! to the screen.

mod app;
mod client;
mod settings;
mod ui;

use std::{
  fs::OpenOptions,
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context, Result, anyhow};
use app::App;
use clap::Parser;
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use perfil_core::session::Session;
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::CliConfig;
use tokio::sync::mpsc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "perfil", version, about = "Edit your profile from the terminal")]
struct Args {
  /// Path to a TOML config file (url, username, password, token, …).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the profile service (default: http://localhost:8080).
  #[arg(long)]
  url: Option<String>,

  /// Login user name.
  #[arg(long)]
  user: Option<String>,

  /// Login password (plaintext).
  #[arg(long)]
  password: Option<String>,

  /// Bearer token; skips the login request.
  #[arg(long)]
  token: Option<String>,

  /// Request timeout in seconds.
  #[arg(long)]
  timeout_secs: Option<u64>,

  /// Where to write the operator log.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

impl Args {
  /// CLI flags override the config file and environment.
  fn apply(self, mut cfg: CliConfig) -> CliConfig {
    if let Some(url) = self.url {
      cfg.url = url;
    }
    if let Some(user) = self.user {
      cfg.username = user;
    }
    if let Some(password) = self.password {
      cfg.password = password;
    }
    if let Some(token) = self.token {
      cfg.token = token;
    }
    if let Some(secs) = self.timeout_secs {
      cfg.timeout_secs = secs;
    }
    if let Some(path) = self.log_file {
      cfg.log_file = path;
    }
    cfg
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let cfg = CliConfig::load(args.config.as_deref())?;
  let cfg = args.apply(cfg);

  init_logging(&cfg.log_file)?;
  tracing::info!(url = %cfg.url, "starting perfil");

  let client = ApiClient::new(ApiConfig {
    base_url: cfg.url.clone(),
    timeout:  Duration::from_secs(cfg.timeout_secs),
  })?;
  let session = open_session(&client, &cfg).await?;
  let mut app = App::new(client, session);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

/// Configure `tracing` to append to `path`.
fn init_logging(path: &Path) -> Result<()> {
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("opening log file {}", path.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(Mutex::new(file))
    .with_ansi(false)
    .init();
  Ok(())
}

/// Use the configured token, else log in, else run unauthenticated (the form
/// then shows the error view).
async fn open_session(client: &ApiClient, cfg: &CliConfig) -> Result<Session> {
  if !cfg.token.trim().is_empty() {
    return Ok(Session::from_token(cfg.token.clone()));
  }
  if cfg.username.is_empty() {
    tracing::warn!("no token or user configured");
    return Ok(Session::anonymous());
  }

  match client.login(&cfg.username, &cfg.password).await {
    Ok(session) => {
      tracing::info!(user = %cfg.username, "logged in");
      Ok(session)
    }
    Err(e) => {
      e.diagnostic.log("login", &e.summary);
      Err(anyhow!("login as {} failed: {e}", cfg.username))
    }
  }
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<ApiClient>,
) -> Result<()> {
  let mut events = spawn_input_reader();

  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // A queued request runs after the loading view is on screen.
    if app.pending.is_some() {
      if !app.run_pending_with_input(&mut events).await {
        break;
      }
      continue;
    }

    let Some(event) = events.recv().await else {
      break;
    };
    if let Event::Key(key) = event
      && key.kind == KeyEventKind::Press
      && !app.handle_key(key)
    {
      break;
    }
  }

  Ok(())
}

/// Read terminal events on a dedicated thread so input keeps flowing while a
/// request is awaited.
fn spawn_input_reader() -> mpsc::UnboundedReceiver<Event> {
  let (tx, rx) = mpsc::unbounded_channel();
  std::thread::spawn(move || {
    loop {
      match event::read() {
        Ok(event) => {
          if tx.send(event).is_err() {
            break;
          }
        }
        Err(e) => {
          tracing::error!(error = %e, "reading terminal input failed");
          break;
        }
      }
    }
  });
  rx
}
