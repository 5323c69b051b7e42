//! TUI rendering — header, the form's current view, status bar.

pub mod profile_form;

use chrono::Local;
use perfil_core::{client::ProfileClient, form::View};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{App, Mode};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<C: ProfileClient>(f: &mut Frame, app: &App<C>) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header<C: ProfileClient>(f: &mut Frame, area: Rect, app: &App<C>) {
  let date = Local::now().format("%Y-%m-%d").to_string();
  let who = match (app.session().subject(), app.session().role()) {
    (Some(user), Some(role)) => format!("{user} ({role})  "),
    (Some(user), None) => format!("{user}  "),
    _ => String::new(),
  };

  let left = Span::styled(
    " perfil  [s] save  [r] reload  [q] quit",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!("{who}{date} "),
    Style::default().fg(Color::Gray),
  );

  // Simple left-right header: pad the middle.
  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body<C: ProfileClient>(f: &mut Frame, area: Rect, app: &App<C>) {
  if app.is_busy() {
    draw_message(f, area, "Loading profile…", Color::Gray);
    return;
  }

  match app.form.view() {
    View::Loading => draw_message(f, area, "Loading profile…", Color::Gray),
    View::Error(message) => {
      draw_message(f, area, &format!("Error: {message}"), Color::Red)
    }
    View::NoData => draw_message(
      f,
      area,
      "Could not load the profile information.",
      Color::Gray,
    ),
    View::Edit(_) => profile_form::draw(f, area, app),
  }
}

fn draw_message(f: &mut Frame, area: Rect, text: &str, color: Color) {
  let block = Block::default()
    .title(" Profile ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new(Span::styled(text.to_string(), Style::default().fg(color)))
      .wrap(Wrap { trim: true }),
    inner,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<C: ProfileClient>(f: &mut Frame, area: Rect, app: &App<C>) {
  let (mode_label, hints) = match &app.mode {
    _ if app.is_busy() => ("BUSY", "Waiting for the server…  Ctrl-C quit"),
    Mode::Editing { .. } => ("EDIT", "Type to edit  Enter keep  Esc discard"),
    Mode::Browse if app.form.error().is_some() => (
      "ERROR",
      "r reload  s retry save  q quit",
    ),
    Mode::Browse => (
      "NORMAL",
      "↑↓/jk move  Enter edit  s save  r reload  q quit",
    ),
  };

  let status = if let Some(notice) = app.form.notice() {
    notice.to_string()
  } else if !app.status_msg.is_empty() {
    app.status_msg.clone()
  } else {
    hints.to_string()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::Gray),
  );

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

#[cfg(test)]
mod tests {
  use perfil_core::{
    RequestFailed,
    profile::{Profile, ProfileUpdate},
    session::Session,
  };
  use ratatui::{Terminal, backend::TestBackend};
  use serde_json::json;

  use super::*;

  struct StaticClient(Profile);

  impl ProfileClient for StaticClient {
    async fn fetch_profile(&self, _token: &str) -> Result<Profile, RequestFailed> {
      Ok(self.0.clone())
    }

    async fn update_profile(
      &self,
      _payload: &ProfileUpdate,
      _token: &str,
    ) -> Result<Profile, RequestFailed> {
      Ok(self.0.clone())
    }
  }

  fn render<C: ProfileClient>(app: &App<C>) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
    terminal.draw(|f| draw(f, app)).unwrap();
    terminal
      .backend()
      .buffer()
      .content()
      .iter()
      .map(|cell| cell.symbol())
      .collect()
  }

  fn profile(person_type: &str) -> Profile {
    serde_json::from_value(json!({
      "nombreCompleto": "Jorge Apaza",
      "documento": "41112222",
      "codigoEstudiante": "2017555",
      "tipoPersona": person_type
    }))
    .unwrap()
  }

  #[tokio::test]
  async fn pending_load_renders_loading_view() {
    let app = App::new(StaticClient(profile("ESTUDIANTE")), Session::from_token("t"));
    assert!(render(&app).contains("Loading profile"));
  }

  #[tokio::test]
  async fn loaded_profile_renders_values() {
    let mut app = App::new(StaticClient(profile("ESTUDIANTE")), Session::from_token("t"));
    app.run_pending().await;

    let screen = render(&app);
    assert!(screen.contains("Jorge Apaza"));
    assert!(screen.contains("2017555"));
    assert!(!screen.contains("Guests cannot edit"));
  }

  #[tokio::test]
  async fn guest_profile_renders_note() {
    let mut app = App::new(StaticClient(profile("INVITADO")), Session::from_token("t"));
    app.run_pending().await;
    assert!(render(&app).contains("Guests cannot edit this field."));
  }

  #[tokio::test]
  async fn missing_token_renders_error() {
    let mut app = App::new(StaticClient(profile("ESTUDIANTE")), Session::anonymous());
    app.run_pending().await;
    assert!(render(&app).contains("Error: Failed to load profile: Not authenticated"));
  }
}
