//! The edit view — one row per field, disabled rows dimmed with a note.

use perfil_core::{client::ProfileClient, field::InputKind};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, Mode};

const LABEL_WIDTH: usize = 22;

/// Render the edit form into `area`.
pub fn draw<C: ProfileClient>(f: &mut Frame, area: Rect, app: &App<C>) {
  let block = Block::default()
    .title(" Edit profile ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let mut lines: Vec<Line> = Vec::new();

  if let Some(success) = app.form.success() {
    lines.push(Line::from(Span::styled(
      format!("✔ {success}"),
      Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));
  }

  let mut cursor_line = 0;
  for (i, state) in app.form.fields().into_iter().enumerate() {
    let selected = i == app.cursor;
    if selected {
      cursor_line = lines.len();
    }

    let label = if state.field.is_required() {
      format!("{}*", state.field.label())
    } else {
      state.field.label().to_string()
    };

    let label_style = if !state.editable {
      Style::default().fg(Color::DarkGray)
    } else if selected {
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::Cyan)
    };

    let value = match (&app.mode, selected) {
      (Mode::Editing { buffer }, true) => format!("{buffer}_"),
      _ if state.value.is_empty() => placeholder(state.field.input_kind()),
      _ => state.value.to_string(),
    };

    let mut value_style = if state.editable {
      Style::default()
    } else {
      Style::default().fg(Color::DarkGray)
    };
    if state.value.is_empty() && !matches!(app.mode, Mode::Editing { .. }) {
      value_style = value_style.fg(Color::DarkGray);
    }
    if selected {
      value_style = value_style.bg(Color::Blue).add_modifier(Modifier::BOLD);
    }

    lines.push(Line::from(vec![
      Span::raw(if selected { "▸ " } else { "  " }),
      Span::styled(format!("{label:<width$}", width = LABEL_WIDTH), label_style),
      Span::styled(value, value_style),
    ]));

    if let Some(note) = state.note {
      lines.push(Line::from(Span::styled(
        format!("  {:<width$}{note}", "", width = LABEL_WIDTH),
        Style::default()
          .fg(Color::DarkGray)
          .add_modifier(Modifier::ITALIC),
      )));
    }
  }

  // Keep the selected row on screen.
  let scroll = cursor_line.saturating_sub(inner.height.saturating_sub(1) as usize);
  f.render_widget(Paragraph::new(lines).scroll((scroll as u16, 0)), inner);
}

fn placeholder(kind: InputKind) -> String {
  match kind {
    InputKind::Date => "YYYY-MM-DD".into(),
    InputKind::Email => "name@example.com".into(),
    InputKind::Text => "—".into(),
  }
}
