//! Application state and key dispatcher.
//!
//! Requests are not run from inside key handling. A key records a pending
//! [`Action`]; the event loop draws the loading view and then awaits
//! [`App::run_pending_with_input`], which keeps reading input while the request
//! runs. Every key except Ctrl-C is discarded until it finishes, so a second
//! submit cannot be queued behind the first.

use std::sync::Arc;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use perfil_core::{
  client::ProfileClient,
  field::Field,
  form::{GUEST_NOTE, ProfileForm, View},
  session::Session,
};
use tokio::sync::mpsc::UnboundedReceiver;

// ─── Mode ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
  /// Moving between fields.
  Browse,
  /// Typing into the selected field; committed on Enter.
  Editing { buffer: String },
}

/// A request waiting for the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  Load,
  Submit,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<C> {
  pub form:       ProfileForm,
  session:        Session,
  /// Index into [`Field::all`] of the selected field.
  pub cursor:     usize,
  pub mode:       Mode,
  pub pending:    Option<Action>,
  /// One-line hint shown in the status bar, cleared on the next key.
  pub status_msg: String,
  pub client:     Arc<C>,
}

impl<C: ProfileClient> App<C> {
  /// Create an [`App`]; the first load is queued immediately.
  pub fn new(client: C, session: Session) -> Self {
    let mut app = Self {
      form: ProfileForm::new(),
      session: Session::anonymous(),
      cursor: 0,
      mode: Mode::Browse,
      pending: None,
      status_msg: String::new(),
      client: Arc::new(client),
    };
    app.set_session(session);
    app
  }

  pub fn session(&self) -> &Session { &self.session }

  /// Replace the session and queue a reload of the profile for it.
  pub fn set_session(&mut self, session: Session) {
    self.session = session;
    self.mode = Mode::Browse;
    self.pending = Some(Action::Load);
  }

  pub fn selected_field(&self) -> Field {
    Field::all().nth(self.cursor).unwrap_or(Field::FullName)
  }

  /// A request is queued or running.
  pub fn is_busy(&self) -> bool { self.pending.is_some() || self.form.is_loading() }

  // ── Requests ──────────────────────────────────────────────────────────────

  /// Perform the queued action, if any. Outcomes land in `self.form`.
  pub async fn run_pending(&mut self) {
    let Some(action) = self.pending else {
      return;
    };
    let result = match action {
      Action::Load => self.form.load(&self.session, self.client.as_ref()).await,
      Action::Submit => {
        self.form.submit(&self.session, self.client.as_ref()).await
      }
    };
    self.pending = None;
    if let Err(e) = result {
      tracing::debug!(?action, error = %e, "action did not complete");
    }
  }

  /// Run the queued action while draining `input`.
  ///
  /// Keys arriving during the request are dropped. Returns `false` if Ctrl-C
  /// was pressed, abandoning the request.
  pub async fn run_pending_with_input(
    &mut self,
    input: &mut UnboundedReceiver<Event>,
  ) -> bool {
    {
      let request = self.run_pending();
      tokio::pin!(request);
      loop {
        tokio::select! {
          biased;
          Some(event) = input.recv() => {
            if is_quit(&event) {
              tracing::info!("quit while a request was running");
              return false;
            }
          }
          () = &mut request => break,
        }
      }
    }

    // Whatever was typed while the last poll ran.
    while let Ok(event) = input.try_recv() {
      if is_quit(&event) {
        return false;
      }
    }
    true
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    // Global: Ctrl-C quits from anywhere.
    if is_ctrl_c(&key) {
      return false;
    }
    if self.is_busy() {
      return true;
    }
    self.status_msg.clear();

    let Mode::Editing { buffer } = &mut self.mode else {
      return self.handle_browse_key(key);
    };
    match key.code {
      KeyCode::Esc => self.mode = Mode::Browse,
      KeyCode::Enter => {
        let value = std::mem::take(buffer);
        let field = self.selected_field();
        self.form.set_field(field, value);
        self.mode = Mode::Browse;
      }
      KeyCode::Backspace => {
        buffer.pop();
      }
      KeyCode::Char(c) => buffer.push(c),
      _ => {}
    }
    true
  }

  fn handle_browse_key(&mut self, key: KeyEvent) -> bool {
    let editing = matches!(self.form.view(), View::Edit(_));

    match key.code {
      // Quit
      KeyCode::Char('q') => return false,

      // Navigation
      KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab if editing => {
        if self.cursor + 1 < Field::all().count() {
          self.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab if editing => {
        self.cursor = self.cursor.saturating_sub(1);
      }

      // Edit the selected field
      KeyCode::Enter | KeyCode::Char('i') if editing => {
        let field = self.selected_field();
        if self.form.is_editable(field) {
          let current = self
            .form
            .profile()
            .map(|p| p.get(field).to_string())
            .unwrap_or_default();
          self.mode = Mode::Editing { buffer: current };
        } else {
          self.status_msg = GUEST_NOTE.to_string();
        }
      }

      // Submit: from the form, or again after a failed submit.
      KeyCode::Char('s') if self.form.profile().is_some() => {
        self.pending = Some(Action::Submit);
      }

      // Reload
      KeyCode::Char('r') => self.pending = Some(Action::Load),

      _ => {}
    }
    true
  }
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
  key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

fn is_quit(event: &Event) -> bool {
  matches!(event, Event::Key(key) if key.kind == KeyEventKind::Press && is_ctrl_c(key))
}
