//! The profile edit form: load → edit → submit → display.
//!
//! [`ProfileForm`] is independent of any UI toolkit. A front-end renders
//! [`ProfileForm::view`] and forwards user intent to [`ProfileForm::load`],
//! [`ProfileForm::set_field`] and [`ProfileForm::submit`].

use crate::{
  Error, Result,
  client::ProfileClient,
  field::Field,
  profile::Profile,
  session::Session,
};

pub const LOAD_FAILED: &str = "Failed to load profile: ";
pub const UPDATE_FAILED: &str = "Failed to update profile: ";
pub const UPDATED: &str = "Profile updated successfully!";
pub const GUEST_NOTE: &str = "Guests cannot edit this field.";

// ─── View ────────────────────────────────────────────────────────────────────

/// What the form should display. Variants are mutually exclusive and chosen in
/// declaration order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View<'a> {
  Loading,
  Error(&'a str),
  NoData,
  Edit(&'a Profile),
}

/// Render data for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldState<'a> {
  pub field:    Field,
  pub value:    &'a str,
  pub editable: bool,
  /// Explanation shown under a disabled input.
  pub note:     Option<&'static str>,
}

// ─── Busy guard ──────────────────────────────────────────────────────────────

/// Holds the loading flag up for the lifetime of a request, including when
/// the request future is dropped before completion.
struct Busy<'a>(&'a mut bool);

impl<'a> Busy<'a> {
  fn enter(flag: &'a mut bool) -> Self {
    *flag = true;
    Self(flag)
  }
}

impl Drop for Busy<'_> {
  fn drop(&mut self) { *self.0 = false; }
}

// ─── Form ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct ProfileForm {
  profile: Option<Profile>,
  loading: bool,
  error:   Option<String>,
  success: Option<String>,
  /// Local validation feedback; does not leave the edit view.
  notice:  Option<String>,
}

impl ProfileForm {
  pub fn new() -> Self { Self::default() }

  pub fn profile(&self) -> Option<&Profile> { self.profile.as_ref() }

  pub fn is_loading(&self) -> bool { self.loading }

  pub fn error(&self) -> Option<&str> { self.error.as_deref() }

  pub fn success(&self) -> Option<&str> { self.success.as_deref() }

  pub fn notice(&self) -> Option<&str> { self.notice.as_deref() }

  pub fn view(&self) -> View<'_> {
    if self.loading {
      View::Loading
    } else if let Some(error) = &self.error {
      View::Error(error)
    } else if let Some(profile) = &self.profile {
      View::Edit(profile)
    } else {
      View::NoData
    }
  }

  /// Every field with its current value and editability, in display order.
  /// Empty when nothing is loaded.
  pub fn fields(&self) -> Vec<FieldState<'_>> {
    let Some(profile) = &self.profile else {
      return Vec::new();
    };
    Field::all()
      .map(|field| {
        let editable = profile.is_editable(field);
        FieldState {
          field,
          value: profile.get(field),
          editable,
          note: (!editable).then_some(GUEST_NOTE),
        }
      })
      .collect()
  }

  pub fn is_editable(&self, field: Field) -> bool {
    self.profile.as_ref().is_some_and(|p| p.is_editable(field))
  }

  // ── Operations ─────────────────────────────────────────────────────────

  /// Fetch the profile for `session` and make it the form state.
  ///
  /// Run on start and whenever the session changes. Without a usable token the
  /// client is not called and the form shows the error view.
  pub async fn load<C: ProfileClient>(
    &mut self,
    session: &Session,
    client: &C,
  ) -> Result<()> {
    self.clear_messages();
    let outcome = {
      let _busy = Busy::enter(&mut self.loading);
      match authorized(session) {
        Ok(token) => client.fetch_profile(token).await.map_err(Error::from),
        Err(e) => Err(e),
      }
    };

    match outcome {
      Ok(profile) => {
        tracing::debug!(id = ?profile.id, "profile loaded");
        self.profile = Some(profile);
        Ok(())
      }
      Err(e) => {
        self.fail(LOAD_FAILED, "load_profile", &e);
        Err(e)
      }
    }
  }

  /// Merge `value` into `field` of the loaded profile.
  ///
  /// Returns `false`, changing nothing, when no profile is loaded or the field
  /// is disabled for this person.
  pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> bool {
    let Some(profile) = self.profile.as_mut() else {
      return false;
    };
    if !profile.is_editable(field) {
      return false;
    }
    profile.set(field, value);
    self.notice = None;
    true
  }

  /// Send the edited profile, minus the managed fields, and adopt the
  /// service's response.
  ///
  /// Checked in order: session, loaded profile (none is a no-op), then local
  /// validation. A failed request keeps the edits so the user can resubmit.
  pub async fn submit<C: ProfileClient>(
    &mut self,
    session: &Session,
    client: &C,
  ) -> Result<()> {
    let token = match authorized(session) {
      Ok(token) => token,
      Err(e) => {
        self.clear_messages();
        self.fail(UPDATE_FAILED, "update_profile", &e);
        return Err(e);
      }
    };
    let Some(profile) = self.profile.as_ref() else {
      return Ok(());
    };
    if let Err(e) = profile.validate() {
      self.notice = Some(e.to_string());
      return Err(e);
    }
    let payload = profile.to_update();

    self.clear_messages();
    let outcome = {
      let _busy = Busy::enter(&mut self.loading);
      client
        .update_profile(&payload, token)
        .await
        .map_err(Error::from)
    };

    match outcome {
      Ok(updated) => {
        tracing::info!(id = ?updated.id, "profile updated");
        self.profile = Some(updated);
        self.success = Some(UPDATED.to_string());
        Ok(())
      }
      Err(e) => {
        self.fail(UPDATE_FAILED, "update_profile", &e);
        Err(e)
      }
    }
  }

  fn clear_messages(&mut self) {
    self.error = None;
    self.success = None;
    self.notice = None;
  }

  /// Log the full detail for operators; show the user one line.
  fn fail(&mut self, prefix: &str, action: &str, e: &Error) {
    match e {
      Error::RequestFailed(failed) => {
        failed.diagnostic.log(action, &failed.summary)
      }
      other => tracing::error!(action, "{other}"),
    }
    self.error = Some(format!("{prefix}{e}"));
  }
}

fn authorized(session: &Session) -> Result<&str> {
  if !session.is_authenticated() {
    return Err(Error::Unauthenticated);
  }
  session.token().ok_or(Error::Unauthenticated)
}
