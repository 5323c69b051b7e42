//! The `ProfileClient` trait.
//!
//! Implemented by transport backends (e.g. the reqwest client in
//! `perfil-cli`). The form depends on this abstraction only, and sees every
//! failure as a uniform [`RequestFailed`].

use std::future::Future;

use crate::{
  error::RequestFailed,
  profile::{Profile, ProfileUpdate},
};

/// Access to the authenticated person's own profile.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes.
pub trait ProfileClient: Send + Sync {
  /// `GET` the profile belonging to the bearer of `token`.
  fn fetch_profile(
    &self,
    token: &str,
  ) -> impl Future<Output = Result<Profile, RequestFailed>> + Send;

  /// Send `payload` as the new profile and return what the service stored.
  fn update_profile(
    &self,
    payload: &ProfileUpdate,
    token: &str,
  ) -> impl Future<Output = Result<Profile, RequestFailed>> + Send;
}
