//! Core types for the perfil profile editor.
//!
//! This crate is deliberately free of HTTP and terminal dependencies. It holds
//! the profile model, the session capability, the [`client::ProfileClient`]
//! abstraction, and the UI-agnostic [`form::ProfileForm`] state machine.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod client;
pub mod error;
pub mod field;
pub mod form;
pub mod profile;
pub mod session;


pub use error::{Diagnostic, Error, RequestFailed, Result};
