//! Layered configuration: optional TOML file, then `PERFIL_*` environment
//! variables. Command-line flags are applied on top in `main`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_URL: &str = "http://localhost:8080";

/// Shape of the config file and environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
  pub url:          String,
  pub username:     String,
  pub password:     String,
  /// Bearer token; when set, no login is attempted.
  pub token:        String,
  pub timeout_secs: u64,
  /// Operator log destination; the terminal belongs to the UI.
  pub log_file:     PathBuf,
}

impl Default for CliConfig {
  fn default() -> Self {
    Self {
      url:          DEFAULT_URL.to_string(),
      username:     String::new(),
      password:     String::new(),
      token:        String::new(),
      timeout_secs: 30,
      log_file:     PathBuf::from("perfil.log"),
    }
  }
}

impl CliConfig {
  /// Read `path` (if given) and the `PERFIL_` environment.
  pub fn load(path: Option<&Path>) -> Result<Self> { Self::load_with_env(path, None) }

  /// As [`CliConfig::load`], reading variables from `env` instead of the
  /// process environment when given.
  fn load_with_env(
    path: Option<&Path>,
    env: Option<config::Map<String, String>>,
  ) -> Result<Self> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
      builder = builder.add_source(config::File::from(path).required(true));
    }
    builder
      .add_source(config::Environment::with_prefix("PERFIL").source(env))
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("failed to deserialise configuration")
  }
}
