//! Runtime configuration, read from `config.toml` and `TRIALS_*` environment
//! variables.
//!
//! ```toml
//! host       = "0.0.0.0"
//! port       = 8000
//! store_path = "~/.local/share/trials/trials.db"
//!
//! [source]
//! base_url     = "https://clinicaltrials.gov/api/v2/studies"
//! timeout_secs = 30
//!
//! [fetch]
//! page_size             = 1000
//! request_delay_ms      = 500
//! max_attempts          = 3
//! retry_backoff_ms      = 2000
//! rate_limit_backoff_ms = 60000
//!
//! [schedule]
//! enabled  = true
//! daily_at = "02:00"   # UTC
//! ```
//!
//! Nested keys are addressed from the environment with a double underscore,
//! e.g. `TRIALS_FETCH__PAGE_SIZE=200`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::NaiveTime;
use serde::Deserialize;
use trials_sync::{ClientConfig, FetchConfig};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  pub source:     ClientConfig,
  pub fetch:      FetchConfig,
  pub schedule:   ScheduleConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_owned(),
      port:       8000,
      store_path: PathBuf::from("trials.db"),
      source:     ClientConfig::default(),
      fetch:      FetchConfig::default(),
      schedule:   ScheduleConfig::default(),
    }
  }
}

/// Daily incremental sync trigger.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
  pub enabled:  bool,
  /// Wall-clock time in UTC, `HH:MM`.
  pub daily_at: String,
}

impl Default for ScheduleConfig {
  fn default() -> Self { Self { enabled: true, daily_at: "02:00".to_owned() } }
}

impl ScheduleConfig {
  pub fn time(&self) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(self.daily_at.trim(), "%H:%M")
      .with_context(|| format!("schedule.daily_at {:?} is not HH:MM", self.daily_at))
  }
}

impl ServerConfig {
  /// Layer the optional file at `path` under `TRIALS_*` environment
  /// variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::from_builder(
      config::Config::builder().add_source(config::File::from(path).required(false)),
    )
  }

  /// Parse TOML text directly; environment variables still apply.
  pub fn from_toml(text: &str) -> anyhow::Result<Self> {
    Self::from_builder(
      config::Config::builder()
        .add_source(config::File::from_str(text, config::FileFormat::Toml)),
    )
  }

  fn from_builder(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
  ) -> anyhow::Result<Self> {
    let settings = builder
      .add_source(
        config::Environment::with_prefix("TRIALS")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .context("failed to read configuration")?;

    let mut cfg: ServerConfig = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_file_yields_defaults() {
    let cfg = ServerConfig::from_toml("").unwrap();
    assert_eq!(cfg.port, 8000);
    assert_eq!(cfg.fetch.page_size, 1000);
    assert_eq!(cfg.fetch.request_delay_ms, 500);
    assert_eq!(cfg.fetch.max_attempts, 3);
    assert_eq!(cfg.source.base_url, trials_sync::client::DEFAULT_BASE_URL);
    assert!(cfg.schedule.enabled);
    assert_eq!(cfg.schedule.time().unwrap(), NaiveTime::from_hms_opt(2, 0, 0).unwrap());
  }

  #[test]
  fn nested_sections_override_defaults() {
    let cfg = ServerConfig::from_toml(
      r#"
        port = 9100
        store_path = "/var/lib/trials/trials.db"

        [fetch]
        page_size = 50
        max_attempts = 5

        [schedule]
        enabled = false
        daily_at = "23:30"
      "#,
    )
    .unwrap();

    assert_eq!(cfg.port, 9100);
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/trials/trials.db"));
    assert_eq!(cfg.fetch.page_size, 50);
    assert_eq!(cfg.fetch.max_attempts, 5);
    // Unset keys inside a present section keep their defaults.
    assert_eq!(cfg.fetch.retry_backoff_ms, 2_000);
    assert!(!cfg.schedule.enabled);
    assert_eq!(cfg.schedule.time().unwrap(), NaiveTime::from_hms_opt(23, 30, 0).unwrap());
  }

  #[test]
  fn malformed_schedule_time_is_rejected() {
    let cfg = ScheduleConfig { enabled: true, daily_at: "2am".into() };
    assert!(cfg.time().is_err());
  }

  #[test]
  fn tilde_is_expanded() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/trials.db")),
      PathBuf::from(home).join("trials.db")
    );
    assert_eq!(expand_tilde(Path::new("/abs.db")), PathBuf::from("/abs.db"));
  }
}
