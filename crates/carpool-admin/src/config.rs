//! Configuration for `carpool-admin`.
//!
//! Values are layered: built-in defaults, then the optional TOML file, then
//! `CARPOOL_*` environment variables (e.g. `CARPOOL_STORE_PATH`).

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Path value that selects an in-memory store.
pub const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
  /// SQLite database file. A leading `~/` is expanded; `:memory:` opens a
  /// throwaway in-memory store.
  pub store_path: PathBuf,
}

impl AdminConfig {
  /// Load from `file` (if it exists) and the environment.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    let settings = ::config::Config::builder()
      .set_default("store_path", "carpool.db")?
      .add_source(::config::File::from(file).required(false))
      .add_source(::config::Environment::with_prefix("CARPOOL"))
      .build()
      .context("failed to read config file")?;

    let mut cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise AdminConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }

  pub fn is_in_memory(&self) -> bool { self.store_path.as_os_str() == IN_MEMORY }
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

  fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir()
      .join(format!("carpool-admin-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
  }

  #[test]
  fn missing_file_uses_default_path() {
    let dir = scratch_dir();
    let cfg = AdminConfig::load(&dir.join("absent.toml")).unwrap();
    assert_eq!(cfg.store_path, PathBuf::from("carpool.db"));
    std::fs::remove_dir_all(&dir).ok();
  }

  #[test]
  fn file_overrides_default() {
    let dir = scratch_dir();
    let file = dir.join("carpool.toml");
    std::fs::write(&file, "store_path = \":memory:\"\n").unwrap();

    let cfg = AdminConfig::load(&file).unwrap();
    assert!(cfg.is_in_memory());
    std::fs::remove_dir_all(&dir).ok();
  }

  #[test]
  fn tilde_is_expanded() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/carpool.db")),
      PathBuf::from(home).join("carpool.db")
    );
    assert_eq!(expand_tilde(Path::new("/tmp/x.db")), PathBuf::from("/tmp/x.db"));
  }
}
