use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

use crate::parser::SentinelPolicy;
use crate::source::{
  DocumentOrigin,
  default_document_path
};

const MISSIONRC_ENV_VAR: &str =
  "MISSIONRC";
const MISSIONRC_FILE: &str =
  ".missionrc";

#[derive(Debug, Clone)]
pub struct Config {
  map: HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    let mut map = HashMap::new();
    map.insert(
      "dashboard.title".to_string(),
      "Mission Control".to_string()
    );
    map.insert(
      "notes.recent".to_string(),
      "5".to_string()
    );
    map.insert(
      "color".to_string(),
      "on".to_string()
    );
    map.insert(
      "sentinel.italic".to_string(),
      "off".to_string()
    );
    Self {
      map,
      loaded_files: vec![]
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    missionrc_override
  ))]
  pub fn load(
    missionrc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();

    let missionrc =
      resolve_missionrc_path(
        missionrc_override
      )?;
    if let Some(path) = missionrc {
      info!(missionrc = %path.display(), "loading missionrc");
      cfg.load_file(&path)?;
    } else {
      debug!(
        "no missionrc found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn get_bool(
    &self,
    key: &str
  ) -> Option<bool> {
    self
      .map
      .get(key)
      .map(|v| parse_bool(v))
  }

  pub fn get_usize(
    &self,
    key: &str
  ) -> anyhow::Result<Option<usize>> {
    let Some(raw) = self.map.get(key)
    else {
      return Ok(None);
    };
    raw
      .trim()
      .parse::<usize>()
      .map(Some)
      .with_context(|| {
        format!(
          "invalid number for {key}: \
           {raw}"
        )
      })
  }

  pub fn sentinel_policy(
    &self
  ) -> SentinelPolicy {
    if self
      .get_bool("sentinel.italic")
      .unwrap_or(false)
    {
      SentinelPolicy::ExactOrItalic
    } else {
      SentinelPolicy::Exact
    }
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    self
      .loaded_files
      .push(path.clone());

    let base_dir = path
      .parent()
      .map(|p| p.to_path_buf())
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let mut line = raw_line.trim();
      if line.is_empty()
        || line.starts_with('#')
      {
        continue;
      }

      if let Some((before, _)) =
        line.split_once('#')
      {
        line = before.trim();
      }

      if line.is_empty() {
        continue;
      }

      if let Some(include_rest) =
        line.strip_prefix("include ")
      {
        let include_path =
          resolve_relative_path(
            &base_dir,
            include_rest.trim()
          )?;
        debug!(
            file = %path.display(),
            include = %include_path.display(),
            line = line_num + 1,
            "processing include"
        );

        if include_path.exists() {
          self
            .load_file(&include_path)?;
        } else {
          warn!(include = %include_path.display(), "include file does not exist; skipping");
        }
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let mut value =
        v.trim().to_string();
      if key == "document.location" {
        value = resolve_relative_path(
          &base_dir, &value
        )?
        .to_string_lossy()
        .to_string();
      }
      trace!(key = %key, value = %value, "loaded config key");
      self.map.insert(key, value);
    }

    Ok(())
  }
}

/// Command-line path wins, then `document.location`, then
/// `./data/MISSION_CONTROL.md`.
#[tracing::instrument(skip(
  cfg,
  override_path
))]
pub fn resolve_document_origin(
  cfg: &Config,
  override_path: Option<&Path>
) -> anyhow::Result<DocumentOrigin> {
  if let Some(path) = override_path {
    return Ok(
      DocumentOrigin::from_arg(path)
    );
  }

  if let Some(location) =
    cfg.get("document.location")
  {
    return Ok(DocumentOrigin::from_arg(
      &expand_tilde(Path::new(
        &location
      ))
    ));
  }

  let cwd = std::env::current_dir()
    .context(
      "cannot determine current \
       directory"
    )?;
  Ok(DocumentOrigin::Path(
    default_document_path(&cwd)
  ))
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_missionrc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(missionrc_env) =
    std::env::var(MISSIONRC_ENV_VAR)
  {
    if missionrc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      missionrc_env
    )));
  }

  let Some(home) = dirs::home_dir()
  else {
    warn!(
      "cannot determine home \
       directory; skipping missionrc"
    );
    return Ok(None);
  };
  let candidate =
    home.join(MISSIONRC_FILE);
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn resolve_relative_path(
  base_dir: &Path,
  raw: &str
) -> anyhow::Result<PathBuf> {
  if raw.trim().is_empty() {
    return Err(anyhow!(
      "path cannot be empty"
    ));
  }
  if raw == "-" {
    return Ok(PathBuf::from(raw));
  }

  let expanded =
    expand_tilde(Path::new(raw));
  if expanded.is_absolute() {
    Ok(expanded)
  } else {
    Ok(base_dir.join(expanded))
  }
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> bool {
  matches!(
    s.trim()
      .to_ascii_lowercase()
      .as_str(),
    "1" | "y" | "yes" | "on" | "true"
  )
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::tempdir;

  use super::{
    Config,
    resolve_document_origin
  };
  use crate::parser::SentinelPolicy;
  use crate::source::DocumentOrigin;

  #[test]
  fn defaults_are_present() {
    let cfg = Config::default();
    assert_eq!(
      cfg.get("dashboard.title")
        .as_deref(),
      Some("Mission Control")
    );
    assert_eq!(
      cfg
        .get_usize("notes.recent")
        .expect("number"),
      Some(5)
    );
    assert_eq!(
      cfg.get_bool("color"),
      Some(true)
    );
    assert_eq!(
      cfg.sentinel_policy(),
      SentinelPolicy::Exact
    );
  }

  #[test]
  fn file_include_and_overrides() {
    let temp =
      tempdir().expect("tempdir");
    fs::write(
      temp.path().join("extra.rc"),
      "notes.recent = 3\n"
    )
    .expect("write include");
    let rc = temp.path().join("missionrc");
    fs::write(
      &rc,
      "# dashboard settings\n\
       dashboard.title = Evernu  # trailing comment\n\
       include extra.rc\n\
       document.location = plan/MISSION_CONTROL.md\n"
    )
    .expect("write rc");

    let mut cfg = Config::load(Some(rc.as_path()))
      .expect("load config");
    assert_eq!(
      cfg.get("dashboard.title")
        .as_deref(),
      Some("Evernu")
    );
    assert_eq!(
      cfg
        .get_usize("notes.recent")
        .expect("number"),
      Some(3)
    );
    assert_eq!(cfg.loaded_files.len(), 2);

    let origin =
      resolve_document_origin(&cfg, None)
        .expect("origin");
    assert_eq!(
      origin,
      DocumentOrigin::Path(
        temp
          .path()
          .join("plan/MISSION_CONTROL.md")
      )
    );

    cfg.apply_overrides(vec![(
      "rc.sentinel.italic".to_string(),
      "yes".to_string()
    )]);
    assert_eq!(
      cfg.sentinel_policy(),
      SentinelPolicy::ExactOrItalic
    );
  }

  #[test]
  fn invalid_line_reports_location() {
    let temp =
      tempdir().expect("tempdir");
    let rc = temp.path().join("missionrc");
    fs::write(&rc, "color = on\nnonsense\n")
      .expect("write rc");

    let err = Config::load(Some(rc.as_path()))
      .expect_err("invalid line");
    assert!(
      err.to_string().contains(":2:")
    );
  }

  #[test]
  fn bad_number_is_an_error() {
    let mut cfg = Config::default();
    cfg.apply_overrides(vec![(
      "notes.recent".to_string(),
      "many".to_string()
    )]);
    assert!(
      cfg.get_usize("notes.recent").is_err()
    );
  }

  #[test]
  fn command_line_path_wins() {
    let cfg = Config::default();
    let origin = resolve_document_origin(
      &cfg,
      Some(std::path::Path::new("-"))
    )
    .expect("origin");
    assert_eq!(
      origin,
      DocumentOrigin::Stdin
    );
  }
}
