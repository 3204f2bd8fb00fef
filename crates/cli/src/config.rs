use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use payline_directory::{ApiConfig, SubmissionSettings};
use payline_import::ImportProfile;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "etc/payline-sync.toml";
pub const DEFAULT_API_KEY_FILE: &str = "etc/client_secret_rw";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// File whose first line is the directory API key. Relative paths are
    /// resolved against the directory of the config file they came from.
    pub api_key_file: PathBuf,
    pub api: ApiConfig,
    pub import: ImportProfile,
    pub submission: SubmissionSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key_file: PathBuf::from(DEFAULT_API_KEY_FILE),
            api: ApiConfig::default(),
            import: ImportProfile::default(),
            submission: SubmissionSettings::default(),
        }
    }
}

impl Settings {
    pub fn from_toml(input: &str) -> anyhow::Result<Self> {
        toml::from_str(input).context("invalid configuration")
    }

    /// Explicit `path` must exist. Without one, `etc/payline-sync.toml` is
    /// looked up in the working directory and then under the install prefix;
    /// built-in defaults apply when neither has it.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let roots = search_roots();
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = locate(Path::new(DEFAULT_CONFIG_PATH), &roots);
                if !default.exists() {
                    let mut settings = Self::default();
                    settings.api_key_file = locate(&settings.api_key_file, &roots);
                    return Ok(settings);
                }
                default
            }
        };

        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut settings =
            Self::from_toml(&text).with_context(|| format!("parsing config {}", path.display()))?;

        if settings.api_key_file.is_relative() {
            if let Some(dir) = path.parent() {
                settings.api_key_file = dir.join(&settings.api_key_file);
            }
        }
        Ok(settings)
    }
}

/// `<prefix>` for a binary installed as `<prefix>/bin/payline-sync`.
fn search_roots() -> Vec<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent()?.parent().map(Path::to_path_buf))
        .into_iter()
        .collect()
}

/// `relative` if it exists from the working directory, else the first root
/// holding it, else `relative` unchanged.
fn locate(relative: &Path, roots: &[PathBuf]) -> PathBuf {
    if relative.is_absolute() || relative.exists() {
        return relative.to_path_buf();
    }
    roots
        .iter()
        .map(|root| root.join(relative))
        .find(|candidate| candidate.exists())
        .unwrap_or_else(|| relative.to_path_buf())
}

/// Reads the API key from the first line of `path`.
pub fn read_api_key(path: &Path) -> anyhow::Result<String> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading API key file {}", path.display()))?;
    let key = text.lines().next().unwrap_or_default().trim();
    if key.is_empty() {
        bail!("API key file {} is empty", path.display());
    }
    Ok(key.to_string())
}
