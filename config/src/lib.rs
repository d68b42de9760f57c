//! Configuration for Pledge.
//!
//! Read from `~/.pledge/config.toml`, or the file named by `PLEDGE_CONFIG`.
//! A missing file is not an error: every setting has a default.
//!
//! ```toml
//! [app]
//! data_dir = "~/.pledge"
//! acting_member = "Sujin"
//!
//! [ledger]
//! enforce_balance_check = true
//!
//! [[members]]
//! name = "Sujin"
//! role = "mom"
//! balance = 45000
//! ```

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use pledge_types::{EmptyStringError, Member, MemberId, NonEmptyString};

pub const CONFIG_ENV_VAR: &str = "PLEDGE_CONFIG";
const CONFIG_DIR_NAME: &str = ".pledge";
const CONFIG_FILE_NAME: &str = "config.toml";

// Default value function for serde (bool::default() is false, so only true needs a fn)
const fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct PledgeConfig {
    pub app: Option<AppConfig>,
    pub ledger: Option<LedgerConfig>,
    /// Roster used to seed a household that has no saved state yet.
    #[serde(default)]
    pub members: Vec<MemberConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Directory holding `household.json` and `logs/`. Supports `~` and `${VAR}`.
    pub data_dir: Option<String>,
    /// Member who creates promises when `--creator` is not given.
    pub acting_member: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LedgerConfig {
    /// Reject promises whose creator cannot currently cover the amount. Default: true.
    #[serde(default = "default_true")]
    pub enforce_balance_check: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            enforce_balance_check: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MemberConfig {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub balance: i64,
}

/// Expand `${VAR}` references. Unset variables expand to the empty string.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let var = &after[..end];
                if !var.is_empty() {
                    out.push_str(&env::var(var).unwrap_or_default());
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn expand_path(value: &str) -> PathBuf {
    let expanded = expand_env_vars(value.trim());
    if expanded == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from(expanded));
    }
    if let Some(rest) = expanded.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(expanded)
}

impl PledgeConfig {
    /// Load from [`config_path`]. `Ok(None)` when there is no config file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Configured data directory, falling back to `~/.pledge`.
    #[must_use]
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.app
            .as_ref()
            .and_then(|app| app.data_dir.as_deref())
            .filter(|dir| !dir.trim().is_empty())
            .map(expand_path)
            .or_else(default_data_dir)
    }

    #[must_use]
    pub fn acting_member(&self) -> Option<&str> {
        self.app
            .as_ref()
            .and_then(|app| app.acting_member.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    #[must_use]
    pub fn enforce_balance_check(&self) -> bool {
        self.ledger
            .as_ref()
            .is_none_or(|ledger| ledger.enforce_balance_check)
    }

    /// Members for a fresh household, ids assigned in listed order from 1.
    ///
    /// Falls back to a two-member parent/child roster when none are configured.
    pub fn seed_members(&self) -> Result<Vec<Member>, EmptyStringError> {
        if self.members.is_empty() {
            return default_members();
        }
        self.members
            .iter()
            .zip(1..)
            .map(|(seed, id)| {
                Ok(Member::new(
                    MemberId::new(id),
                    NonEmptyString::new(seed.name.trim())?,
                    seed.role.clone(),
                    seed.balance,
                ))
            })
            .collect()
    }

    /// Persist the acting member to the config file.
    ///
    /// Uses `toml_edit` to preserve comments and formatting.
    /// Creates the config file and parent directory if they don't exist.
    pub fn persist_acting_member(name: &str) -> io::Result<()> {
        let path = config_path().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Could not determine config path")
        })?;
        persist_acting_member_at(&path, name)
    }
}

pub fn persist_acting_member_at(path: &Path, name: &str) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
        Err(err) => return Err(err),
    };

    let mut doc = content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    if !doc.contains_key("app") {
        doc["app"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["app"]["acting_member"] = toml_edit::value(name);

    pledge_utils::atomic_write(path, doc.to_string().as_bytes())
}

fn default_members() -> Result<Vec<Member>, EmptyStringError> {
    Ok(vec![
        Member::new(MemberId::new(1), NonEmptyString::new("Sujin")?, "guardian", 45_000),
        Member::new(MemberId::new(2), NonEmptyString::new("Minjun")?, "child", 12_000),
    ])
}

#[must_use]
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME))
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Ok(explicit) = env::var(CONFIG_ENV_VAR)
        && !explicit.trim().is_empty()
    {
        return Some(expand_path(&explicit));
    }
    default_data_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}
