use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which path answers queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Try the remote backend once, fall back to the local store on failure
    Remote,
    /// Local store only; the remote backend is never called
    Local,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Remote => "remote",
            Mode::Local => "local",
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "remote" | "api" => Ok(Mode::Remote),
            "local" => Ok(Mode::Local),
            other => Err(format!("unknown data mode `{other}` (expected `remote` or `local`)")),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mode inputs, resolved with precedence override > preference > `local`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeConfig {
    /// From env / CLI; pins the mode for the process lifetime
    pub override_mode: Option<Mode>,
    /// Persisted user preference
    pub preferred: Option<Mode>,
    pub remote_configured: bool,
}

impl ModeConfig {
    /// The mode the inputs ask for, before checking a remote exists
    pub fn requested(&self) -> Mode {
        self.override_mode.or(self.preferred).unwrap_or(Mode::Local)
    }

    /// Remote without a configured backend degrades to local
    pub fn effective(&self) -> Mode {
        match self.requested() {
            Mode::Remote if !self.remote_configured => Mode::Local,
            mode => mode,
        }
    }
}
