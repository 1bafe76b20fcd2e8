use crate::insights::SubjectMatch;
use anyhow::{anyhow, bail};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_URL: &str = "SCHOOL_SOURCE_URL";
pub const ENV_USERNAME: &str = "SCHOOL_SOURCE_USERNAME";
pub const ENV_PASSWORD: &str = "SCHOOL_SOURCE_PASSWORD";
pub const ENV_TIMEOUT_SECS: &str = "SCHOOL_SOURCE_TIMEOUT_SECS";
pub const ENV_FIXTURES: &str = "SCHOOL_SOURCE_FIXTURES";
pub const ENV_SUBJECT_MATCH: &str = "SCHOOL_SUBJECT_MATCH";

/// Connection details for the remote records API.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSettings {
    Http(SourceConfig),
    /// Directory holding `teachers.xml` and `children.xml`.
    Fixtures(PathBuf),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub source: Option<SourceSettings>,
    pub subject_match: SubjectMatch,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let subject_match = match get(ENV_SUBJECT_MATCH) {
            Some(raw) => SubjectMatch::parse(&raw)
                .ok_or_else(|| anyhow!("{ENV_SUBJECT_MATCH} must be exact or caseInsensitive"))?,
            None => SubjectMatch::default(),
        };

        let source = if let Some(dir) = get(ENV_FIXTURES) {
            Some(SourceSettings::Fixtures(PathBuf::from(dir)))
        } else if let Some(base_url) = get(ENV_URL) {
            let timeout = match get(ENV_TIMEOUT_SECS) {
                Some(raw) => parse_timeout_secs(&raw)?,
                None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            };
            Some(SourceSettings::Http(SourceConfig {
                base_url,
                username: get(ENV_USERNAME).unwrap_or_default(),
                password: lookup(ENV_PASSWORD).unwrap_or_default(),
                timeout,
            }))
        } else {
            None
        };

        Ok(Self {
            source,
            subject_match,
        })
    }
}

fn parse_timeout_secs(raw: &str) -> anyhow::Result<Duration> {
    let secs: u64 = raw
        .parse()
        .map_err(|_| anyhow!("{ENV_TIMEOUT_SECS} must be a whole number of seconds"))?;
    if secs == 0 {
        bail!("{ENV_TIMEOUT_SECS} must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}

/// Reads `source.configure` params: either `fixtureDir`, or `baseUrl` with
/// optional `username`, `password` and `timeoutSecs`.
pub fn source_settings_from_params(params: &serde_json::Value) -> Result<SourceSettings, String> {
    let str_param = |key: &str| {
        params
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    if let Some(dir) = str_param("fixtureDir") {
        return Ok(SourceSettings::Fixtures(PathBuf::from(dir)));
    }
    let Some(base_url) = str_param("baseUrl") else {
        return Err("missing baseUrl or fixtureDir".to_string());
    };
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err("baseUrl must start with http:// or https://".to_string());
    }
    let timeout = match params.get("timeoutSecs") {
        None | Some(serde_json::Value::Null) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        Some(v) => match v.as_u64() {
            Some(n) if n > 0 => Duration::from_secs(n),
            _ => return Err("timeoutSecs must be a positive integer".to_string()),
        },
    };
    Ok(SourceSettings::Http(SourceConfig {
        base_url,
        username: str_param("username").unwrap_or_default(),
        password: params
            .get("password")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
        timeout,
    }))
}
