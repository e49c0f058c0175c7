// src/config.rs

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{env, fs, path::Path, time::Duration};
use url::Url;

use crate::dataset::DEFAULT_LOCATION;
use crate::fetch::DEFAULT_FEED_URL;
use crate::tracker::scheduler::{DEFAULT_RECOMPUTE_INTERVAL, DEFAULT_REFRESH_INTERVAL};

pub const ENV_CONFIG: &str = "VAXTRACK_CONFIG";
pub const ENV_FEED_URL: &str = "VAXTRACK_FEED_URL";
pub const ENV_REFRESH_SECS: &str = "VAXTRACK_REFRESH_SECS";
pub const ENV_RECOMPUTE_SECS: &str = "VAXTRACK_RECOMPUTE_SECS";
pub const ENV_LOCATION: &str = "VAXTRACK_LOCATION";
pub const ENV_TIMEOUT_SECS: &str = "VAXTRACK_TIMEOUT_SECS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub feed_url: String,
    pub refresh_interval_secs: u64,
    pub recompute_interval_secs: u64,
    /// Whole-request limit for one feed download.
    pub request_timeout_secs: u64,
    /// Location selected at startup.
    pub location: String,
    /// Headline shows the estimate rather than the last-known figure.
    pub estimate_live: bool,
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL.as_secs(),
            recompute_interval_secs: DEFAULT_RECOMPUTE_INTERVAL.as_secs(),
            request_timeout_secs: 120,
            location: DEFAULT_LOCATION.to_string(),
            estimate_live: true,
            output: OutputFormat::Text,
        }
    }
}

impl Config {
    /// Defaults, then the YAML file at `path` if any, then `VAXTRACK_*`
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        cfg.apply_overrides(|key| env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_yaml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup(ENV_FEED_URL) {
            self.feed_url = v;
        }
        if let Some(v) = lookup(ENV_REFRESH_SECS) {
            self.refresh_interval_secs = v
                .trim()
                .parse()
                .with_context(|| format!("{} must be whole seconds, got {:?}", ENV_REFRESH_SECS, v))?;
        }
        if let Some(v) = lookup(ENV_RECOMPUTE_SECS) {
            self.recompute_interval_secs = v.trim().parse().with_context(|| {
                format!("{} must be whole seconds, got {:?}", ENV_RECOMPUTE_SECS, v)
            })?;
        }
        if let Some(v) = lookup(ENV_TIMEOUT_SECS) {
            self.request_timeout_secs = v.trim().parse().with_context(|| {
                format!("{} must be whole seconds, got {:?}", ENV_TIMEOUT_SECS, v)
            })?;
        }
        if let Some(v) = lookup(ENV_LOCATION) {
            self.location = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.feed_url)
            .with_context(|| format!("parsing feed URL {}", self.feed_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("feed URL must be http or https, got {}", url.scheme());
        }
        if self.refresh_interval_secs == 0 {
            bail!("refresh_interval_secs must be greater than zero");
        }
        if self.recompute_interval_secs == 0 {
            bail!("recompute_interval_secs must be greater than zero");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn recompute_interval(&self) -> Duration {
        Duration::from_secs(self.recompute_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(3600));
        assert_eq!(cfg.recompute_interval(), Duration::from_secs(300));
        assert_eq!(cfg.request_timeout(), Duration::from_secs(120));
        assert_eq!(cfg.location, "World");
        assert!(cfg.estimate_live);
        assert_eq!(cfg.output, OutputFormat::Text);
        cfg.validate().unwrap();
    }

    #[test]
    fn test_partial_yaml_file() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "location: Chile\nrecompute_interval_secs: 60\noutput: json").unwrap();
        let cfg = Config::from_file(f.path()).unwrap();
        assert_eq!(cfg.location, "Chile");
        assert_eq!(cfg.recompute_interval_secs, 60);
        assert_eq!(cfg.refresh_interval_secs, 3600);
        assert_eq!(cfg.output, OutputFormat::Json);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "refresh_every: 10").unwrap();
        assert!(Config::from_file(f.path()).is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_FEED_URL, "http://localhost:8080/v.csv"),
            (ENV_REFRESH_SECS, " 120 "),
            (ENV_LOCATION, "Israel"),
            (ENV_TIMEOUT_SECS, "15"),
        ]
        .into_iter()
        .collect();
        let mut cfg = Config::default();
        cfg.apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(cfg.feed_url, "http://localhost:8080/v.csv");
        assert_eq!(cfg.refresh_interval_secs, 120);
        assert_eq!(cfg.recompute_interval_secs, 300);
        assert_eq!(cfg.location, "Israel");
        assert_eq!(cfg.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_bad_override_is_error() {
        let mut cfg = Config::default();
        let err = cfg
            .apply_overrides(|k| (k == ENV_RECOMPUTE_SECS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_RECOMPUTE_SECS));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = Config {
            refresh_interval_secs: 0,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());

        cfg.refresh_interval_secs = 10;
        cfg.feed_url = "ftp://example.com/v.csv".into();
        assert!(cfg.validate().is_err());

        cfg.feed_url = "not a url".into();
        assert!(cfg.validate().is_err());

        cfg.feed_url = DEFAULT_FEED_URL.into();
        cfg.request_timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }
}
